use crate::graph::Graph;
use crate::*;
use hashbrown::HashMap;

/// Citation term data.
///
/// Term-conditional estimation fixes every arc whose sender is not in the
/// latest term, so the samplers only toggle arcs sent by max-term nodes.
#[derive(Clone, Debug)]
pub struct CitationTerms {
    /// The term (time period) of each node.
    pub(crate) term: Vec<u32>,
    /// The largest observed term.
    pub(crate) max_term: u32,
    /// Nodes whose term equals `max_term`.
    pub(crate) maxterm_nodes: Vec<NodeT>,
    pub(crate) is_maxterm: Vec<bool>,
    /// Arcs whose tail is a max-term node, in flat-list form.
    pub(crate) maxtermsender_arcs: Vec<(NodeT, NodeT)>,
    pub(crate) maxtermsender_arc_positions: HashMap<(NodeT, NodeT), usize>,
}

impl CitationTerms {
    /// Build the term side data from the current arc set of the graph.
    pub(crate) fn from_graph(graph: &Graph, term: Vec<u32>) -> Result<CitationTerms> {
        if term.len() != graph.number_of_nodes as usize {
            return Err(format!(
                "The term file provides {} terms but the graph has {} nodes.",
                term.len(),
                graph.number_of_nodes
            ));
        }
        let max_term = term.iter().copied().max().unwrap_or(0);
        let is_maxterm: Vec<bool> = term.iter().map(|&t| t == max_term).collect();
        let maxterm_nodes: Vec<NodeT> = (0..graph.number_of_nodes)
            .filter(|&node_id| is_maxterm[node_id as usize])
            .collect();

        let mut maxtermsender_arcs = Vec::new();
        let mut maxtermsender_arc_positions = HashMap::new();
        for &(src, dst) in graph.arcs.iter() {
            if is_maxterm[src as usize] {
                maxtermsender_arc_positions.insert((src, dst), maxtermsender_arcs.len());
                maxtermsender_arcs.push((src, dst));
            }
        }

        Ok(CitationTerms {
            term,
            max_term,
            maxterm_nodes,
            is_maxterm,
            maxtermsender_arcs,
            maxtermsender_arc_positions,
        })
    }

    #[inline]
    pub fn get_term_from_node_id(&self, node_id: NodeT) -> u32 {
        self.term[node_id as usize]
    }

    #[inline]
    pub fn get_max_term(&self) -> u32 {
        self.max_term
    }

    #[inline]
    pub fn is_maxterm_node(&self, node_id: NodeT) -> bool {
        self.is_maxterm[node_id as usize]
    }

    #[inline]
    pub fn get_maxterm_nodes(&self) -> &[NodeT] {
        &self.maxterm_nodes
    }

    #[inline]
    pub fn get_number_of_maxtermsender_arcs(&self) -> usize {
        self.maxtermsender_arcs.len()
    }

    #[inline]
    pub fn get_maxtermsender_arc_from_arc_id(&self, arc_id: usize) -> (NodeT, NodeT) {
        self.maxtermsender_arcs[arc_id]
    }
}
