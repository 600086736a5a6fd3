use crate::attributes::NodeAttributes;
use crate::graph::Graph;
use crate::terms::CitationTerms;
use crate::two_paths::TwoPathCounters;
use crate::zones::SnowballZones;
use crate::*;
use hashbrown::HashMap;

/// # Graph construction methods
impl Graph {
    /// Return a new graph with the given node set and no arcs.
    ///
    /// # Arguments
    /// * `directed`: bool - Whether to build the graph as directed or undirected.
    /// * `number_of_nodes`: NodeT - The number of nodes in the graph.
    /// * `number_of_mode_a_nodes`: Option<NodeT> - The first-mode node count when bipartite.
    /// * `two_path_mode`: TwoPathMode - Storage strategy for the two-path tables.
    ///
    /// # Raises
    /// * If the graph has no nodes.
    /// * If the bipartite mode size is zero or not smaller than the node count.
    /// * If a bipartite graph is requested as directed.
    pub fn new(
        directed: bool,
        number_of_nodes: NodeT,
        number_of_mode_a_nodes: Option<NodeT>,
        two_path_mode: TwoPathMode,
    ) -> Result<Graph> {
        if number_of_nodes == 0 {
            return Err("Cannot build a graph without nodes.".to_string());
        }
        if let Some(mode_a) = number_of_mode_a_nodes {
            if directed {
                return Err("Bipartite graphs must be undirected.".to_string());
            }
            if mode_a == 0 || mode_a >= number_of_nodes {
                return Err(format!(
                    concat!(
                        "The bipartite first-mode size {} is invalid for a graph ",
                        "with {} nodes: both modes must be non-empty."
                    ),
                    mode_a, number_of_nodes
                ));
            }
        }
        Ok(Graph {
            directed,
            number_of_nodes,
            number_of_mode_a_nodes,
            out_neighbours: vec![Vec::new(); number_of_nodes as usize],
            in_neighbours: vec![Vec::new(); number_of_nodes as usize],
            arcs: Vec::new(),
            arc_positions: HashMap::new(),
            two_paths: TwoPathCounters::new(directed, two_path_mode, number_of_nodes),
            attributes: NodeAttributes::default(),
            zones: None,
            terms: None,
        })
    }

    /// Attach the provided attribute columns to the graph.
    ///
    /// # Arguments
    /// * `attributes`: NodeAttributes - The attribute columns to attach.
    ///
    /// # Raises
    /// * If any column length differs from the number of nodes.
    pub fn set_attributes(&mut self, attributes: NodeAttributes) -> Result<()> {
        attributes.validate(self.number_of_nodes)?;
        self.attributes = attributes;
        Ok(())
    }

    /// Attach snowball sampling zones, computing the derived side data from
    /// the current arc set.
    ///
    /// # Arguments
    /// * `zone`: Vec<u32> - The snowball wave of each node.
    ///
    /// # Raises
    /// * If the zone vector length differs from the number of nodes.
    /// * If the zones are not contiguous from zero.
    /// * If there are fewer than two distinct zones.
    pub fn set_snowball_zones(&mut self, zone: Vec<u32>) -> Result<()> {
        let zones = SnowballZones::from_graph(self, zone)?;
        self.zones = Some(zones);
        Ok(())
    }

    /// Attach citation terms, computing the max-term side data from the
    /// current arc set.
    ///
    /// # Arguments
    /// * `term`: Vec<u32> - The term (time period) of each node.
    ///
    /// # Raises
    /// * If the graph is undirected.
    /// * If the term vector length differs from the number of nodes.
    pub fn set_citation_terms(&mut self, term: Vec<u32>) -> Result<()> {
        if !self.directed {
            return Err("Citation terms require a directed graph.".to_string());
        }
        let terms = CitationTerms::from_graph(self, term)?;
        self.terms = Some(terms);
        Ok(())
    }
}
