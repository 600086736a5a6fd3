use crate::graph::Graph;
use crate::*;
use hashbrown::HashMap;

/// Snowball sampling zone data.
///
/// Conditional estimation fixes every tie incident to the outermost wave, so
/// the samplers only toggle arcs between inner nodes and must never orphan a
/// node from the wave it was recruited from.
#[derive(Clone, Debug)]
pub struct SnowballZones {
    /// The snowball wave of each node.
    pub(crate) zone: Vec<u32>,
    /// The largest (outermost) wave.
    pub(crate) max_zone: u32,
    /// Nodes lying strictly inside the outermost wave.
    pub(crate) inner_nodes: Vec<NodeT>,
    pub(crate) is_inner: Vec<bool>,
    /// Arcs whose endpoints are both inner nodes, in flat-list form.
    pub(crate) inner_arcs: Vec<(NodeT, NodeT)>,
    pub(crate) inner_arc_positions: HashMap<(NodeT, NodeT), usize>,
    /// For each node, the number of its neighbours (ignoring direction)
    /// lying in the immediately preceding wave.
    pub(crate) prev_wave_degree: Vec<NodeT>,
    /// Number of candidate dyads between inner nodes in adjacent-or-equal
    /// waves, ordered when the graph is directed.
    pub(crate) number_of_inner_dyads: DyadT,
}

impl SnowballZones {
    /// Build the zone side data from the current arc set of the graph.
    ///
    /// # Arguments
    /// * `graph`: &Graph - The graph the zones refer to.
    /// * `zone`: Vec<u32> - The snowball wave of each node.
    pub(crate) fn from_graph(graph: &Graph, zone: Vec<u32>) -> Result<SnowballZones> {
        if zone.len() != graph.number_of_nodes as usize {
            return Err(format!(
                "The zone file provides {} zones but the graph has {} nodes.",
                zone.len(),
                graph.number_of_nodes
            ));
        }
        let max_zone = zone.iter().copied().max().unwrap_or(0);
        if max_zone == 0 {
            return Err(concat!(
                "Conditional estimation requires at least two snowball waves, ",
                "but every node lies in wave 0."
            )
            .to_string());
        }
        let mut wave_sizes = vec![0 as DyadT; max_zone as usize + 1];
        zone.iter().for_each(|&z| wave_sizes[z as usize] += 1);
        if let Some(empty) = wave_sizes.iter().position(|&size| size == 0) {
            return Err(format!(
                "The snowball waves are not contiguous: wave {} has no nodes.",
                empty
            ));
        }

        let is_inner: Vec<bool> = zone.iter().map(|&z| z < max_zone).collect();
        let inner_nodes: Vec<NodeT> = (0..graph.number_of_nodes)
            .filter(|&node_id| is_inner[node_id as usize])
            .collect();

        // Ordered dyads between inner nodes at most one wave apart; halved
        // for undirected graphs since a candidate is an unordered pair.
        let mut number_of_inner_dyads: DyadT = 0;
        for z in 0..max_zone as usize {
            let same = wave_sizes[z];
            number_of_inner_dyads += same * (same - 1);
            if z + 1 < max_zone as usize {
                number_of_inner_dyads += 2 * same * wave_sizes[z + 1];
            }
        }
        if !graph.directed {
            number_of_inner_dyads /= 2;
        }

        let mut prev_wave_degree = vec![0 as NodeT; graph.number_of_nodes as usize];
        let mut inner_arcs = Vec::new();
        let mut inner_arc_positions = HashMap::new();
        for &(src, dst) in graph.arcs.iter() {
            if zone[src as usize] == zone[dst as usize] + 1 {
                prev_wave_degree[src as usize] += 1;
            }
            if zone[dst as usize] == zone[src as usize] + 1 {
                prev_wave_degree[dst as usize] += 1;
            }
            if is_inner[src as usize] && is_inner[dst as usize] {
                inner_arc_positions.insert((src, dst), inner_arcs.len());
                inner_arcs.push((src, dst));
            }
        }

        Ok(SnowballZones {
            zone,
            max_zone,
            inner_nodes,
            is_inner,
            inner_arcs,
            inner_arc_positions,
            prev_wave_degree,
            number_of_inner_dyads,
        })
    }

    #[inline]
    pub fn get_zone_from_node_id(&self, node_id: NodeT) -> u32 {
        self.zone[node_id as usize]
    }

    #[inline]
    pub fn get_max_zone(&self) -> u32 {
        self.max_zone
    }

    #[inline]
    pub fn is_inner_node(&self, node_id: NodeT) -> bool {
        self.is_inner[node_id as usize]
    }

    #[inline]
    pub fn get_inner_nodes(&self) -> &[NodeT] {
        &self.inner_nodes
    }

    #[inline]
    pub fn get_number_of_inner_arcs(&self) -> usize {
        self.inner_arcs.len()
    }

    #[inline]
    pub fn get_inner_arc_from_arc_id(&self, arc_id: usize) -> (NodeT, NodeT) {
        self.inner_arcs[arc_id]
    }

    #[inline]
    pub fn get_prev_wave_degree_from_node_id(&self, node_id: NodeT) -> NodeT {
        self.prev_wave_degree[node_id as usize]
    }

    #[inline]
    pub fn get_number_of_inner_dyads(&self) -> DyadT {
        self.number_of_inner_dyads
    }
}
