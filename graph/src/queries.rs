use crate::graph::Graph;
use crate::two_paths::TwoPathCounters;
use crate::*;

/// # Graph queries
impl Graph {
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    pub fn is_bipartite(&self) -> bool {
        self.number_of_mode_a_nodes.is_some()
    }

    /// Return the first-mode node count when the graph is bipartite.
    #[inline]
    pub fn get_number_of_mode_a_nodes(&self) -> Option<NodeT> {
        self.number_of_mode_a_nodes
    }

    #[inline]
    pub fn get_number_of_nodes(&self) -> NodeT {
        self.number_of_nodes
    }

    /// Return the current number of arcs (or undirected edges).
    #[inline]
    pub fn get_number_of_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Return whether the arc `src -> dst` is present. For undirected
    /// graphs the orientation of the query is irrelevant.
    #[inline]
    pub fn has_arc_from_node_ids(&self, src: NodeT, dst: NodeT) -> bool {
        self.arc_positions.contains_key(&self.arc_key(src, dst))
    }

    /// Return the arc stored at the given position of the flat arc list.
    #[inline]
    pub fn get_arc_from_arc_id(&self, arc_id: usize) -> (NodeT, NodeT) {
        self.arcs[arc_id]
    }

    /// Return an iterator over the current arcs, in flat-list order.
    pub fn iter_arc_node_ids(&self) -> impl Iterator<Item = (NodeT, NodeT)> + '_ {
        self.arcs.iter().copied()
    }

    #[inline]
    pub fn get_out_degree_from_node_id(&self, node_id: NodeT) -> NodeT {
        self.out_neighbours[node_id as usize].len() as NodeT
    }

    #[inline]
    pub fn get_in_degree_from_node_id(&self, node_id: NodeT) -> NodeT {
        if self.directed {
            self.in_neighbours[node_id as usize].len() as NodeT
        } else {
            self.out_neighbours[node_id as usize].len() as NodeT
        }
    }

    /// Return the degree of the node ignoring arc direction.
    #[inline]
    pub fn get_degree_from_node_id(&self, node_id: NodeT) -> NodeT {
        if self.directed {
            self.get_out_degree_from_node_id(node_id) + self.get_in_degree_from_node_id(node_id)
        } else {
            self.get_out_degree_from_node_id(node_id)
        }
    }

    /// Return an iterator over the out-neighbours of the node. For
    /// undirected graphs this iterates every neighbour.
    pub fn iter_out_neighbour_node_ids_from_node_id(
        &self,
        node_id: NodeT,
    ) -> impl Iterator<Item = NodeT> + '_ {
        self.out_neighbours[node_id as usize].iter().copied()
    }

    /// Return an iterator over the in-neighbours of the node. For
    /// undirected graphs this iterates every neighbour.
    pub fn iter_in_neighbour_node_ids_from_node_id(
        &self,
        node_id: NodeT,
    ) -> impl Iterator<Item = NodeT> + '_ {
        if self.directed {
            self.in_neighbours[node_id as usize].iter().copied()
        } else {
            self.out_neighbours[node_id as usize].iter().copied()
        }
    }

    /// Return the number of nodes k with arcs `src -> k` and `k -> dst`.
    ///
    /// Only defined for directed graphs.
    #[inline]
    pub fn get_mixed_two_path_count(&self, src: NodeT, dst: NodeT) -> u32 {
        match &self.two_paths {
            TwoPathCounters::Directed { mixed, .. } => mixed.get(src, dst),
            TwoPathCounters::Undirected { .. } => {
                unreachable!("Mixed two-paths are only defined for directed graphs.")
            }
        }
    }

    /// Return the number of nodes k with arcs `k -> a` and `k -> b`.
    ///
    /// Only defined for directed graphs.
    #[inline]
    pub fn get_shared_source_count(&self, a: NodeT, b: NodeT) -> u32 {
        match &self.two_paths {
            TwoPathCounters::Directed { shared_source, .. } => shared_source.get(a, b),
            TwoPathCounters::Undirected { .. } => {
                unreachable!("Shared-source two-paths are only defined for directed graphs.")
            }
        }
    }

    /// Return the number of nodes k with arcs `a -> k` and `b -> k`.
    ///
    /// Only defined for directed graphs.
    #[inline]
    pub fn get_shared_target_count(&self, a: NodeT, b: NodeT) -> u32 {
        match &self.two_paths {
            TwoPathCounters::Directed { shared_target, .. } => shared_target.get(a, b),
            TwoPathCounters::Undirected { .. } => {
                unreachable!("Shared-target two-paths are only defined for directed graphs.")
            }
        }
    }

    /// Return the number of nodes k adjacent to both a and b.
    ///
    /// Only defined for undirected graphs.
    #[inline]
    pub fn get_two_path_count(&self, a: NodeT, b: NodeT) -> u32 {
        match &self.two_paths {
            TwoPathCounters::Undirected { paths } => paths.get(a, b),
            TwoPathCounters::Directed { .. } => {
                unreachable!("Undirected two-paths are only defined for undirected graphs.")
            }
        }
    }

    /// Return the snowball zone data, when loaded.
    #[inline]
    pub fn get_snowball_zones(&self) -> Option<&crate::zones::SnowballZones> {
        self.zones.as_ref()
    }

    /// Return the citation term data, when loaded.
    #[inline]
    pub fn get_citation_terms(&self) -> Option<&crate::terms::CitationTerms> {
        self.terms.as_ref()
    }
}
