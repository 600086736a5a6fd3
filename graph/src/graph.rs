//! A mutable graph representation optimized for single-arc toggles.
use crate::attributes::NodeAttributes;
use crate::terms::CitationTerms;
use crate::two_paths::TwoPathCounters;
use crate::zones::SnowballZones;
use crate::*;
use hashbrown::HashMap;

/// A labelled graph over the fixed node set `{0, .., N-1}` with a mutable
/// arc set and incrementally maintained side indices.
#[derive(Clone, Debug)]
pub struct Graph {
    /// Whether the graph is directed.
    pub(crate) directed: bool,
    /// Number of nodes, fixed after construction.
    pub(crate) number_of_nodes: NodeT,
    /// Number of first-mode nodes when the graph is bipartite.
    /// Nodes `0..number_of_mode_a_nodes` form mode A, the rest mode B.
    pub(crate) number_of_mode_a_nodes: Option<NodeT>,
    /// Forward incident-arc lists. For undirected graphs this holds every
    /// neighbour of the node and `in_neighbours` stays empty.
    pub(crate) out_neighbours: Vec<Vec<NodeT>>,
    /// Reverse incident-arc lists, the transpose of `out_neighbours`.
    pub(crate) in_neighbours: Vec<Vec<NodeT>>,
    /// Flat list of every arc, used to pick a uniform arc in O(1).
    /// Undirected edges are stored with the smaller endpoint first.
    pub(crate) arcs: Vec<(NodeT, NodeT)>,
    /// Position of each arc inside `arcs`, for O(1) swap-removal.
    pub(crate) arc_positions: HashMap<(NodeT, NodeT), usize>,
    /// The two-path tables, kept exact across every toggle.
    pub(crate) two_paths: TwoPathCounters,
    /// Per-node attribute columns, read-only after load.
    pub(crate) attributes: NodeAttributes,
    /// Snowball sampling zone data, when conditional estimation applies.
    pub(crate) zones: Option<SnowballZones>,
    /// Citation term data, when term-conditional estimation applies.
    pub(crate) terms: Option<CitationTerms>,
}
