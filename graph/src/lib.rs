//! An in-memory graph representation optimized for single-arc toggles.
//!
//! The store keeps the forward and reverse incident-arc lists, a flat arc
//! list for O(1) uniform arc picks, and incrementally maintained two-path
//! tables, so that a Metropolis sampler can evaluate and commit a toggle in
//! expected constant time.
//!
//! # Definitions
//! * `arc`: an ordered pair of nodes in a directed graph
//! * `edge`: an unordered pair of nodes in an undirected graph
//! * `two-path`: a pair of incident arcs sharing a middle node
//! * `inner node`: a node outside the last wave of a snowball sample
//! * `max-term node`: a node whose term equals the largest observed term

mod types;
pub use types::*;

mod graph;
pub use self::graph::Graph;

mod graph_impl;
mod modifiers;
mod queries;
pub use self::queries::*;

mod two_paths;
pub use two_paths::{TwoPathMode, TwoPathTable};

mod attributes;
pub use attributes::NodeAttributes;

mod zones;
pub use zones::SnowballZones;

mod terms;
pub use terms::CitationTerms;

mod from_file;
pub use from_file::*;
