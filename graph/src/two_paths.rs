use super::*;
use hashbrown::HashMap;

/// Storage strategy for the two-path tables.
///
/// The dense realisation is a flat N x N matrix and the sparse one a hash
/// table keyed by ordered node pair; both give identical observable counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TwoPathMode {
    /// Pick dense for small graphs and sparse otherwise.
    Auto,
    Dense,
    Sparse,
}

/// Largest node count for which `Auto` still picks the dense matrices.
const AUTO_DENSE_MAX_NODES: NodeT = 1024;

impl TwoPathMode {
    pub(crate) fn resolve(self, number_of_nodes: NodeT) -> TwoPathMode {
        match self {
            TwoPathMode::Auto => {
                if number_of_nodes <= AUTO_DENSE_MAX_NODES {
                    TwoPathMode::Dense
                } else {
                    TwoPathMode::Sparse
                }
            }
            mode => mode,
        }
    }
}

/// A counter table over ordered node pairs.
#[derive(Clone, Debug)]
pub enum TwoPathTable {
    Dense {
        number_of_nodes: usize,
        counts: Vec<u32>,
    },
    Sparse {
        counts: HashMap<(NodeT, NodeT), u32>,
    },
}

impl TwoPathTable {
    /// Return a zeroed table for the requested storage mode.
    ///
    /// # Arguments
    /// * `mode`: TwoPathMode - The storage strategy, already resolved.
    /// * `number_of_nodes`: NodeT - The number of nodes in the graph.
    pub(crate) fn new(mode: TwoPathMode, number_of_nodes: NodeT) -> TwoPathTable {
        match mode.resolve(number_of_nodes) {
            TwoPathMode::Dense => TwoPathTable::Dense {
                number_of_nodes: number_of_nodes as usize,
                counts: vec![0; (number_of_nodes as usize) * (number_of_nodes as usize)],
            },
            _ => TwoPathTable::Sparse {
                counts: HashMap::new(),
            },
        }
    }

    /// Return the count stored for the ordered pair.
    #[inline]
    pub fn get(&self, src: NodeT, dst: NodeT) -> u32 {
        match self {
            TwoPathTable::Dense {
                number_of_nodes,
                counts,
            } => counts[(src as usize) * number_of_nodes + dst as usize],
            TwoPathTable::Sparse { counts } => {
                counts.get(&(src, dst)).copied().unwrap_or(0)
            }
        }
    }

    /// Add a signed delta to the ordered pair, dropping sparse entries at zero.
    #[inline]
    pub(crate) fn add(&mut self, src: NodeT, dst: NodeT, delta: i32) {
        match self {
            TwoPathTable::Dense {
                number_of_nodes,
                counts,
            } => {
                let entry = &mut counts[(src as usize) * *number_of_nodes + dst as usize];
                *entry = (*entry as i64 + delta as i64) as u32;
            }
            TwoPathTable::Sparse { counts } => {
                let entry = counts.entry((src, dst)).or_insert(0);
                *entry = (*entry as i64 + delta as i64) as u32;
                if *entry == 0 {
                    counts.remove(&(src, dst));
                }
            }
        }
    }
}

/// The two-path tables of a graph.
///
/// Directed graphs keep three tables: `mixed[i][j]` counts nodes k with arcs
/// i->k and k->j, `shared_source[i][j]` nodes k with arcs k->i and k->j, and
/// `shared_target[i][j]` nodes k with arcs i->k and j->k. Undirected graphs
/// keep the single symmetric table `paths[i][j]` counting nodes k adjacent
/// to both i and j. Diagonals are maintained too: `shared_source[i][i]` is
/// the in-degree of i and `shared_target[i][i]` its out-degree.
#[derive(Clone, Debug)]
pub(crate) enum TwoPathCounters {
    Directed {
        mixed: TwoPathTable,
        shared_source: TwoPathTable,
        shared_target: TwoPathTable,
    },
    Undirected {
        paths: TwoPathTable,
    },
}

impl TwoPathCounters {
    pub(crate) fn new(directed: bool, mode: TwoPathMode, number_of_nodes: NodeT) -> Self {
        if directed {
            TwoPathCounters::Directed {
                mixed: TwoPathTable::new(mode, number_of_nodes),
                shared_source: TwoPathTable::new(mode, number_of_nodes),
                shared_target: TwoPathTable::new(mode, number_of_nodes),
            }
        } else {
            TwoPathCounters::Undirected {
                paths: TwoPathTable::new(mode, number_of_nodes),
            }
        }
    }
}
