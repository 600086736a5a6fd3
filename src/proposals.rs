//! Proposal generators for the candidate add and delete moves.
//!
//! The active constraint regime is a closed enum built once per task, so
//! the samplers never branch on configuration booleans in the hot loop.
//! Rejection is by resampling with a bounded attempt count: a bound
//! exhausted on addition is an error, while an empty or exhausted deletion
//! pool is reported as `None` so the sampler can fall back to an addition.

use ::graph::{DyadT, Graph, NodeT, Result};
use rand::rngs::SmallRng;
use rand::Rng;

/// Resampling bound per proposal; graphs dense enough to exhaust it are far
/// outside the sparse regime the samplers are built for.
pub const MAX_PROPOSAL_ATTEMPTS: usize = 10_000;

/// The constraint regime the proposal generators draw under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Regime {
    /// Unconstrained toggles over every candidate dyad.
    Plain {
        allow_loops: bool,
        forbid_reciprocity: bool,
    },
    /// Snowball-conditional: only arcs between inner nodes at most one wave
    /// apart, never orphaning a node from its recruiting wave.
    Snowball,
    /// Citation-conditional: only arcs sent by max-term nodes.
    Citation,
}

impl Regime {
    /// Draw a uniform candidate arc to add, absent from the graph and
    /// admissible under the regime, or `None` when every candidate dyad is
    /// already occupied.
    ///
    /// # Raises
    /// * If the resampling bound is exhausted on a graph that still has
    ///   free candidate dyads.
    pub fn propose_addition(
        &self,
        graph: &Graph,
        rng: &mut SmallRng,
    ) -> Result<Option<(NodeT, NodeT)>> {
        if self.occupied_candidate_dyads(graph)? >= self.get_number_of_addition_dyads(graph)? {
            return Ok(None);
        }
        let number_of_nodes = graph.get_number_of_nodes();
        for _ in 0..MAX_PROPOSAL_ATTEMPTS {
            let (src, dst) = match self {
                Regime::Plain {
                    allow_loops,
                    forbid_reciprocity,
                } => {
                    let (src, dst) = match graph.get_number_of_mode_a_nodes() {
                        Some(mode_a) => (
                            rng.gen_range(0, mode_a),
                            rng.gen_range(mode_a, number_of_nodes),
                        ),
                        None => (
                            rng.gen_range(0, number_of_nodes),
                            rng.gen_range(0, number_of_nodes),
                        ),
                    };
                    if src == dst && !allow_loops {
                        continue;
                    }
                    if *forbid_reciprocity && graph.has_arc_from_node_ids(dst, src) {
                        continue;
                    }
                    (src, dst)
                }
                Regime::Snowball => {
                    let zones = expect_zones(graph)?;
                    let inner_nodes = zones.get_inner_nodes();
                    let src = inner_nodes[rng.gen_range(0, inner_nodes.len())];
                    let dst = inner_nodes[rng.gen_range(0, inner_nodes.len())];
                    if src == dst {
                        continue;
                    }
                    let src_zone = zones.get_zone_from_node_id(src);
                    let dst_zone = zones.get_zone_from_node_id(dst);
                    if src_zone.max(dst_zone) - src_zone.min(dst_zone) > 1 {
                        continue;
                    }
                    (src, dst)
                }
                Regime::Citation => {
                    let terms = expect_terms(graph)?;
                    let maxterm_nodes = terms.get_maxterm_nodes();
                    let src = maxterm_nodes[rng.gen_range(0, maxterm_nodes.len())];
                    let dst = rng.gen_range(0, number_of_nodes);
                    if src == dst {
                        continue;
                    }
                    (src, dst)
                }
            };
            if !graph.has_arc_from_node_ids(src, dst) {
                return Ok(Some((src, dst)));
            }
        }
        Err(format!(
            concat!(
                "No admissible addition was found in {} attempts: the graph is ",
                "too dense for rejection sampling under the active regime."
            ),
            MAX_PROPOSAL_ATTEMPTS
        ))
    }

    /// Number of candidate dyads currently occupied by arcs, matching the
    /// domain `get_number_of_addition_dyads` counts over.
    fn occupied_candidate_dyads(&self, graph: &Graph) -> Result<DyadT> {
        Ok(match self {
            Regime::Plain { .. } => graph.get_number_of_arcs() as DyadT,
            Regime::Snowball => expect_zones(graph)?.get_number_of_inner_arcs() as DyadT,
            Regime::Citation => {
                expect_terms(graph)?.get_number_of_maxtermsender_arcs() as DyadT
            }
        })
    }

    /// The size of the addition candidate pool of the regime. Matches
    /// `get_number_of_candidate_dyads` except for the citation regime,
    /// whose reported dyad count is a halved convention.
    fn get_number_of_addition_dyads(&self, graph: &Graph) -> Result<DyadT> {
        match self {
            Regime::Citation => {
                let terms = expect_terms(graph)?;
                Ok(terms.get_maxterm_nodes().len() as DyadT
                    * (graph.get_number_of_nodes() as DyadT - 1))
            }
            _ => self.get_number_of_candidate_dyads(graph),
        }
    }

    /// Draw a uniform candidate arc to delete, or `None` when the deletable
    /// pool is empty or the resampling bound is exhausted.
    pub fn propose_deletion(
        &self,
        graph: &Graph,
        rng: &mut SmallRng,
    ) -> Result<Option<(NodeT, NodeT)>> {
        match self {
            Regime::Plain { .. } => {
                if graph.get_number_of_arcs() == 0 {
                    return Ok(None);
                }
                Ok(Some(
                    graph.get_arc_from_arc_id(rng.gen_range(0, graph.get_number_of_arcs())),
                ))
            }
            Regime::Snowball => {
                let zones = expect_zones(graph)?;
                if zones.get_number_of_inner_arcs() == 0 {
                    return Ok(None);
                }
                for _ in 0..MAX_PROPOSAL_ATTEMPTS {
                    let (src, dst) = zones
                        .get_inner_arc_from_arc_id(rng.gen_range(0, zones.get_number_of_inner_arcs()));
                    // Deleting the last tie into the recruiting wave would
                    // break the snowball structure.
                    let src_zone = zones.get_zone_from_node_id(src);
                    let dst_zone = zones.get_zone_from_node_id(dst);
                    if src_zone == dst_zone + 1 && zones.get_prev_wave_degree_from_node_id(src) == 1
                    {
                        continue;
                    }
                    if dst_zone == src_zone + 1 && zones.get_prev_wave_degree_from_node_id(dst) == 1
                    {
                        continue;
                    }
                    return Ok(Some((src, dst)));
                }
                Ok(None)
            }
            Regime::Citation => {
                let terms = expect_terms(graph)?;
                if terms.get_number_of_maxtermsender_arcs() == 0 {
                    return Ok(None);
                }
                Ok(Some(terms.get_maxtermsender_arc_from_arc_id(
                    rng.gen_range(0, terms.get_number_of_maxtermsender_arcs()),
                )))
            }
        }
    }

    /// Return the number of candidate dyads under the regime, the `L` of
    /// the IFD arc-parameter correction and the dyad pool of the TNT kernel.
    pub fn get_number_of_candidate_dyads(&self, graph: &Graph) -> Result<DyadT> {
        let number_of_nodes = graph.get_number_of_nodes() as DyadT;
        Ok(match self {
            Regime::Plain {
                allow_loops,
                forbid_reciprocity,
            } => match graph.get_number_of_mode_a_nodes() {
                Some(mode_a) => {
                    (mode_a as DyadT) * (number_of_nodes - mode_a as DyadT)
                }
                None => {
                    let mut dyads = if *allow_loops {
                        number_of_nodes * number_of_nodes
                    } else {
                        number_of_nodes * (number_of_nodes - 1)
                    };
                    if !graph.is_directed() || *forbid_reciprocity {
                        dyads /= 2;
                    }
                    dyads
                }
            },
            Regime::Snowball => expect_zones(graph)?.get_number_of_inner_dyads(),
            Regime::Citation => {
                let terms = expect_terms(graph)?;
                terms.get_maxterm_nodes().len() as DyadT * (number_of_nodes - 1) / 2
            }
        })
    }
}

fn expect_zones(graph: &Graph) -> Result<&::graph::SnowballZones> {
    graph.get_snowball_zones().ok_or_else(|| {
        "The snowball regime is active but the graph has no zone data.".to_string()
    })
}

fn expect_terms(graph: &Graph) -> Result<&::graph::CitationTerms> {
    graph.get_citation_terms().ok_or_else(|| {
        "The citation regime is active but the graph has no term data.".to_string()
    })
}
