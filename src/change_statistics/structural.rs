//! Structural change statistics.
//!
//! The alternating statistics use the decay parametrisation whose
//! whole-graph values are `lambda^2 * sum_i [y^d_i - 1 + d_i/lambda]` for
//! stars and `lambda * sum [1 - y^count]` over arcs or pairs for k-triangles
//! and two-paths, with `y = 1 - 1/lambda`; the change formulas below are the
//! closed-form single-toggle deltas of those sums.

use super::{ChangeStatistic, ModelTerm, DEFAULT_DECAY};
use crate::config::ParamSpec;
use ::graph::{Graph, NodeT, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StructuralStatistic {
    // Directed terms.
    Arc,
    Reciprocity,
    Sink,
    Source,
    Loop,
    AltInStars { decay: f64 },
    AltOutStars { decay: f64 },
    AltKTrianglesT { decay: f64 },
    AltKTrianglesC { decay: f64 },
    AltTwoPathsT { decay: f64 },
    AltTwoPathsD { decay: f64 },
    AltTwoPathsU { decay: f64 },
    AltTwoPathsTD { decay: f64 },
    // Undirected terms.
    Edge,
    AltStars { decay: f64 },
    AltKTriangles { decay: f64 },
    AltTwoPaths { decay: f64 },
    // Either direction.
    Isolates,
}

impl StructuralStatistic {
    pub(crate) fn requires_directed(&self) -> bool {
        !matches!(
            self,
            StructuralStatistic::Edge
                | StructuralStatistic::AltStars { .. }
                | StructuralStatistic::AltKTriangles { .. }
                | StructuralStatistic::AltTwoPaths { .. }
                | StructuralStatistic::Isolates
        )
    }

    /// Whether the change formula stays exact when self-loops may occur.
    /// The alternating path and triangle statistics assume a loop-free
    /// graph; the degree and indicator statistics do not care.
    pub(crate) fn supports_loops(&self) -> bool {
        !matches!(
            self,
            StructuralStatistic::AltKTrianglesT { .. }
                | StructuralStatistic::AltKTrianglesC { .. }
                | StructuralStatistic::AltTwoPathsT { .. }
                | StructuralStatistic::AltTwoPathsD { .. }
                | StructuralStatistic::AltTwoPathsU { .. }
                | StructuralStatistic::AltTwoPathsTD { .. }
        )
    }

    pub(crate) fn requires_undirected(&self) -> bool {
        matches!(
            self,
            StructuralStatistic::Edge
                | StructuralStatistic::AltStars { .. }
                | StructuralStatistic::AltKTriangles { .. }
                | StructuralStatistic::AltTwoPaths { .. }
        )
    }

    #[inline]
    pub(crate) fn evaluate(&self, graph: &Graph, src: NodeT, dst: NodeT) -> f64 {
        match *self {
            StructuralStatistic::Arc | StructuralStatistic::Edge => 1.0,
            StructuralStatistic::Reciprocity => {
                if graph.has_arc_from_node_ids(dst, src) {
                    1.0
                } else {
                    0.0
                }
            }
            StructuralStatistic::Loop => {
                if src == dst {
                    1.0
                } else {
                    0.0
                }
            }
            StructuralStatistic::Sink => {
                change_degree_indicator(graph, src, dst, |in_degree, out_degree| {
                    out_degree == 0 && in_degree > 0
                })
            }
            StructuralStatistic::Source => {
                change_degree_indicator(graph, src, dst, |in_degree, out_degree| {
                    in_degree == 0 && out_degree > 0
                })
            }
            StructuralStatistic::Isolates => {
                if graph.is_directed() {
                    change_degree_indicator(graph, src, dst, |in_degree, out_degree| {
                        in_degree == 0 && out_degree == 0
                    })
                } else {
                    let mut delta = 0.0;
                    if graph.get_degree_from_node_id(src) == 0 {
                        delta -= 1.0;
                    }
                    if graph.get_degree_from_node_id(dst) == 0 {
                        delta -= 1.0;
                    }
                    delta
                }
            }
            StructuralStatistic::AltInStars { decay } => {
                decay * (1.0 - decay_pow(decay, graph.get_in_degree_from_node_id(dst)))
            }
            StructuralStatistic::AltOutStars { decay } => {
                decay * (1.0 - decay_pow(decay, graph.get_out_degree_from_node_id(src)))
            }
            StructuralStatistic::AltStars { decay } => {
                decay * (1.0 - decay_pow(decay, graph.get_degree_from_node_id(src)))
                    + decay * (1.0 - decay_pow(decay, graph.get_degree_from_node_id(dst)))
            }
            StructuralStatistic::AltKTrianglesT { decay } => {
                change_alt_ktriangles_t(graph, src, dst, decay)
            }
            StructuralStatistic::AltKTrianglesC { decay } => {
                change_alt_ktriangles_c(graph, src, dst, decay)
            }
            StructuralStatistic::AltTwoPathsT { decay } => {
                change_alt_two_paths_t(graph, src, dst, decay)
            }
            StructuralStatistic::AltTwoPathsD { decay } => {
                change_alt_two_paths_d(graph, src, dst, decay)
            }
            StructuralStatistic::AltTwoPathsU { decay } => {
                change_alt_two_paths_u(graph, src, dst, decay)
            }
            StructuralStatistic::AltTwoPathsTD { decay } => {
                change_alt_two_paths_t(graph, src, dst, decay)
                    + change_alt_two_paths_d(graph, src, dst, decay)
            }
            StructuralStatistic::AltKTriangles { decay } => {
                change_alt_ktriangles_undirected(graph, src, dst, decay)
            }
            StructuralStatistic::AltTwoPaths { decay } => {
                change_alt_two_paths_undirected(graph, src, dst, decay)
            }
        }
    }
}

#[inline]
fn decay_pow(decay: f64, count: NodeT) -> f64 {
    (1.0 - 1.0 / decay).powi(count as i32)
}

/// Change of a count of nodes satisfying an in/out-degree indicator, from
/// the degree changes the toggle induces on its endpoints.
fn change_degree_indicator<F>(graph: &Graph, src: NodeT, dst: NodeT, indicator: F) -> f64
where
    F: Fn(NodeT, NodeT) -> bool,
{
    let count = |in_degree, out_degree| indicator(in_degree, out_degree) as u8 as f64;
    let src_in = graph.get_in_degree_from_node_id(src);
    let src_out = graph.get_out_degree_from_node_id(src);
    if src == dst {
        return count(src_in + 1, src_out + 1) - count(src_in, src_out);
    }
    let dst_in = graph.get_in_degree_from_node_id(dst);
    let dst_out = graph.get_out_degree_from_node_id(dst);
    count(src_in, src_out + 1) - count(src_in, src_out) + count(dst_in + 1, dst_out)
        - count(dst_in, dst_out)
}

/// Alternating transitive k-triangles: the new arc closes k-triangles over
/// its own mixed two-paths, and lengthens the two-path count of every
/// present arc it forms a new two-path for. Exact on loop-free graphs,
/// which the configuration validation guarantees for the path statistics.
fn change_alt_ktriangles_t(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let own = graph.get_mixed_two_path_count(src, dst);
    let mut delta = decay * (1.0 - decay_pow(decay, own));
    for w in graph.iter_out_neighbour_node_ids_from_node_id(dst) {
        if graph.has_arc_from_node_ids(src, w) {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(src, w));
        }
    }
    for u in graph.iter_in_neighbour_node_ids_from_node_id(src) {
        if graph.has_arc_from_node_ids(u, dst) {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(u, dst));
        }
    }
    delta
}

/// Alternating cyclic k-triangles: as the transitive variant, with the
/// closure running against the arc direction.
fn change_alt_ktriangles_c(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let own = graph.get_mixed_two_path_count(dst, src);
    let mut delta = decay * (1.0 - decay_pow(decay, own));
    for w in graph.iter_out_neighbour_node_ids_from_node_id(dst) {
        if graph.has_arc_from_node_ids(w, src) {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(src, w));
        }
    }
    for u in graph.iter_in_neighbour_node_ids_from_node_id(src) {
        if graph.has_arc_from_node_ids(dst, u) {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(u, dst));
        }
    }
    delta
}

/// Alternating mixed two-paths over the ordered off-diagonal pairs.
fn change_alt_two_paths_t(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let mut delta = 0.0;
    for w in graph.iter_out_neighbour_node_ids_from_node_id(dst) {
        if w != src {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(src, w));
        }
    }
    for u in graph.iter_in_neighbour_node_ids_from_node_id(src) {
        if u != dst {
            delta += decay_pow(decay, graph.get_mixed_two_path_count(u, dst));
        }
    }
    delta
}

/// Alternating shared-source two-paths over the unordered off-diagonal
/// pairs: the destination gains the source as a new common sender with
/// every other target of the source.
fn change_alt_two_paths_d(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let mut delta = 0.0;
    for w in graph.iter_out_neighbour_node_ids_from_node_id(src) {
        if w != dst {
            delta += decay_pow(decay, graph.get_shared_source_count(dst, w));
        }
    }
    delta
}

/// Alternating shared-target two-paths over the unordered off-diagonal
/// pairs: the source gains the destination as a new common target with
/// every other sender to the destination.
fn change_alt_two_paths_u(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let mut delta = 0.0;
    for w in graph.iter_in_neighbour_node_ids_from_node_id(dst) {
        if w != src {
            delta += decay_pow(decay, graph.get_shared_target_count(src, w));
        }
    }
    delta
}

fn change_alt_ktriangles_undirected(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let mut delta = decay * (1.0 - decay_pow(decay, graph.get_two_path_count(src, dst)));
    for w in graph.iter_out_neighbour_node_ids_from_node_id(dst) {
        if w != src && graph.has_arc_from_node_ids(src, w) {
            delta += decay_pow(decay, graph.get_two_path_count(src, w));
        }
    }
    for w in graph.iter_out_neighbour_node_ids_from_node_id(src) {
        if w != dst && graph.has_arc_from_node_ids(w, dst) {
            delta += decay_pow(decay, graph.get_two_path_count(w, dst));
        }
    }
    delta
}

fn change_alt_two_paths_undirected(graph: &Graph, src: NodeT, dst: NodeT, decay: f64) -> f64 {
    let mut delta = 0.0;
    for w in graph.iter_out_neighbour_node_ids_from_node_id(dst) {
        if w != src {
            delta += decay_pow(decay, graph.get_two_path_count(src, w));
        }
    }
    for w in graph.iter_out_neighbour_node_ids_from_node_id(src) {
        if w != dst {
            delta += decay_pow(decay, graph.get_two_path_count(w, dst));
        }
    }
    delta
}

/// Parse one structural parameter specification into a model term.
pub(crate) fn parse_structural_term(spec: &ParamSpec, graph: &Graph) -> Result<ModelTerm> {
    let decay = match spec.arguments.as_slice() {
        [] => DEFAULT_DECAY,
        [argument] => {
            let decay: f64 = argument.parse().map_err(|_| {
                format!(
                    "The decay of the structural parameter {} is not a number: {}.",
                    spec.name, argument
                )
            })?;
            if decay <= 1.0 {
                return Err(format!(
                    "The decay of the structural parameter {} must exceed 1.0, found {}.",
                    spec.name, decay
                ));
            }
            decay
        }
        arguments => {
            return Err(format!(
                "The structural parameter {} takes at most one decay argument, found {}.",
                spec.name,
                arguments.len()
            ))
        }
    };
    let statistic = match spec.name.as_str() {
        "Arc" => StructuralStatistic::Arc,
        "Edge" => StructuralStatistic::Edge,
        "Reciprocity" => StructuralStatistic::Reciprocity,
        "Sink" => StructuralStatistic::Sink,
        "Source" => StructuralStatistic::Source,
        "Isolates" => StructuralStatistic::Isolates,
        "Loop" => StructuralStatistic::Loop,
        "AltInStars" => StructuralStatistic::AltInStars { decay },
        "AltOutStars" => StructuralStatistic::AltOutStars { decay },
        "AltStars" => StructuralStatistic::AltStars { decay },
        "AltKTrianglesT" => StructuralStatistic::AltKTrianglesT { decay },
        "AltKTrianglesC" => StructuralStatistic::AltKTrianglesC { decay },
        "AltKTriangles" => StructuralStatistic::AltKTriangles { decay },
        "AltTwoPathsT" => StructuralStatistic::AltTwoPathsT { decay },
        "AltTwoPathsD" => StructuralStatistic::AltTwoPathsD { decay },
        "AltTwoPathsU" => StructuralStatistic::AltTwoPathsU { decay },
        "AltTwoPathsTD" => StructuralStatistic::AltTwoPathsTD { decay },
        "AltTwoPaths" => StructuralStatistic::AltTwoPaths { decay },
        unknown => {
            return Err(format!(
                concat!(
                    "The structural parameter {} is not supported. The supported ",
                    "directed parameters are Arc, Reciprocity, Sink, Source, ",
                    "Isolates, Loop, AltInStars, AltOutStars, AltKTrianglesT, ",
                    "AltKTrianglesC, AltTwoPathsT, AltTwoPathsD, AltTwoPathsU and ",
                    "AltTwoPathsTD; the supported undirected parameters are Edge, ",
                    "Isolates, AltStars, AltKTriangles and AltTwoPaths."
                ),
                unknown
            ))
        }
    };
    if graph.is_directed() && statistic.requires_undirected() {
        return Err(format!(
            "The structural parameter {} only applies to undirected graphs.",
            spec.name
        ));
    }
    if !graph.is_directed() && statistic.requires_directed() {
        return Err(format!(
            "The structural parameter {} only applies to directed graphs.",
            spec.name
        ));
    }
    Ok(ModelTerm {
        name: spec.name.clone(),
        statistic: ChangeStatistic::Structural(statistic),
    })
}
