//! The tie-no-tie kernel.
//!
//! Half the proposals are drawn from the current arc list, so sparse graphs
//! mix far faster than under uniform dyad toggles. The acceptance keeps the
//! chain exact with the proposal-ratio correction of the asymmetric draw,
//! including the exact factors of the one- and zero-arc boundary states.
//! Only the unconstrained regime is supported.

use super::{SamplerReport, SamplerScratch};
use crate::change_statistics::{calc_change_stats, Model};
use crate::proposals::{Regime, MAX_PROPOSAL_ATTEMPTS};
use ::graph::{Graph, NodeT, Result};
use rand::rngs::SmallRng;
use rand::Rng;

/// Draw a uniform candidate dyad under the plain regime, present or not.
fn draw_dyad(graph: &Graph, allow_loops: bool, rng: &mut SmallRng) -> Result<(NodeT, NodeT)> {
    let number_of_nodes = graph.get_number_of_nodes();
    for _ in 0..MAX_PROPOSAL_ATTEMPTS {
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
        return Ok((src, dst));
    }
    Err("No candidate dyad was found: the node set is degenerate.".to_string())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn run(
    graph: &mut Graph,
    model: &Model,
    theta: &[f64],
    regime: &Regime,
    steps: u64,
    perform_move: bool,
    rng: &mut SmallRng,
    scratch: &mut SamplerScratch,
) -> Result<SamplerReport> {
    let allow_loops = match regime {
        Regime::Plain {
            allow_loops,
            forbid_reciprocity: false,
        } => *allow_loops,
        _ => {
            return Err(
                "The TNT kernel only supports the unconstrained proposal regime.".to_string(),
            )
        }
    };
    let dyads = regime.get_number_of_candidate_dyads(graph)? as f64;
    let mut report = SamplerReport::default();
    for _ in 0..steps {
        report.proposals += 1;
        let arcs = graph.get_number_of_arcs();
        let tie_pick = arcs > 0 && rng.gen::<f64>() < 0.5;
        let (src, dst) = if tie_pick {
            graph.get_arc_from_arc_id(rng.gen_range(0, arcs))
        } else {
            draw_dyad(graph, allow_loops, rng)?
        };
        if graph.has_arc_from_node_ids(src, dst) {
            // Deletion: with the tie pick and the dyad pick both able to
            // reach this arc, while only a dyad pick can re-add it.
            let proposal_ratio = if arcs == 1 {
                2.0 / (dyads + 1.0)
            } else {
                arcs as f64 / (arcs as f64 + dyads)
            };
            graph.remove_arc(src, dst)?;
            let total =
                calc_change_stats(graph, model, src, dst, theta, true, &mut scratch.changes);
            if rng.gen::<f64>() < total.exp() * proposal_ratio {
                report.accepted += 1;
                report.accepted_deletions += 1;
                scratch.record(true);
                if !perform_move {
                    graph.insert_arc(src, dst)?;
                }
            } else {
                graph.insert_arc(src, dst)?;
            }
        } else {
            let proposal_ratio = if arcs == 0 {
                (dyads + 1.0) / 2.0
            } else {
                (dyads + arcs as f64 + 1.0) / (arcs as f64 + 1.0)
            };
            let total =
                calc_change_stats(graph, model, src, dst, theta, false, &mut scratch.changes);
            if rng.gen::<f64>() < total.exp() * proposal_ratio {
                report.accepted += 1;
                report.accepted_additions += 1;
                scratch.record(false);
                if perform_move {
                    graph.insert_arc(src, dst)?;
                }
            }
        }
    }
    Ok(report)
}
