//! The basic Metropolis kernel.

use super::{SamplerReport, SamplerScratch};
use crate::change_statistics::{calc_change_stats, Model};
use crate::proposals::Regime;
use ::graph::{Graph, NodeT, Result};
use log::warn;
use rand::rngs::SmallRng;
use rand::Rng;

/// Resolve one proposal: a fair coin picks the kind, and a kind whose
/// candidate pool is empty silently falls back to the other, as a drained
/// arc list or a saturated dyad pool would otherwise stall the chain.
/// Returns the candidate with its kind, or `None` when neither pool has
/// one.
fn resolve_candidate(
    graph: &Graph,
    regime: &Regime,
    rng: &mut SmallRng,
    flipped: &mut u64,
) -> Result<Option<(bool, (NodeT, NodeT))>> {
    let wants_delete = rng.gen::<f64>() < 0.5;
    if wants_delete {
        if let Some(arc) = regime.propose_deletion(graph, rng)? {
            return Ok(Some((true, arc)));
        }
        *flipped += 1;
        Ok(regime
            .propose_addition(graph, rng)?
            .map(|arc| (false, arc)))
    } else {
        if let Some(arc) = regime.propose_addition(graph, rng)? {
            return Ok(Some((false, arc)));
        }
        *flipped += 1;
        Ok(regime.propose_deletion(graph, rng)?.map(|arc| (true, arc)))
    }
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
    let mut report = SamplerReport::default();
    let mut flipped = 0u64;
    for _ in 0..steps {
        report.proposals += 1;
        let (is_delete, (src, dst)) = match resolve_candidate(graph, regime, rng, &mut flipped)? {
            Some(candidate) => candidate,
            None => continue,
        };
        if is_delete {
            // The change statistics are always evaluated with the candidate
            // arc absent, so the arc comes out before the evaluation and
            // goes back in unless the deletion is both accepted and
            // performed.
            graph.remove_arc(src, dst)?;
            let total =
                calc_change_stats(graph, model, src, dst, theta, true, &mut scratch.changes);
            if rng.gen::<f64>() < total.exp() {
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
            let total =
                calc_change_stats(graph, model, src, dst, theta, false, &mut scratch.changes);
            if rng.gen::<f64>() < total.exp() {
                report.accepted += 1;
                report.accepted_additions += 1;
                scratch.record(false);
                if perform_move {
                    graph.insert_arc(src, dst)?;
                }
            }
        }
    }
    if flipped > 0 {
        warn!(
            "{} proposals found an empty candidate pool and were flipped to the other kind.",
            flipped
        );
    }
    Ok(report)
}
