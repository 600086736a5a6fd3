//! The Improved Fixed Density kernel.
//!
//! The kernel keeps the density fixed by alternating move kinds on
//! acceptance: after an addition is committed the next proposals are all
//! deletions until one is committed, and vice versa, so the arc count never
//! strays more than one from the observed count. An auxiliary parameter V
//! plays the role of the density coefficient: it augments the acceptance
//! total by +V on additions and -V on deletions, and a feedback update
//! after every call drives the two proposal pools towards equal acceptance
//! rates. The model itself must therefore carry no explicit density term.

use super::{SamplerReport, SamplerScratch};
use crate::change_statistics::{calc_change_stats, Model};
use crate::proposals::Regime;
use ::graph::{Graph, Result};
use log::warn;
use rand::rngs::SmallRng;
use rand::Rng;

/// Proposal imbalance ratio beyond which the auxiliary parameter is judged
/// far from its fixed point.
const IMBALANCE_WARNING_RATIO: f64 = 0.8;

/// Cross-call state of the IFD kernel, owned by the task.
#[derive(Clone, Debug)]
pub struct IfdSamplerState {
    /// The auxiliary density parameter V.
    pub aux_param: f64,
    /// Feedback gain of the auxiliary update.
    pub(crate) ifd_k: f64,
    /// Kind of the next proposal: true once an addition was committed and
    /// the pair awaits its deletion.
    pub(crate) pending_is_delete: bool,
    /// Deletion proposals silently flipped to additions because the
    /// deletable pool was empty. A non-zero count may bias the chain.
    pub forced_add_flips: u64,
}

impl IfdSamplerState {
    pub fn new(ifd_k: f64) -> IfdSamplerState {
        IfdSamplerState {
            aux_param: 0.0,
            ifd_k,
            pending_is_delete: false,
            forced_add_flips: 0,
        }
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
    state: &mut IfdSamplerState,
) -> Result<SamplerReport> {
    let mut report = SamplerReport::default();
    let mut additions_proposed = 0u64;
    let mut deletions_proposed = 0u64;
    let mut flipped_this_call = 0u64;
    for _ in 0..steps {
        report.proposals += 1;
        let resolved = if state.pending_is_delete {
            match regime.propose_deletion(graph, rng)? {
                Some(arc) => Some((true, arc)),
                None => {
                    state.forced_add_flips += 1;
                    flipped_this_call += 1;
                    regime.propose_addition(graph, rng)?.map(|arc| (false, arc))
                }
            }
        } else {
            match regime.propose_addition(graph, rng)? {
                Some(arc) => Some((false, arc)),
                None => regime.propose_deletion(graph, rng)?.map(|arc| (true, arc)),
            }
        };
        let (is_delete, (src, dst)) = match resolved {
            Some(resolved) => resolved,
            None => continue,
        };
        if is_delete {
            deletions_proposed += 1;
            graph.remove_arc(src, dst)?;
            let total =
                calc_change_stats(graph, model, src, dst, theta, true, &mut scratch.changes)
                    - state.aux_param;
            if rng.gen::<f64>() < total.exp() {
                report.accepted += 1;
                report.accepted_deletions += 1;
                scratch.record(true);
                // A committed deletion owes an addition, whether or not it
                // was itself a flipped proposal.
                state.pending_is_delete = false;
                if !perform_move {
                    graph.insert_arc(src, dst)?;
                }
            } else {
                graph.insert_arc(src, dst)?;
            }
        } else {
            additions_proposed += 1;
            let total =
                calc_change_stats(graph, model, src, dst, theta, false, &mut scratch.changes)
                    + state.aux_param;
            if rng.gen::<f64>() < total.exp() {
                report.accepted += 1;
                report.accepted_additions += 1;
                scratch.record(false);
                state.pending_is_delete = true;
                if perform_move {
                    graph.insert_arc(src, dst)?;
                }
            }
        }
    }

    // Feedback on the proposal imbalance: a surplus of addition proposals
    // means additions keep getting rejected, so V rises to admit them, and
    // symmetrically for deletions.
    let total_proposed = additions_proposed + deletions_proposed;
    if total_proposed > 0 && additions_proposed != deletions_proposed {
        let imbalance = (deletions_proposed as f64 - additions_proposed as f64)
            / total_proposed as f64;
        let step = state.ifd_k * imbalance * imbalance;
        if deletions_proposed > additions_proposed {
            state.aux_param -= step;
        } else {
            state.aux_param += step;
        }
        if imbalance.abs() > IMBALANCE_WARNING_RATIO {
            warn!(
                "The IFD proposal kinds are imbalanced ({} additions, {} deletions): \
                 the auxiliary parameter is far from its fixed point.",
                additions_proposed, deletions_proposed
            );
        }
    }
    if flipped_this_call > 0 {
        warn!(
            "{} IFD deletion proposals found no deletable arc and were flipped to additions.",
            flipped_this_call
        );
    }
    report.dz_arc = deletions_proposed as i64 - additions_proposed as i64;
    Ok(report)
}
