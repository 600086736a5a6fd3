//! The MCMC kernels over graph state.
//!
//! The three kernels share one calling convention: run `steps` proposals,
//! accumulate the change statistics of the accepted additions and deletions
//! into the caller's scratch (always with add-direction signs), commit the
//! accepted toggles only when `perform_move` is set, and report the
//! acceptance counts. Kernel state that must survive across calls, such as
//! the IFD auxiliary parameter, lives in the sampler value owned by the
//! task, never in globals.

use crate::change_statistics::Model;
use crate::proposals::Regime;
use ::graph::{Graph, Result};
use rand::rngs::SmallRng;

mod basic;
mod ifd;
mod tnt;

pub use ifd::IfdSamplerState;

/// Acceptance accounting of one sampler call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SamplerReport {
    pub proposals: u64,
    pub accepted: u64,
    pub accepted_additions: u64,
    pub accepted_deletions: u64,
    /// Proposal imbalance `Ndel - Nadd` of the IFD kernel, 0 elsewhere.
    pub dz_arc: i64,
}

impl SamplerReport {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }
}

/// Per-call accumulators, allocated once per task and zeroed by the kernels.
#[derive(Clone, Debug)]
pub struct SamplerScratch {
    /// Summed change statistics of the accepted additions.
    pub add_change_sums: Vec<f64>,
    /// Summed change statistics of the accepted deletions, in add direction.
    pub del_change_sums: Vec<f64>,
    pub(crate) changes: Vec<f64>,
}

impl SamplerScratch {
    pub fn new(number_of_terms: usize) -> SamplerScratch {
        SamplerScratch {
            add_change_sums: vec![0.0; number_of_terms],
            del_change_sums: vec![0.0; number_of_terms],
            changes: vec![0.0; number_of_terms],
        }
    }

    pub(crate) fn zero(&mut self) {
        self.add_change_sums.iter_mut().for_each(|sum| *sum = 0.0);
        self.del_change_sums.iter_mut().for_each(|sum| *sum = 0.0);
    }

    pub(crate) fn record(&mut self, is_delete: bool) {
        let sums = if is_delete {
            &mut self.del_change_sums
        } else {
            &mut self.add_change_sums
        };
        for (sum, change) in sums.iter_mut().zip(self.changes.iter()) {
            *sum += change;
        }
    }
}

/// The selected MCMC kernel, carrying its cross-call state.
#[derive(Clone, Debug)]
pub enum Sampler {
    /// Metropolis on uniform toggles with a fair add/delete coin.
    Basic,
    /// Improved Fixed Density: alternating kinds and an auxiliary parameter
    /// standing in for the density term.
    Ifd(IfdSamplerState),
    /// Tie-no-tie: half the proposals drawn from the current arc list, with
    /// the exact proposal-ratio correction.
    Tnt,
}

impl Sampler {
    /// Run the kernel for `steps` proposals.
    ///
    /// # Arguments
    /// * `graph`: &mut Graph - The chain state; mutated only when `perform_move` is set.
    /// * `model`: &Model - The model terms.
    /// * `theta`: &[f64] - The current parameter vector.
    /// * `regime`: &Regime - The active proposal regime.
    /// * `steps`: u64 - The number of proposals to run.
    /// * `perform_move`: bool - Whether accepted toggles are committed.
    /// * `rng`: &mut SmallRng - The task-local generator.
    /// * `scratch`: &mut SamplerScratch - The per-call accumulators.
    pub fn run(
        &mut self,
        graph: &mut Graph,
        model: &Model,
        theta: &[f64],
        regime: &Regime,
        steps: u64,
        perform_move: bool,
        rng: &mut SmallRng,
        scratch: &mut SamplerScratch,
    ) -> Result<SamplerReport> {
        scratch.zero();
        match self {
            Sampler::Basic => {
                basic::run(graph, model, theta, regime, steps, perform_move, rng, scratch)
            }
            Sampler::Ifd(state) => ifd::run(
                graph,
                model,
                theta,
                regime,
                steps,
                perform_move,
                rng,
                scratch,
                state,
            ),
            Sampler::Tnt => {
                tnt::run(graph, model, theta, regime, steps, perform_move, rng, scratch)
            }
        }
    }
}
