//! The two-stage equilibrium-expectation engine.
//!
//! Algorithm S walks the sampler without committing moves: its parameter
//! updates push theta towards a high-probability region while the squared
//! accepted-change sums estimate the derivative scales that algorithm EE
//! later uses. Algorithm EE commits moves and accumulates the net drift of
//! every sufficient statistic away from the observed graph; each parameter
//! steps against the sign of its drift until the drift fluctuates around
//! zero, the equilibrium-expectation fixed point.

use crate::change_statistics::Model;
use crate::config::Config;
use crate::driver::TrajectoryWriter;
use crate::proposals::Regime;
use crate::sampler::{Sampler, SamplerScratch};
use crate::sign;
use ::graph::Graph;
use log::warn;
use rand::rngs::SmallRng;

/// The step-size and iteration-count knobs of the engine.
#[derive(Clone, Copy, Debug)]
pub struct EeSettings {
    pub aca_s: f64,
    pub aca_ee: f64,
    pub comp_c: f64,
    pub sampler_steps: u64,
    pub s_steps: u64,
    pub outer_steps: u64,
    pub inner_steps: u64,
    pub output_all_steps: bool,
    pub use_borisenko_update: bool,
    pub learning_rate: f64,
    pub min_theta: f64,
    pub min_theta_mean: f64,
    pub theta_sd_threshold: f64,
}

impl From<&Config> for EeSettings {
    fn from(config: &Config) -> EeSettings {
        EeSettings {
            aca_s: config.aca_s,
            aca_ee: config.aca_ee,
            comp_c: config.comp_c,
            sampler_steps: config.sampler_steps,
            s_steps: config.s_steps,
            outer_steps: config.ee_steps,
            inner_steps: config.ee_inner_steps,
            output_all_steps: config.output_all_steps,
            use_borisenko_update: config.use_borisenko_update,
            learning_rate: config.learning_rate,
            min_theta: config.min_theta,
            min_theta_mean: config.min_theta_mean,
            theta_sd_threshold: config.theta_sd_threshold,
        }
    }
}

/// Failure of one estimation task.
#[derive(Clone, Debug)]
pub enum TaskError {
    /// The model was judged degenerate by the guard between the stages;
    /// sibling tasks may still succeed.
    Degenerate(String),
    Failed(String),
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::Degenerate(message) => write!(formatter, "degenerate model: {}", message),
            TaskError::Failed(message) => write!(formatter, "{}", message),
        }
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> TaskError {
        TaskError::Failed(message)
    }
}

/// Run algorithm S and return the derivative scales `Dmean`.
///
/// The sampler does not commit moves here. Every iteration updates theta by
/// a crude Robbins-Monro step whose size decays as the accepted change sums
/// stabilise, and appends one line to the theta trajectory.
///
/// # Arguments
/// * `graph`: &mut Graph - The observed graph; restored after every proposal.
/// * `model`: &Model - The model terms.
/// * `theta`: &mut [f64] - The parameter vector, updated in place.
/// * `regime`: &Regime - The active proposal regime.
/// * `sampler`: &mut Sampler - The selected kernel.
/// * `settings`: &EeSettings - Step sizes and iteration counts.
/// * `rng`: &mut SmallRng - The task-local generator.
/// * `writer`: &mut TrajectoryWriter - The trajectory sink.
/// * `iteration`: &mut u64 - The global trajectory line counter.
#[allow(clippy::too_many_arguments)]
pub fn algorithm_s(
    graph: &mut Graph,
    model: &Model,
    theta: &mut [f64],
    regime: &Regime,
    sampler: &mut Sampler,
    settings: &EeSettings,
    rng: &mut SmallRng,
    writer: &mut TrajectoryWriter,
    iteration: &mut u64,
) -> Result<Vec<f64>, String> {
    let number_of_terms = model.len();
    let mut scratch = SamplerScratch::new(number_of_terms);
    let mut squared_change_sums = vec![0.0; number_of_terms];
    for _ in 0..settings.s_steps {
        let report = sampler.run(
            graph,
            model,
            theta,
            regime,
            settings.sampler_steps,
            false,
            rng,
            &mut scratch,
        )?;
        for position in 0..number_of_terms {
            let dz_a = scratch.del_change_sums[position] - scratch.add_change_sums[position];
            let change_sum =
                scratch.add_change_sums[position] + scratch.del_change_sums[position];
            squared_change_sums[position] += dz_a * dz_a;
            let step_size = if change_sum == 0.0 {
                0.0
            } else {
                settings.aca_s / (change_sum * change_sum)
            };
            theta[position] += sign(dz_a) * step_size * dz_a * dz_a;
        }
        writer.write_theta(*iteration, theta, report.acceptance_rate())?;
        *iteration += 1;
    }
    Ok(squared_change_sums
        .iter()
        .map(|&sum| settings.sampler_steps as f64 / sum)
        .collect())
}

/// Return the degeneracy verdict on the derivative scales of algorithm S.
pub fn check_degeneracy(d_mean: &[f64], model: &Model) -> Result<(), TaskError> {
    for (scale, name) in d_mean.iter().zip(model.iter_names()) {
        if !scale.is_finite() {
            return Err(TaskError::Degenerate(format!(
                "the derivative scale of {} is {} after algorithm S.",
                name, scale
            )));
        }
    }
    Ok(())
}

/// Run algorithm EE: the sampler commits moves and theta steps against the
/// accumulated drift of each sufficient statistic.
///
/// The drift accumulator is never reset between inner iterations. Between
/// outer iterations the derivative scales are rescaled from the spread of
/// the parameter trajectory over the last inner window, unless the
/// Borisenko update rule is selected.
#[allow(clippy::too_many_arguments)]
pub fn algorithm_ee(
    graph: &mut Graph,
    model: &Model,
    theta: &mut [f64],
    d_scale: &mut [f64],
    regime: &Regime,
    sampler: &mut Sampler,
    settings: &EeSettings,
    rng: &mut SmallRng,
    writer: &mut TrajectoryWriter,
    iteration: &mut u64,
) -> Result<Vec<f64>, String> {
    let number_of_terms = model.len();
    let mut scratch = SamplerScratch::new(number_of_terms);
    let mut drift = vec![0.0; number_of_terms];
    let mut theta_window = vec![0.0; settings.inner_steps as usize * number_of_terms];
    for _ in 0..settings.outer_steps {
        let mut acceptance_rate = 0.0;
        for inner in 0..settings.inner_steps as usize {
            let report = sampler.run(
                graph,
                model,
                theta,
                regime,
                settings.sampler_steps,
                true,
                rng,
                &mut scratch,
            )?;
            acceptance_rate = report.acceptance_rate();
            for position in 0..number_of_terms {
                drift[position] +=
                    scratch.add_change_sums[position] - scratch.del_change_sums[position];
                if settings.use_borisenko_update {
                    theta[position] -= sign(drift[position])
                        * settings.learning_rate
                        * theta[position].abs().max(settings.min_theta);
                } else {
                    theta[position] -= sign(drift[position])
                        * d_scale[position]
                        * settings.aca_ee
                        * drift[position]
                        * drift[position];
                }
                theta_window[inner * number_of_terms + position] = theta[position];
            }
            if settings.output_all_steps {
                writer.write_theta(*iteration, theta, acceptance_rate)?;
                writer.write_dza(*iteration, &drift)?;
            }
            *iteration += 1;
        }
        if !settings.output_all_steps {
            writer.write_theta(*iteration - 1, theta, acceptance_rate)?;
            writer.write_dza(*iteration - 1, &drift)?;
        }
        writer.flush()?;
        if !settings.use_borisenko_update {
            rescale_derivative_scales(d_scale, &theta_window, settings, number_of_terms);
        }
    }
    Ok(drift)
}

/// Rescale the derivative scales from the parameter spread over the last
/// inner window: parameters wandering widely get a smaller scale, stuck
/// ones a larger one. Near-zero window means are clamped so a parameter
/// hovering at zero keeps a usable scale.
fn rescale_derivative_scales(
    d_scale: &mut [f64],
    theta_window: &[f64],
    settings: &EeSettings,
    number_of_terms: usize,
) {
    let window = settings.inner_steps as usize;
    for position in 0..number_of_terms {
        let mut mean = 0.0;
        for inner in 0..window {
            mean += theta_window[inner * number_of_terms + position];
        }
        mean /= window as f64;
        let mut variance = 0.0;
        for inner in 0..window {
            let deviation = theta_window[inner * number_of_terms + position] - mean;
            variance += deviation * deviation;
        }
        let standard_deviation = (variance / window as f64).sqrt();
        let mean_magnitude = mean.abs().max(settings.min_theta_mean);
        if standard_deviation > settings.theta_sd_threshold {
            d_scale[position] *=
                (settings.comp_c * mean_magnitude / standard_deviation).sqrt();
        }
    }
}

/// Log the forced-flip diagnostic of an IFD run, if any occurred.
pub fn report_ifd_flips(sampler: &Sampler) {
    if let Sampler::Ifd(state) = sampler {
        if state.forced_add_flips > 0 {
            warn!(
                "The IFD sampler flipped {} deletion proposals to additions over the run; \
                 a large count may bias the chain.",
                state.forced_add_flips
            );
        }
    }
}
