//! Simulation mode: draw networks from a fitted model.
//!
//! The simulator reuses the estimation samplers with the moves committed
//! and theta fixed at the values of the configuration's parameter lists.
//! Sufficient statistics are maintained incrementally: the starting values
//! come from the telescoped change-statistic sum and every sampler call
//! adds its accepted deltas, so no statistic is ever recomputed from
//! scratch inside the sampling loop.

use crate::change_statistics::{build_model, Model};
use crate::config::Config;
use crate::driver::{build_regime, build_sampler, build_task_rng, load_graph};
use crate::proposals::Regime;
use crate::sampler::{Sampler, SamplerScratch};
use crate::statistics::compute_statistics;
use ::graph::{Graph, Result};
use itertools::izip;
use log::info;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Run every simulation task of the configuration.
pub fn run_simulation(config: &Config) -> Result<()> {
    config.validate_for_simulation()?;
    let graph = load_graph(config)?;
    let model = build_model(config, &graph)?;
    let theta: Vec<f64> = config.iter_param_specs().map(|spec| spec.value).collect();
    info!(
        "Simulating {} samples of {} steps each over {} nodes.",
        config.sim_sample_size,
        config.sim_interval,
        graph.get_number_of_nodes()
    );
    (0..config.num_tasks)
        .into_par_iter()
        .map(|task_id| run_simulation_task(config, &graph, &model, &theta, task_id))
        .collect::<Result<Vec<()>>>()?;
    Ok(())
}

/// One sampler call with the sufficient statistics advanced by the
/// accepted deltas; returns the acceptance rate of the call.
#[allow(clippy::too_many_arguments)]
fn advance_chain(
    graph: &mut Graph,
    model: &Model,
    theta: &[f64],
    regime: &Regime,
    sampler: &mut Sampler,
    rng: &mut SmallRng,
    scratch: &mut SamplerScratch,
    statistics: &mut [f64],
    steps: u64,
) -> Result<f64> {
    let report = sampler.run(graph, model, theta, regime, steps, true, rng, scratch)?;
    for (statistic, added, deleted) in izip!(
        statistics.iter_mut(),
        scratch.add_change_sums.iter(),
        scratch.del_change_sums.iter()
    ) {
        *statistic += added - deleted;
    }
    Ok(report.acceptance_rate())
}

fn run_simulation_task(
    config: &Config,
    graph: &Graph,
    model: &Model,
    theta: &[f64],
    task_id: u64,
) -> Result<()> {
    let mut graph = graph.clone();
    let regime = build_regime(config);
    let mut sampler = build_sampler(config);
    let mut rng = build_task_rng(config.random_seed, task_id);
    let mut scratch = SamplerScratch::new(model.len());
    let mut statistics = compute_statistics(&graph, model)?;

    let stats_path = format!("{}_{}.txt", config.stats_file_prefix, task_id);
    let mut stats_writer = BufWriter::new(File::create(&stats_path).map_err(|error| {
        format!("Cannot create the file {}: {}.", stats_path, error)
    })?);
    let names: Vec<&str> = model.iter_names().collect();
    writeln!(stats_writer, "t {} AcceptanceRate", names.join(" "))
        .map_err(|error| format!("Cannot write the file {}: {}.", stats_path, error))?;

    advance_chain(
        &mut graph,
        model,
        theta,
        &regime,
        &mut sampler,
        &mut rng,
        &mut scratch,
        &mut statistics,
        config.sim_burnin,
    )?;
    for sample in 0..config.sim_sample_size {
        let acceptance_rate = advance_chain(
            &mut graph,
            model,
            theta,
            &regime,
            &mut sampler,
            &mut rng,
            &mut scratch,
            &mut statistics,
            config.sim_interval,
        )?;
        let step = config.sim_burnin + (sample + 1) * config.sim_interval;
        write!(stats_writer, "{}", step)
            .map_err(|error| format!("Cannot write the file {}: {}.", stats_path, error))?;
        for value in statistics.iter() {
            write!(stats_writer, " {}", value)
                .map_err(|error| format!("Cannot write the file {}: {}.", stats_path, error))?;
        }
        writeln!(stats_writer, " {}", acceptance_rate)
            .map_err(|error| format!("Cannot write the file {}: {}.", stats_path, error))?;
        stats_writer
            .flush()
            .map_err(|error| format!("Cannot flush the file {}: {}.", stats_path, error))?;
        if config.output_simulated_network {
            graph.to_pajek_file(&format!(
                "{}_{}_{}.net",
                config.sim_net_file_prefix, task_id, step
            ))?;
        }
    }
    Ok(())
}
