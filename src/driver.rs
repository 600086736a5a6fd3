//! The estimation driver.
//!
//! Every task is one independent MCMC chain over its own copy of the
//! observed graph, with its own parameter vector, sampler state, generator
//! and trajectory files; tasks share nothing mutable and run in parallel.

use crate::change_statistics::{build_model, Model};
use crate::config::Config;
use crate::ee::{algorithm_ee, algorithm_s, check_degeneracy, report_ifd_flips, EeSettings, TaskError};
use crate::proposals::Regime;
use crate::sampler::{IfdSamplerState, Sampler};
use crate::splitmix64;
use ::graph::{Graph, NodeAttributes, PajekFileReader, Result, TwoPathMode};
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};

/// The per-task trajectory files: theta lines carry the acceptance rate,
/// dzA lines the drift accumulator.
pub struct TrajectoryWriter {
    theta: BufWriter<File>,
    theta_path: String,
    dza: BufWriter<File>,
    dza_path: String,
}

impl TrajectoryWriter {
    /// Open the two trajectory files of a task and write their headers.
    ///
    /// # Arguments
    /// * `config`: &Config - The configuration carrying the file prefixes.
    /// * `model`: &Model - The model whose term names head the columns.
    /// * `task_id`: u64 - The task number appended to the prefixes.
    pub fn new(config: &Config, model: &Model, task_id: u64) -> Result<TrajectoryWriter> {
        let theta_path = format!("{}_{}.txt", config.theta_file_prefix, task_id);
        let dza_path = format!("{}_{}.txt", config.dza_file_prefix, task_id);
        let mut writer = TrajectoryWriter {
            theta: open_writer(&theta_path)?,
            theta_path,
            dza: open_writer(&dza_path)?,
            dza_path,
        };
        let names: Vec<&str> = model.iter_names().collect();
        writeln!(writer.theta, "t {} AcceptanceRate", names.join(" "))
            .map_err(|error| writer.error("write", error))?;
        writeln!(writer.dza, "t {}", names.join(" "))
            .map_err(|error| writer.error("write", error))?;
        Ok(writer)
    }

    pub fn write_theta(&mut self, iteration: u64, theta: &[f64], acceptance_rate: f64) -> Result<()> {
        write!(self.theta, "{}", iteration).map_err(|error| self.error("write", error))?;
        for value in theta {
            write!(self.theta, " {}", value).map_err(|error| self.error("write", error))?;
        }
        writeln!(self.theta, " {}", acceptance_rate).map_err(|error| self.error("write", error))
    }

    pub fn write_dza(&mut self, iteration: u64, drift: &[f64]) -> Result<()> {
        write!(self.dza, "{}", iteration).map_err(|error| self.error("write", error))?;
        for value in drift {
            write!(self.dza, " {}", value).map_err(|error| self.error("write", error))?;
        }
        writeln!(self.dza).map_err(|error| self.error("write", error))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.theta.flush().map_err(|error| self.error("flush", error))?;
        self.dza.flush().map_err(|error| self.error("flush", error))
    }

    fn error(&self, action: &str, error: std::io::Error) -> String {
        format!(
            "Cannot {} the trajectory files {} / {}: {}.",
            action, self.theta_path, self.dza_path, error
        )
    }
}

fn open_writer(path: &str) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).map_err(|error| {
        format!("Cannot create the file {}: {}.", path, error)
    })?))
}

/// Load the observed graph with its attributes and conditioning side data.
pub fn load_graph(config: &Config) -> Result<Graph> {
    let mut graph = match (&config.arclist_file, config.num_nodes) {
        (Some(path), _) => PajekFileReader::new(path.as_str())
            .set_directed(Some(config.is_directed))
            .load()?,
        (None, Some(number_of_nodes)) => {
            Graph::new(config.is_directed, number_of_nodes, None, TwoPathMode::Auto)?
        }
        (None, None) => return Err("No arclistFile and no numNodes were provided.".to_string()),
    };
    if config.is_bipartite && !graph.is_bipartite() {
        return Err(concat!(
            "isBipartite is set but the arc list file does not declare a ",
            "bipartite first-mode count on its *vertices line."
        )
        .to_string());
    }
    let mut attributes = NodeAttributes::default();
    if let Some(path) = &config.binattr_file {
        attributes.load_binary_file(path)?;
    }
    if let Some(path) = &config.catattr_file {
        attributes.load_categorical_file(path)?;
    }
    if let Some(path) = &config.contattr_file {
        attributes.load_continuous_file(path)?;
    }
    if let Some(path) = &config.setattr_file {
        attributes.load_set_file(path)?;
    }
    graph.set_attributes(attributes)?;
    if config.use_conditional_estimation {
        if let Some(path) = &config.zone_file {
            graph.set_snowball_zones(::graph::read_node_integer_file(path, "zone")?)?;
        }
    }
    if config.citation_ergm {
        if let Some(path) = &config.term_file {
            graph.set_citation_terms(::graph::read_node_integer_file(path, "term")?)?;
        }
    }
    Ok(graph)
}

/// Return the proposal regime the configuration selects.
pub fn build_regime(config: &Config) -> Regime {
    if config.use_conditional_estimation {
        Regime::Snowball
    } else if config.citation_ergm {
        Regime::Citation
    } else {
        Regime::Plain {
            allow_loops: config.allow_loops,
            forbid_reciprocity: config.forbid_reciprocity,
        }
    }
}

/// Return a fresh sampler of the configured kind.
pub fn build_sampler(config: &Config) -> Sampler {
    if config.use_ifd_sampler {
        Sampler::Ifd(IfdSamplerState::new(config.ifd_k))
    } else if config.use_tnt_sampler {
        Sampler::Tnt
    } else {
        Sampler::Basic
    }
}

/// Return the task-local generator, scrambled so close task ids give
/// uncorrelated chains.
pub fn build_task_rng(random_seed: u64, task_id: u64) -> SmallRng {
    SmallRng::seed_from_u64(splitmix64(random_seed.wrapping_add(task_id)))
}

/// Validations that need the loaded graph and the built model.
fn validate_against_graph(config: &Config, graph: &Graph, model: &Model) -> Result<()> {
    if config.use_ifd_sampler && model.has_density_term() {
        return Err(concat!(
            "The IFD sampler replaces the density term with its auxiliary ",
            "parameter: remove Arc (or Edge) from structParams."
        )
        .to_string());
    }
    if config.allow_loops {
        if let Some(name) = model.first_loop_unsafe_term() {
            return Err(format!(
                "The change formula of {} assumes a loop-free graph and cannot be combined with allowLoops.",
                name
            ));
        }
    }
    if config.forbid_reciprocity {
        for (src, dst) in graph.iter_arc_node_ids() {
            if graph.has_arc_from_node_ids(dst, src) && src != dst {
                return Err(format!(
                    "forbidReciprocity is set but the observed graph holds the mutual pair {} <-> {}.",
                    src, dst
                ));
            }
        }
    }
    Ok(())
}

/// Run one estimation task: algorithm S, the degeneracy guard, algorithm
/// EE and the final reports.
pub fn run_task(
    config: &Config,
    graph: &Graph,
    model: &Model,
    task_id: u64,
) -> std::result::Result<(), TaskError> {
    let mut graph = graph.clone();
    let mut theta = vec![0.0; model.len()];
    let regime = build_regime(config);
    let mut sampler = build_sampler(config);
    let mut rng = build_task_rng(config.random_seed, task_id);
    let settings = EeSettings::from(config);
    let mut writer = TrajectoryWriter::new(config, model, task_id)?;
    let mut iteration = 0u64;

    info!("Task {}: starting algorithm S.", task_id);
    let mut d_scale = algorithm_s(
        &mut graph,
        model,
        &mut theta,
        &regime,
        &mut sampler,
        &settings,
        &mut rng,
        &mut writer,
        &mut iteration,
    )?;
    if let Err(error) = check_degeneracy(&d_scale, model) {
        warn!("Task {}: {}; skipping algorithm EE.", task_id, error);
        return Err(error);
    }

    info!("Task {}: starting algorithm EE.", task_id);
    algorithm_ee(
        &mut graph,
        model,
        &mut theta,
        &mut d_scale,
        &regime,
        &mut sampler,
        &settings,
        &mut rng,
        &mut writer,
        &mut iteration,
    )?;
    writer.flush()?;
    report_ifd_flips(&sampler);

    if let Sampler::Ifd(state) = &sampler {
        let correction = arc_parameter_correction(&graph, &regime)?;
        info!(
            "Task {}: effective arc parameter V - C = {} (V = {}, C = {}).",
            task_id,
            state.aux_param - correction,
            state.aux_param,
            correction
        );
    }
    if config.output_simulated_network {
        let path = format!("{}_{}.net", config.sim_net_file_prefix, task_id);
        graph.to_pajek_file(&path)?;
        info!("Task {}: final simulated network written to {}.", task_id, path);
    }
    Ok(())
}

/// The reporting correction `C = ln((L - m) / (m + 1))` turning the IFD
/// auxiliary parameter into an effective arc parameter, with `L` the
/// candidate dyad count of the active regime.
pub fn arc_parameter_correction(graph: &Graph, regime: &Regime) -> Result<f64> {
    let candidate_dyads = regime.get_number_of_candidate_dyads(graph)? as f64;
    let arcs = graph.get_number_of_arcs() as f64;
    Ok(((candidate_dyads - arcs) / (arcs + 1.0)).ln())
}

/// Run every estimation task of the configuration, in parallel when no
/// explicit task id is given.
///
/// # Arguments
/// * `config`: &Config - The validated configuration.
/// * `only_task`: Option<u64> - Run just this task, for multi-process dispatch.
pub fn run_estimation(config: &Config, only_task: Option<u64>) -> Result<()> {
    config.validate_for_estimation()?;
    let graph = load_graph(config)?;
    let model = build_model(config, &graph)?;
    validate_against_graph(config, &graph, &model)?;
    info!(
        "Estimating {} parameters over {} nodes and {} arcs.",
        model.len(),
        graph.get_number_of_nodes(),
        graph.get_number_of_arcs()
    );
    let task_ids: Vec<u64> = match only_task {
        Some(task_id) => vec![task_id],
        None => (0..config.num_tasks).collect(),
    };
    let failures: Vec<String> = task_ids
        .par_iter()
        .filter_map(|&task_id| {
            run_task(config, &graph, &model, task_id)
                .err()
                .map(|error| format!("task {}: {}", task_id, error))
        })
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} tasks failed: {}",
            failures.len(),
            task_ids.len(),
            failures.join("; ")
        ))
    }
}
