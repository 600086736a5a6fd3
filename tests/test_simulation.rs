//! Simulation mode: trajectory shape and consistency of the incremental
//! sufficient statistics with a from-scratch recount of the sampled graph.

use estimnet::{build_model, compute_statistics, run_simulation, Config};
use graph::PajekFileReader;

fn temp_prefix(label: &str) -> String {
    std::env::temp_dir()
        .join(label)
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
/// Simulating from an empty graph writes one statistics line per sample,
/// and the incrementally tracked statistics of the last sample equal a
/// from-scratch recomputation on the dumped network.
fn test_simulation_statistics_consistency() -> Result<(), String> {
    let stats_prefix = temp_prefix("estimnet_sim_stats");
    let net_prefix = temp_prefix("estimnet_sim_net");
    let text = format!(
        concat!(
            "numNodes = 20\n",
            "randomSeed = 7\n",
            "simBurnin = 200\n",
            "simSampleSize = 5\n",
            "simInterval = 100\n",
            "outputSimulatedNetwork = True\n",
            "statsFilePrefix = {}\n",
            "simNetFilePrefix = {}\n",
            "structParams = {{Arc = -1.0, Reciprocity = 0.5}}\n",
        ),
        stats_prefix, net_prefix
    );
    let config = Config::parse(&text)?;
    run_simulation(&config)?;

    let stats = std::fs::read_to_string(format!("{}_0.txt", stats_prefix))
        .map_err(|error| error.to_string())?;
    let lines: Vec<&str> = stats.lines().collect();
    if lines.len() != 1 + 5 {
        return Err(format!(
            "Expected a header and five sample lines, found {}.",
            lines.len()
        ));
    }
    if !lines[0].starts_with("t Arc Reciprocity") {
        return Err(format!("Unexpected statistics header: {}", lines[0]));
    }
    let last: Vec<f64> = lines[5]
        .split_whitespace()
        .skip(1)
        .take(2)
        .map(|token| token.parse().map_err(|_| "bad float".to_string()))
        .collect::<Result<_, _>>()?;

    // The network dumped at the last sample step carries the same state
    // the last statistics line was computed from.
    let last_step = 200 + 5 * 100;
    let graph = PajekFileReader::new(format!("{}_0_{}.net", net_prefix, last_step)).load()?;
    let model = build_model(&config, &graph)?;
    let recomputed = compute_statistics(&graph, &model)?;
    for (tracked, fresh) in last.iter().zip(recomputed.iter()) {
        if (tracked - fresh).abs() > 1e-9 {
            return Err(format!(
                "The tracked statistic {} diverged from the recount {}.",
                tracked, fresh
            ));
        }
    }
    Ok(())
}

#[test]
/// A positive density parameter fills the graph, a negative one drains
/// it: the mean sampled arc count must order accordingly.
fn test_simulation_density_responds_to_theta() -> Result<(), String> {
    let mut mean_arcs = Vec::new();
    for (label, value) in [("estimnet_sim_low", "-2.0"), ("estimnet_sim_high", "1.0")] {
        let stats_prefix = temp_prefix(label);
        let text = format!(
            concat!(
                "numNodes = 15\n",
                "randomSeed = 11\n",
                "simBurnin = 2000\n",
                "simSampleSize = 20\n",
                "simInterval = 200\n",
                "statsFilePrefix = {}\n",
                "structParams = {{Arc = {}}}\n",
            ),
            stats_prefix, value
        );
        run_simulation(&Config::parse(&text)?)?;
        let stats = std::fs::read_to_string(format!("{}_0.txt", stats_prefix))
            .map_err(|error| error.to_string())?;
        let arcs: Vec<f64> = stats
            .lines()
            .skip(1)
            .filter_map(|line| line.split_whitespace().nth(1))
            .filter_map(|token| token.parse().ok())
            .collect();
        mean_arcs.push(arcs.iter().sum::<f64>() / arcs.len() as f64);
    }
    if mean_arcs[0] >= mean_arcs[1] {
        return Err(format!(
            "A lower density parameter must sample sparser graphs: {} vs {}.",
            mean_arcs[0], mean_arcs[1]
        ));
    }
    Ok(())
}
