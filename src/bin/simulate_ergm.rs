//! Simulation entry point: `simulate_ergm CONFIG_FILE`.
//!
//! Draws networks from the model whose parameter values are attached to
//! the configuration's parameter lists, writing sufficient-statistics
//! trajectories and optionally the sampled networks.

use estimnet::{run_simulation, Config};
use std::env;
use std::process::exit;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} CONFIG_FILE", args[0]);
        exit(1);
    }
    let config = match Config::from_file(&args[1]) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            exit(2);
        }
    };
    if let Err(error) = run_simulation(&config) {
        eprintln!("{}", error);
        exit(2);
    }
}
