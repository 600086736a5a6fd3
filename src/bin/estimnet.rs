//! Estimation entry point: `estimnet CONFIG_FILE [TASK_ID]`.
//!
//! Without a task id every configured task runs in parallel inside this
//! process; with one, only that task runs, so a multi-process dispatcher
//! can assign one task per worker.

use estimnet::{run_estimation, Config};
use std::env;
use std::process::exit;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} CONFIG_FILE [TASK_ID]", program);
    exit(1)
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        usage(&args[0]);
    }
    let only_task = match args.get(2) {
        Some(task) => match task.parse::<u64>() {
            Ok(task_id) => Some(task_id),
            Err(_) => usage(&args[0]),
        },
        None => None,
    };
    let config = match Config::from_file(&args[1]) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            exit(2);
        }
    };
    if let Err(error) = run_estimation(&config, only_task) {
        eprintln!("{}", error);
        exit(2);
    }
}
