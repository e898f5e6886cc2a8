use std::env;
use std::process::exit;

use clap::Parser;
use node_pool::cli::{ResizeNodePoolCli, SEGMENT_COUNT_ENV};
use node_pool::controller::PksController;
use node_pool::resize::{resize_to_capacity, ResizeOutcome, DEFAULT_POLL_INTERVAL};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = match ResizeNodePoolCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage problems are reported without an error chain and always exit 1.
            let _ = e.print();
            exit(1);
        }
    };

    let segment_count = match env::var(SEGMENT_COUNT_ENV) {
        Ok(raw) => match raw.parse::<u32>() {
            Ok(count) => count,
            Err(_) => {
                eprintln!("{SEGMENT_COUNT_ENV} must be a non-negative integer, got '{raw}'");
                exit(1);
            }
        },
        Err(_) => {
            eprintln!("{SEGMENT_COUNT_ENV} must be exported in the current environment");
            exit(1);
        }
    };

    let controller = PksController::discover()?;
    match resize_to_capacity(
        &controller,
        &cli.cluster_name,
        segment_count,
        DEFAULT_POLL_INTERVAL,
    )? {
        ResizeOutcome::AlreadySufficient { existing } => {
            println!("already have enough ({existing}) nodes.");
        }
        ResizeOutcome::Resized { polls } => {
            println!("resize succeeded after {polls} status queries.");
        }
    }

    Ok(())
}
