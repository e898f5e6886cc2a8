use std::fs;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use disk_perf::aggregate::compute_average;
use disk_perf::capacity::{validate_disk_size, HostCapacity};
use disk_perf::cli::DiskPerfCli;
use disk_perf::config::PerfConfig;
use disk_perf::harness;
use disk_perf::runner::Gpcheckperf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = match DiskPerfCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage problems are reported without an error chain and always exit 1.
            let _ = e.print();
            exit(1);
        }
    };

    let config = PerfConfig::default();
    if cli.compute {
        report(&config, cli.thread_count)
    } else {
        run(&config, cli.thread_count)
    }
}

fn run(config: &PerfConfig, thread_count: usize) -> anyhow::Result<()> {
    let capacity = HostCapacity::probe(&config.data_dir_root)?;
    validate_disk_size(
        capacity.mem_total_bytes,
        capacity.disk_available_bytes,
        thread_count,
    )?;

    log::info!("starting disk_perf with {thread_count} threads");
    let runner = Arc::new(Gpcheckperf::discover()?);
    harness::run(config, runner, thread_count)
}

fn report(config: &PerfConfig, thread_count: usize) -> anyhow::Result<()> {
    // Compute mode may run before any benchmark has; an empty directory is just "no data".
    fs::create_dir_all(&config.output_dir)?;

    report_kind(config, &config.read_label, "READ", thread_count)?;
    report_kind(config, &config.write_label, "WRITE", thread_count)
}

fn report_kind(
    config: &PerfConfig,
    label: &str,
    kind: &str,
    thread_count: usize,
) -> anyhow::Result<()> {
    let totals = compute_average(&config.output_dir, label)?;
    if totals.samples == 0 {
        println!("0 {kind} samples found; no data to compute average.");
        return Ok(());
    }

    println!(
        "After {samples} runs, single thread average for {kind}: {avg} MB/s",
        samples = totals.samples,
        avg = totals.single_thread_average()
    );
    println!(
        "Average for whole system {kind}: {avg} MB/s\n",
        avg = totals.system_wide_average(thread_count)
    );

    Ok(())
}
