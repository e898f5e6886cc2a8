use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::config::PerfConfig;
use crate::runner::BenchmarkRunner;

/// Run the benchmark campaign: one worker thread per index, each invoking the benchmark
/// `serial_runs` times and appending the raw output to its own file.
///
/// Blocks until every worker has finished. A worker that fails stops its own remaining runs
/// but never the other workers; if any worker failed the whole campaign is reported as
/// failed.
pub fn run(
    config: &PerfConfig,
    runner: Arc<dyn BenchmarkRunner>,
    num_threads: usize,
) -> anyhow::Result<()> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            config.output_dir.display()
        )
    })?;

    let mut handles = Vec::with_capacity(num_threads);
    for thread_index in 0..num_threads {
        let config = config.clone();
        let runner = runner.clone();
        let handle = std::thread::Builder::new()
            .name(format!("perf-{thread_index}"))
            .spawn(move || worker(&config, runner.as_ref(), thread_index))
            .context("Failed to start benchmark worker thread")?;
        handles.push(handle);
    }

    let mut failed = 0;
    for (thread_index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::error!("worker {thread_index} failed: {e:?}");
                failed += 1;
            }
            Err(_) => {
                log::error!("worker {thread_index} panicked");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {num_threads} benchmark workers failed");
    }

    Ok(())
}

fn worker(
    config: &PerfConfig,
    runner: &dyn BenchmarkRunner,
    thread_index: usize,
) -> anyhow::Result<()> {
    let output_path = config.output_file(thread_index);
    let mut output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output_path)
        .with_context(|| format!("Failed to open output file '{}'", output_path.display()))?;

    let data_dir = config.data_dir(thread_index);
    for run in 1..=config.serial_runs {
        log::info!(
            "worker {thread_index}: benchmark run {run}/{total} against '{dir}'",
            total = config.serial_runs,
            dir = data_dir.display()
        );
        let raw = runner.run_once(&data_dir)?;
        output
            .write_all(raw.as_bytes())
            .with_context(|| format!("Failed to append to '{}'", output_path.display()))?;
        std::thread::sleep(config.pause_between_runs);
    }

    Ok(())
}
