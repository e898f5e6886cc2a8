use std::path::PathBuf;
use std::time::Duration;

/// Settings for one benchmarking campaign.
///
/// The defaults match the layout operators expect on a Greenplum host. Tests inject
/// temporary directories instead of relying on them.
#[derive(Debug, Clone)]
pub struct PerfConfig {
    /// Where the per-thread benchmark output files live.
    pub output_dir: PathBuf,
    /// The mount the benchmark writes its test files to; thread `i` uses
    /// `<data_dir_root>/test<i>`.
    pub data_dir_root: PathBuf,
    /// How many times each worker invokes the benchmark back to back.
    pub serial_runs: usize,
    /// Pause after each benchmark invocation.
    pub pause_between_runs: Duration,
    /// Label on read bandwidth lines in the benchmark output.
    pub read_label: String,
    /// Label on write bandwidth lines in the benchmark output.
    pub write_label: String,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("/tmp/perf_tests"),
            data_dir_root: PathBuf::from("/greenplum"),
            serial_runs: 10,
            pause_between_runs: Duration::from_secs(2),
            read_label: "disk read bandwidth (MB/s): ".to_string(),
            write_label: "disk write bandwidth (MB/s): ".to_string(),
        }
    }
}

impl PerfConfig {
    /// Output file for the worker with the given zero-based index.
    ///
    /// Run mode and compute mode must agree on this layout.
    pub fn output_file(&self, thread_index: usize) -> PathBuf {
        self.output_dir.join(format!("{thread_index}.txt"))
    }

    /// Benchmark data directory for the worker with the given zero-based index.
    pub fn data_dir(&self, thread_index: usize) -> PathBuf {
        self.data_dir_root.join(format!("test{thread_index}"))
    }
}
