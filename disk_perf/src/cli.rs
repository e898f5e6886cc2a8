use clap::Parser;

/// Run the disk benchmark in multiple threads, or aggregate the output of a previous run.
///
/// Run mode leaves one output file per thread under the output directory; compute mode reads
/// whatever is there. Stale files from earlier runs are not cleaned up automatically, so clear
/// the directory between campaigns.
#[derive(Parser)]
#[command(name = "disk_perf", about, long_about = None)]
pub struct DiskPerfCli {
    /// Parse previously generated output files and print averages instead of running the
    /// benchmark
    #[clap(long)]
    pub compute: bool,

    /// The number of benchmark threads to run (or that were run, in compute mode)
    pub thread_count: usize,
}
