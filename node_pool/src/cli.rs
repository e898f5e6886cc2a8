use clap::Parser;

/// Environment variable holding the number of Greenplum segments the cluster must host.
pub const SEGMENT_COUNT_ENV: &str = "SEGMENT_COUNT";

/// Resize a PKS worker node pool so it can host the requested number of segments.
///
/// The segment count is taken from the `SEGMENT_COUNT` environment variable rather than an
/// argument so the tool can be dropped into existing provisioning scripts unchanged.
#[derive(Parser)]
#[command(name = "resize_node_pool", about, long_about = None)]
pub struct ResizeNodePoolCli {
    /// The name of the cluster whose worker pool should be resized
    pub cluster_name: String,
}
