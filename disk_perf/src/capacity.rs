use std::path::Path;

use anyhow::Context;
use sysinfo::{Disks, System};
use thiserror::Error;

/// The target mount cannot hold the benchmark files for the requested thread count.
///
/// A dedicated type so callers can tell "not enough disk" apart from a failed tool
/// invocation.
#[derive(Debug, Error)]
#[error(
    "disk size {disk_bytes} bytes < required size of single file {file_bytes} bytes (2*RAM) \
     for goal of running {num_threads} simultaneous threads"
)]
pub struct InsufficientDiskSpace {
    pub disk_bytes: u64,
    pub file_bytes: u64,
    pub num_threads: usize,
}

/// The size of the file each benchmark run writes.
///
/// Twice RAM, so that neither the page cache nor swap (assumed smaller than RAM) can hide
/// the disk from the measurement.
pub fn required_file_size(mem_total_bytes: u64) -> u64 {
    2 * mem_total_bytes
}

/// Check there is room on the target mount for `num_threads` concurrent benchmark files.
pub fn validate_disk_size(
    mem_total_bytes: u64,
    disk_available_bytes: u64,
    num_threads: usize,
) -> Result<(), InsufficientDiskSpace> {
    let file_bytes = required_file_size(mem_total_bytes);
    if disk_available_bytes < file_bytes * num_threads as u64 {
        return Err(InsufficientDiskSpace {
            disk_bytes: disk_available_bytes,
            file_bytes,
            num_threads,
        });
    }

    Ok(())
}

/// Memory and disk capacity of the host the benchmark will run on.
#[derive(Debug, Clone, Copy)]
pub struct HostCapacity {
    pub mem_total_bytes: u64,
    pub disk_available_bytes: u64,
}

impl HostCapacity {
    /// Read the host's total memory and the available space on the disk holding `mount`.
    ///
    /// When several mount points are prefixes of `mount` the most specific one wins.
    pub fn probe(mount: &Path) -> anyhow::Result<Self> {
        let mut sys = System::new();
        sys.refresh_memory();
        let mem_total_bytes = sys.total_memory();

        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .iter()
            .filter(|disk| mount.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .with_context(|| format!("No mounted disk found for '{}'", mount.display()))?;

        Ok(Self {
            mem_total_bytes,
            disk_available_bytes: disk.available_space(),
        })
    }
}
