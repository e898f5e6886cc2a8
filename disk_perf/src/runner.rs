use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context};

/// Environment variable to override the path to the `gpcheckperf` binary.
pub const GPCHECKPERF_PATH_ENV: &str = "GPCHECKPERF_PATH";

/// A single invocation of the disk benchmark.
///
/// The harness and the tests only depend on this trait; the real implementation shells out
/// to `gpcheckperf`.
pub trait BenchmarkRunner: Send + Sync {
    /// Run the benchmark once against `data_dir` and return its combined stdout and stderr.
    fn run_once(&self, data_dir: &Path) -> anyhow::Result<String>;
}

/// [BenchmarkRunner] backed by the `gpcheckperf` binary.
pub struct Gpcheckperf {
    binary: PathBuf,
}

impl Gpcheckperf {
    /// Locate the `gpcheckperf` binary.
    ///
    /// If the [GPCHECKPERF_PATH_ENV] environment variable is set, its value is used as the
    /// path to the binary. Otherwise the binary is looked up on the user's `PATH`.
    pub fn discover() -> anyhow::Result<Self> {
        let binary = match env::var(GPCHECKPERF_PATH_ENV).ok().as_deref() {
            Some("") => {
                bail!("'{GPCHECKPERF_PATH_ENV}' set to empty string");
            }
            Some(path) => {
                let gpcheckperf_path = PathBuf::from(path);
                if !gpcheckperf_path.exists() {
                    bail!(
                        "'{GPCHECKPERF_PATH_ENV}={path}' set but that path doesn't exist",
                        path = gpcheckperf_path.display()
                    );
                }
                gpcheckperf_path
            }
            None => which::which("gpcheckperf").context(
                "gpcheckperf not found in PATH. Please install the Greenplum utilities or set 'GPCHECKPERF_PATH' to the correct path.",
            )?,
        };

        Ok(Self { binary })
    }
}

impl BenchmarkRunner for Gpcheckperf {
    fn run_once(&self, data_dir: &Path) -> anyhow::Result<String> {
        let output = Command::new(&self.binary)
            .args(["-v", "-h", "localhost", "-r", "ds", "-D", "-d"])
            .arg(data_dir)
            .output()
            .context("Failed to execute gpcheckperf")?;
        if !output.status.success() {
            bail!(
                "gpcheckperf failed with exit code {status}: {stderr}",
                status = output.status,
                stderr = String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        // The bandwidth lines land on either stream depending on the gpcheckperf version,
        // so keep both.
        let mut raw = String::from_utf8_lossy(&output.stdout).into_owned();
        raw.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(raw)
    }
}
