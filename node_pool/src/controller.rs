use std::env;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Environment variable to override the path to the `pks` CLI.
pub const PKS_PATH_ENV: &str = "PKS_PATH";

const LAST_ACTION_STATE: &str = "Last Action State";

/// A cluster as reported by `pks cluster <name> --json`.
///
/// Only the fields the resize workflow needs; the CLI reports far more.
#[derive(Debug, Deserialize)]
pub struct ClusterDescription {
    pub parameters: ClusterParameters,
}

#[derive(Debug, Deserialize)]
pub struct ClusterParameters {
    pub kubernetes_worker_instances: u32,
}

/// Operations against the external cluster manager.
///
/// The resize workflow only depends on this trait so that tests can drive it with a fake
/// instead of a live `pks` installation.
pub trait ClusterController {
    /// Fetch the current description of the named cluster.
    fn describe(&self, cluster_name: &str) -> anyhow::Result<ClusterDescription>;

    /// Ask the cluster manager to scale the worker pool to `num_nodes`.
    fn resize(&self, cluster_name: &str, num_nodes: u32) -> anyhow::Result<()>;

    /// The "Last Action State" line from the cluster status output.
    fn last_action_state(&self, cluster_name: &str) -> anyhow::Result<String>;
}

/// [ClusterController] backed by the `pks` CLI.
pub struct PksController {
    binary: PathBuf,
}

impl PksController {
    /// Locate the `pks` CLI.
    ///
    /// If the [PKS_PATH_ENV] environment variable is set, its value is used as the path to the
    /// binary. Otherwise the binary is looked up on the user's `PATH`.
    pub fn discover() -> anyhow::Result<Self> {
        let binary = match env::var(PKS_PATH_ENV).ok().as_deref() {
            Some("") => {
                bail!("'{PKS_PATH_ENV}' set to empty string");
            }
            Some(path) => {
                let pks_path = PathBuf::from(path);
                if !pks_path.exists() {
                    bail!(
                        "'{PKS_PATH_ENV}={path}' set but that path doesn't exist",
                        path = pks_path.display()
                    );
                }
                pks_path
            }
            None => which::which("pks").context(
                "pks CLI not found in PATH. Please install the PKS CLI or set 'PKS_PATH' to the correct path.",
            )?,
        };

        Ok(Self { binary })
    }

    fn checked_output(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute 'pks {}'", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "'pks {args}' failed with exit code: {status}",
                args = args.join(" "),
                status = output.status
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("Output of 'pks {}' is not UTF-8", args.join(" ")))
    }
}

impl ClusterController for PksController {
    fn describe(&self, cluster_name: &str) -> anyhow::Result<ClusterDescription> {
        let json = self.checked_output(&["cluster", cluster_name, "--json"])?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse JSON output of 'pks cluster {cluster_name}'"))
    }

    fn resize(&self, cluster_name: &str, num_nodes: u32) -> anyhow::Result<()> {
        // Inherit stdio so the CLI's own progress output reaches the operator.
        let status = Command::new(&self.binary)
            .args(["resize", cluster_name])
            .arg(format!("--num-nodes={num_nodes}"))
            .status()
            .with_context(|| format!("Failed to execute 'pks resize {cluster_name}'"))?;
        if !status.success() {
            bail!("'pks resize {cluster_name}' failed with exit code: {status}");
        }

        Ok(())
    }

    fn last_action_state(&self, cluster_name: &str) -> anyhow::Result<String> {
        let output = self.checked_output(&["show-cluster", cluster_name])?;
        output
            .lines()
            .find(|line| line.contains(LAST_ACTION_STATE))
            .map(|line| line.to_string())
            .with_context(|| {
                format!(
                    "No '{LAST_ACTION_STATE}' line in 'pks show-cluster {cluster_name}' output"
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_worker_instances_from_cluster_json() {
        let json = r#"{
            "name": "gp-test",
            "plan_name": "medium",
            "last_action": "UPDATE",
            "parameters": {
                "kubernetes_master_host": "gp-test.example.com",
                "kubernetes_worker_instances": 18
            }
        }"#;

        let cluster: ClusterDescription = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.parameters.kubernetes_worker_instances, 18);
    }

    #[test]
    fn rejects_cluster_json_without_parameters() {
        let result: Result<ClusterDescription, _> = serde_json::from_str(r#"{"name": "gp-test"}"#);
        assert!(result.is_err());
    }
}
