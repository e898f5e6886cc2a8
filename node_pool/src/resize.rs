use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::controller::ClusterController;

/// How long to wait between cluster status queries while a resize is in flight.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const SUCCEEDED: &str = "succeeded";

/// What [resize_to_capacity] ended up doing.
#[derive(Debug, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The pool already had at least the required number of workers; nothing was done.
    AlreadySufficient { existing: u32 },
    /// The pool was resized; `polls` status queries were made before the cluster reported
    /// success.
    Resized { polls: u32 },
}

/// The number of worker nodes needed to host `segment_count` Greenplum segments.
///
/// One node per primary, one per mirror, plus one each for master and standby.
pub fn required_nodes(segment_count: u32) -> u32 {
    2 * segment_count + 2
}

/// Grow the cluster's worker pool until it can host `segment_count` segments.
///
/// Resizing is skipped entirely when the pool is already big enough, because the external
/// resize call takes a long time even when it has nothing to do. Otherwise the resize is
/// issued and the cluster status polled every `poll_interval` until it reports success.
/// There is no timeout; cancellation is only by terminating the process.
pub fn resize_to_capacity(
    controller: &dyn ClusterController,
    cluster_name: &str,
    segment_count: u32,
    poll_interval: Duration,
) -> anyhow::Result<ResizeOutcome> {
    let required = required_nodes(segment_count);
    let existing = controller
        .describe(cluster_name)?
        .parameters
        .kubernetes_worker_instances;
    log::info!("existing nodes: {existing}, required: {required}");

    if existing >= required {
        return Ok(ResizeOutcome::AlreadySufficient { existing });
    }

    log::info!("Calling pks resize. This can take many minutes and this routine has no timeout.");
    controller.resize(cluster_name, required)?;

    let polls = await_last_action_success(controller, cluster_name, poll_interval)?;
    Ok(ResizeOutcome::Resized { polls })
}

/// Poll the cluster status until the last action is reported as succeeded.
///
/// Any status string other than one containing "succeeded" keeps the loop going, with a
/// fixed sleep between queries. A failed status query is fatal. Returns the number of
/// queries made.
pub fn await_last_action_success(
    controller: &dyn ClusterController,
    cluster_name: &str,
    poll_interval: Duration,
) -> anyhow::Result<u32> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} waiting for resize [{elapsed_precise}]")
            .expect("Failed to set progress style"),
    );

    let mut polls = 0;
    loop {
        let state = controller.last_action_state(cluster_name)?;
        polls += 1;
        if state.contains(SUCCEEDED) {
            spinner.finish_and_clear();
            return Ok(polls);
        }

        log::debug!("cluster not ready yet: {state}");
        spinner.tick();
        std::thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use anyhow::bail;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::controller::{ClusterDescription, ClusterParameters};

    struct FakeClusterController {
        workers: u32,
        statuses: RefCell<VecDeque<&'static str>>,
        resize_calls: RefCell<Vec<u32>>,
        status_queries: RefCell<u32>,
    }

    impl FakeClusterController {
        fn new(workers: u32, statuses: &[&'static str]) -> Self {
            Self {
                workers,
                statuses: RefCell::new(statuses.iter().copied().collect()),
                resize_calls: RefCell::new(Vec::new()),
                status_queries: RefCell::new(0),
            }
        }
    }

    impl ClusterController for FakeClusterController {
        fn describe(&self, _cluster_name: &str) -> anyhow::Result<ClusterDescription> {
            Ok(ClusterDescription {
                parameters: ClusterParameters {
                    kubernetes_worker_instances: self.workers,
                },
            })
        }

        fn resize(&self, _cluster_name: &str, num_nodes: u32) -> anyhow::Result<()> {
            self.resize_calls.borrow_mut().push(num_nodes);
            Ok(())
        }

        fn last_action_state(&self, _cluster_name: &str) -> anyhow::Result<String> {
            *self.status_queries.borrow_mut() += 1;
            match self.statuses.borrow_mut().pop_front() {
                Some(status) => Ok(format!("Last Action State:  {status}")),
                None => bail!("status queried more times than scripted"),
            }
        }
    }

    #[test]
    fn computes_required_nodes() {
        assert_eq!(required_nodes(0), 2);
        assert_eq!(required_nodes(1), 4);
        assert_eq!(required_nodes(8), 18);
    }

    #[test]
    fn does_not_resize_when_pool_is_already_big_enough() {
        let controller = FakeClusterController::new(18, &[]);

        let outcome = resize_to_capacity(&controller, "gp-test", 8, Duration::ZERO).unwrap();

        assert_eq!(outcome, ResizeOutcome::AlreadySufficient { existing: 18 });
        assert!(controller.resize_calls.borrow().is_empty());
        assert_eq!(*controller.status_queries.borrow(), 0);
    }

    #[test]
    fn oversized_pool_counts_as_sufficient() {
        let controller = FakeClusterController::new(30, &[]);

        let outcome = resize_to_capacity(&controller, "gp-test", 8, Duration::ZERO).unwrap();

        assert_eq!(outcome, ResizeOutcome::AlreadySufficient { existing: 30 });
        assert!(controller.resize_calls.borrow().is_empty());
    }

    #[test]
    fn resizes_and_polls_until_succeeded() {
        let controller = FakeClusterController::new(
            4,
            &["in progress", "in progress", "in progress", "succeeded"],
        );

        let outcome = resize_to_capacity(&controller, "gp-test", 8, Duration::ZERO).unwrap();

        // Three "in progress" statuses mean three sleeps before the fourth query succeeds.
        assert_eq!(outcome, ResizeOutcome::Resized { polls: 4 });
        assert_eq!(*controller.resize_calls.borrow(), vec![18]);
        assert_eq!(*controller.status_queries.borrow(), 4);
    }

    #[test]
    fn immediate_success_polls_once() {
        let controller = FakeClusterController::new(0, &["succeeded"]);

        let outcome = resize_to_capacity(&controller, "gp-test", 0, Duration::ZERO).unwrap();

        assert_eq!(outcome, ResizeOutcome::Resized { polls: 1 });
        assert_eq!(*controller.resize_calls.borrow(), vec![2]);
    }

    #[test]
    fn status_query_failure_is_fatal() {
        // Two scripted statuses, neither of them success; the third query fails.
        let controller = FakeClusterController::new(4, &["in progress", "failed"]);

        let result = resize_to_capacity(&controller, "gp-test", 8, Duration::ZERO);

        assert!(result.is_err());
        assert_eq!(*controller.status_queries.borrow(), 3);
    }
}
