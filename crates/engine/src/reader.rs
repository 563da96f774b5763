// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-stream reader (C3): drives a `RunTests` invocation's framed
//! message stream to completion, accumulating [`TestResult`]s and pulling
//! per-test output artifacts back to the host results directory.

use crate::error::RunError;
use hostdrv_adapters::{sync, RunnerInvoker, SshSession};
use hostdrv_core::{ControlMessage, TestName, TestResult};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of draining one chunk's control stream.
#[derive(Debug, Clone, Default)]
pub struct ReaderOutcome {
    /// Results keyed by test name, in commit order.
    pub results: Vec<TestResult>,
    /// `true` once a `RunEnd` message was observed (no SSH drop).
    pub run_ended: bool,
    /// Name of the last entity that was started but not yet committed, if
    /// the stream ended (or dropped) mid-entity. Used by the caller to
    /// attach a diagnosis verdict or a synthetic error.
    pub last_in_flight: Option<TestName>,
}

struct Accumulator {
    committed: Vec<TestResult>,
    in_flight: HashMap<TestName, TestResult>,
    /// Remote output directory recorded at `EntityStart`, by test name.
    out_dirs: HashMap<TestName, String>,
    last_started: Option<TestName>,
}

impl Accumulator {
    fn new() -> Self {
        Self { committed: Vec::new(), in_flight: HashMap::new(), out_dirs: HashMap::new(), last_started: None }
    }

    fn entity_start(&mut self, name: TestName, time: f64, out_dir: String) {
        self.last_started = Some(name.clone());
        self.out_dirs.insert(name.clone(), out_dir.clone());
        self.in_flight.insert(name.clone(), TestResult::started(name, time, out_dir));
    }

    fn entity_log(&mut self, name: &TestName, text: &str) {
        if let Some(result) = self.in_flight.get_mut(name) {
            result.append_log(text);
        }
    }

    fn entity_error(&mut self, name: &TestName, error: String) {
        if let Some(result) = self.in_flight.get_mut(name) {
            result.record_error(error);
        }
    }

    fn entity_end(&mut self, name: &TestName, time: f64) {
        if let Some(mut result) = self.in_flight.remove(name) {
            result.finish(time);
            self.committed.push(result);
        }
        if self.last_started.as_ref() == Some(name) {
            self.last_started = None;
        }
    }

    /// Attaches `error` to the last in-flight (not-yet-committed) entity, or
    /// synthesizes a run-level result if none is in flight.
    fn attach_final_error(&mut self, error: String) {
        if let Some(name) = self.last_started.clone() {
            if let Some(result) = self.in_flight.remove(&name) {
                let mut result = result;
                result.record_error(error);
                self.committed.push(result);
            }
            return;
        }
        let mut result = TestResult::default();
        result.record_error(error);
        self.committed.push(result);
    }

    fn into_outcome(mut self, run_ended: bool) -> ReaderOutcome {
        let last_in_flight = self.last_started.clone();
        self.committed.extend(self.in_flight.into_values());
        ReaderOutcome { results: self.committed, run_ended, last_in_flight }
    }
}

/// Drains `invoker`'s control-message stream for one `RunTests` chunk
/// invocation, pulling per-test artifacts via `session` and enforcing the
/// heartbeat watchdog, max-failure short-circuit, and post-close wait
/// timeout.
///
/// `res_dir` is the host results directory; artifacts land under
/// `<res_dir>/tests/<testName>/`. `cancel` is the orchestrator-owned
/// cancellation token (spec.md §5): once it fires the runner is killed and
/// `RunError::Cancelled` is returned alongside whatever was committed so far.
///
/// Every error path carries the [`ReaderOutcome`] accumulated up to that
/// point, not just the error: spec.md §8 Scenario 4 and Scenario 5 both
/// require results for completed entities to survive a `TimeoutError` or a
/// `MaxFailuresReached` abort.
pub async fn drain_control_stream<S: SshSession>(
    invoker: &mut dyn RunnerInvoker,
    session: &S,
    res_dir: &Path,
    heartbeat_interval: Duration,
    wait_timeout: Duration,
    max_failures: u32,
    cancel: &CancellationToken,
) -> Result<ReaderOutcome, (RunError, ReaderOutcome)> {
    let stall_budget = heartbeat_interval.saturating_mul(3);
    let mut accumulator = Accumulator::new();
    let mut failure_count: u32 = 0;

    loop {
        // A fresh `sleep` each iteration resets the watchdog on every
        // received message, per the heartbeat contract in spec.md §4.3.
        let message = tokio::select! {
            biased;
            msg = invoker.next_message() => match msg {
                Ok(msg) => msg,
                Err(e) => return Err((RunError::from(e), accumulator.into_outcome(false))),
            },
            _ = tokio::time::sleep(stall_budget) => {
                invoker.cancel();
                return Err((RunError::Stalled, accumulator.into_outcome(false)));
            }
            _ = cancel.cancelled() => {
                invoker.cancel();
                return Err((RunError::Cancelled, accumulator.into_outcome(false)));
            }
        };

        let Some(message) = message else {
            break;
        };

        match message {
            ControlMessage::RunStart { .. } | ControlMessage::Heartbeat { .. } | ControlMessage::RunLog { .. } => {}
            ControlMessage::RunError { error, .. } => accumulator.attach_final_error(error),
            ControlMessage::EntityStart { time, info, out_dir } => {
                accumulator.entity_start(info.name, time, out_dir);
            }
            ControlMessage::EntityLog { name, text, .. } => accumulator.entity_log(&name, &text),
            ControlMessage::EntityError { name, error, .. } => {
                accumulator.entity_error(&name, error);
                failure_count += 1;
                if max_failures != 0 && failure_count >= max_failures {
                    invoker.cancel();
                    accumulator.attach_final_error(format!("max test failures ({max_failures}) reached"));
                    return Err((RunError::MaxFailuresReached(max_failures), accumulator.into_outcome(false)));
                }
            }
            ControlMessage::EntityEnd { time, name } => {
                pull_entity_artifacts(session, &mut accumulator, &name, res_dir).await;
                accumulator.entity_end(&name, time);
            }
            ControlMessage::RunEnd { .. } => {
                let exit = match invoker.wait(wait_timeout).await {
                    Ok(exit) => exit,
                    Err(hostdrv_adapters::RunnerError::Timeout) => {
                        return Err((RunError::Timeout, accumulator.into_outcome(false)))
                    }
                    Err(other) => return Err((RunError::from(other), accumulator.into_outcome(false))),
                };
                if !exit.success {
                    let error = RunError::from(hostdrv_adapters::RunnerError::RunnerExit {
                        code: exit.code.unwrap_or(-1),
                        stderr_field: invoker.stderr_tail(),
                    });
                    return Err((error, accumulator.into_outcome(false)));
                }
                return Ok(accumulator.into_outcome(true));
            }
        }
    }

    // Stream closed (EOF) without a `RunEnd`: treat as a dropped session.
    Ok(accumulator.into_outcome(false))
}

/// Issues `sync` then copies the test's remote output directory into
/// `<res_dir>/tests/<testName>/`. Pull failures are recorded on the test's
/// result rather than aborting the stream (§4.3).
async fn pull_entity_artifacts<S: SshSession>(
    session: &S,
    accumulator: &mut Accumulator,
    name: &TestName,
    res_dir: &Path,
) {
    let Some(out_dir) = accumulator.out_dirs.get(name).cloned() else {
        return;
    };
    if let Err(e) = sync(session).await {
        accumulator.entity_error(name, format!("sync before artifact pull failed: {e}"));
        return;
    }
    let dest = res_dir.join("tests").join(name.as_str());
    if let Err(e) = std::fs::create_dir_all(&dest) {
        accumulator.entity_error(name, format!("failed to create artifact directory: {e}"));
        return;
    }
    if let Err(e) = session.pull_dir(&out_dir, &dest).await {
        accumulator.entity_error(name, format!("failed to pull artifacts: {e}"));
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
