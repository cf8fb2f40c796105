//! Batch execution of every function binding
//!
//! Functions run one at a time in namespace order. Executions a function
//! queues run right after it. The first failure stops the batch; bindings
//! after it stay `Pending`.

use crate::binding::{FunctionBinding, FunctionNamespace, ObjectNamespace};
use crate::error::EngineError;
use crate::execute::Executor;
use sgui_namespace::NodePath;
use thiserror::Error;

/// Default cap on queued executions within one run
pub const DEFAULT_MAX_FOLLOW_UPS: usize = 64;
use tracing::{error, info};

/// Run state of one function binding within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Not started
    Pending,
    /// Executing now
    Running,
    /// Finished and outputs written
    Completed,
    /// Finished with an error
    Failed,
}

impl RunState {
    /// Check if no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: RunState) -> Vec<RunState> {
    use RunState::{Completed, Failed, Pending, Running};
    match from {
        Pending => vec![Running],
        Running => vec![Completed, Failed],
        Completed | Failed => vec![],
    }
}

/// Validate a run state transition
///
/// # Errors
/// [`EngineError::IllegalTransition`] if `to` is not reachable from `from`
pub fn validate_transition(from: RunState, to: RunState) -> Result<(), EngineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(EngineError::IllegalTransition { from, to })
    }
}

/// One function binding's row in a batch report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    /// Path of the function binding
    pub path: NodePath,
    /// Final state in this run
    pub state: RunState,
    /// Object paths written or removed by it
    pub written: Vec<NodePath>,
}

impl RunEntry {
    fn pending(path: NodePath) -> Self {
        Self {
            path,
            state: RunState::Pending,
            written: Vec::new(),
        }
    }

    fn advance(&mut self, to: RunState) -> Result<(), EngineError> {
        validate_transition(self.state, to)?;
        self.state = to;
        Ok(())
    }
}

/// Per-binding outcome of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    entries: Vec<RunEntry>,
}

impl BatchReport {
    /// Rows in execution order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    /// State of the binding at `path`
    #[must_use]
    pub fn state_of(&self, path: &NodePath) -> Option<RunState> {
        self.entries.iter().find(|e| &e.path == path).map(|e| e.state)
    }

    /// Number of bindings that completed
    #[must_use]
    pub fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.state == RunState::Completed).count()
    }

    /// Check if every binding completed
    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.entries.iter().all(|e| e.state == RunState::Completed)
    }
}

/// Batch stopped at a failing binding
#[derive(Debug, Clone, PartialEq, Error)]
#[error("batch aborted at {path}: {source}")]
pub struct BatchAborted {
    /// Report up to and including the failure
    pub report: BatchReport,
    /// Binding that failed
    pub path: NodePath,
    /// Why it failed
    #[source]
    pub source: EngineError,
}

/// Runs every binding of a functions namespace in order
pub struct BatchRunner<'a> {
    executor: Executor<'a>,
    max_follow_ups: usize,
}

impl<'a> BatchRunner<'a> {
    /// Create runner
    #[must_use]
    pub fn new(executor: Executor<'a>) -> Self {
        Self {
            executor,
            max_follow_ups: DEFAULT_MAX_FOLLOW_UPS,
        }
    }

    /// Override the cap on queued executions per run
    #[must_use]
    pub fn with_max_follow_ups(mut self, max_follow_ups: usize) -> Self {
        self.max_follow_ups = max_follow_ups;
        self
    }

    /// Execute all bindings sequentially, stopping at the first failure
    ///
    /// Bindings are snapshotted before the first one runs.
    ///
    /// # Errors
    /// [`BatchAborted`] with the partial report
    pub fn run(
        &self,
        functions: &FunctionNamespace,
        objects: &mut ObjectNamespace,
    ) -> Result<BatchReport, Box<BatchAborted>> {
        let queue: Vec<(NodePath, FunctionBinding)> = functions
            .leaves()
            .into_iter()
            .map(|(path, binding)| (path, binding.clone()))
            .collect();
        self.run_queue(queue, functions, objects)
    }

    /// Execute the given bindings sequentially
    ///
    /// Executions a binding queues are looked up in `functions` and run
    /// before the rest of `queue`.
    ///
    /// # Errors
    /// [`BatchAborted`] with the partial report. A queued path with no
    /// function binding fails that entry; more queued executions than the
    /// cap fail with [`EngineError::FollowUpLimit`].
    pub fn run_queue(
        &self,
        queue: Vec<(NodePath, FunctionBinding)>,
        functions: &FunctionNamespace,
        objects: &mut ObjectNamespace,
    ) -> Result<BatchReport, Box<BatchAborted>> {
        let mut report = BatchReport::default();
        let mut bindings: Vec<Option<FunctionBinding>> = Vec::with_capacity(queue.len());
        for (path, binding) in queue {
            report.entries.push(RunEntry::pending(path));
            bindings.push(Some(binding));
        }
        info!(functions = report.entries.len(), "running all functions");

        let mut follow_ups = 0;
        let mut i = 0;
        while i < report.entries.len() {
            let path = report.entries[i].path.clone();
            let outcome = report.entries[i]
                .advance(RunState::Running)
                .and_then(|()| match bindings[i].take() {
                    Some(binding) => Ok(binding),
                    None => functions.binding(&path).cloned().map_err(EngineError::from),
                })
                .and_then(|binding| self.executor.execute(&binding, objects));

            let executed = match outcome {
                Ok(executed) => executed,
                Err(source) => {
                    report.entries[i].state = RunState::Failed;
                    error!(%path, error = %source, "function failed, aborting batch");
                    return Err(Box::new(BatchAborted { report, path, source }));
                }
            };

            let entry = &mut report.entries[i];
            entry.written = executed.written;
            entry.written.extend(executed.edited);
            if let Err(source) = entry.advance(RunState::Completed) {
                return Err(Box::new(BatchAborted { report, path, source }));
            }
            info!(%path, "function completed");

            follow_ups += executed.queued.len();
            if follow_ups > self.max_follow_ups {
                let source = EngineError::FollowUpLimit(self.max_follow_ups);
                error!(%path, error = %source, "aborting batch");
                return Err(Box::new(BatchAborted { report, path, source }));
            }
            for (offset, next) in executed.queued.into_iter().enumerate() {
                report.entries.insert(i + 1 + offset, RunEntry::pending(next));
                bindings.insert(i + 1 + offset, None);
            }
            i += 1;
        }

        info!(completed = report.completed(), "all functions completed");
        Ok(report)
    }
}
