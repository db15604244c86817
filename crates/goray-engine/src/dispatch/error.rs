use std::fmt;

/// Reasons a [`submit_and_wait`](super::Dispatcher::submit_and_wait) call can fail.
///
/// None of these are retryable: they all mean the owner thread cannot (or will
/// not) run the task.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DispatchError {
    /// Called from the owner thread itself; waiting would deadlock the loop.
    OwnerThread,
    /// The owner was dropped before the task could be enqueued.
    Disconnected,
    /// The task was enqueued but never signalled completion: it failed, or the
    /// owner stopped and discarded it.
    Aborted,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnerThread => f.write_str("submit_and_wait called from the owner thread"),
            Self::Disconnected => f.write_str("owner thread is gone; task not enqueued"),
            Self::Aborted => f.write_str("task was discarded or failed on the owner thread"),
        }
    }
}

impl std::error::Error for DispatchError {}
