use std::thread::{self, ThreadId};

use crossbeam_channel::{bounded, select, Receiver, Sender};

use super::{DispatchError, Owner};

/// Queue capacity used when the caller has no specific requirement.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// A unit of work executed exactly once on the owner thread.
///
/// An `Err` return is treated as fatal by [`Owner::run`].
pub type Task<S> = Box<dyn FnOnce(&mut S) -> anyhow::Result<()> + Send + 'static>;

/// Creates a bounded task queue owned by the **calling** thread.
///
/// The returned [`Owner`] must be run on this same thread. `capacity` is clamped
/// to at least 1.
pub fn channel<S: 'static>(capacity: usize) -> (Dispatcher<S>, Owner<S>) {
    let capacity = capacity.max(1);
    let (sender, receiver) = bounded(capacity);
    // Never carries a message. The owner holds the sender, so dropping the
    // owner disconnects it and wakes every waiter.
    let (closed_tx, closed_rx) = bounded::<()>(0);
    let owner_thread = thread::current().id();

    log::debug!("task queue created (capacity {capacity}, owner {owner_thread:?})");

    (
        Dispatcher {
            sender,
            closed: closed_rx,
            owner_thread,
        },
        Owner::new(receiver, closed_tx, owner_thread),
    )
}

/// Producer handle for the owner-thread task queue.
///
/// Cheap to clone; each clone may be moved to a different thread. The queue
/// disconnects once every `Dispatcher` has been dropped.
pub struct Dispatcher<S> {
    sender: Sender<Task<S>>,
    closed: Receiver<()>,
    owner_thread: ThreadId,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            closed: self.closed.clone(),
            owner_thread: self.owner_thread,
        }
    }
}

impl<S: 'static> Dispatcher<S> {
    /// Runs `f` on the owner thread and blocks until it has finished.
    ///
    /// Blocks first on enqueue while the queue is full, then on the task's
    /// completion signal. Returns once `f` has executed exactly once. No value
    /// is carried back; capture a channel or shared cell in `f` if one is needed.
    ///
    /// Must not be called from the owner thread.
    pub fn submit_and_wait<F>(&self, f: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut S) -> anyhow::Result<()> + Send + 'static,
    {
        if thread::current().id() == self.owner_thread {
            return Err(DispatchError::OwnerThread);
        }

        let (done_tx, done_rx) = bounded::<()>(1);
        let task: Task<S> = Box::new(move |state: &mut S| {
            f(state)?;
            // The waiter may have given up only if it panicked; nothing to do then.
            let _ = done_tx.send(());
            Ok(())
        });

        self.sender
            .send(task)
            .map_err(|_| DispatchError::Disconnected)?;

        // A failing or discarded task drops `done_tx`. A task enqueued while the
        // owner is shutting down may never be dropped, so the owner's own exit
        // also ends the wait. Completion recorded before that exit still counts.
        select! {
            recv(done_rx) -> done => done.map_err(|_| DispatchError::Aborted),
            recv(self.closed) -> _ => done_rx.try_recv().map_err(|_| DispatchError::Aborted),
        }
    }

    /// Number of tasks currently waiting in the queue.
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::dispatch::LoopExit;

    #[derive(Default)]
    struct Tally {
        before: u64,
        after: u64,
        threads: HashSet<ThreadId>,
    }

    fn wait_until(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn eight_producers_serialize_on_owner() {
        let (dispatcher, owner) = channel::<Tally>(DEFAULT_QUEUE_CAPACITY);
        let owner_id = thread::current().id();

        let producers: Vec<_> = (0..8)
            .map(|_| {
                let d = dispatcher.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        d.submit_and_wait(|t: &mut Tally| {
                            // A torn update would leave these out of step.
                            assert_eq!(t.before, t.after);
                            t.before += 1;
                            t.after += 1;
                            t.threads.insert(thread::current().id());
                            Ok(())
                        })
                        .expect("submit");
                    }
                })
            })
            .collect();
        drop(dispatcher);

        let mut tally = Tally::default();
        let exit = owner.run(&mut tally).expect("owner loop");

        for p in producers {
            p.join().expect("producer panicked");
        }

        assert_eq!(exit, LoopExit::Disconnected);
        assert_eq!(tally.after, 8000);
        assert_eq!(tally.threads.len(), 1);
        assert!(tally.threads.contains(&owner_id));
    }

    #[test]
    fn submit_returns_after_execution() {
        let (dispatcher, owner) = channel::<Vec<u32>>(4);
        let producer = thread::spawn(move || {
            let ran = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&ran);
            dispatcher
                .submit_and_wait(move |v: &mut Vec<u32>| {
                    v.push(7);
                    flag.store(true, Ordering::Release);
                    Ok(())
                })
                .expect("submit");
            ran.load(Ordering::Acquire)
        });

        let mut seen = Vec::new();
        owner.run(&mut seen).expect("owner loop");
        assert!(producer.join().expect("producer panicked"));
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn full_queue_blocks_instead_of_dropping() {
        let (dispatcher, owner) = channel::<u32>(1);

        let first = {
            let d = dispatcher.clone();
            thread::spawn(move || d.submit_and_wait(|n: &mut u32| {
                *n += 1;
                Ok(())
            }))
        };
        wait_until(|| dispatcher.queued() == 1);

        let second = {
            let d = dispatcher.clone();
            thread::spawn(move || d.submit_and_wait(|n: &mut u32| {
                *n += 1;
                Ok(())
            }))
        };

        // The queue holds one task; the second producer is parked on enqueue.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(dispatcher.queued(), 1);
        assert!(!second.is_finished());
        drop(dispatcher);

        let mut count = 0;
        owner.run(&mut count).expect("owner loop");

        assert_eq!(first.join().expect("first panicked"), Ok(()));
        assert_eq!(second.join().expect("second panicked"), Ok(()));
        assert_eq!(count, 2);
    }

    #[test]
    fn owner_thread_submit_is_rejected() {
        let (dispatcher, _owner) = channel::<()>(1);
        let result = dispatcher.submit_and_wait(|_| Ok(()));
        assert_eq!(result, Err(DispatchError::OwnerThread));
        assert_eq!(dispatcher.queued(), 0);
    }

    #[test]
    fn submit_after_owner_dropped_is_disconnected() {
        let (dispatcher, owner) = channel::<()>(1);
        drop(owner);
        let result = thread::spawn(move || dispatcher.submit_and_wait(|_| Ok(())))
            .join()
            .expect("producer panicked");
        assert_eq!(result, Err(DispatchError::Disconnected));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (dispatcher, _owner) = channel::<()>(0);
        assert_eq!(dispatcher.capacity(), 1);
    }
}
