// Copyright 2018-2021 DDK developers
// This file is part of DDK Core.

// DDK Core is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// DDK Core is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with DDK Core.  If not, see <http://www.gnu.org/licenses/>.

//! Single-worker FIFO task serializer.
//!
//! Every ledger-visible mutation (admission cycles, block application,
//! fork recovery) runs as a task on one worker thread, which gives the
//! pool's read-modify-write sections a single-writer discipline without
//! a lock per index. Tasks block-receive off the queue; the historical
//! inter-task pacing delay survives as a configuration knob.

use std::{
    collections::VecDeque,
    panic,
    sync::{
        atomic::{AtomicBool, Ordering as AtomicOrdering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::{Condvar, Mutex, RwLock};

type Task = Box<dyn FnOnce() + Send>;
type WarningHandler = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Sequence configuration.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// Depth at which the warning hook starts firing.
    pub warning_limit: usize,
    /// Minimum delay between tasks; zero disables pacing.
    pub pacing: Duration,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig {
            warning_limit: 50,
            pacing: Duration::ZERO,
        }
    }
}

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    signal: Condvar,
    deleting: AtomicBool,
    warning_limit: usize,
    pacing: Duration,
    on_warning: RwLock<Option<WarningHandler>>,
}

/// Single-worker FIFO task queue.
pub struct Sequence {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Sequence {
    /// Spawn the worker and return the handle used to enqueue tasks.
    pub fn new(name: &str, config: SequenceConfig) -> Sequence {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            signal: Condvar::new(),
            deleting: AtomicBool::new(false),
            warning_limit: config.warning_limit,
            pacing: config.pacing,
            on_warning: RwLock::new(None),
        });

        let worker = shared.clone();
        let thread = thread::Builder::new()
            .name(format!("Sequence {name}"))
            .spawn(move || Sequence::work(worker))
            .expect("Error creating sequence thread");

        Sequence {
            shared,
            thread: Some(thread),
        }
    }

    fn work(shared: Arc<Shared>) {
        loop {
            let (task, depth) = {
                let mut queue = shared.queue.lock();
                loop {
                    if shared.deleting.load(AtomicOrdering::SeqCst) {
                        return;
                    }
                    match queue.pop_front() {
                        // depth counts the task being started.
                        Some(task) => break (task, queue.len() + 1),
                        None => shared.signal.wait(&mut queue),
                    }
                }
            };

            if depth >= shared.warning_limit {
                warn!(target: "sequence", "Main queue, state: {} / {}", depth, shared.warning_limit);
                if let Some(handler) = &*shared.on_warning.read() {
                    handler(depth, shared.warning_limit);
                }
            }

            // A panicking task must not take the worker down with it.
            if panic::catch_unwind(panic::AssertUnwindSafe(task)).is_err() {
                error!(target: "sequence", "Sequence task panicked");
            }

            if !shared.pacing.is_zero() {
                thread::sleep(shared.pacing);
            }
        }
    }

    /// Enqueue a task.
    pub fn push<F: FnOnce() + Send + 'static>(&self, task: F) {
        self.shared.queue.lock().push_back(Box::new(task));
        self.shared.signal.notify_all();
    }

    /// Current queue depth, not counting a task already running.
    pub fn count(&self) -> usize {
        self.shared.queue.lock().len()
    }

    /// Install the overload observer.
    pub fn on_warning(&self, handler: WarningHandler) {
        *self.shared.on_warning.write() = Some(handler);
    }
}

impl Drop for Sequence {
    fn drop(&mut self) {
        trace!(target: "shutdown", "[Sequence] Closing...");
        let _ = self.shared.queue.lock();
        self.shared.deleting.store(true, AtomicOrdering::SeqCst);
        self.shared.signal.notify_all();
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
        trace!(target: "shutdown", "[Sequence] Closed");
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("count", &self.count())
            .finish()
    }
}
