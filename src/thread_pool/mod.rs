// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bounded queue of log tasks serviced by worker threads, shared by asynchronous loggers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::TrySendError;

use crate::Error;
use crate::ErrorKind;
use crate::Record;
use crate::layout::PatternLayout;
use crate::sink::SinkHandle;
use crate::trap::Trap;

mod worker;

use self::worker::Worker;

/// Number of workers when the `THREAD_POOL` section does not name one.
pub const DEFAULT_THREAD_COUNT: usize = 1;
/// Queue capacity when the `THREAD_POOL` section does not name one.
pub const DEFAULT_QUEUE_SIZE: usize = 8192;

/// What an asynchronous logger does when the queue is full.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OverflowPolicy {
    /// Blocks until the queue has room.
    Block,
    /// Discards the oldest queued task to make room for the incoming one.
    DropOldest,
}

pub(crate) enum Task {
    Log {
        sinks: Arc<[SinkHandle]>,
        layout: Arc<PatternLayout>,
        record: Record,
    },
    Flush {
        sinks: Arc<[SinkHandle]>,
        done: Sender<()>,
    },
}

/// A pool of worker threads draining a bounded task queue.
///
/// Dropping the pool closes the queue, lets the workers drain what is left and joins them.
pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    receiver: Receiver<Task>,
    handles: Vec<JoinHandle<()>>,
    queue_size: usize,
    dropped: AtomicU64,
    trap: Arc<dyn Trap>,
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads", &self.handles.len())
            .field("queue_size", &self.queue_size)
            .field("dropped", &self.dropped())
            .finish()
    }
}

impl ThreadPool {
    /// Spawn `thread_count` workers behind a queue of `queue_size` tasks.
    ///
    /// Errors raised by sinks on the workers go to `trap`.
    pub fn new(thread_count: usize, queue_size: usize, trap: Arc<dyn Trap>) -> Result<Self, Error> {
        if thread_count == 0 {
            return Err(Error::new(ErrorKind::ConfigInvalid, "thread pool needs a worker")
                .with_context("field", "thread_count")
                .with_context("value", thread_count));
        }
        if queue_size == 0 {
            return Err(Error::new(ErrorKind::ConfigInvalid, "thread pool needs a queue")
                .with_context("field", "queue_size")
                .with_context("value", queue_size));
        }

        let (sender, receiver) = crossbeam_channel::bounded(queue_size);
        let mut handles = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let worker = Worker::new(receiver.clone(), trap.clone());
            let handle = std::thread::Builder::new()
                .name(format!("logconf-worker-{index}"))
                .spawn(move || worker.run())
                .map_err(|err| {
                    Error::new(ErrorKind::Unexpected, "failed to spawn thread pool worker")
                        .with_source(err)
                })?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            receiver,
            handles,
            queue_size,
            dropped: AtomicU64::new(0),
            trap,
        })
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Capacity of the task queue.
    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    /// Number of tasks discarded under [`OverflowPolicy::DropOldest`].
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub(crate) fn send(&self, task: Task, overflow: OverflowPolicy) -> Result<(), Error> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(shut_down());
        };

        match overflow {
            OverflowPolicy::Block => sender.send(task).map_err(|_| shut_down()),
            OverflowPolicy::DropOldest => {
                let mut task = task;
                loop {
                    match sender.try_send(task) {
                        Ok(()) => return Ok(()),
                        Err(TrySendError::Full(rejected)) => {
                            if self.receiver.try_recv().is_ok() {
                                self.dropped.fetch_add(1, Ordering::Relaxed);
                            }
                            task = rejected;
                        }
                        Err(TrySendError::Disconnected(_)) => return Err(shut_down()),
                    }
                }
            }
        }
    }
}

fn shut_down() -> Error {
    Error::new(ErrorKind::Unexpected, "thread pool is shut down")
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // workers leave their loop once the queue is drained and no sender is left
        drop(self.sender.take());

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                let err = Error::new(ErrorKind::Unexpected, "thread pool worker panicked");
                self.trap.trap(&err);
            }
        }
    }
}
