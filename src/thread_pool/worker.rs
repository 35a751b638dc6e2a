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

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::Error;
use crate::ErrorKind;
use crate::thread_pool::Task;
use crate::trap::Trap;

pub(crate) struct Worker {
    receiver: Receiver<Task>,
    trap: Arc<dyn Trap>,
}

impl Worker {
    pub(crate) fn new(receiver: Receiver<Task>, trap: Arc<dyn Trap>) -> Self {
        Self { receiver, trap }
    }

    pub(crate) fn run(self) {
        let Self { receiver, trap } = self;

        while let Ok(task) = receiver.recv() {
            match task {
                Task::Log {
                    sinks,
                    layout,
                    record,
                } => {
                    for sink in sinks.iter() {
                        if let Err(err) = sink.log(&record, &layout) {
                            let err = Error::new(ErrorKind::Unexpected, "failed to append record")
                                .with_context("sink", sink.name())
                                .with_source(err);
                            trap.trap(&err);
                        }
                    }
                }
                Task::Flush { sinks, done } => {
                    for sink in sinks.iter() {
                        if let Err(err) = sink.flush() {
                            let err = Error::new(ErrorKind::Unexpected, "failed to flush")
                                .with_context("sink", sink.name())
                                .with_source(err);
                            trap.trap(&err);
                        }
                    }
                    // the flushing caller may have given up waiting
                    let _ = done.send(());
                }
            }
        }
    }
}
