//! An in-process, at-least-once work queue over [`crate::tasks`]. Workers
//! pull tasks off a shared channel, execute them, schedule their follow-ups,
//! and re-enqueue failures up to a bounded retry count.
//!
//! The transport deliberately guarantees very little: no ordering between
//! independently scheduled tasks, and possible duplicate execution under
//! retry. The pipeline is built to be correct under exactly those terms, so
//! swapping this module for a distributed queue changes nothing above it.

use crate::build::SiteBuilder;
use crate::tasks::{self, Event, Task};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, warn};

enum Message {
    Run { task: Task, attempt: u32 },
    Stop,
}

pub struct Queue {
    tx: Sender<Message>,
    pending: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl Queue {
    /// Starts `workers` threads draining the queue against `builder`. A
    /// failed task is retried up to `max_retries` times before the queue
    /// gives up and logs it.
    pub fn start(builder: Arc<SiteBuilder>, workers: usize, max_retries: u32) -> Queue {
        let (tx, rx) = unbounded::<Message>();
        let pending = Arc::new(AtomicUsize::new(0));

        let handles = (0..workers.max(1))
            .map(|_| {
                let builder = builder.clone();
                let rx: Receiver<Message> = rx.clone();
                let tx = tx.clone();
                let pending = pending.clone();
                thread::spawn(move || {
                    worker_loop(&builder, &rx, &tx, &pending, max_retries)
                })
            })
            .collect();

        Queue {
            tx,
            pending,
            workers: handles,
        }
    }

    /// Fire-and-forget scheduling of a single task.
    pub fn schedule(&self, task: Task) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(Message::Run { task, attempt: 0 });
    }

    /// Schedules everything an event requires.
    pub fn schedule_event(&self, event: &Event) {
        for task in tasks::plan(event) {
            self.schedule(task);
        }
    }

    /// Blocks until no scheduled work (including follow-ups and retries)
    /// remains in flight.
    pub fn wait_idle(&self) {
        while self.pending.load(Ordering::SeqCst) > 0 {
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Drains outstanding work, then stops and joins the workers.
    pub fn shutdown(self) {
        self.wait_idle();
        for _ in &self.workers {
            let _ = self.tx.send(Message::Stop);
        }
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    builder: &SiteBuilder,
    rx: &Receiver<Message>,
    tx: &Sender<Message>,
    pending: &AtomicUsize,
    max_retries: u32,
) {
    while let Ok(message) = rx.recv() {
        let (task, attempt) = match message {
            Message::Run { task, attempt } => (task, attempt),
            Message::Stop => break,
        };

        match tasks::execute(builder, &task) {
            Ok(follow_ups) => {
                for follow_up in follow_ups {
                    pending.fetch_add(1, Ordering::SeqCst);
                    let _ = tx.send(Message::Run {
                        task: follow_up,
                        attempt: 0,
                    });
                }
            }
            Err(err) if attempt < max_retries => {
                warn!(?task, attempt, %err, "task failed, requeueing");
                pending.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(Message::Run {
                    task,
                    attempt: attempt + 1,
                });
            }
            Err(err) => {
                error!(?task, attempt, %err, "task failed, giving up");
            }
        }

        // decrement after any requeue so wait_idle never observes a false 0
        pending.fetch_sub(1, Ordering::SeqCst);
    }
}
