//! The designated callback context.
//!
//! # Design
//! Completions produced on runtime worker threads are posted here as boxed
//! closures and executed on whichever thread drains the queue, so callbacks
//! never run concurrently with each other. Draining blocks the calling
//! thread, which therefore must not be a runtime worker. Idle timeouts are
//! driven on the runtime handle given at construction; it should belong to a
//! multi-thread runtime so its timer runs without a `Runtime::block_on`.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Receiving end of the callback queue. Drain it from the thread that should
/// run callbacks.
#[derive(Debug)]
pub struct MainQueue {
    sender: UnboundedSender<Job>,
    receiver: UnboundedReceiver<Job>,
    runtime: Handle,
}

/// Cloneable handle used to post work onto a [`MainQueue`].
#[derive(Debug, Clone)]
pub struct MainHandle {
    sender: UnboundedSender<Job>,
}

impl MainQueue {
    pub fn new(runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            runtime,
        }
    }

    pub fn handle(&self) -> MainHandle {
        MainHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run callbacks forever. Returns once every [`MainHandle`] is dropped.
    pub fn run(self) {
        let MainQueue {
            sender,
            mut receiver,
            ..
        } = self;
        drop(sender);
        while let Some(job) = receiver.blocking_recv() {
            job();
        }
    }

    /// Run whatever is queued right now without waiting.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run callbacks until none arrives within `idle`.
    pub fn run_until_idle(&mut self, idle: Duration) -> usize {
        let mut ran = 0;
        loop {
            let next = self
                .runtime
                .block_on(tokio::time::timeout(idle, self.receiver.recv()));
            match next {
                Ok(Some(job)) => {
                    job();
                    ran += 1;
                }
                Ok(None) | Err(_) => return ran,
            }
        }
    }
}

impl MainHandle {
    pub fn post(&self, job: impl FnOnce() + Send + 'static) {
        if self.sender.send(Box::new(job)).is_err() {
            tracing::warn!("main queue is gone, dropping callback");
        }
    }
}
