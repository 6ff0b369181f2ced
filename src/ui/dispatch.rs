//! Run-on-foreground primitive
//!
//! Background workers never touch application state directly. They post a
//! closure through a [`Dispatcher`]; the foreground event loop drains the
//! matching [`TaskQueue`] and runs each closure with exclusive access to the
//! state. When the loop is blocked in `mio::Poll`, the attached waker
//! interrupts it so posted work runs promptly.

use log::{debug, warn};
use mio::Waker;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

/// Work scheduled to run on the foreground thread
pub type Task<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Sending half, cloned into every background worker
pub struct Dispatcher<T> {
    tx: Sender<Task<T>>,
    waker: Option<Arc<Waker>>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }
}

/// Receiving half, owned by the foreground loop
pub struct TaskQueue<T> {
    rx: Receiver<Task<T>>,
}

/// Create a connected dispatcher/queue pair
pub fn channel<T>() -> (Dispatcher<T>, TaskQueue<T>) {
    let (tx, rx) = mpsc::channel();
    (Dispatcher { tx, waker: None }, TaskQueue { rx })
}

impl<T> Dispatcher<T> {
    /// Wake this poller whenever a task is posted
    pub fn with_waker(mut self, waker: Arc<Waker>) -> Self {
        self.waker = Some(waker);
        self
    }

    /// Schedule `task` on the foreground thread
    ///
    /// Returns false if the foreground loop has already gone away.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            debug!("Foreground queue closed, dropping task");
            return false;
        }

        if let Some(waker) = &self.waker {
            if let Err(e) = waker.wake() {
                warn!("Failed to wake foreground loop: {}", e);
            }
        }
        true
    }
}

impl<T> TaskQueue<T> {
    /// Run every task that is already queued
    pub fn run_pending(&self, target: &mut T) -> usize {
        let mut count = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(target);
            count += 1;
        }
        count
    }

    /// Block up to `timeout` for one task and run it
    pub fn run_next(&self, target: &mut T, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task(target);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}
