// Background search for interactive front ends.
//
// The worker thread owns the whole search; the UI keeps only the cancel
// token and the receiving end of the channel and drains it once per tick
// with `poll`. Nothing else is shared between the two threads.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{error, info};

use super::cancel::CancelToken;
use super::engine::{SearchEvent, SearchSession};
use crate::config::SearchRequest;
use crate::errors::{SearchError, SearchResult};
use crate::results::SearchReport;

const WORKER_THREAD_NAME: &str = "sheetscout-worker";

/// Message sent from the worker thread to the UI
#[derive(Debug)]
pub enum WorkerMessage {
    Event(SearchEvent),
    /// Last message of a search that ran to completion or was stopped
    Finished(SearchReport),
    /// Last message of a search that could not run
    Failed(String),
}

/// Runs at most one search on a background thread
#[derive(Debug, Default)]
pub struct SearchWorker {
    receiver: Option<Receiver<WorkerMessage>>,
    cancel: CancelToken,
    running: bool,
}

impl SearchWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `request` and starts searching in the background.
    ///
    /// Fails with [`SearchError::AlreadyRunning`] while a previous search has
    /// not delivered its final message yet.
    pub fn start(&mut self, request: SearchRequest) -> SearchResult<()> {
        if self.running {
            return Err(SearchError::AlreadyRunning);
        }
        request.validate()?;

        let (tx, rx) = mpsc::channel();
        let mut session = SearchSession::with_token(self.cancel.clone());
        session.begin()?;

        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let tx_guard = tx.clone();
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    session.run(&request, |event| {
                        let _ = tx.send(WorkerMessage::Event(event));
                    })
                }));
                let last = match outcome {
                    Ok(Ok(report)) => WorkerMessage::Finished(report),
                    Ok(Err(err)) => WorkerMessage::Failed(err.to_string()),
                    Err(_) => {
                        error!("Search thread panicked");
                        WorkerMessage::Failed(
                            "Internal error: search thread panicked unexpectedly".to_string(),
                        )
                    }
                };
                let _ = tx_guard.send(last);
            })?;

        self.receiver = Some(rx);
        self.running = true;
        info!("Search worker started");
        Ok(())
    }

    /// Asks the running search to stop. Its final message still arrives.
    pub fn stop(&self) {
        if self.running {
            self.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drains at most `max` messages without blocking.
    ///
    /// A `Finished` or `Failed` message marks the worker idle again. A worker
    /// thread that vanished without a final message is reported as `Failed`.
    pub fn poll(&mut self, max: usize) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        let Some(rx) = self.receiver.as_ref() else {
            return messages;
        };

        while messages.len() < max {
            match rx.try_recv() {
                Ok(message) => {
                    let last = matches!(
                        message,
                        WorkerMessage::Finished(_) | WorkerMessage::Failed(_)
                    );
                    messages.push(message);
                    if last {
                        self.running = false;
                        self.receiver = None;
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running = false;
                    self.receiver = None;
                    messages.push(WorkerMessage::Failed(
                        "Search thread exited unexpectedly".to_string(),
                    ));
                    break;
                }
            }
        }
        messages
    }

    /// Blocks until the running search delivers its final message
    pub fn wait(&mut self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while self.running {
            let batch = self.poll(usize::MAX);
            if batch.is_empty() {
                thread::sleep(std::time::Duration::from_millis(5));
            }
            messages.extend(batch);
        }
        messages
    }
}
