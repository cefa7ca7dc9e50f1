use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

use super::cancel::CancelToken;
use super::enumerator::{FileEnumerator, WalkItem};
use super::processor::FileProcessor;
use crate::config::SearchRequest;
use crate::errors::{SearchError, SearchResult};
use crate::results::{MatchResult, SearchOutcome, SearchReport, SkippedFile};

/// Lifecycle of a [`SearchSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Stopped,
    Failed,
}

/// Progress reported while a search runs, in the order it happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    EnteredDirectory(PathBuf),
    Scanning(PathBuf),
    Matched(MatchResult),
    Skipped(SkippedFile),
}

/// One search at a time, with a stop button.
///
/// The session runs on whichever thread calls [`run`](Self::run); the
/// [`CancelToken`] handed out by [`cancel_token`](Self::cancel_token) is the
/// only thing another thread needs to stop it.
#[derive(Debug)]
pub struct SearchSession {
    state: SessionState,
    cancel: CancelToken,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::with_token(CancelToken::new())
    }

    /// Creates a session that is stopped through an existing token
    pub fn with_token(cancel: CancelToken) -> Self {
        Self {
            state: SessionState::Idle,
            cancel,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Moves the session to Running and clears any earlier stop request
    pub fn begin(&mut self) -> SearchResult<()> {
        if self.state == SessionState::Running {
            return Err(SearchError::AlreadyRunning);
        }
        self.cancel.reset();
        self.state = SessionState::Running;
        Ok(())
    }

    /// Requests a stop; the running search notices at the next file or row
    pub fn stop(&self) {
        info!("Stop requested");
        self.cancel.cancel();
    }

    /// Begins a session and runs it to the end
    pub fn start<F>(&mut self, request: &SearchRequest, sink: F) -> SearchResult<SearchReport>
    where
        F: FnMut(SearchEvent),
    {
        self.begin()?;
        self.run(request, sink)
    }

    /// Runs a begun session. Events go to `sink` as they happen.
    pub fn run<F>(&mut self, request: &SearchRequest, sink: F) -> SearchResult<SearchReport>
    where
        F: FnMut(SearchEvent),
    {
        match execute(request, &self.cancel, sink) {
            Ok(report) => {
                self.state = match report.outcome {
                    SearchOutcome::Completed => SessionState::Completed,
                    SearchOutcome::Stopped => SessionState::Stopped,
                };
                Ok(report)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }
}

/// Runs a whole search on the current thread without a session
pub fn search<F>(request: &SearchRequest, cancel: &CancelToken, sink: F) -> SearchResult<SearchReport>
where
    F: FnMut(SearchEvent),
{
    execute(request, cancel, sink)
}

fn execute<F>(request: &SearchRequest, cancel: &CancelToken, mut sink: F) -> SearchResult<SearchReport>
where
    F: FnMut(SearchEvent),
{
    request.validate()?;
    info!(
        "Starting search in {} for files matching '{}' (recursive: {}, csv: {})",
        request.root_path.display(),
        request.filename_pattern,
        request.recursive,
        request.include_csv
    );

    let enumerator = FileEnumerator::from_request(request)?;
    let processor = FileProcessor::from_request(request)?;
    let mut report = SearchReport::new();

    for item in enumerator.walk(cancel) {
        let path = match item {
            WalkItem::Directory(dir) => {
                sink(SearchEvent::EnteredDirectory(dir));
                continue;
            }
            WalkItem::File(path) => path,
        };

        if cancel.is_cancelled() {
            break;
        }

        sink(SearchEvent::Scanning(path.clone()));
        report.files_scanned += 1;

        match processor.find_first_row(&path, cancel) {
            Ok(Some(row)) => {
                debug!("Match in {}", path.display());
                let result = MatchResult::new(path, row);
                report.add_match(result.clone());
                sink(SearchEvent::Matched(result));
            }
            Ok(None) => trace!("No match in {}", path.display()),
            Err(err) if err.is_per_file() => {
                warn!("Skipping {}: {}", path.display(), err);
                let skipped = SkippedFile {
                    path,
                    reason: err.to_string(),
                };
                report.add_skipped(skipped.clone());
                sink(SearchEvent::Skipped(skipped));
            }
            Err(err) => return Err(err),
        }
    }

    if cancel.is_cancelled() {
        report.outcome = SearchOutcome::Stopped;
    }

    info!(
        "Search {}. Found {} matches in {} files ({} skipped)",
        if report.was_stopped() { "stopped" } else { "complete" },
        report.files_with_matches(),
        report.files_scanned,
        report.skipped.len()
    );

    Ok(report)
}
