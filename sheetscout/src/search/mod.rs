/// Finding the first matching row in every candidate spreadsheet.
///
/// A search is a single pass over the tree, one file at a time:
///
/// 1. **Enumeration** ([`enumerator`]): walks the base directory in file-name
///    order and yields candidates that pass the [`FileFilter`](crate::filters::FileFilter),
///    announcing each directory before its files.
/// 2. **Matching** ([`processor`], [`matcher`], [`encoding`]): opens the file
///    with the reader for its format and returns the first row with a cell
///    that contains the search text, ignoring case. Workbooks are read through
///    `calamine`; CSV files are decoded first and tokenised with `csv`.
/// 3. **Session** ([`engine`]): ties both together, emits [`SearchEvent`]s and
///    collects a [`SearchReport`](crate::results::SearchReport). A file that
///    cannot be read is logged and skipped; the search goes on.
///
/// Interactive callers run the session through a [`SearchWorker`], which owns
/// one background thread and hands events back over a channel:
///
/// ```rust,ignore
/// let mut worker = SearchWorker::new();
/// worker.start(request)?;
/// loop {
///     for message in worker.poll(256) {
///         match message {
///             WorkerMessage::Event(SearchEvent::Matched(m)) => show(m),
///             WorkerMessage::Finished(report) => return Ok(report),
///             WorkerMessage::Failed(reason) => bail!(reason),
///             _ => {}
///         }
///     }
///     redraw();
/// }
/// ```
///
/// # Cancellation
///
/// Stopping is cooperative. The [`CancelToken`] is checked before every
/// directory entry, before every file and before every row, so a stop takes
/// effect within one row of the current file. A stopped search still returns
/// its report, marked as stopped, with every match found so far.
pub mod cancel;
pub mod encoding;
pub mod engine;
pub mod enumerator;
pub mod matcher;
pub mod processor;
pub mod worker;

pub use cancel::CancelToken;
pub use engine::{search, SearchEvent, SearchSession, SessionState};
pub use enumerator::{FileEnumerator, WalkItem};
pub use matcher::TextMatcher;
pub use processor::FileProcessor;
pub use worker::{SearchWorker, WorkerMessage};
