pub mod config;
pub mod display;
pub mod errors;
pub mod export;
pub mod filters;
pub mod host;
pub mod results;
pub mod search;
pub mod settings;

pub use config::{CsvOptions, SearchRequest};
pub use errors::{SearchError, SearchResult};
pub use results::{MatchResult, SearchOutcome, SearchReport, SkippedFile};
pub use search::{
    CancelToken, SearchEvent, SearchSession, SearchWorker, SessionState, WorkerMessage,
};
pub use settings::{Settings, SettingsOverrides};
