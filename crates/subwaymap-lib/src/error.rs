use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the subwaymap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A graph query referenced a vertex that was never added.
    #[error("{vertex} is not a vertex in the graph")]
    InvalidVertex { vertex: String },

    /// Priority queue `insert` called twice for the same client index.
    #[error("index {index} is already present in the priority queue")]
    DuplicateIndex { index: usize },

    /// A priority queue operation referenced an index outside the fixed
    /// capacity chosen at construction.
    #[error("index {index} is outside the priority queue capacity {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },

    /// `del_min` called on an empty priority queue.
    #[error("priority queue underflow")]
    EmptyQueue,

    /// `decrease_key` or `delete` referenced an index that is not queued.
    #[error("index {index} is not present in the priority queue")]
    IndexNotFound { index: usize },

    /// The goal is unreachable from the start. A normal terminal outcome,
    /// not a programmer error; callers are expected to handle it.
    #[error("no path found between {start} and {goal}")]
    PathNotFound { start: String, goal: String },

    /// A shortest-path run observed its cancellation flag between
    /// relaxation iterations.
    #[error("shortest-path run was cancelled")]
    Cancelled,

    /// Raised when a stop name could not be matched in the network.
    #[error("unknown stop name: {name}{}", format_suggestions(.suggestions))]
    UnknownStop {
        name: String,
        suggestions: Vec<String>,
    },

    /// The transit API answered with a non-success status code.
    #[error("transit API request to {url} failed with status {status}")]
    ApiStatus { url: String, status: u16 },

    /// A local API fixture override pointed at a file that does not exist.
    #[error("transit API fixture not found at {path}")]
    FixtureNotFound { path: PathBuf },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(". Did you mean '{}'?", only),
        many => format!(
            ". Did you mean one of: {}?",
            many.iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stop_lists_suggestions() {
        let err = Error::UnknownStop {
            name: "Davvis".to_string(),
            suggestions: vec!["Davis".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown stop name: Davvis. Did you mean 'Davis'?"
        );
    }

    #[test]
    fn unknown_stop_without_suggestions_is_bare() {
        let err = Error::UnknownStop {
            name: "Xyzzy".to_string(),
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "unknown stop name: Xyzzy");
    }
}
