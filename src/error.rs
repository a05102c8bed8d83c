use std::path::PathBuf;

/// Everything that can go wrong while talking to the catalog, the webhook or
/// the last-seen store.
///
/// None of these are fatal for the process, a cycle that hits one of them
/// simply ends without changing the persisted state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected status {status}")]
    Protocol { status: u16 },
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("last-seen store {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Parse(_) => "parse",
            Self::Persistence { .. } => "persistence",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

// Status codes are checked and bodies decoded by the clients themselves, so
// whatever reqwest reports is a transport problem.
impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
