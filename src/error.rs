use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Malformed command-line targets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("no tasks specified")]
    NoTargets,

    #[error("expecting 'job:task' or 'task', got {0}")]
    TooManyColons(String),

    #[error("empty task name in {0:?}")]
    EmptyTask(String),
}

/// Terminal failure of a single allocation log stream.
///
/// Only [`StreamError::UnknownTask`] is treated as the expected teardown race;
/// every other variant is a real failure of that one stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("unknown task name: {0}")]
    UnknownTask(String),

    #[error("log stream request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("log stream transport error: {0}")]
    Transport(String),

    #[error("malformed log frame: {0}")]
    Decode(String),
}

impl StreamError {
    /// True when the allocation no longer knows the task, i.e. it already exited.
    #[must_use]
    pub const fn is_task_gone(&self) -> bool {
        matches!(self, Self::UnknownTask(_))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("Nomad API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

impl Error {
    /// Whether this error came from malformed user input rather than the runtime.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Target(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unknown_task_counts_as_gone() {
        assert!(StreamError::UnknownTask("web".into()).is_task_gone());
        assert!(!StreamError::Transport("reset".into()).is_task_gone());
        assert!(!StreamError::Status {
            status: 500,
            message: "boom".into()
        }
        .is_task_gone());
    }

    #[test]
    fn target_errors_are_input_errors() {
        let err: Error = TargetError::NoTargets.into();
        assert!(err.is_input());
        assert_eq!(err.to_string(), "no tasks specified");

        let err: Error = ConfigError::InvalidValue {
            field: "poll_interval_ms",
            reason: "must be greater than 0".into(),
        }
        .into();
        assert!(!err.is_input());
    }

    #[test]
    fn too_many_colons_message_names_the_target() {
        let err = TargetError::TooManyColons("a:b:c".into());
        assert_eq!(err.to_string(), "expecting 'job:task' or 'task', got a:b:c");
    }
}
