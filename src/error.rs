//! Error types for recsel
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in recsel
#[derive(Debug, Error)]
pub enum RecselError {
    /// Recommender configuration not found
    #[error("Recommender not found: {0}")]
    RecommenderNotFound(i64),

    /// Caller passed an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A recommender plugin failed while building or evaluating
    #[error("Recommender [{recommender}] failed: {message}")]
    Plugin { recommender: String, message: String },

    /// A recommender plugin panicked
    #[error("Recommender [{recommender}] panicked: {message}")]
    PluginPanic { recommender: String, message: String },

    /// A recommender evaluation ran past its deadline
    #[error("Evaluation of recommender [{recommender}] timed out after {timeout_ms}ms")]
    EvaluationTimeout { recommender: String, timeout_ms: u64 },

    /// Suggestion ids ran out within a single session
    #[error("Annotation suggestion ID overflow. Restart session.")]
    IdSpaceExhausted,

    /// Task scheduling error
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RecselError {
    /// Create a plugin error attributed to a recommender
    pub fn plugin(recommender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            recommender: recommender.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised by recommender plugin code
    pub fn is_plugin_fault(&self) -> bool {
        matches!(
            self,
            Self::Plugin { .. } | Self::PluginPanic { .. } | Self::EvaluationTimeout { .. }
        )
    }
}

/// Result type alias for recsel operations
pub type Result<T> = std::result::Result<T, RecselError>;
