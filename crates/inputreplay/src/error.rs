//! Error types for script loading, configuration, and input queries.
//!
//! None of these are fatal to a replay: the engine degrades to doing less
//! (fewer steps, or no steps at all) and reports what happened through
//! [`crate::engine::ScriptStatus`].

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or parsing a replay script.
#[derive(Debug, Error, Diagnostic)]
pub enum ScriptError {
    /// The script file could not be opened.
    #[error("failed to open script {}", path.display())]
    #[diagnostic(
        code(inputreplay::script::io),
        help("check that the script path exists and is readable")
    )]
    Io {
        /// Script path as given.
        path: PathBuf,
        /// Underlying open failure.
        #[source]
        source: std::io::Error,
    },

    /// The token stream was malformed. Steps parsed before this point are kept.
    #[error("invalid script at line {line}, column {column}: {message}")]
    #[diagnostic(code(inputreplay::script::syntax))]
    Syntax {
        /// 1-based line of the error.
        line: usize,
        /// 1-based column of the error.
        column: usize,
        /// Parser message, without position.
        message: String,
        /// Source bytes consumed just before the error.
        snippet: String,
    },
}

impl ScriptError {
    pub(crate) fn syntax(err: &serde_json::Error, snippet: String) -> Self {
        let message = err.to_string();
        // serde_json appends its own position; we report it separately.
        let message = match message.rfind(" at line ") {
            Some(idx) => message.get(..idx).unwrap_or(&message).to_string(),
            None => message,
        };
        Self::Syntax {
            line: err.line(),
            column: err.column(),
            message,
            snippet,
        }
    }
}

/// Failure loading or validating an [`crate::EngineConfig`].
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}", path.display())]
    #[diagnostic(code(inputreplay::config::io))]
    Io {
        /// Config path as given.
        path: PathBuf,
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid JSON or YAML config.
    #[error("failed to parse config {}: {message}", path.display())]
    #[diagnostic(code(inputreplay::config::parse))]
    Parse {
        /// Config path as given.
        path: PathBuf,
        /// Deserializer message.
        message: String,
    },

    /// The config parsed but holds values the engine cannot use.
    #[error("invalid config: {0}")]
    #[diagnostic(code(inputreplay::config::invalid))]
    Invalid(String),
}

/// A query the synthetic input driver does not service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Only the primary port is backed by scripted input.
    #[error("port {0} is not served by the replay driver")]
    UnsupportedPort(u32),
    /// Only joypad and keyboard queries are answered.
    #[error("device {0} is not served by the replay driver")]
    UnsupportedDevice(u32),
}
