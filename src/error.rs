//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `image-mirror` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! ## Failure Classes
//!
//! - Configuration parsing errors (registry or autoupdate file).
//! - Autoupdate entry validation errors.
//! - Missing or malformed runtime environment (token, owner/repo).
//! - Update strategy resolution failures, scoped to a single entry.
//! - Git command execution failures.
//! - GitHub API failures (listing or creating pull requests).
//! - Malformed image references in the registry.
//! - I/O and YAML errors, wrapped from their source types.
//!
//! Errors that abort a single autoupdate entry (`Strategy`, `GitCommand`,
//! `RemoteApi`) carry enough context to identify the entry or operation;
//! whether processing continues with the remaining entries is decided by the
//! caller, not here.

use thiserror::Error;

/// Main error type for image-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the registry or autoupdate
    /// configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An autoupdate entry failed validation at load time.
    #[error("entry {entry:?} failed validation: {message}")]
    EntryValidation { entry: String, message: String },

    /// The runtime environment is missing or malformed (token, owner/repo).
    #[error("environment error: {message}")]
    Environment { message: String },

    /// An entry's update strategy failed to resolve the latest images.
    #[error("failed to get latest images for {entry}: {message}")]
    Strategy { entry: String, message: String },

    /// An error occurred while executing a git command.
    #[error("git {command} failed: {stderr}")]
    GitCommand { command: String, stderr: String },

    /// A GitHub API request failed.
    #[error("GitHub API error for {url}: {message}")]
    RemoteApi { url: String, message: String },

    /// An image reference in the registry is malformed.
    #[error("image {image:?}: {message}")]
    InvalidImage { image: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("configuration parsing error"));
        assert!(display.contains("Invalid YAML"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown field `Strategy`".to_string(),
            hint: Some("autoupdate entries reject unknown fields".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("unknown field"));
        assert!(display.contains("hint:"));
        assert!(display.contains("reject unknown fields"));
    }

    #[test]
    fn test_error_display_entry_validation() {
        let error = Error::EntryValidation {
            entry: "flannel".to_string(),
            message: "must specify an update strategy".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("\"flannel\""));
        assert!(display.contains("must specify an update strategy"));
    }

    #[test]
    fn test_error_display_strategy() {
        let error = Error::Strategy {
            entry: "coredns".to_string(),
            message: "no releases found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("failed to get latest images for coredns"));
        assert!(display.contains("no releases found"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "push".to_string(),
            stderr: "remote rejected".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("git push failed"));
        assert!(display.contains("remote rejected"));
    }

    #[test]
    fn test_error_display_remote_api() {
        let error = Error::RemoteApi {
            url: "https://api.github.com/repos/o/r/pulls".to_string(),
            message: "403 rate limit exceeded".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("GitHub API error"));
        assert!(display.contains("rate limit"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }
}
