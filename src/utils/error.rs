use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("Unsupported OS: {os}, architecture: {arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Failed to load native binding from {path}: {source}")]
    ArtifactLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Native binding is missing symbol {symbol}: {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("Steam API initialization failed (code {code}): {message}")]
    InitFailed { code: i32, message: String },

    #[error("Steam API is not initialized")]
    NotInitialized,

    #[error("No tokio runtime available to schedule {task}")]
    NoRuntime { task: &'static str },

    #[error("Desktop shell not found")]
    ShellNotFound,

    #[error("Desktop shell application is not ready")]
    ShellNotReady,

    #[error("Failed to append command line switch {switch}: {message}")]
    Switch { switch: String, message: String },

    #[error("Failed to attach overlay invalidator: {message}")]
    Attach { message: String },

    #[error("Window {window_id} error: {message}")]
    Window { window_id: u64, message: String },

    #[error("Desktop shell error: {message}")]
    Shell { message: String },

    #[error("Screenshot error: {message}")]
    Screenshot { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Platform,
    Sdk,
    Host,
    Configuration,
    Io,
}

impl ShimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShimError::UnsupportedPlatform { .. }
            | ShimError::ArtifactLoad { .. }
            | ShimError::MissingSymbol { .. } => ErrorCategory::Platform,
            ShimError::InitFailed { .. }
            | ShimError::NotInitialized
            | ShimError::Screenshot { .. } => ErrorCategory::Sdk,
            ShimError::NoRuntime { .. }
            | ShimError::ShellNotFound
            | ShimError::ShellNotReady
            | ShimError::Switch { .. }
            | ShimError::Attach { .. }
            | ShimError::Window { .. }
            | ShimError::Shell { .. } => ErrorCategory::Host,
            ShimError::ConfigError { .. } | ShimError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            ShimError::IoError(_) | ShimError::SerializationError(_) => ErrorCategory::Io,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShimError::UnsupportedPlatform { .. } => {
                "Run on Windows (x86/x86_64), Linux (x86/x86_64) or macOS"
            }
            ShimError::ArtifactLoad { .. } | ShimError::MissingSymbol { .. } => {
                "Check that the dist directory holds the Steamworks redistributables for this platform"
            }
            ShimError::InitFailed { .. } => {
                "Make sure Steam is running and an app id or steam_appid.txt is provided"
            }
            ShimError::NotInitialized => "Call init before using the Steam API",
            ShimError::NoRuntime { .. } => "Call this from inside a tokio runtime",
            ShimError::ShellNotFound => "Register a desktop shell before enabling the overlay",
            ShimError::ShellNotReady => "Enable the overlay after the shell application is ready",
            ShimError::Switch { .. } | ShimError::Attach { .. } | ShimError::Shell { .. } => {
                "Check the desktop shell integration"
            }
            ShimError::Window { .. } => "The window may have been destroyed during setup",
            ShimError::Screenshot { .. } => "Check the screenshot path and dimensions",
            ShimError::ConfigError { .. } | ShimError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
            ShimError::IoError(_) | ShimError::SerializationError(_) => {
                "Check file permissions and paths"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ShimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_message() {
        let err = ShimError::UnsupportedPlatform {
            os: "freebsd".to_string(),
            arch: "x86_64".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported OS: freebsd, architecture: x86_64"
        );
        assert_eq!(err.category(), ErrorCategory::Platform);
    }

    #[test]
    fn test_host_errors_are_categorized() {
        assert_eq!(ShimError::ShellNotFound.category(), ErrorCategory::Host);
        assert_eq!(ShimError::ShellNotReady.category(), ErrorCategory::Host);
        assert_eq!(
            ShimError::InitFailed {
                code: 1,
                message: "no steam".to_string()
            }
            .category(),
            ErrorCategory::Sdk
        );
    }
}
