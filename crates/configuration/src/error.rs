//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use crate::environment;

#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {}:{line}:{column}: {message}", .file_path.display())]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version {version}, expected {expected}")]
    UnsupportedVersion { version: u32, expected: u32 },
    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("invalid connection URI: {0}")]
    MissingEnvironmentVariable(#[from] environment::Error),
    #[error("invalid {template}: {message}")]
    InvalidTemplate {
        template: &'static str,
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("cannot write {} outside of {}", .file.display(), .dir.display())]
    WritingOutsideDestinationDir { dir: PathBuf, file: PathBuf },
}
