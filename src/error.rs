use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Browser;

/// Error type for all possible failures in the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("command `{command}` not found")]
    CommandNotFound { command: String },

    #[error("command `{command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    #[error("failed to execute command `{command}`: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command `{command}` produced output that is not valid UTF-8: {source}")]
    CommandOutput {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("unable to retrieve {browser} version from system")]
    Detection {
        browser: Browser,
        #[source]
        source: Box<Error>,
    },

    #[error("browser not supported: {detail}")]
    BrowserNotSupported { detail: String },

    #[error("{browser} is not available on {os}")]
    UnsupportedPlatform { browser: Browser, os: &'static str },

    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("no version matching `{pattern}` in `{output}`")]
    VersionParse {
        pattern: &'static str,
        output: String,
    },

    #[error("could not resolve a {browser} driver version: {detail}")]
    DriverVersionNotFound { browser: Browser, detail: String },

    #[error("I/O error accessing path `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract zip archive `{path}`: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read or write version cache `{path}`: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported archive format: `{path}`")]
    UnsupportedArchive { path: PathBuf },

    #[error("driver executable `{name}` not found under `{path}`")]
    BinaryNotFound { name: String, path: PathBuf },

    #[error("could not determine the user home directory")]
    HomeDirNotFound,
}

impl Error {
    /// Wraps a lower-level failure as a detection error for `browser`.
    pub(crate) fn detection(browser: Browser, source: Error) -> Self {
        Error::Detection {
            browser,
            source: Box::new(source),
        }
    }
}
