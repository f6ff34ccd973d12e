use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient memory: could not allocate {requested_bytes} bytes ({cause})")]
    Allocation { requested_bytes: u64, cause: String },

    #[error("Cannot read {}: {source}", display_path(.path))]
    ScanAccess {
        path: Option<PathBuf>,
        #[source]
        source: walkdir::Error,
    },

    #[error("Platform query failed: {0}")]
    PlatformQuery(String),

    #[error("CPU worker {worker} did not observe the stop signal")]
    StuckWorker { worker: usize },

    #[error("CPU worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Scan root not found: {}", .0.display())]
    ScanRootNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGUMENTS: i32 = 2;
    pub const SCAN_ROOT_NOT_FOUND: i32 = 3;
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ScanRootNotFound(_) => exit_code::SCAN_ROOT_NOT_FOUND,
            Error::InvalidArgument(_) => exit_code::INVALID_ARGUMENTS,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::ScanAccess {
            path: err.path().map(|p| p.to_path_buf()),
            source: err,
        }
    }
}
