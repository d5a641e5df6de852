use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    NotFound,
    Corruption,
    InvalidArgument,
    IOError,
    LoadError,
}

/// Outcome of a failed binding or engine call.
///
/// Every failure in this crate is fatal for the operation that produced it:
/// nothing retries, nothing degrades. The status only carries enough detail
/// for the caller to decide whether to abort startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    fn new(code: Code, msg: impl Into<String>) -> Self {
        Status {
            code,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Status::new(Code::NotFound, msg)
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Status::new(Code::Corruption, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status::new(Code::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Status::new(Code::IOError, msg)
    }

    /// I/O failure tied to a concrete file
    pub fn io_error_at(path: &Path, err: impl fmt::Display) -> Self {
        Status::new(Code::IOError, format!("{}: {err}", path.display()))
    }

    pub fn load_error(msg: impl Into<String>) -> Self {
        Status::new(Code::LoadError, msg)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }

    pub fn is_load_error(&self) -> bool {
        self.code == Code::LoadError
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Status::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

impl From<libloading::Error> for Status {
    fn from(err: libloading::Error) -> Self {
        Status::load_error(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Status>;
