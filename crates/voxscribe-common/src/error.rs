use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum VoxscribeError {
    IoError(std::io::Error),
    /// Rejected construction input: bad section size, wrong palette length,
    /// malformed section-key or palette text.
    InvalidConfiguration(String),
    /// A value escaped its documented range inside an internal computation.
    OutOfRangeValue(String),
    /// Iteration order or index bookkeeping diverged mid-encode.
    EncodingInvariant(String),
}

impl fmt::Display for VoxscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxscribeError::IoError(err) => write!(f, "IO error: {}", err),
            VoxscribeError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            VoxscribeError::OutOfRangeValue(msg) => write!(f, "Out-of-range value: {}", msg),
            VoxscribeError::EncodingInvariant(msg) => {
                write!(f, "Encoding invariant violated: {}", msg)
            }
        }
    }
}

impl Error for VoxscribeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VoxscribeError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VoxscribeError {
    fn from(err: std::io::Error) -> Self {
        VoxscribeError::IoError(err)
    }
}
