use core::fmt;
use std::io;
use std::path::PathBuf;

/// Problems found while reading test cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Input ended while a value was still expected
    UnexpectedEnd { expected: &'static str },
    /// Token is not a non-negative integer
    InvalidNumber { token: String },
    /// Case declares zero nodes
    EmptyGraph { case: usize },
    /// Edge endpoint outside `1..=node_count`
    NodeOutOfRange {
        case: usize,
        node: usize,
        node_count: usize,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnexpectedEnd { expected } => {
                write!(f, "Input ended, expected {expected}")
            }
            InputError::InvalidNumber { token } => write!(f, "Invalid number {token:?}"),
            InputError::EmptyGraph { case } => write!(f, "Case {case} has no nodes"),
            InputError::NodeOutOfRange {
                case,
                node,
                node_count,
            } => write!(
                f,
                "Case {case}: node {node} is outside 1..={node_count}"
            ),
        }
    }
}

impl std::error::Error for InputError {}

/// Result type for reading input
pub type Result<T> = core::result::Result<T, InputError>;

/// Per-file failures of the batch checker
#[derive(Debug)]
pub enum CheckError {
    Io { path: PathBuf, source: io::Error },
    Input { path: PathBuf, source: InputError },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Io { path, source } => {
                write!(f, "Cannot read {}: {source}", path.display())
            }
            CheckError::Input { path, source } => {
                write!(f, "Cannot parse {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Io { source, .. } => Some(source),
            CheckError::Input { source, .. } => Some(source),
        }
    }
}
