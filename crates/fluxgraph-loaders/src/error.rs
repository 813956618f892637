//! Loader error type.

use std::error::Error;
use std::fmt;

/// A configuration document failed to parse or validate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The document is not syntactically valid for its format.
    ///
    /// The message is the underlying parser's, which includes the
    /// source location (line/column).
    Syntax {
        /// `"yaml"` or `"json"`.
        format: &'static str,
        /// Underlying parser message with location.
        message: String,
    },
    /// The document parsed but a node has the wrong shape.
    Structure {
        /// JSON-pointer-style path of the offending node.
        path: String,
        /// What the loader required.
        message: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { format, message } => {
                write!(f, "{format} parse error: {message}")
            }
            Self::Structure { path, message } => {
                write!(f, "parse error at {path}: {message}")
            }
        }
    }
}

impl Error for LoadError {}
