use std::path::PathBuf;

use crate::parser::Rule;

/// Errors raised while loading translation tables.
///
/// Translation itself never fails, malformed LaTeX degrades to imperfect output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read table file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed translation table: {0}")]
    Parse(Box<pest::error::Error<Rule>>),
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(err: pest::error::Error<Rule>) -> Self {
        Error::Parse(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
