use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NestError {
    /// No donor taxa were given; nothing could ever be monophyletic with the query
    #[error("no donor taxa specified")]
    EmptyDonor,

    /// The input directory does not exist or is not a directory
    #[error("input directory not found: {}", .0.display())]
    MissingInputDir(PathBuf),

    /// The tree file has no Newick string on its first line
    #[error("no tree found in {}", .0.display())]
    EmptyTree(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NestError::Io {
            path: path.into(),
            source,
        }
    }
}
