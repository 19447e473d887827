//! Error types shared by the library

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, rendering or freezing the blog
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid front matter in {path:?}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("No blank line after the front matter in {0:?}")]
    MissingSeparator(PathBuf),

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Feed error: {0}")]
    Feed(#[from] atom_syndication::Error),

    #[error("Refusing to freeze into {0:?}: it contains the site sources")]
    UnsafeDestination(PathBuf),

    #[error("Invalid configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Whether the error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
