//! Error types shared across the table.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TarotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("deck at {0} contains no cards")]
    EmptyDeck(PathBuf),

    #[error("cannot draw {requested} cards from a deck of {available}")]
    DeckTooSmall { requested: usize, available: usize },

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle response had no content")]
    EmptyReading,
}

pub type Result<T> = std::result::Result<T, TarotError>;
