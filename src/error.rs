//! Error handling for hubfetch.
//!
//! This module provides the crate-wide error type. Catalogue paging surfaces
//! these errors to the caller, while download tasks fold them into a
//! [`Summary`](crate::product::Summary) so a single product's failure never
//! takes down the pool.

use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can happen when using hubfetch.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A hub URL, or a URL derived from it, cannot be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O Error.
    ///
    /// Raised while listing the destination directory, creating files or
    /// removing a processed archive.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the middleware stack (retry, tracing) or the client it wraps.
    #[error("HTTP middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// A catalogue page could not be decoded.
    #[error("Malformed catalogue page")]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    /// The catalogue answered a search with a non-success status.
    #[error("Search failed with HTTP {status}: {body}")]
    Search { status: StatusCode, body: String },

    /// The download connection for a product could not be opened.
    #[error("Cannot connect to download {product}: {message}")]
    Connect { product: String, message: String },

    /// The transfer of a product broke off mid-stream.
    #[error("Transfer of {product} interrupted: {message}")]
    Stream { product: String, message: String },

    /// A downloaded archive is malformed or unreadable.
    #[error("Cannot extract archive {}", archive.display())]
    Archive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A product name does not leave a usable file name.
    #[error("Product name {name:?} is not a valid file name")]
    UnsafeName { name: String },

    /// No hub is registered under the requested identifier.
    #[error("DataHub with id {id} not found. Available hubs are {}", available.join(", "))]
    HubNotFound { id: String, available: Vec<String> },
}

/// Result type alias for operations that can fail with a hubfetch error.
pub type Result<T> = std::result::Result<T, Error>;
