//! Startup errors for the asset server.

use std::{io, net::SocketAddr, path::PathBuf};
use thiserror::Error;

use crate::resolve::PathRejection;

/// Fatal conditions that stop the server before or while serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("document root {path:?} is not usable: {source}")]
    DocumentRoot { path: PathBuf, source: io::Error },

    #[error("index document {path:?} is not a plain relative path: {source}")]
    IndexDocument {
        path: PathBuf,
        source: PathRejection,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("server stopped unexpectedly: {0}")]
    Serve(#[source] io::Error),
}
