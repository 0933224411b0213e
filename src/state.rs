//! Server configuration and the state shared with handlers.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use crate::{
    cli::Cli,
    error::ServerError,
    resolve::{PathRejection, sanitize},
};

/// Immutable settings fixed at process start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub document_root: PathBuf,
    pub index_document: PathBuf,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            addr: SocketAddr::new(cli.host, cli.port),
            document_root: cli.document_root,
            index_document: cli.index_document,
        }
    }
}

/// Shared application state accessible to all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonical root directory for static file serving
    pub document_root: PathBuf,
    /// Relative path of the document served at `/` and for directories
    pub index_document: PathBuf,
}

impl AppState {
    /// Canonicalises the document root and validates the index document name.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let document_root =
            config
                .document_root
                .canonicalize()
                .map_err(|source| ServerError::DocumentRoot {
                    path: config.document_root.clone(),
                    source,
                })?;

        let index_document =
            index_relative(&config.index_document).map_err(|source| ServerError::IndexDocument {
                path: config.index_document.clone(),
                source,
            })?;

        Ok(Self {
            document_root,
            index_document,
        })
    }

    pub fn index_path(&self) -> PathBuf {
        self.document_root.join(&self.index_document)
    }

    pub fn root(&self) -> &Path {
        &self.document_root
    }
}

/// The index document must name a file below the root, never the root itself.
fn index_relative(index: &Path) -> Result<PathBuf, PathRejection> {
    let display = || index.display().to_string();
    if index.is_absolute() {
        return Err(PathRejection::BadSegment(display()));
    }

    let relative = sanitize(index.to_str().ok_or_else(|| PathRejection::BadSegment(display()))?)?;
    if relative.as_os_str().is_empty() {
        return Err(PathRejection::BadSegment(display()));
    }
    Ok(relative)
}
