//! Command-line interface configuration.

use argh::FromArgs;
use std::{net::IpAddr, path::PathBuf};

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 3260;

/// Serves a pre-built meshwave bundle over HTTP
#[derive(Debug, FromArgs)]
pub struct Cli {
    /// listening port (default: $PORT, else 3260)
    #[argh(option, default = "default_port()")]
    pub port: u16,

    /// interface to bind (default: '0.0.0.0', all interfaces)
    #[argh(option, default = "IpAddr::from([0, 0, 0, 0])")]
    pub host: IpAddr,

    /// directory the bundle is served from (default: 'dist')
    #[argh(option, long = "document-root", default = "PathBuf::from(\"dist\")")]
    pub document_root: PathBuf,

    /// file served at '/' relative to the document root (default: 'index.html')
    #[argh(
        option,
        long = "index-document",
        default = "PathBuf::from(\"index.html\")"
    )]
    pub index_document: PathBuf,
}

fn default_port() -> u16 {
    port_from(std::env::var("PORT").ok().as_deref())
}

/// Port from a `PORT` value; unset or unparsable falls back to [`DEFAULT_PORT`].
pub fn port_from(env: Option<&str>) -> u16 {
    env.and_then(|port| port.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_required() {
        let cli = Cli::from_args(&["meshwave-server"], &[]).unwrap();
        assert_eq!(cli.host, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(cli.document_root, PathBuf::from("dist"));
        assert_eq!(cli.index_document, PathBuf::from("index.html"));
    }

    #[test]
    fn test_port_from_env_value() {
        assert_eq!(port_from(Some("39517")), 39517);
        assert_eq!(port_from(Some(" 8080 ")), 8080);
    }

    #[test]
    fn test_port_falls_back_to_default() {
        assert_eq!(port_from(None), DEFAULT_PORT);
        assert_eq!(port_from(Some("")), DEFAULT_PORT);
        assert_eq!(port_from(Some("http")), DEFAULT_PORT);
        assert_eq!(port_from(Some("70000")), DEFAULT_PORT);
        assert_eq!(port_from(Some("-1")), DEFAULT_PORT);
    }

    #[test]
    fn test_explicit_options() {
        let cli = Cli::from_args(
            &["meshwave-server"],
            &[
                "--port",
                "8080",
                "--document-root",
                "public",
                "--index-document",
                "home.html",
            ],
        )
        .unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.document_root, PathBuf::from("public"));
        assert_eq!(cli.index_document, PathBuf::from("home.html"));
    }
}
