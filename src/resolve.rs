//! Mapping request paths onto files under the document root.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Why a request path was refused before touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("path escapes the document root")]
    Traversal,
    #[error("segment `{0}` is not valid percent-encoded UTF-8")]
    BadEncoding(String),
    #[error("segment `{0}` contains a separator or reserved character")]
    BadSegment(String),
}

/// Turns a URI path into a relative filesystem path.
///
/// Empty and `.` segments are dropped; `..` anywhere is rejected rather than
/// normalised, as are segments that decode to separators, NUL or a drive
/// prefix.
pub fn sanitize(uri_path: &str) -> Result<PathBuf, PathRejection> {
    let mut relative = PathBuf::new();

    for raw in uri_path.split('/') {
        let segment = urlencoding::decode(raw)
            .map_err(|_| PathRejection::BadEncoding(raw.to_owned()))?;

        match &*segment {
            "" | "." => continue,
            ".." => return Err(PathRejection::Traversal),
            s if s.contains(['/', '\\', '\0']) => {
                return Err(PathRejection::BadSegment(raw.to_owned()));
            }
            _ => {}
        }

        let mut components = Path::new(&*segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => relative.push(part),
            _ => return Err(PathRejection::BadSegment(raw.to_owned())),
        }
    }

    Ok(relative)
}

/// Finds the file to serve for `relative` under `root`.
///
/// `root` must already be canonical. Directories resolve to their `index`
/// document. The final path is canonicalised so symlinks pointing outside the
/// root are refused.
pub async fn locate(root: &Path, relative: &Path, index: &Path) -> Option<PathBuf> {
    let mut candidate = root.join(relative);
    if fs::metadata(&candidate).await.ok()?.is_dir() {
        candidate.push(index);
    }

    let resolved = fs::canonicalize(&candidate).await.ok()?;
    if !resolved.starts_with(root) {
        return None;
    }

    fs::metadata(&resolved)
        .await
        .ok()
        .filter(|meta| meta.is_file())
        .map(|_| resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_paths() {
        assert_eq!(sanitize("/app.js").unwrap(), PathBuf::from("app.js"));
        assert_eq!(
            sanitize("/assets/./img//logo.png").unwrap(),
            PathBuf::from("assets/img/logo.png")
        );
        assert_eq!(sanitize("/").unwrap(), PathBuf::new());
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            sanitize("/my%20file.txt").unwrap(),
            PathBuf::from("my file.txt")
        );
    }

    #[test]
    fn test_rejects_traversal() {
        assert_eq!(sanitize("/../../etc/passwd"), Err(PathRejection::Traversal));
        assert_eq!(sanitize("/assets/../app.js"), Err(PathRejection::Traversal));
        assert_eq!(sanitize("/%2e%2e/etc/passwd"), Err(PathRejection::Traversal));
    }

    #[test]
    fn test_rejects_hidden_separators() {
        assert!(matches!(
            sanitize("/..%2fetc%2fpasswd"),
            Err(PathRejection::BadSegment(_))
        ));
        assert!(matches!(
            sanitize("/..%5c..%5cwindows"),
            Err(PathRejection::BadSegment(_))
        ));
        assert!(matches!(
            sanitize("/app.js%00.png"),
            Err(PathRejection::BadSegment(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        assert!(matches!(
            sanitize("/%ff%fe.js"),
            Err(PathRejection::BadEncoding(_))
        ));
    }

    #[tokio::test]
    async fn test_locate_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("docs")).unwrap();
        std::fs::write(root.join("docs/index.html"), "docs").unwrap();

        let found = locate(&root, Path::new("docs"), Path::new("index.html")).await;
        assert_eq!(found, Some(root.join("docs/index.html")));
        assert_eq!(
            locate(&root, Path::new("missing.png"), Path::new("index.html")).await,
            None
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_locate_refuses_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.join("leak.txt"))
            .unwrap();

        assert_eq!(
            locate(&root, Path::new("leak.txt"), Path::new("index.html")).await,
            None
        );
    }
}
