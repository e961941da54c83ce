//! Destination URI resolution
//!
//! Two URI forms are accepted: `file:///absolute/path` and
//! `app-data:///relative/path`, the latter rooted at the application data
//! directory.

use async_trait::async_trait;
use bgdl_errors::{Error, TransferError};
use std::path::PathBuf;
use tokio::fs::{self as tokio_fs, OpenOptions};
use url::Url;

pub const APP_DATA_SCHEME: &str = "app-data";

/// A destination that resolved to a writable local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationFile {
    /// The URI the caller supplied
    pub uri: String,
    pub path: PathBuf,
}

impl DestinationFile {
    #[must_use]
    pub fn new(uri: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            uri: uri.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
pub trait DestinationResolver: Send + Sync {
    /// Resolve `destination_uri` to a writable file
    async fn resolve(&self, destination_uri: &str) -> Result<DestinationFile, Error>;
}

/// Resolves destinations against the local filesystem
#[derive(Debug, Clone)]
pub struct AppStorageResolver {
    app_data_root: PathBuf,
}

impl AppStorageResolver {
    #[must_use]
    pub fn new(app_data_root: impl Into<PathBuf>) -> Self {
        Self {
            app_data_root: app_data_root.into(),
        }
    }

    /// Map a destination URI onto a path without touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns `DestinationResolution` for malformed URIs, unsupported
    /// schemes, and app-data paths that escape the root.
    pub fn to_path(&self, destination_uri: &str) -> Result<PathBuf, Error> {
        let fail = |reason: &str| -> Error {
            TransferError::DestinationResolution {
                uri: destination_uri.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        let url = Url::parse(destination_uri).map_err(|e| fail(&e.to_string()))?;

        match url.scheme() {
            "file" => url
                .to_file_path()
                .map_err(|()| fail("not a local file path")),
            APP_DATA_SCHEME => {
                if url.host_str().is_some_and(|host| !host.is_empty()) {
                    return Err(fail("app-data URIs must not name a host"));
                }
                let mut path = self.app_data_root.clone();
                let mut named = false;
                for raw in url.path_segments().into_iter().flatten() {
                    if raw.is_empty() {
                        continue;
                    }
                    let segment = urlencoding::decode(raw)
                        .map_err(|_| fail("app-data path is not valid UTF-8"))?;
                    if matches!(segment.as_ref(), "." | "..")
                        || segment.contains(['/', '\\', '\0'])
                    {
                        return Err(fail("app-data path segments must be plain file names"));
                    }
                    path.push(segment.as_ref());
                    named = true;
                }
                if !named {
                    return Err(fail("app-data URI has no file path"));
                }
                Ok(path)
            }
            scheme => Err(fail(&format!("unsupported scheme `{scheme}`"))),
        }
    }
}

#[async_trait]
impl DestinationResolver for AppStorageResolver {
    async fn resolve(&self, destination_uri: &str) -> Result<DestinationFile, Error> {
        let path = self.to_path(destination_uri)?;
        let fail = |e: &std::io::Error| -> Error {
            TransferError::DestinationResolution {
                uri: destination_uri.to_string(),
                reason: format!("{}: {e}", path.display()),
            }
            .into()
        };

        if let Some(parent) = path.parent() {
            tokio_fs::create_dir_all(parent).await.map_err(|e| fail(&e))?;
        }

        // Opening for write is the writability check; existing content is
        // left alone until the transfer replaces it.
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .map_err(|e| fail(&e))?;

        tracing::debug!(uri = destination_uri, path = %path.display(), "destination resolved");
        Ok(DestinationFile::new(destination_uri, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_data_paths_are_rooted() {
        let resolver = AppStorageResolver::new("/data/app");
        let path = resolver.to_path("app-data:///local/f.bin").unwrap();
        assert_eq!(path, PathBuf::from("/data/app/local/f.bin"));
    }

    #[test]
    fn test_app_data_segments_are_decoded() {
        let resolver = AppStorageResolver::new("/data/app");
        let path = resolver.to_path("app-data:///my%20files/f%C3%BC.bin").unwrap();
        assert_eq!(path, PathBuf::from("/data/app/my files/f\u{fc}.bin"));
    }

    #[test]
    fn test_rejects_encoded_separators() {
        let resolver = AppStorageResolver::new("/data/app");
        assert!(resolver.to_path("app-data:///a%2Fb.bin").is_err());
        assert!(resolver.to_path("app-data:///a%5Cb.bin").is_err());
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let resolver = AppStorageResolver::new("/data/app");
        let err = resolver.to_path("ftp://example.com/f.bin").unwrap_err();
        assert!(matches!(
            err,
            Error::Transfer(TransferError::DestinationResolution { .. })
        ));
    }

    #[test]
    fn test_rejects_bare_app_data_root() {
        let resolver = AppStorageResolver::new("/data/app");
        assert!(resolver.to_path("app-data:///").is_err());
        assert!(resolver.to_path("not a uri").is_err());
    }
}
