/// Render host: fetch and decode the active image source
///
/// Loads run as background tasks. The caller tags the result with the
/// slot generation it was started for; this module knows nothing about
/// generations or fallback policy.

use iced::widget::image::Handle;
use std::path::PathBuf;
use tokio::task;
use tracing::debug;

use super::resolver::{ResolvedSource, SourceOrigin};
use crate::error::LoadFailure;

/// Filesystem roots that resolved locations are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    /// Directory holding bundled assets
    pub assets_dir: PathBuf,
    /// Local mirror of backend storage, if any
    pub storage_root: Option<PathBuf>,
}

/// Where the bytes of a resolved source come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTarget {
    File(PathBuf),
    Http(String),
}

impl SourceRoots {
    /// Map a resolved source to a file path or URL
    pub fn locate(&self, source: &ResolvedSource) -> Result<SourceTarget, LoadFailure> {
        match source.origin {
            SourceOrigin::Remote => Ok(SourceTarget::Http(source.location.clone())),
            SourceOrigin::Bundled => Ok(SourceTarget::File(self.assets_dir.join(&source.location))),
            SourceOrigin::Storage => {
                let root = self
                    .storage_root
                    .as_ref()
                    .ok_or_else(|| LoadFailure::NoStorageRoot(source.location.clone()))?;
                // Keys are relative to the storage root even with a leading slash
                Ok(SourceTarget::File(
                    root.join(source.location.trim_start_matches('/')),
                ))
            }
        }
    }
}

/// Reads image sources from disk or over HTTP
#[derive(Debug, Clone)]
pub struct ImageLoader {
    roots: SourceRoots,
    client: reqwest::Client,
}

impl ImageLoader {
    pub fn new(roots: SourceRoots) -> Self {
        Self {
            roots,
            client: reqwest::Client::new(),
        }
    }

    /// Load an image into a renderable handle
    pub async fn load(self, source: ResolvedSource) -> Result<Handle, LoadFailure> {
        let bytes = self.read(&source).await?;
        Ok(Handle::from_bytes(bytes))
    }

    /// Read the source bytes and check that they decode as an image
    pub async fn read(&self, source: &ResolvedSource) -> Result<Vec<u8>, LoadFailure> {
        let bytes = match self.roots.locate(source)? {
            SourceTarget::File(path) => {
                tokio::fs::read(&path).await.map_err(|e| LoadFailure::Read {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                })?
            }
            SourceTarget::Http(url) => self.fetch(&url).await?,
        };

        // Decoding is CPU-bound
        let location = source.location.clone();
        task::spawn_blocking(move || verify_decodes(location, bytes))
            .await
            .map_err(|e| LoadFailure::Join {
                location: source.location.clone(),
                reason: e.to_string(),
            })?
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadFailure::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LoadFailure::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| LoadFailure::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(url, bytes = body.len(), "Fetched remote image");
        Ok(body.to_vec())
    }
}

fn verify_decodes(location: String, bytes: Vec<u8>) -> Result<Vec<u8>, LoadFailure> {
    image::load_from_memory(&bytes).map_err(|e| LoadFailure::Decode {
        location,
        reason: e.to_string(),
    })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn source(location: &str, origin: SourceOrigin) -> ResolvedSource {
        ResolvedSource {
            location: location.to_string(),
            origin,
            is_fallback: false,
        }
    }

    fn roots(assets_dir: &Path, storage_root: Option<&Path>) -> SourceRoots {
        SourceRoots {
            assets_dir: assets_dir.to_path_buf(),
            storage_root: storage_root.map(Path::to_path_buf),
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut png = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    /// Serve one HTTP response on a local port; returns the base URL
    async fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).await;

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(&body).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_locate() {
        let roots = roots(Path::new("/opt/assets"), Some(Path::new("/srv/storage")));

        assert_eq!(
            roots.locate(&source("properties/a.jpg", SourceOrigin::Bundled)).unwrap(),
            SourceTarget::File(PathBuf::from("/opt/assets/properties/a.jpg"))
        );
        assert_eq!(
            roots.locate(&source("/listings/1/a.png", SourceOrigin::Storage)).unwrap(),
            SourceTarget::File(PathBuf::from("/srv/storage/listings/1/a.png"))
        );
        assert_eq!(
            roots.locate(&source("https://x/a.jpg", SourceOrigin::Remote)).unwrap(),
            SourceTarget::Http("https://x/a.jpg".to_string())
        );
    }

    #[test]
    fn test_storage_without_root() {
        let roots = roots(Path::new("/opt/assets"), None);
        assert_eq!(
            roots.locate(&source("listings/1/a.png", SourceOrigin::Storage)),
            Err(LoadFailure::NoStorageRoot("listings/1/a.png".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reads_valid_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("properties")).unwrap();
        image::RgbImage::new(2, 2)
            .save(dir.path().join("properties/default.png"))
            .unwrap();

        let loader = ImageLoader::new(roots(dir.path(), None));
        let bytes = loader
            .read(&source("properties/default.png", SourceOrigin::Bundled))
            .await
            .unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(roots(dir.path(), Some(dir.path())));
        let result = loader
            .read(&source("listings/404.png", SourceOrigin::Storage))
            .await;
        assert!(matches!(result, Err(LoadFailure::Read { .. })));
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();

        let loader = ImageLoader::new(roots(dir.path(), None));
        let result = loader.read(&source("broken.jpg", SourceOrigin::Bundled)).await;
        match result {
            Err(LoadFailure::Decode { location, .. }) => assert_eq!(location, "broken.jpg"),
            other => panic!("expected a decode failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetches_remote_image() {
        let expected = png_bytes();
        let base = serve_once("200 OK", expected.clone()).await;
        let url = format!("{}/listings/204.jpg", base);

        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(roots(dir.path(), None));
        let bytes = loader.read(&source(&url, SourceOrigin::Remote)).await.unwrap();
        assert_eq!(bytes, expected);
    }

    #[tokio::test]
    async fn test_remote_error_status_fails() {
        let base = serve_once("404 Not Found", Vec::new()).await;
        let url = format!("{}/missing.jpg", base);

        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(roots(dir.path(), None));
        let result = loader.read(&source(&url, SourceOrigin::Remote)).await;
        assert_eq!(result, Err(LoadFailure::HttpStatus { url, status: 404 }));
    }

    #[tokio::test]
    async fn test_remote_garbage_fails_to_decode() {
        let base = serve_once("200 OK", b"<html>nope</html>".to_vec()).await;
        let url = format!("{}/page.jpg", base);

        let dir = tempfile::tempdir().unwrap();
        let loader = ImageLoader::new(roots(dir.path(), None));
        let result = loader.read(&source(&url, SourceOrigin::Remote)).await;
        assert!(matches!(result, Err(LoadFailure::Decode { .. })));
    }
}
