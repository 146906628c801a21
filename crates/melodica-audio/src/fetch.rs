//! Buffering of whole tracks into memory.
//!
//! Playlist entries name either a remote file (`http://`, `https://`) fetched
//! with a blocking HTTP client, or a local file (plain path or `file://`
//! URL). Either way the complete body is read before decoding starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AudioError, Result};

/// Limits applied while buffering a track.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-request timeout for remote tracks.
    pub timeout: Duration,
    /// Largest body that will be buffered.
    pub max_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_bytes: 256 * 1024 * 1024,
        }
    }
}

/// Where a playlist entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLocation {
    /// An `http(s)://` URL.
    Remote(String),
    /// A file on the local filesystem.
    Local(PathBuf),
}

impl TrackLocation {
    /// Classify a playlist entry.
    pub fn parse(entry: &str) -> Self {
        let lower = entry.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            TrackLocation::Remote(entry.to_string())
        } else if let Some(path) = entry.strip_prefix("file://") {
            TrackLocation::Local(PathBuf::from(path))
        } else {
            TrackLocation::Local(PathBuf::from(entry))
        }
    }
}

/// Download or read a track fully into memory.
///
/// # Errors
///
/// Returns [`AudioError::Http`] for network failures and non-success status
/// codes, [`AudioError::Io`] for unreadable local files, and
/// [`AudioError::TooLarge`] when the body exceeds `options.max_bytes`.
pub fn buffer_audio_data(entry: &str, options: &FetchOptions) -> Result<Vec<u8>> {
    match TrackLocation::parse(entry) {
        TrackLocation::Remote(url) => fetch_remote(&url, options),
        TrackLocation::Local(path) => read_local(&path, options),
    }
}

fn fetch_remote(url: &str, options: &FetchOptions) -> Result<Vec<u8>> {
    let http_err = |source: ureq::Error| AudioError::Http {
        url: url.to_string(),
        source: Box::new(source),
    };

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(options.timeout))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    tracing::debug!(url, "fetching track");
    let mut response = agent.get(url).call().map_err(http_err)?;
    let data = response
        .body_mut()
        .with_config()
        .limit(options.max_bytes)
        .read_to_vec()
        .map_err(|e| match e {
            ureq::Error::BodyExceedsLimit(limit) => AudioError::TooLarge {
                location: url.to_string(),
                limit,
            },
            other => http_err(other),
        })?;
    tracing::debug!(url, bytes = data.len(), "track buffered");
    Ok(data)
}

fn read_local(path: &Path, options: &FetchOptions) -> Result<Vec<u8>> {
    let io_err = |source| AudioError::Io {
        path: path.display().to_string(),
        source,
    };

    let len = std::fs::metadata(path).map_err(io_err)?.len();
    if len > options.max_bytes {
        return Err(AudioError::TooLarge {
            location: path.display().to_string(),
            limit: options.max_bytes,
        });
    }
    std::fs::read(path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use pretty_assertions::assert_eq;

    const MOCK_AUDIO: &[u8] = b"This is mock audio data";

    /// Serve `router` on an ephemeral port from a background runtime.
    fn serve(router: Router) -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, router).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();
        format!("http://{addr}")
    }

    fn router() -> Router {
        Router::new()
            .route("/song.mp3", get(|| async { MOCK_AUDIO }))
            .route("/missing.mp3", get(|| async { StatusCode::NOT_FOUND }))
    }

    #[test]
    fn classifies_entries() {
        assert_eq!(
            TrackLocation::parse("HTTPS://host/a.mp3"),
            TrackLocation::Remote("HTTPS://host/a.mp3".into())
        );
        assert_eq!(
            TrackLocation::parse("file:///music/a.mp3"),
            TrackLocation::Local(PathBuf::from("/music/a.mp3"))
        );
        assert_eq!(
            TrackLocation::parse("a.mp3"),
            TrackLocation::Local(PathBuf::from("a.mp3"))
        );
    }

    #[test]
    fn buffers_remote_track() {
        let base = serve(router());
        let data = buffer_audio_data(&format!("{base}/song.mp3"), &FetchOptions::default()).unwrap();
        assert_eq!(data, MOCK_AUDIO);
    }

    #[test]
    fn remote_error_status_is_error() {
        let base = serve(router());
        let err = buffer_audio_data(&format!("{base}/missing.mp3"), &FetchOptions::default())
            .unwrap_err();
        assert!(matches!(err, AudioError::Http { .. }), "got: {err:?}");
    }

    #[test]
    fn remote_body_over_limit_is_rejected() {
        let base = serve(router());
        let options = FetchOptions {
            max_bytes: 4,
            ..FetchOptions::default()
        };
        let err = buffer_audio_data(&format!("{base}/song.mp3"), &options).unwrap_err();
        assert!(matches!(err, AudioError::TooLarge { .. }), "got: {err:?}");
    }

    #[test]
    fn reads_local_track() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.mp3");
        std::fs::write(&path, MOCK_AUDIO).unwrap();

        let plain = buffer_audio_data(path.to_str().unwrap(), &FetchOptions::default()).unwrap();
        assert_eq!(plain, MOCK_AUDIO);

        let url = format!("file://{}", path.display());
        let via_url = buffer_audio_data(&url, &FetchOptions::default()).unwrap();
        assert_eq!(via_url, MOCK_AUDIO);
    }

    #[test]
    fn local_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.mp3");
        std::fs::write(&path, MOCK_AUDIO).unwrap();
        let options = FetchOptions {
            max_bytes: 3,
            ..FetchOptions::default()
        };
        let err = buffer_audio_data(path.to_str().unwrap(), &options).unwrap_err();
        assert!(matches!(err, AudioError::TooLarge { limit: 3, .. }));
    }

    #[test]
    fn missing_local_track_is_io_error() {
        let err = buffer_audio_data("/nonexistent/track.mp3", &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, AudioError::Io { .. }));
    }
}
