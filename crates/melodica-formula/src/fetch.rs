//! Downloading and verifying source archives.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::checksum::{HashingWriter, verify_checksum};
use crate::types::{FormulaError, Result};

/// Limits applied while downloading.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Largest archive accepted.
    pub max_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            max_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Result of a completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Download `url` to `dest`, hashing while streaming.
///
/// `http(s)://` URLs are fetched over the network; `file://` URLs are
/// copied. The body is staged in a temporary file next to `dest` and only
/// moved into place once it is complete and, when `expected_sha256` is
/// given, verified. On any failure an existing `dest` is left untouched.
///
/// # Errors
///
/// [`FormulaError::ChecksumMismatch`] for a wrong digest,
/// [`FormulaError::InvalidField`] when a `file://` URL names `dest` itself,
/// plus download, size and I/O errors.
pub fn fetch_archive(
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    options: &FetchOptions,
) -> Result<FetchReport> {
    if let Some(source) = url.strip_prefix("file://") {
        if same_file(Path::new(source), dest) {
            return Err(FormulaError::InvalidField {
                field: "output".to_string(),
                reason: format!("{} is the archive being fetched", dest.display()),
            });
        }
    }

    let dir = match dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent.to_path_buf()
        }
        None => PathBuf::from("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".melodica-fetch-")
        .tempfile_in(&dir)?;

    let (bytes, sha256) = download(url, staging.as_file(), options)?;
    if let Some(expected) = expected_sha256 {
        verify_checksum(&sha256, expected)?;
    }
    staging
        .persist(dest)
        .map_err(|e| FormulaError::Io(e.error))?;

    tracing::info!(url, path = %dest.display(), bytes, "archive fetched");
    Ok(FetchReport {
        path: dest.to_path_buf(),
        bytes,
        sha256,
    })
}

/// Whether `a` and `b` name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Stream `url` into `out`, returning the byte count and hex digest.
fn download(url: &str, out: &File, options: &FetchOptions) -> Result<(u64, String)> {
    let mut writer = HashingWriter::new(BufWriter::new(out));

    if let Some(path) = url.strip_prefix("file://") {
        tracing::debug!(path, "copying local archive");
        copy_limited(File::open(path)?, &mut writer, url, options.max_bytes)?;
    } else {
        let download_err = |source: ureq::Error| FormulaError::Download {
            url: url.to_string(),
            source: Box::new(source),
        };
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(options.timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);

        tracing::debug!(url, "downloading archive");
        let mut response = agent.get(url).call().map_err(download_err)?;
        let reader = response.body_mut().as_reader();
        copy_limited(reader, &mut writer, url, options.max_bytes)?;
    }

    let bytes = writer.written();
    let (_, sha256) = writer.finish()?;
    Ok((bytes, sha256))
}

fn copy_limited<R: Read, W: Write>(reader: R, writer: &mut W, url: &str, limit: u64) -> Result<()> {
    let copied = io::copy(&mut reader.take(limit.saturating_add(1)), writer)?;
    if copied > limit {
        return Err(FormulaError::TooLarge {
            url: url.to_string(),
            limit,
        });
    }
    Ok(())
}
