//! Playlist loading.
//!
//! A playlist is a plain text file with one track per line. Each entry is a
//! local path, a `file://` URL or an `http(s)://` URL. Surrounding whitespace
//! is trimmed and blank lines are skipped; order is preserved.

use std::path::Path;

use crate::error::{CoreError, Result};

/// Parse playlist text into its entries.
pub fn parse_playlist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load playlist entries from a file.
///
/// # Errors
///
/// Returns [`CoreError::Read`] if the file cannot be read.
pub fn load_playlist(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let entries = parse_playlist(&text);
    tracing::debug!(path = %path.display(), tracks = entries.len(), "loaded playlist");
    Ok(entries)
}

/// Display name of a playlist entry: its final path segment.
///
/// Trailing slashes are ignored; an entry made only of slashes yields `/`.
pub fn track_name(entry: &str) -> &str {
    let trimmed = entry.trim_end_matches('/');
    if trimmed.is_empty() {
        return if entry.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// A non-empty, ordered list of tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<String>,
}

impl Playlist {
    /// Build a playlist from entries.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyPlaylist`] when `entries` is empty.
    pub fn new(entries: Vec<String>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CoreError::EmptyPlaylist);
        }
        Ok(Self { entries })
    }

    /// Load and validate a playlist file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::new(load_playlist(path)?)
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Location of the track at `index`.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.entries
            .get(index)
            .map(String::as_str)
            .ok_or(CoreError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Display name of the track at `index`, or `""` when out of range.
    pub fn track_name(&self, index: usize) -> &str {
        self.entries.get(index).map(|e| track_name(e)).unwrap_or("")
    }

    /// All entries in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Playlist rows as shown in the UI: `[<n>] <name>`, numbered from 1.
    pub fn display_rows(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("[{}] {}", i + 1, track_name(entry)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn load_trims_and_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"song1.mp3\nsong2.mp3\n  song3.mp3  \n\nsong4.mp3\n")
            .unwrap();

        let entries = load_playlist(file.path()).unwrap();
        assert_eq!(
            entries,
            vec!["song1.mp3", "song2.mp3", "song3.mp3", "song4.mp3"]
        );
    }

    #[test]
    fn load_missing_file_is_error() {
        let err = load_playlist(Path::new("/nonexistent/playlist.txt")).unwrap_err();
        assert!(matches!(err, CoreError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/playlist.txt"));
    }

    #[test]
    fn parse_handles_crlf_and_tabs() {
        let entries = parse_playlist("\ta.mp3\r\n\r\n b.mp3 \r\n");
        assert_eq!(entries, vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn track_name_is_last_segment() {
        assert_eq!(track_name("https://example.com/music/song.mp3"), "song.mp3");
        assert_eq!(track_name("/home/me/a b.mp3"), "a b.mp3");
        assert_eq!(track_name("plain.mp3"), "plain.mp3");
        assert_eq!(track_name("dir/sub/"), "sub");
        assert_eq!(track_name("///"), "/");
        assert_eq!(track_name(""), ".");
    }

    #[test]
    fn empty_playlist_rejected() {
        assert!(matches!(
            Playlist::new(Vec::new()),
            Err(CoreError::EmptyPlaylist)
        ));
    }

    #[test]
    fn display_rows_are_numbered_from_one() {
        let playlist = Playlist::new(vec![
            "http://host/a.mp3".to_string(),
            "b.mp3".to_string(),
        ])
        .unwrap();
        assert_eq!(playlist.display_rows(), vec!["[1] a.mp3", "[2] b.mp3"]);
        assert_eq!(playlist.track_name(1), "b.mp3");
        assert_eq!(playlist.track_name(7), "");
        assert!(playlist.get(2).is_err());
    }
}
