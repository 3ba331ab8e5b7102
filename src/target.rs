use std::fmt;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::error::{Result, SubhuntError};
use crate::guess::{self, Information};

/// A video file that can be subtitled.
///
/// Created once per discovered video and shared read-only for the rest of
/// the run.
#[derive(Debug)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name used when querying providers.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extracts release information from the file name.
    pub fn info(&self) -> Information {
        guess::parse(&self.name())
    }

    /// Saves subtitle bytes next to the video file, named
    /// `<basename>.<lang>.<ext>`.
    pub async fn save_subtitle(&self, content: &[u8], lang: &str, ext: &str) -> Result<PathBuf> {
        let stem = self
            .path
            .file_stem()
            .ok_or_else(|| SubhuntError::Config(format!("invalid video path: {}", self)))?
            .to_string_lossy();

        let subtitle_path = self.path.with_file_name(format!("{stem}.{lang}.{ext}"));
        fs::write(&subtitle_path, content).await?;

        info!("Saved subtitle: {}", subtitle_path.display());
        Ok(subtitle_path)
    }
}

impl fmt::Display for FileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_from_file_name() {
        let target = FileTarget::new("/videos/The Walking Dead S05E03 720p HDTV x264-ASAP.mkv");
        let info = target.info();
        assert_eq!(info.title, "The Walking Dead");
        assert_eq!(info.season, 5);
        assert_eq!(info.episode, 3);
    }

    #[tokio::test]
    async fn test_save_subtitle_naming() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("Alien.1979.1080p.BluRay.mkv");

        let target = FileTarget::new(&video);
        let saved = target.save_subtitle(b"1\n00:00:01,000 --> 00:00:02,000\nhi\n", "en", "srt")
            .await
            .unwrap();

        assert_eq!(
            saved,
            dir.path().join("Alien.1979.1080p.BluRay.en.srt")
        );
        assert!(saved.exists());
    }
}
