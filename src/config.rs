// Run configuration. Everything the upload loop needs is collected into
// an explicit `Config` struct so tests can build one directly instead of
// going through the environment.

use crate::caption::CaptionTemplate;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Hard limit the feed endpoint puts on photos per post.
pub const MAX_PHOTOS_PER_POST: u32 = 4;

const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com/v22.0";
const DEFAULT_CAPTION: &str = "Frame {num}";
const TOKEN_FILE: &str = ".framepost_token";

/// Where uploaded photos land: the caller's own photo stream or a
/// specific album. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    OwnStream,
    Album(String),
}

impl UploadTarget {
    pub fn from_album(album: Option<String>) -> Self {
        match album {
            Some(id) => UploadTarget::Album(id),
            None => UploadTarget::OwnStream,
        }
    }

    /// Path of the photo endpoint under the graph root.
    pub fn photos_path(&self) -> String {
        match self {
            UploadTarget::OwnStream => "me/photos".to_string(),
            UploadTarget::Album(id) => format!("{id}/photos"),
        }
    }
}

/// Whether a `--multi-photo` value is an acceptable post size.
pub fn multi_photo_in_range(n: u32) -> bool {
    (1..=MAX_PHOTOS_PER_POST).contains(&n)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: String,
    pub graph_url: String,
    pub frames_dir: PathBuf,
    pub frame_ext: String,
    pub caption: CaptionTemplate,
    /// Wait applied before every frame, uploaded or skipped.
    pub pacing: Duration,
    /// Total attempts per photo upload, including the first.
    pub retries: u32,
    /// Fixed wait between attempts of the same upload.
    pub backoff: Duration,
    pub timeout: Duration,
}

impl Config {
    /// Build a config from `FRAMEPOST_*` environment variables, falling
    /// back to defaults. The access token may instead live in
    /// `~/.framepost_token` so it stays out of shell history.
    pub fn from_env() -> Result<Self> {
        let caption_raw =
            env::var("FRAMEPOST_CAPTION").unwrap_or_else(|_| DEFAULT_CAPTION.to_string());
        let caption = CaptionTemplate::parse(&caption_raw)
            .context("FRAMEPOST_CAPTION is not a usable caption template")?;

        Ok(Config {
            access_token: env::var("FRAMEPOST_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .or_else(token_from_home)
                .unwrap_or_default(),
            graph_url: env::var("FRAMEPOST_GRAPH_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPH_URL.to_string()),
            frames_dir: env::var("FRAMEPOST_FRAMES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./frames")),
            frame_ext: env::var("FRAMEPOST_FRAME_EXT").unwrap_or_else(|_| "jpg".to_string()),
            caption,
            pacing: Duration::from_secs(env_u64("FRAMEPOST_PACING_SECS", 2)),
            retries: env_u64("FRAMEPOST_RETRIES", 3).max(1) as u32,
            backoff: Duration::from_secs(env_u64("FRAMEPOST_BACKOFF_SECS", 2)),
            timeout: Duration::from_secs(10),
        })
    }

    /// Local path of a frame: `<frames_dir>/frame_<NNNN>.<ext>`.
    pub fn frame_path(&self, sequence: i64) -> PathBuf {
        self.frames_dir
            .join(format!("frame_{:04}.{}", sequence, self.frame_ext))
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn token_from_home() -> Option<String> {
    let path = dirs::home_dir()?.join(TOKEN_FILE);
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_photo_bounds() {
        assert!(!multi_photo_in_range(0));
        assert!(multi_photo_in_range(1));
        assert!(multi_photo_in_range(4));
        assert!(!multi_photo_in_range(5));
    }

    #[test]
    fn frame_paths_are_zero_padded() {
        let cfg = Config {
            access_token: String::new(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            frames_dir: PathBuf::from("/tmp/frames"),
            frame_ext: "jpg".to_string(),
            caption: CaptionTemplate::parse("{num}").unwrap(),
            pacing: Duration::ZERO,
            retries: 3,
            backoff: Duration::ZERO,
            timeout: Duration::from_secs(10),
        };
        assert_eq!(cfg.frame_path(42), PathBuf::from("/tmp/frames/frame_0042.jpg"));
        assert_eq!(cfg.frame_path(12345), PathBuf::from("/tmp/frames/frame_12345.jpg"));
    }

    #[test]
    fn photos_path_per_target() {
        assert_eq!(UploadTarget::OwnStream.photos_path(), "me/photos");
        assert_eq!(
            UploadTarget::Album("987".to_string()).photos_path(),
            "987/photos"
        );
    }
}
