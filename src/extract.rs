// Frame extraction wrapper. Decoding stays in ffmpeg; this module only
// builds the invocation and checks that it ran.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Extract still frames from `video` into `out_dir` as zero-padded
/// `frame_0001.<format>` files, `fps` frames per second of source video.
pub fn extract_frames(video: &Path, out_dir: &Path, fps: u32, format: &str) -> Result<()> {
    if !video.is_file() {
        bail!("video file {} does not exist", video.display());
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let status = Command::new("ffmpeg")
        .args(ffmpeg_args(video, out_dir, fps, format))
        .status()
        .context("ffmpeg is not installed or not on PATH")?;
    if !status.success() {
        bail!("ffmpeg exited with {status}");
    }
    Ok(())
}

fn ffmpeg_args(video: &Path, out_dir: &Path, fps: u32, format: &str) -> Vec<OsString> {
    let pattern = out_dir.join(format!("frame_%04d.{format}"));
    vec![
        OsString::from("-i"),
        video.as_os_str().to_owned(),
        OsString::from("-vf"),
        OsString::from(format!("fps={fps}")),
        OsString::from("-q:v"),
        OsString::from("3"),
        pattern.into_os_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn args_carry_fps_filter_and_numbered_pattern() {
        let args = ffmpeg_args(
            &PathBuf::from("movie.mp4"),
            &PathBuf::from("/tmp/frames"),
            2,
            "jpg",
        );
        assert!(args.contains(&OsString::from("fps=2")));
        let pattern = args.last().unwrap().to_string_lossy().into_owned();
        assert!(pattern.ends_with("frame_%04d.jpg"));
    }
}
