// Companion binary: produce the numbered frame files the uploader
// consumes, by handing the video to ffmpeg.

use clap::Parser;
use framepost_cli::extract;
use std::path::PathBuf;

/// Extract still frames from a video with ffmpeg.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the numbered frames are written to
    #[arg(short, long, default_value = "./frames")]
    output_dir: PathBuf,

    /// Frames to extract per second of video
    #[arg(short, long, default_value_t = 2)]
    fps: u32,

    /// Output image format
    #[arg(long, default_value = "jpg")]
    format: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    extract::extract_frames(&cli.input, &cli.output_dir, cli.fps, &cli.format)?;
    println!("Frames extracted to {}", cli.output_dir.display());
    Ok(())
}
