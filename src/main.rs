// Entrypoint for the uploader binary.
// - Keeps `main` small: validate flags, build the client, hand the rest
//   to the upload loop.
// - Returns `anyhow::Result` so startup errors print with context.

use anyhow::bail;
use clap::Parser;
use framepost_cli::api::ApiClient;
use framepost_cli::config::{self, Config, UploadTarget, MAX_PHOTOS_PER_POST};
use framepost_cli::ui::{self, Console, Tone};
use framepost_cli::uploader::{RunOptions, UploadRun};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Upload extracted video frames to a Graph-style photo endpoint, in order.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// First frame number to upload
    #[arg(long, value_name = "START_FRAME")]
    start: u32,

    /// Number of frames to upload
    #[arg(long = "loop", value_name = "LOOP_COUNT", default_value_t = 40)]
    loop_count: i64,

    /// Destination album id (defaults to the caller's own photo stream)
    #[arg(long, value_name = "ALBUM_ID")]
    album: Option<String>,

    /// Simulate the run: no network calls, no deletions
    #[arg(long)]
    dry_run: bool,

    /// Collect frames into multi-photo posts of this size (1-4)
    #[arg(long, value_name = "N")]
    multi_photo: Option<u32>,

    /// Stop the whole run at the first failed frame
    #[arg(long)]
    halt_on_failure: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(n) = cli.multi_photo {
        if !config::multi_photo_in_range(n) {
            eprintln!(
                "{}",
                ui::paint(
                    Tone::Failure,
                    &format!("--multi-photo must be between 1 and {MAX_PHOTOS_PER_POST}"),
                )
            );
            process::exit(1);
        }
    }

    let cfg = Config::from_env()?;
    if !cli.dry_run && cfg.access_token.is_empty() {
        bail!("no access token configured; set FRAMEPOST_ACCESS_TOKEN or write ~/.framepost_token");
    }

    // Ctrl-C flips a flag the upload loop checks between frames, so an
    // interrupted run still prints its summary.
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))?;

    let console = Console::for_run(cli.loop_count.max(0) as u64);
    let api = ApiClient::new(&cfg, console.clone())?;
    let opts = RunOptions {
        start: i64::from(cli.start),
        count: cli.loop_count,
        target: UploadTarget::from_album(cli.album),
        dry_run: cli.dry_run,
        batch_size: cli.multi_photo.map(|n| n as usize),
        halt_on_failure: cli.halt_on_failure,
    };

    UploadRun::new(&cfg, &api, console, cancel).run(&opts);
    println!("{}", ui::paint(Tone::Heading, "Task Done"));
    Ok(())
}
