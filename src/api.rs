// API client module: a small blocking HTTP client for the Graph-style
// photo and feed endpoints. Photo uploads go out as multipart forms and
// are retried a bounded number of times; batch posts get exactly one
// attempt. The client never raises past its boundary: the upload loop
// sees booleans and optional handles, failures are reported on the
// console as they happen.

use crate::config::{Config, UploadTarget};
use crate::ui::{Console, Tone};
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// How a single upload attempt can end.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("server returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("response carried no media id")]
    MissingId,
}

impl ApiError {
    /// Whether another attempt could plausibly succeed. A 2xx response
    /// without an id is the server answering clearly, so it is final.
    fn retryable(&self) -> bool {
        !matches!(self, ApiError::MissingId)
    }
}

/// Seam between the upload loop and the network. The loop only ever
/// needs these three calls; tests substitute a recording fake.
pub trait PhotoApi {
    /// Upload and publish one photo. Transport and HTTP-level errors are
    /// both just `false` after the retry budget is spent.
    fn publish(&self, image: &Path, caption: &str, target: &UploadTarget) -> bool;

    /// Upload one photo unpublished, returning the media handle the
    /// server assigned for later batching.
    fn stage(&self, image: &Path, caption: &str, target: &UploadTarget) -> Option<String>;

    /// Post a single feed entry referencing previously staged handles.
    fn publish_batch(&self, handles: &[String], message: &str) -> bool;
}

/// Expected response body of both the photo and feed endpoints. The id
/// is optional so a malformed 2xx can be told apart from a parse error.
#[derive(Deserialize, Debug)]
struct MediaResponse {
    id: Option<String>,
}

pub struct ApiClient {
    client: Client,
    graph_url: String,
    access_token: String,
    retries: u32,
    backoff: Duration,
    console: Console,
}

impl ApiClient {
    pub fn new(cfg: &Config, console: Console) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            graph_url: cfg.graph_url.clone(),
            access_token: cfg.access_token.clone(),
            retries: cfg.retries,
            backoff: cfg.backoff,
            console,
        })
    }

    /// One attempt at the photo endpoint: multipart image bytes plus
    /// caption and publish flag.
    fn send_photo(
        &self,
        image: &Path,
        caption: &str,
        target: &UploadTarget,
        published: bool,
    ) -> std::result::Result<MediaResponse, ApiError> {
        let url = format!("{}/{}", self.graph_url, target.photos_path());
        let file = File::open(image)?;
        let file_name = image
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("frame.jpg")
            .to_string();
        let part = multipart::Part::reader(file)
            .file_name(file_name)
            .mime_str(mime_for(image))?;
        let form = multipart::Form::new()
            .text("access_token", self.access_token.clone())
            .text("caption", caption.to_string())
            .text("published", if published { "true" } else { "false" })
            .part("source", part);

        let res = self.client.post(&url).multipart(form).send()?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(ApiError::Rejected { status, body });
        }
        Ok(res.json()?)
    }

    /// One attempt at the feed endpoint with the staged handles attached.
    fn send_feed_post(
        &self,
        handles: &[String],
        message: &str,
    ) -> std::result::Result<MediaResponse, ApiError> {
        let url = format!("{}/me/feed", self.graph_url);
        let params = feed_params(&self.access_token, message, handles);
        let res = self.client.post(&url).form(&params).send()?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(ApiError::Rejected { status, body });
        }
        Ok(res.json()?)
    }
}

impl PhotoApi for ApiClient {
    fn publish(&self, image: &Path, caption: &str, target: &UploadTarget) -> bool {
        let label = format!("publishing {}", image.display());
        match with_retries(&self.console, &label, self.retries, self.backoff, || {
            self.send_photo(image, caption, target, true)
        }) {
            Ok(resp) => {
                let id = resp.id.unwrap_or_else(|| "?".to_string());
                self.console.say(
                    Tone::Success,
                    &format!("Frame uploaded and published, photo id {id}"),
                );
                true
            }
            // Each attempt was already reported by the retry loop.
            Err(_) => false,
        }
    }

    fn stage(&self, image: &Path, caption: &str, target: &UploadTarget) -> Option<String> {
        let label = format!("staging {}", image.display());
        match with_retries(&self.console, &label, self.retries, self.backoff, || {
            self.send_photo(image, caption, target, false)
                .and_then(|resp| resp.id.ok_or(ApiError::MissingId))
        }) {
            Ok(handle) => {
                self.console
                    .say(Tone::Success, &format!("Frame staged, media handle {handle}"));
                Some(handle)
            }
            Err(_) => None,
        }
    }

    fn publish_batch(&self, handles: &[String], message: &str) -> bool {
        // Single attempt only: the handles were consumed server-side when
        // staged, and re-posting them risks a duplicate feed entry.
        match self.send_feed_post(handles, message) {
            Ok(resp) => {
                let id = resp.id.unwrap_or_else(|| "?".to_string());
                self.console.say(
                    Tone::Success,
                    &format!("Posted {} staged frames, post id {id}", handles.len()),
                );
                true
            }
            Err(err) => {
                self.console.say(
                    Tone::Failure,
                    &format!("Failed to post batch of {}: {err}", handles.len()),
                );
                false
            }
        }
    }
}

/// Run `op` until it succeeds, the error is final, or `attempts` runs
/// out, sleeping `backoff` between attempts. Every failed attempt is
/// reported on the console with its position in the budget.
pub(crate) fn with_retries<T>(
    console: &Console,
    label: &str,
    attempts: u32,
    backoff: Duration,
    mut op: impl FnMut() -> std::result::Result<T, ApiError>,
) -> std::result::Result<T, ApiError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                console.say(
                    Tone::Failure,
                    &format!("Attempt {attempt}/{attempts} {label}: {err}"),
                );
                if !err.retryable() || attempt == attempts {
                    return Err(err);
                }
                thread::sleep(backoff);
                attempt += 1;
            }
        }
    }
}

fn feed_params(token: &str, message: &str, handles: &[String]) -> Vec<(String, String)> {
    let mut params = vec![
        ("access_token".to_string(), token.to_string()),
        ("message".to_string(), message.to_string()),
    ];
    for (i, handle) in handles.iter().enumerate() {
        params.push((
            format!("attached_media[{i}]"),
            json!({ "media_fbid": handle }).to_string(),
        ));
    }
    params
}

fn mime_for(image: &Path) -> &'static str {
    match image.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    fn rejected() -> ApiError {
        ApiError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn retry_bound_is_respected() {
        let calls = Cell::new(0u32);
        let result: std::result::Result<(), ApiError> =
            with_retries(&Console::sink(), "uploading", 3, Duration::ZERO, || {
                calls.set(calls.get() + 1);
                Err(rejected())
            });
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn missing_id_is_final() {
        let calls = Cell::new(0u32);
        let result: std::result::Result<(), ApiError> =
            with_retries(&Console::sink(), "staging", 3, Duration::ZERO, || {
                calls.set(calls.get() + 1);
                Err(ApiError::MissingId)
            });
        assert!(matches!(result, Err(ApiError::MissingId)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn success_stops_the_loop() {
        let calls = Cell::new(0u32);
        let result = with_retries(&Console::sink(), "staging", 3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(rejected())
            } else {
                Ok("media-id".to_string())
            }
        });
        assert_eq!(result.unwrap(), "media-id");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let calls = Cell::new(0u32);
        let _ = with_retries(&Console::sink(), "uploading", 0, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Err::<(), _>(rejected())
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn feed_params_encode_attached_media() {
        let params = feed_params("tok", "msg", &["123".to_string(), "456".to_string()]);
        assert_eq!(params[0], ("access_token".to_string(), "tok".to_string()));
        assert_eq!(params[1], ("message".to_string(), "msg".to_string()));
        assert_eq!(params[2].0, "attached_media[0]");
        assert_eq!(params[2].1, r#"{"media_fbid":"123"}"#);
        assert_eq!(params[3].0, "attached_media[1]");
        assert_eq!(params[3].1, r#"{"media_fbid":"456"}"#);
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(&PathBuf::from("frame_0001.jpg")), "image/jpeg");
        assert_eq!(mime_for(&PathBuf::from("frame_0001.png")), "image/png");
        assert_eq!(mime_for(&PathBuf::from("frame_0001")), "image/jpeg");
    }
}
