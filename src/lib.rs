// Library root
// ------------
// The main binary (`main.rs`) wires these modules into the frame upload
// CLI; `bin/extract_frames.rs` uses `extract` on its own.
//
// Module responsibilities:
// - `config`: run configuration (endpoint, pacing, retry policy) read
//   from the environment, plus the upload target.
// - `caption`: per-frame caption rendering from the configured template.
// - `api`: blocking HTTP client for the photo and feed endpoints with
//   bounded retry; the `PhotoApi` trait is the seam tests fake.
// - `batch`: accumulator for staged media handles awaiting a
//   multi-photo post.
// - `uploader`: the sequential upload loop and its bookkeeping.
// - `ui`: styled console lines and the progress bar.
// - `extract`: ffmpeg wrapper that produces the numbered frame files.
pub mod api;
pub mod batch;
pub mod caption;
pub mod config;
pub mod extract;
pub mod ui;
pub mod uploader;
