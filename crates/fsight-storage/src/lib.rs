//! Object storage for uploaded performance videos.
//!
//! Videos land in a Cloudflare R2 bucket (S3 API) under per-user keys.
//! Playback never reads through this service: the client gets a short-lived
//! presigned URL and streams directly from the bucket.

pub mod client;
pub mod error;
pub mod keys;

pub use client::{PlaybackUrl, R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use keys::{extension_for_mime, video_key};
