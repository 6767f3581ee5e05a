// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Remote generation gateway. The session treats the service as a set of
//! opaque async calls supplied by the host; everything here is the typed
//! surface of that contract.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use url::Url;

use crate::error::{Error, Result};
use crate::settings::{ImageAspect, VideoAspect, VideoResolution};

/// Where a text request originated. Hosts may route or bill differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Chat,
    Shortcut,
}

/// Options for plain and image-grounded text generation.
#[derive(Debug, Clone)]
pub struct TextOptions {
    pub model: Option<String>,
    /// Opaque host-defined generation parameters, passed through verbatim.
    pub generation_config: Option<serde_json::Value>,
    pub use_web_search: bool,
    pub source: RequestSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub text: String,
    pub sources: Vec<String>,
}

impl GenerationReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Base64 image payload attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data: String,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }
}

/// Content attached to a dispatch alongside the typed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    Image(ImageAttachment),
    Url(Url),
}

impl Attachment {
    /// Validate a raw string into a URL attachment.
    pub fn url(raw: &str) -> Result<Self> {
        Url::parse(raw.trim())
            .map(Self::Url)
            .map_err(|err| Error::InvalidUrl(format!("{raw}: {err}")))
    }
}

#[derive(Debug, Clone)]
pub struct ImageOptions {
    pub aspect: ImageAspect,
    pub reference_images: Vec<ImageAttachment>,
}

#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub aspect: VideoAspect,
    pub duration_secs: u8,
    pub resolution: VideoResolution,
    pub reference_image: Option<ImageAttachment>,
}

/// Base64 media returned by image or video generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReply {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub max_length: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub text: String,
    pub truncated: bool,
    pub final_url: String,
}

/// Trait for the host's generation service.
pub trait Gateway: Send + Sync {
    fn generate_text(
        &self,
        prompt: &str,
        options: &TextOptions,
    ) -> impl std::future::Future<Output = Result<GenerationReply>> + Send;

    fn generate_with_image(
        &self,
        prompt: &str,
        image: &ImageAttachment,
        options: &TextOptions,
    ) -> impl std::future::Future<Output = Result<GenerationReply>> + Send;

    fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> impl std::future::Future<Output = Result<MediaReply>> + Send;

    fn generate_video(
        &self,
        prompt: &str,
        options: &VideoOptions,
    ) -> impl std::future::Future<Output = Result<MediaReply>> + Send;

    fn fetch_url(
        &self,
        url: &Url,
        options: &FetchOptions,
    ) -> impl std::future::Future<Output = Result<FetchedPage>> + Send;

    /// Best-effort remote cancellation. The session ignores the local
    /// result either way; this only asks the server to stop early.
    fn cancel_generation(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Split a trailing sources block off a reply. The block counts only when a
/// final `Sources:` header is followed exclusively by URL lines; anything
/// else leaves the text untouched.
pub(crate) fn extract_sources(text: &str) -> (String, Vec<String>) {
    let lines: Vec<&str> = text.lines().collect();
    let Some(header) = lines.iter().rposition(|line| {
        let label = line.trim().trim_end_matches(':').to_lowercase();
        label == "sources"
    }) else {
        return (text.to_string(), Vec::new());
    };

    let mut sources = Vec::new();
    for line in &lines[header + 1..] {
        let candidate = line.trim().trim_start_matches(['-', '*']).trim();
        if candidate.is_empty() {
            continue;
        }
        match Url::parse(candidate) {
            Ok(url) => sources.push(url.to_string()),
            Err(_) => return (text.to_string(), Vec::new()),
        }
    }
    if sources.is_empty() {
        return (text.to_string(), Vec::new());
    }

    let body = lines[..header].join("\n").trim_end().to_string();
    (body, sources)
}
