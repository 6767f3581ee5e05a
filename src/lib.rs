// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Conversational session controller for a desktop generative-AI chat
//! front end.
//!
//! The host supplies a [`Gateway`] (the remote generation service) and a
//! [`SettingsBridge`] (persistence), then drives a [`SessionController`]
//! from its event loop: composer text in, [`UiEvent`]s out. The controller
//! owns the transcript, slash-command parsing and autocomplete, tunable
//! generation settings, and the single cancellable in-flight request.

pub mod autocomplete;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod controller;
mod dispatch;
pub mod error;
pub mod gateway;
pub mod locale;
pub mod output;
mod prompts;
pub mod scroll;
mod session;
pub mod settings;
pub mod transcript;

pub use autocomplete::{Candidate, candidates_for};
pub use bridge::{FileSettingsBridge, NullBridge, SettingsBridge};
pub use config::SessionConfig;
pub use controller::{CommandBadge, SessionController};
pub use error::{Error, Result};
pub use gateway::{
    Attachment, FetchOptions, FetchedPage, Gateway, GenerationReply, ImageAttachment, ImageOptions,
    MediaReply, RequestSource, TextOptions, VideoOptions,
};
pub use locale::{Lang, Locale, Tone};
pub use output::{OutputContext, UiEvent, UiListener};
pub use scroll::{ScrollHold, ScrollSuppressor};
pub use settings::{
    ImageAspect, SettingKey, SlideAspect, StoredSettings, TranslateMode, VideoAspect,
    VideoResolution,
};
pub use transcript::{Role, TranscriptMessage};
