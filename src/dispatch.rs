// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Turn dispatch: classify submitted text as a slash command, a structured
//! `@` directive, or a plain chat turn, and drive the flow end to end.
//!
//! Every generation flow follows the same shape: append the user's line,
//! draw a request token, await the gateway, then check the token before
//! touching the transcript again. Results carrying a superseded token are
//! dropped without comment.

use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::bridge::SettingsBridge;
use crate::commands::{self, Command};
use crate::controller::{CommandBadge, SessionController, lock};
use crate::error::{Error, Result};
use crate::gateway::{
    Attachment, FetchOptions, Gateway, GenerationReply, ImageAttachment, ImageOptions,
    RequestSource, VideoOptions, extract_sources,
};
use crate::locale::Locale;
use crate::output::{UiEvent, emit_error, emit_status};
use crate::prompts::{self, UrlExcerpt};
use crate::session::{RequestToken, Resolution};
use crate::settings::SettingKey;

/// Holds the dispatch re-entrancy flag, released on drop so every exit path
/// frees the next submit.
struct DispatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DispatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<G, B> SessionController<G, B>
where
    G: Gateway + 'static,
    B: SettingsBridge + 'static,
{
    /// Turn raw submitted text into one turn. Overlapping calls (Enter-key
    /// repeat, double-click) are dropped while one dispatch is running;
    /// background shortcut prompts go through [`Self::run_shortcut_prompt`]
    /// instead and rely on token supersession.
    pub async fn dispatch(&self, raw: &str, attachments: &[Attachment]) {
        let badge = self.badge();
        let text = raw.trim();
        if text.is_empty() && badge.is_none() {
            return;
        }
        let Some(_guard) = DispatchGuard::acquire(&self.dispatching) else {
            return;
        };

        // An active badge had its token stripped from the visible input;
        // put it back before classification. The badge is consumed either way.
        let effective = match badge {
            Some(badge) => {
                self.clear_badge();
                format!("{} {}", badge.token(), text)
            }
            None => text.to_string(),
        };

        if effective.starts_with('/') {
            self.run_slash(&effective).await;
        } else if let Some((badge, rest)) = CommandBadge::parse(&effective) {
            match badge {
                CommandBadge::Image => self.run_image_turn(rest, attachments).await,
                CommandBadge::Video => self.run_video_turn(rest, attachments).await,
                CommandBadge::Slide => self.run_slide_turn(rest).await,
            }
        } else {
            self.run_chat_turn(&effective, attachments).await;
        }
    }

    async fn run_slash(&self, text: &str) {
        let locale = self.locale();
        let Some(command) = commands::parse(text) else {
            let name = text.split_whitespace().next().unwrap_or(text);
            emit_status(&self.output, locale.unknown_command(name));
            return;
        };
        match command {
            Command::Clear => {
                lock(&self.transcript).clear();
                // Orphan any in-flight token so its result cannot land in the
                // emptied transcript.
                lock(&self.generation).invalidate();
                self.output.emit(UiEvent::TranscriptCleared);
                emit_status(&self.output, locale.cleared().to_string());
            }
            Command::Help => emit_status(&self.output, commands::help_text(&locale)),
            Command::Compact => self.run_compact().await,
            Command::Translate { language } => self.run_translate(&language).await,
            Command::SetImageAspect(value) => {
                self.apply_setting(SettingKey::ImageAspect, &value).await
            }
            Command::SetImageCount(value) => {
                self.apply_setting(SettingKey::ImageCount, &value).await
            }
            Command::SetSlideAspect(value) => {
                self.apply_setting(SettingKey::SlideAspect, &value).await
            }
            Command::SetSlidePrompt(value) => {
                self.apply_setting(SettingKey::SlidePrompt, &value).await
            }
            Command::SetTranslateMode(value) => {
                self.apply_setting(SettingKey::TranslateMode, &value).await
            }
            Command::SetVideoAspect(value) => {
                self.apply_setting(SettingKey::VideoAspect, &value).await
            }
            Command::SetVideoCount(value) => {
                self.apply_setting(SettingKey::VideoCount, &value).await
            }
            Command::SetVideoDuration(value) => {
                self.apply_setting(SettingKey::VideoDuration, &value).await
            }
            Command::SetVideoQuality(value) => {
                self.apply_setting(SettingKey::VideoResolution, &value).await
            }
            Command::SetWebSearch(value) => {
                self.apply_setting(SettingKey::WebSearch, &value).await
            }
        }
    }

    async fn run_chat_turn(&self, text: &str, attachments: &[Attachment]) {
        let locale = self.locale();

        // Identity questions are answered locally; the gateway never sees
        // them and no generation slot is opened.
        if attachments.is_empty() && locale.is_identity_question(text) {
            let reply = locale.identity_reply();
            {
                let mut transcript = lock(&self.transcript);
                transcript.push_user(text);
                transcript.push_assistant(reply);
            }
            self.output.emit(UiEvent::AssistantReply {
                text: reply.to_string(),
                sources: Vec::new(),
            });
            return;
        }

        let image = attachments.iter().find_map(|attachment| match attachment {
            Attachment::Image(attached) => Some(attached.clone()),
            _ => None,
        });
        let urls: Vec<Url> = attachments
            .iter()
            .filter_map(|attachment| match attachment {
                Attachment::Url(url) => Some(url.clone()),
                _ => None,
            })
            .collect();

        // Context is snapshotted before the new user line lands so the
        // prompt does not quote the message it is answering.
        let context = {
            let mut transcript = lock(&self.transcript);
            let context = transcript.context(
                self.config.history_max_chars,
                self.config.history_max_messages,
                &locale,
            );
            transcript.push_user(text);
            context
        };

        let token = self.begin_generation();
        let _hold = self.scroll.hold();

        let mut excerpts = Vec::new();
        for url in &urls {
            if !lock(&self.generation).is_current(token) {
                return;
            }
            match self.fetch_excerpt(url).await {
                Ok(excerpt) => excerpts.push(excerpt),
                Err(err) => {
                    tracing::debug!("fetch failed for {url}: {err}");
                    // Same silence rules as generation results: a torn-down
                    // request must not leave a status behind.
                    if !err.is_cancellation() && lock(&self.generation).is_current(token) {
                        emit_status(&self.output, locale.fetch_failed(url.as_str()));
                    }
                }
            }
        }
        if !lock(&self.generation).is_current(token) {
            return;
        }

        let prompt = prompts::chat_prompt(&context, text, &excerpts, &locale);
        let options = self.text_options(RequestSource::Chat);
        let result = match &image {
            Some(image) => {
                self.gateway
                    .generate_with_image(&prompt, image, &options)
                    .await
            }
            None => self.gateway.generate_text(&prompt, &options).await,
        };
        self.finish_text_turn(token, result, &locale);
    }

    /// Background shortcut prompt: the text is echoed into the transcript as
    /// a user turn so the reply has visible context, then generated like a
    /// chat turn. Bypasses the dispatch lock; rapid re-triggers supersede
    /// each other through the request token.
    pub async fn run_shortcut_prompt(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let locale = self.locale();
        let context = {
            let mut transcript = lock(&self.transcript);
            let context = transcript.context(
                self.config.history_max_chars,
                self.config.history_max_messages,
                &locale,
            );
            transcript.push_user(text);
            context
        };

        let token = self.begin_generation();
        let _hold = self.scroll.hold();
        let prompt = prompts::chat_prompt(&context, text, &[], &locale);
        let options = self.text_options(RequestSource::Shortcut);
        let result = self.gateway.generate_text(&prompt, &options).await;
        self.finish_text_turn(token, result, &locale);
    }

    async fn run_translate(&self, language: &str) {
        let locale = self.locale();
        let source = lock(&self.transcript)
            .last_assistant()
            .map(|message| message.content.clone());
        let Some(source) = source else {
            emit_status(&self.output, locale.nothing_to_translate().to_string());
            return;
        };
        let mode = lock(&self.settings).values().translate_mode;

        let token = self.begin_generation();
        let _hold = self.scroll.hold();
        let prompt = prompts::translate_prompt(&source, language, mode);
        let options = self.text_options(RequestSource::Chat);
        let result = self.gateway.generate_text(&prompt, &options).await;
        self.finish_text_turn(token, result, &locale);
    }

    async fn run_compact(&self) {
        let locale = self.locale();
        let rendered = {
            let transcript = lock(&self.transcript);
            if transcript.is_empty() {
                emit_status(&self.output, locale.nothing_to_compact().to_string());
                return;
            }
            transcript.render_all(&locale)
        };

        let token = self.begin_generation();
        let _hold = self.scroll.hold();
        let prompt = prompts::compact_prompt(&rendered, &locale);
        let options = self.text_options(RequestSource::Chat);
        match self.gateway.generate_text(&prompt, &options).await {
            Ok(reply) => {
                if lock(&self.generation).resolve(token) != Resolution::Current {
                    return;
                }
                let replaced = lock(&self.transcript).replace_with_summary(reply.text.trim());
                self.output.emit(UiEvent::TranscriptCompacted {
                    messages_compacted: replaced,
                });
                emit_status(&self.output, locale.compacted(replaced));
                self.output.emit(UiEvent::GenerationFinished);
            }
            Err(err) => self.finish_error(token, err, &locale),
        }
    }

    async fn run_image_turn(&self, description: &str, attachments: &[Attachment]) {
        let locale = self.locale();
        if description.is_empty() {
            emit_status(&self.output, locale.directive_usage("@image"));
            return;
        }
        let (aspect, count) = {
            let settings = lock(&self.settings);
            let values = settings.values();
            (values.image_aspect, values.image_count)
        };
        let reference_images: Vec<ImageAttachment> = attachments
            .iter()
            .filter_map(|attachment| match attachment {
                Attachment::Image(image) => Some(image.clone()),
                _ => None,
            })
            .collect();

        lock(&self.transcript).push_user(&format!("@image {description}"));
        let token = self.begin_generation();
        let _hold = self.scroll.hold();

        let options = ImageOptions {
            aspect,
            reference_images,
        };
        for _ in 0..count {
            if !lock(&self.generation).is_current(token) {
                return;
            }
            match self.gateway.generate_image(description, &options).await {
                Ok(media) => {
                    // A cancel or supersession landing mid-call must not
                    // surface the late payload.
                    if !lock(&self.generation).is_current(token) {
                        return;
                    }
                    self.output.emit(UiEvent::ImageReady {
                        data: media.data,
                        mime_type: media.mime_type,
                    });
                }
                Err(err) => {
                    self.finish_error(token, err, &locale);
                    return;
                }
            }
        }

        if lock(&self.generation).resolve(token) != Resolution::Current {
            return;
        }
        let placeholder = locale.image_placeholder(count as usize, aspect.as_str());
        lock(&self.transcript).push_assistant(&placeholder);
        self.output.emit(UiEvent::GenerationFinished);
    }

    async fn run_video_turn(&self, description: &str, attachments: &[Attachment]) {
        let locale = self.locale();
        if description.is_empty() {
            emit_status(&self.output, locale.directive_usage("@video"));
            return;
        }
        let (aspect, resolution, duration_secs, count) = {
            let settings = lock(&self.settings);
            let values = settings.values();
            (
                values.video_aspect,
                values.video_resolution,
                values.video_duration_secs,
                values.video_count,
            )
        };
        let reference_image = attachments.iter().find_map(|attachment| match attachment {
            Attachment::Image(image) => Some(image.clone()),
            _ => None,
        });

        lock(&self.transcript).push_user(&format!("@video {description}"));
        let token = self.begin_generation();
        let _hold = self.scroll.hold();

        let options = VideoOptions {
            aspect,
            duration_secs,
            resolution,
            reference_image,
        };
        for _ in 0..count {
            if !lock(&self.generation).is_current(token) {
                return;
            }
            match self.gateway.generate_video(description, &options).await {
                Ok(media) => {
                    if !lock(&self.generation).is_current(token) {
                        return;
                    }
                    self.output.emit(UiEvent::VideoReady {
                        data: media.data,
                        mime_type: media.mime_type,
                    });
                }
                Err(err) => {
                    self.finish_error(token, err, &locale);
                    return;
                }
            }
        }

        if lock(&self.generation).resolve(token) != Resolution::Current {
            return;
        }
        let placeholder = locale.video_placeholder(count as usize, aspect.as_str());
        lock(&self.transcript).push_assistant(&placeholder);
        self.output.emit(UiEvent::GenerationFinished);
    }

    async fn run_slide_turn(&self, topic: &str) {
        let locale = self.locale();
        if topic.is_empty() {
            emit_status(&self.output, locale.directive_usage("@slide"));
            return;
        }
        let (aspect, custom) = {
            let settings = lock(&self.settings);
            let values = settings.values();
            (values.slide_aspect, values.slide_prompt.clone())
        };

        lock(&self.transcript).push_user(&format!("@slide {topic}"));
        let token = self.begin_generation();
        let _hold = self.scroll.hold();
        let prompt = prompts::slide_prompt(topic, aspect, custom.as_deref());
        let options = self.text_options(RequestSource::Chat);
        let result = self.gateway.generate_text(&prompt, &options).await;
        self.finish_text_turn(token, result, &locale);
    }

    async fn fetch_excerpt(&self, url: &Url) -> Result<UrlExcerpt> {
        let options = FetchOptions {
            max_length: self.config.fetch_max_length,
            timeout: self.config.fetch_timeout(),
        };
        let page = self.gateway.fetch_url(url, &options).await?;
        Ok(UrlExcerpt {
            url: page.final_url,
            text: page.text,
            truncated: page.truncated,
        })
    }

    /// Settle a finished text generation against the current token. Stale
    /// and canceled results vanish without a trace; current results append
    /// the reply with any trailing sources block folded into the source
    /// list.
    fn finish_text_turn(
        &self,
        token: RequestToken,
        result: Result<GenerationReply>,
        locale: &Locale,
    ) {
        match result {
            Ok(reply) => {
                if lock(&self.generation).resolve(token) != Resolution::Current {
                    return;
                }
                let (body, extracted) = extract_sources(&reply.text);
                let mut sources = reply.sources;
                for url in extracted {
                    if !sources.contains(&url) {
                        sources.push(url);
                    }
                }
                lock(&self.transcript).push_assistant(&body);
                self.output.emit(UiEvent::AssistantReply {
                    text: body,
                    sources,
                });
                self.output.emit(UiEvent::GenerationFinished);
            }
            Err(err) => self.finish_error(token, err, locale),
        }
    }

    fn finish_error(&self, token: RequestToken, err: Error, locale: &Locale) {
        if lock(&self.generation).resolve(token) != Resolution::Current {
            return;
        }
        if !err.is_cancellation() {
            emit_error(&self.output, format!("{}{err}", locale.error_prefix()));
        }
        self.output.emit(UiEvent::GenerationFinished);
    }
}
