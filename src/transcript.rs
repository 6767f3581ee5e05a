// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Conversation transcript and the prompt-context cache over it.
//!
//! The transcript is the single source of truth for on-screen history and for
//! "last AI reply" command targets. Entries are append-only; the only bulk
//! mutations are a wholesale clear and the compact-to-summary replacement.
//! Every mutation invalidates the context cache before returning, so a read
//! immediately after a mutation can never see pre-mutation text.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::{Lang, Locale};

/// Who authored a transcript entry. Status lines are not transcript entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl TranscriptMessage {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            at: Utc::now(),
        }
    }
}

/// Ordered user/assistant turns plus the serialized-context cache.
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
    cache: ContextCache,
}

impl Transcript {
    pub(crate) fn new(cache_ttl: Duration) -> Self {
        Self {
            messages: Vec::new(),
            cache: ContextCache::new(cache_ttl),
        }
    }

    pub(crate) fn push_user(&mut self, content: &str) {
        self.messages.push(TranscriptMessage::new(Role::User, content));
        self.cache.invalidate();
    }

    pub(crate) fn push_assistant(&mut self, content: &str) {
        self.messages
            .push(TranscriptMessage::new(Role::Assistant, content));
        self.cache.invalidate();
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    /// Most recent assistant turn, scanning from the end.
    pub(crate) fn last_assistant(&self) -> Option<&TranscriptMessage> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.messages.len();
        self.messages.clear();
        self.cache.invalidate();
        removed
    }

    /// Replace the whole transcript with a single assistant summary.
    /// Returns how many messages were folded away.
    pub(crate) fn replace_with_summary(&mut self, summary: &str) -> usize {
        let replaced = self.messages.len();
        self.messages.clear();
        self.messages
            .push(TranscriptMessage::new(Role::Assistant, summary));
        self.cache.invalidate();
        replaced
    }

    /// Serialized prompt context over the most recent messages, memoized for
    /// the cache TTL. Truncation keeps the tail so the newest turns survive.
    pub(crate) fn context(
        &mut self,
        max_chars: usize,
        max_messages: usize,
        locale: &Locale,
    ) -> String {
        let key = CacheKey {
            max_chars,
            max_messages,
            lang: locale.lang,
        };
        if let Some(text) = self.cache.fresh(key) {
            return text;
        }

        let start = self.messages.len().saturating_sub(max_messages);
        let text = render_lines(&self.messages[start..], locale);
        let text = tail_chars(&text, max_chars);
        self.cache.fill(key, text.clone());
        text
    }

    /// Serialize every message, uncached. Feeds the compact prompt.
    pub(crate) fn render_all(&self, locale: &Locale) -> String {
        render_lines(&self.messages, locale)
    }

    #[cfg(test)]
    pub(crate) fn context_rebuilds(&self) -> u64 {
        self.cache.rebuilds
    }
}

fn render_lines(messages: &[TranscriptMessage], locale: &Locale) -> String {
    let lines: Vec<String> = messages
        .iter()
        .map(|message| format!("{}: {}", locale.role_label(message.role), message.content))
        .collect();
    lines.join("\n")
}

/// Keep the last `max_chars` characters of `text`.
fn tail_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    text.chars().skip(count - max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    max_chars: usize,
    max_messages: usize,
    lang: Lang,
}

struct ContextCache {
    text: String,
    filled_at: Option<Instant>,
    key: Option<CacheKey>,
    ttl: Duration,
    rebuilds: u64,
}

impl ContextCache {
    fn new(ttl: Duration) -> Self {
        Self {
            text: String::new(),
            filled_at: None,
            key: None,
            ttl,
            rebuilds: 0,
        }
    }

    fn invalidate(&mut self) {
        self.filled_at = None;
    }

    fn fresh(&self, key: CacheKey) -> Option<String> {
        let filled_at = self.filled_at?;
        if filled_at.elapsed() < self.ttl && self.key == Some(key) {
            Some(self.text.clone())
        } else {
            None
        }
    }

    fn fill(&mut self, key: CacheKey, text: String) {
        self.text = text;
        self.filled_at = Some(Instant::now());
        self.key = Some(key);
        self.rebuilds += 1;
    }
}
