// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Prompt builders for chat turns and the canned slash flows.

use crate::locale::{Lang, Locale, Tone};
use crate::settings::{SlideAspect, TranslateMode};
use crate::transcript::Role;

/// Fetched page content folded into a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlExcerpt {
    pub(crate) url: String,
    pub(crate) text: String,
    pub(crate) truncated: bool,
}

const COMPACT_INSTRUCTIONS: &str = "Summarize the conversation below, keeping facts, \
decisions, names, and any unresolved questions. Be concise; the summary replaces the \
full history.";

const SLIDE_INSTRUCTIONS: &str = "Design a single presentation slide about the topic \
below. Respond with a title line, 3-5 bullet points, and one speaker note.";

fn style_directive(locale: &Locale) -> &'static str {
    match (locale.lang, locale.tone) {
        (Lang::En, Tone::Friendly) => "Reply in English with a warm, friendly tone.",
        (Lang::En, Tone::Formal) => "Reply in English with a polite, formal tone.",
        (Lang::Ja, Tone::Friendly) => "日本語で、親しみやすい口調で答えてください。",
        (Lang::Ja, Tone::Formal) => "日本語で、丁寧な敬語で答えてください。",
    }
}

/// Assemble a chat prompt. The transcript context is snapshotted by the
/// caller before the new user line is appended, so the question rides along
/// here instead of inside the context block.
pub(crate) fn chat_prompt(
    context: &str,
    user_text: &str,
    excerpts: &[UrlExcerpt],
    locale: &Locale,
) -> String {
    let mut parts = vec![style_directive(locale).to_string()];
    if !context.is_empty() {
        parts.push(format!("Conversation so far:\n{context}"));
    }
    for excerpt in excerpts {
        let marker = if excerpt.truncated { " (truncated)" } else { "" };
        parts.push(format!(
            "Content from {}{marker}:\n{}",
            excerpt.url, excerpt.text
        ));
    }
    parts.push(format!("{}: {user_text}", locale.role_label(Role::User)));
    parts.join("\n\n")
}

pub(crate) fn translate_prompt(text: &str, language: &str, mode: TranslateMode) -> String {
    let style = match mode {
        TranslateMode::Literal => "Stay close to the original wording and sentence structure.",
        TranslateMode::Free => "Prioritize natural, idiomatic phrasing over word-for-word fidelity.",
    };
    format!(
        "Translate the following text into {}. {style} Reply with the translation only.\n\n{text}",
        display_language(language)
    )
}

pub(crate) fn compact_prompt(rendered: &str, locale: &Locale) -> String {
    let language_clause = match locale.lang {
        Lang::En => "Write the summary in English.",
        Lang::Ja => "要約は日本語で書いてください。",
    };
    format!("{COMPACT_INSTRUCTIONS} {language_clause}\n\n{rendered}")
}

/// Slide prompts honor the user's custom instructions when set.
pub(crate) fn slide_prompt(topic: &str, aspect: SlideAspect, custom: Option<&str>) -> String {
    let instructions = custom.unwrap_or(SLIDE_INSTRUCTIONS);
    format!(
        "{instructions}\n\nAspect ratio: {}\nTopic: {topic}",
        aspect.as_str()
    )
}

fn display_language(language: &str) -> String {
    let mut chars = language.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_prompt_includes_context_and_question() {
        let locale = Locale::default();
        let prompt = chat_prompt("User: hi\nAI: hello", "what next?", &[], &locale);
        assert!(prompt.contains("Conversation so far:\nUser: hi\nAI: hello"));
        assert!(prompt.ends_with("User: what next?"));
    }

    #[test]
    fn test_chat_prompt_without_context_has_no_history_block() {
        let prompt = chat_prompt("", "hello", &[], &Locale::default());
        assert!(!prompt.contains("Conversation so far"));
        assert!(prompt.contains("Reply in English"));
    }

    #[test]
    fn test_chat_prompt_folds_excerpts() {
        let excerpts = [UrlExcerpt {
            url: "https://example.com/".to_string(),
            text: "Example body".to_string(),
            truncated: true,
        }];
        let prompt = chat_prompt("", "summarize that page", &excerpts, &Locale::default());
        assert!(prompt.contains("Content from https://example.com/ (truncated):\nExample body"));
    }

    #[test]
    fn test_chat_prompt_japanese_directive_and_role() {
        let locale = Locale::new(Lang::Ja, Tone::Formal);
        let prompt = chat_prompt("", "こんにちは", &[], &locale);
        assert!(prompt.contains("敬語"));
        assert!(prompt.contains("ユーザー: こんにちは"));
    }

    #[test]
    fn test_translate_prompt_varies_by_mode() {
        let literal = translate_prompt("hello", "japanese", TranslateMode::Literal);
        let free = translate_prompt("hello", "japanese", TranslateMode::Free);
        assert!(literal.contains("into Japanese"));
        assert!(literal.contains("original wording"));
        assert!(free.contains("idiomatic"));
        assert_ne!(literal, free);
    }

    #[test]
    fn test_compact_prompt_language_clause() {
        let ja = compact_prompt("User: hi", &Locale::new(Lang::Ja, Tone::Friendly));
        assert!(ja.contains("日本語"));
        assert!(ja.ends_with("User: hi"));
    }

    #[test]
    fn test_slide_prompt_custom_override() {
        let stock = slide_prompt("Q3 results", SlideAspect::Wide, None);
        assert!(stock.contains("presentation slide"));
        assert!(stock.contains("Aspect ratio: 16:9"));

        let custom = slide_prompt("Q3 results", SlideAspect::Standard, Some("One chart only."));
        assert!(custom.starts_with("One chart only."));
        assert!(custom.contains("Aspect ratio: 4:3"));
        assert!(!custom.contains("speaker note"));
    }
}
