// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Language and tone context for user-facing text.
//!
//! Everything shown to the user or folded into a prompt goes through an
//! explicit [`Locale`] value; there is no ambient language state.

use crate::settings::SettingKey;
use crate::transcript::Role;

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Ja,
}

/// Register used for canned replies and prompt instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Friendly,
    Formal,
}

/// Explicit language/tone context handed to every formatting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Locale {
    pub lang: Lang,
    pub tone: Tone,
}

const IDENTITY_PHRASES_EN: &[&str] = &[
    "who are you",
    "what are you",
    "what is your name",
    "what's your name",
    "are you an ai",
];

const IDENTITY_PHRASES_JA: &[&str] = &[
    "あなたは誰",
    "あなたはだれ",
    "お前は誰",
    "君は誰",
    "あなたの名前",
];

impl Locale {
    pub fn new(lang: Lang, tone: Tone) -> Self {
        Self { lang, tone }
    }

    /// Transcript role label used in serialized history lines.
    pub(crate) fn role_label(&self, role: Role) -> &'static str {
        match (role, self.lang) {
            (Role::User, Lang::En) => "User",
            (Role::User, Lang::Ja) => "ユーザー",
            (Role::Assistant, _) => "AI",
        }
    }

    /// True when the text reads as a "who/what are you" question. Checked
    /// before engaging the gateway so the canned reply below answers it.
    pub(crate) fn is_identity_question(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let phrases = match self.lang {
            Lang::En => IDENTITY_PHRASES_EN,
            Lang::Ja => IDENTITY_PHRASES_JA,
        };
        phrases.iter().any(|phrase| lower.contains(phrase))
    }

    pub(crate) fn identity_reply(&self) -> &'static str {
        match (self.lang, self.tone) {
            (Lang::En, Tone::Friendly) => {
                "I'm the AI assistant built into this app. Ask me anything, or type /help to see what I can do."
            }
            (Lang::En, Tone::Formal) => {
                "I am the AI assistant integrated into this application. Please ask your question, or type /help to list the available commands."
            }
            (Lang::Ja, Tone::Friendly) => {
                "このアプリのAIアシスタントだよ。なんでも聞いてね。/help でコマンド一覧も見られるよ。"
            }
            (Lang::Ja, Tone::Formal) => {
                "本アプリケーションに組み込まれたAIアシスタントです。ご質問をどうぞ。/help でコマンド一覧をご覧いただけます。"
            }
        }
    }

    pub(crate) fn canceled(&self) -> &'static str {
        match self.lang {
            Lang::En => "Generation canceled.",
            Lang::Ja => "生成をキャンセルしました。",
        }
    }

    pub(crate) fn error_prefix(&self) -> &'static str {
        match self.lang {
            Lang::En => "Error: ",
            Lang::Ja => "エラー: ",
        }
    }

    pub(crate) fn unavailable(&self) -> &'static str {
        match self.lang {
            Lang::En => "Settings are unavailable right now.",
            Lang::Ja => "設定は現在利用できません。",
        }
    }

    pub(crate) fn cleared(&self) -> &'static str {
        match self.lang {
            Lang::En => "Conversation cleared.",
            Lang::Ja => "会話をクリアしました。",
        }
    }

    pub(crate) fn compacted(&self, messages: usize) -> String {
        match self.lang {
            Lang::En => format!("Compacted {messages} messages into a summary."),
            Lang::Ja => format!("{messages}件のメッセージを要約しました。"),
        }
    }

    pub(crate) fn nothing_to_compact(&self) -> &'static str {
        match self.lang {
            Lang::En => "There is nothing to compact yet.",
            Lang::Ja => "要約する会話がまだありません。",
        }
    }

    pub(crate) fn nothing_to_translate(&self) -> &'static str {
        match self.lang {
            Lang::En => "There is no AI reply to translate yet.",
            Lang::Ja => "翻訳するAIの回答がまだありません。",
        }
    }

    pub(crate) fn unknown_command(&self, name: &str) -> String {
        match self.lang {
            Lang::En => format!("Unknown command: {name}"),
            Lang::Ja => format!("不明なコマンド: {name}"),
        }
    }

    pub(crate) fn fetch_failed(&self, url: &str) -> String {
        match self.lang {
            Lang::En => format!("Could not fetch {url}."),
            Lang::Ja => format!("{url}を取得できませんでした。"),
        }
    }

    pub(crate) fn directive_usage(&self, token: &str) -> String {
        match self.lang {
            Lang::En => format!("Add a description after {token}."),
            Lang::Ja => format!("{token}の後に内容を入力してください。"),
        }
    }

    pub(crate) fn setting_updated(&self, key: SettingKey, value: &str) -> String {
        let label = self.setting_label(key);
        match self.lang {
            Lang::En => format!("{label} set to {value}."),
            Lang::Ja => format!("{label}を{value}に変更しました。"),
        }
    }

    pub(crate) fn setting_already(&self, key: SettingKey, value: &str) -> String {
        let label = self.setting_label(key);
        match self.lang {
            Lang::En => format!("{label} is already {value}."),
            Lang::Ja => format!("{label}は既に{value}です。"),
        }
    }

    pub(crate) fn setting_label(&self, key: SettingKey) -> &'static str {
        match (key, self.lang) {
            (SettingKey::TranslateMode, Lang::En) => "Translate mode",
            (SettingKey::TranslateMode, Lang::Ja) => "翻訳モード",
            (SettingKey::ImageAspect, Lang::En) => "Image aspect ratio",
            (SettingKey::ImageAspect, Lang::Ja) => "画像のアスペクト比",
            (SettingKey::ImageCount, Lang::En) => "Image count",
            (SettingKey::ImageCount, Lang::Ja) => "画像の枚数",
            (SettingKey::VideoAspect, Lang::En) => "Video aspect ratio",
            (SettingKey::VideoAspect, Lang::Ja) => "動画のアスペクト比",
            (SettingKey::VideoDuration, Lang::En) => "Video duration",
            (SettingKey::VideoDuration, Lang::Ja) => "動画の長さ",
            (SettingKey::VideoResolution, Lang::En) => "Video resolution",
            (SettingKey::VideoResolution, Lang::Ja) => "動画の解像度",
            (SettingKey::VideoCount, Lang::En) => "Video count",
            (SettingKey::VideoCount, Lang::Ja) => "動画の本数",
            (SettingKey::SlideAspect, Lang::En) => "Slide aspect ratio",
            (SettingKey::SlideAspect, Lang::Ja) => "スライドのアスペクト比",
            (SettingKey::SlidePrompt, Lang::En) => "Slide prompt",
            (SettingKey::SlidePrompt, Lang::Ja) => "スライドのプロンプト",
            (SettingKey::WebSearch, Lang::En) => "Web search",
            (SettingKey::WebSearch, Lang::Ja) => "ウェブ検索",
        }
    }

    pub(crate) fn help_header(&self) -> &'static str {
        match self.lang {
            Lang::En => "Available commands:",
            Lang::Ja => "利用できるコマンド:",
        }
    }

    pub(crate) fn image_placeholder(&self, count: usize, aspect: &str) -> String {
        match self.lang {
            Lang::En => format!("(generated {count} image(s), {aspect})"),
            Lang::Ja => format!("(画像を{count}枚生成しました: {aspect})"),
        }
    }

    pub(crate) fn video_placeholder(&self, count: usize, aspect: &str) -> String {
        match self.lang {
            Lang::En => format!("(generated {count} video clip(s), {aspect})"),
            Lang::Ja => format!("(動画を{count}本生成しました: {aspect})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        let en = Locale::default();
        assert_eq!(en.role_label(Role::User), "User");
        assert_eq!(en.role_label(Role::Assistant), "AI");

        let ja = Locale::new(Lang::Ja, Tone::Friendly);
        assert_eq!(ja.role_label(Role::User), "ユーザー");
        assert_eq!(ja.role_label(Role::Assistant), "AI");
    }

    #[test]
    fn test_identity_detection_en() {
        let locale = Locale::default();
        assert!(locale.is_identity_question("Who are you exactly?"));
        assert!(locale.is_identity_question("WHAT IS YOUR NAME"));
        assert!(!locale.is_identity_question("who was the first emperor"));
    }

    #[test]
    fn test_identity_detection_ja() {
        let locale = Locale::new(Lang::Ja, Tone::Formal);
        assert!(locale.is_identity_question("あなたは誰ですか"));
        assert!(!locale.is_identity_question("今日の天気は?"));
    }

    #[test]
    fn test_identity_reply_varies_with_tone() {
        let friendly = Locale::new(Lang::En, Tone::Friendly);
        let formal = Locale::new(Lang::En, Tone::Formal);
        assert_ne!(friendly.identity_reply(), formal.identity_reply());
    }
}
