// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Tunable generation settings. Every setting follows the same shape: a
//! small domain, normalize-toward-default on bad input, an "already set"
//! short circuit, and fire-and-forget persistence handled by the caller.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

const IMAGE_COUNTS: RangeInclusive<u8> = 1..=4;
const VIDEO_DURATIONS: RangeInclusive<u8> = 5..=8;
const VIDEO_COUNTS: RangeInclusive<u8> = 1..=2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateMode {
    Literal,
    Free,
}

impl TranslateMode {
    pub(crate) fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "literal" => Self::Literal,
            "free" => Self::Free,
            _ => Self::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Free => "free",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageAspect {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Tall,
}

impl ImageAspect {
    pub(crate) fn normalize(raw: &str) -> Self {
        match raw.trim() {
            "1:1" => Self::Square,
            "16:9" => Self::Landscape,
            "9:16" => Self::Portrait,
            "4:3" => Self::Standard,
            "3:4" => Self::Tall,
            _ => Self::Square,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Standard => "4:3",
            Self::Tall => "3:4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoAspect {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl VideoAspect {
    pub(crate) fn normalize(raw: &str) -> Self {
        match raw.trim() {
            "9:16" => Self::Portrait,
            _ => Self::Landscape,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoResolution {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Fhd1080,
}

impl VideoResolution {
    pub(crate) fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "1080p" | "1080" => Self::Fhd1080,
            _ => Self::Hd720,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Fhd1080 => "1080p",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideAspect {
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "4:3")]
    Standard,
}

impl SlideAspect {
    pub(crate) fn normalize(raw: &str) -> Self {
        match raw.trim() {
            "4:3" => Self::Standard,
            _ => Self::Wide,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wide => "16:9",
            Self::Standard => "4:3",
        }
    }
}

/// Clamp a numeric argument to a contiguous domain. Unparseable input takes
/// the default; out-of-range input takes the nearest member.
fn clamp_numeric(raw: &str, domain: RangeInclusive<u8>, default: u8) -> u8 {
    match raw.trim().parse::<i64>() {
        Ok(value) => {
            value.clamp(i64::from(*domain.start()), i64::from(*domain.end())) as u8
        }
        Err(_) => default,
    }
}

/// Nearest domain member for an already-numeric value.
fn clamp_loaded(value: u8, domain: RangeInclusive<u8>) -> u8 {
    value.clamp(*domain.start(), *domain.end())
}

fn parse_toggle(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "on" | "true" | "1")
}

/// Identifies a setting in status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    TranslateMode,
    ImageAspect,
    ImageCount,
    VideoAspect,
    VideoDuration,
    VideoResolution,
    VideoCount,
    SlideAspect,
    SlidePrompt,
    WebSearch,
}

/// The persisted shape. Missing fields take the built-in defaults, so old
/// files keep loading as settings are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    pub translate_mode: TranslateMode,
    pub image_aspect: ImageAspect,
    pub image_count: u8,
    pub video_aspect: VideoAspect,
    pub video_resolution: VideoResolution,
    pub video_duration_secs: u8,
    pub video_count: u8,
    pub slide_aspect: SlideAspect,
    pub slide_prompt: Option<String>,
    pub web_search: bool,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            translate_mode: TranslateMode::Free,
            image_aspect: ImageAspect::Square,
            image_count: 1,
            video_aspect: VideoAspect::Landscape,
            video_resolution: VideoResolution::Hd720,
            video_duration_secs: 5,
            video_count: 1,
            slide_aspect: SlideAspect::Wide,
            slide_prompt: None,
            web_search: false,
        }
    }
}

/// Result of a set transition. Carries the display value for the status
/// line so callers do not re-derive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SetOutcome {
    Updated { key: SettingKey, value: String },
    Already { key: SettingKey, value: String },
}

/// Result of an external translate-mode push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// Echo of a change made locally; suppress the status line once.
    Acknowledged,
    /// Genuinely external change, now applied.
    Applied(TranslateMode),
    /// Matches current state with nothing pending.
    Ignored,
}

/// In-memory settings. Authoritative for the session; the bridge is only a
/// best-effort mirror.
#[derive(Debug, Default)]
pub(crate) struct SettingsState {
    values: StoredSettings,
    pending_translate_ack: Option<TranslateMode>,
}

impl SettingsState {
    /// Replace everything with a loaded snapshot. Numeric fields are pinned
    /// to the same domains `set` enforces, so a hand-edited or stale file
    /// cannot carry a count or duration outside its bounds into the
    /// session. Enum fields cannot deserialize out of domain.
    pub(crate) fn load(&mut self, stored: StoredSettings) {
        self.values = StoredSettings {
            image_count: clamp_loaded(stored.image_count, IMAGE_COUNTS),
            video_duration_secs: clamp_loaded(stored.video_duration_secs, VIDEO_DURATIONS),
            video_count: clamp_loaded(stored.video_count, VIDEO_COUNTS),
            ..stored
        };
        self.pending_translate_ack = None;
    }

    pub(crate) fn snapshot(&self) -> StoredSettings {
        self.values.clone()
    }

    pub(crate) fn values(&self) -> &StoredSettings {
        &self.values
    }

    /// Apply one raw argument to one setting. Never fails; bad input lands
    /// on the domain default or the nearest member.
    pub(crate) fn set(&mut self, key: SettingKey, raw: &str) -> SetOutcome {
        match key {
            SettingKey::TranslateMode => {
                let next = TranslateMode::normalize(raw);
                if self.values.translate_mode == next {
                    return already(key, next.as_str());
                }
                self.values.translate_mode = next;
                self.pending_translate_ack = Some(next);
                updated(key, next.as_str())
            }
            SettingKey::ImageAspect => {
                let next = ImageAspect::normalize(raw);
                if self.values.image_aspect == next {
                    return already(key, next.as_str());
                }
                self.values.image_aspect = next;
                updated(key, next.as_str())
            }
            SettingKey::ImageCount => {
                let next = clamp_numeric(raw, IMAGE_COUNTS, 1);
                if self.values.image_count == next {
                    return already(key, &next.to_string());
                }
                self.values.image_count = next;
                updated(key, &next.to_string())
            }
            SettingKey::VideoAspect => {
                let next = VideoAspect::normalize(raw);
                if self.values.video_aspect == next {
                    return already(key, next.as_str());
                }
                self.values.video_aspect = next;
                updated(key, next.as_str())
            }
            SettingKey::VideoDuration => {
                let next = clamp_numeric(raw, VIDEO_DURATIONS, 5);
                if self.values.video_duration_secs == next {
                    return already(key, &format!("{next}s"));
                }
                self.values.video_duration_secs = next;
                updated(key, &format!("{next}s"))
            }
            SettingKey::VideoResolution => {
                let next = VideoResolution::normalize(raw);
                if self.values.video_resolution == next {
                    return already(key, next.as_str());
                }
                self.values.video_resolution = next;
                updated(key, next.as_str())
            }
            SettingKey::VideoCount => {
                let next = clamp_numeric(raw, VIDEO_COUNTS, 1);
                if self.values.video_count == next {
                    return already(key, &next.to_string());
                }
                self.values.video_count = next;
                updated(key, &next.to_string())
            }
            SettingKey::SlideAspect => {
                let next = SlideAspect::normalize(raw);
                if self.values.slide_aspect == next {
                    return already(key, next.as_str());
                }
                self.values.slide_aspect = next;
                updated(key, next.as_str())
            }
            SettingKey::SlidePrompt => {
                let trimmed = raw.trim();
                let next = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                };
                let display = if trimmed.is_empty() { "default" } else { trimmed };
                if self.values.slide_prompt == next {
                    return already(key, display);
                }
                self.values.slide_prompt = next;
                updated(key, display)
            }
            SettingKey::WebSearch => {
                let next = parse_toggle(raw);
                let display = if next { "on" } else { "off" };
                if self.values.web_search == next {
                    return already(key, display);
                }
                self.values.web_search = next;
                updated(key, display)
            }
        }
    }

    /// Fold in a translate-mode change pushed from outside the session.
    /// A pending local change suppresses its own echo exactly once.
    pub(crate) fn apply_translate_push(&mut self, incoming: TranslateMode) -> PushOutcome {
        if self.pending_translate_ack == Some(incoming) {
            self.pending_translate_ack = None;
            return PushOutcome::Acknowledged;
        }
        if self.values.translate_mode == incoming {
            return PushOutcome::Ignored;
        }
        self.values.translate_mode = incoming;
        PushOutcome::Applied(incoming)
    }

    #[cfg(test)]
    pub(crate) fn has_pending_translate_ack(&self) -> bool {
        self.pending_translate_ack.is_some()
    }
}

fn updated(key: SettingKey, value: &str) -> SetOutcome {
    SetOutcome::Updated {
        key,
        value: value.to_string(),
    }
}

fn already(key: SettingKey, value: &str) -> SetOutcome {
    SetOutcome::Already {
        key,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_normalize_falls_back_to_default() {
        assert_eq!(ImageAspect::normalize("16:9"), ImageAspect::Landscape);
        assert_eq!(ImageAspect::normalize(" 9:16 "), ImageAspect::Portrait);
        assert_eq!(ImageAspect::normalize("huge"), ImageAspect::Square);
        assert_eq!(TranslateMode::normalize("LITERAL"), TranslateMode::Literal);
        assert_eq!(TranslateMode::normalize("poetic"), TranslateMode::Free);
        assert_eq!(VideoResolution::normalize("1080"), VideoResolution::Fhd1080);
    }

    #[test]
    fn test_numeric_clamp_to_nearest_member() {
        assert_eq!(clamp_numeric("3", IMAGE_COUNTS, 1), 3);
        assert_eq!(clamp_numeric("7", IMAGE_COUNTS, 1), 4);
        assert_eq!(clamp_numeric("0", IMAGE_COUNTS, 1), 1);
        assert_eq!(clamp_numeric("-2", VIDEO_DURATIONS, 5), 5);
        assert_eq!(clamp_numeric("many", IMAGE_COUNTS, 1), 1);
    }

    #[test]
    fn test_load_clamps_numeric_fields_into_domain() {
        let mut stored = StoredSettings::default();
        stored.image_count = 200;
        stored.video_duration_secs = 1;
        stored.video_count = 0;

        let mut state = SettingsState::default();
        state.load(stored);
        assert_eq!(state.values().image_count, 4);
        assert_eq!(state.values().video_duration_secs, 5);
        assert_eq!(state.values().video_count, 1);
    }

    #[test]
    fn test_set_then_set_again_reports_already() {
        let mut state = SettingsState::default();
        assert_eq!(
            state.set(SettingKey::ImageCount, "2"),
            SetOutcome::Updated {
                key: SettingKey::ImageCount,
                value: "2".to_string()
            }
        );
        assert_eq!(
            state.set(SettingKey::ImageCount, "2"),
            SetOutcome::Already {
                key: SettingKey::ImageCount,
                value: "2".to_string()
            }
        );
        assert_eq!(state.values().image_count, 2);
    }

    #[test]
    fn test_invalid_value_lands_on_default_and_may_report_already() {
        let mut state = SettingsState::default();
        // Default image aspect is 1:1, so a bad value is a no-op transition.
        assert_eq!(
            state.set(SettingKey::ImageAspect, "round"),
            SetOutcome::Already {
                key: SettingKey::ImageAspect,
                value: "1:1".to_string()
            }
        );
    }

    #[test]
    fn test_translate_push_acknowledged_exactly_once() {
        let mut state = SettingsState::default();
        state.set(SettingKey::TranslateMode, "literal");
        assert!(state.has_pending_translate_ack());

        assert_eq!(
            state.apply_translate_push(TranslateMode::Literal),
            PushOutcome::Acknowledged
        );
        assert!(!state.has_pending_translate_ack());
        assert_eq!(
            state.apply_translate_push(TranslateMode::Literal),
            PushOutcome::Ignored
        );
        assert_eq!(
            state.apply_translate_push(TranslateMode::Free),
            PushOutcome::Applied(TranslateMode::Free)
        );
        assert_eq!(state.values().translate_mode, TranslateMode::Free);
    }

    #[test]
    fn test_slide_prompt_set_and_reset() {
        let mut state = SettingsState::default();
        assert_eq!(
            state.set(SettingKey::SlidePrompt, "  Launch deck "),
            SetOutcome::Updated {
                key: SettingKey::SlidePrompt,
                value: "Launch deck".to_string()
            }
        );
        assert_eq!(
            state.set(SettingKey::SlidePrompt, ""),
            SetOutcome::Updated {
                key: SettingKey::SlidePrompt,
                value: "default".to_string()
            }
        );
        assert_eq!(state.values().slide_prompt, None);
    }

    #[test]
    fn test_stored_settings_partial_json_fills_defaults() {
        let stored: StoredSettings = serde_json::from_str(r#"{"image_count":3}"#).unwrap();
        assert_eq!(stored.image_count, 3);
        assert_eq!(stored.translate_mode, TranslateMode::Free);
        assert_eq!(stored.video_duration_secs, 5);

        let json = serde_json::to_string(&StoredSettings::default()).unwrap();
        assert!(json.contains("\"image_aspect\":\"1:1\""));
        assert!(json.contains("\"video_resolution\":\"720p\""));
    }
}
