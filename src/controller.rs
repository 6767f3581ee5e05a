// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Session controller state and the input-side surface the front end talks
//! to: composer text, the command badge, suggestion keys, settings, and
//! cancellation. Dispatch flows live in [`crate::dispatch`].

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::event::KeyEvent;

use crate::autocomplete::{Candidate, KeyOutcome, SuggestState};
use crate::bridge::SettingsBridge;
use crate::config::SessionConfig;
use crate::error::Error;
use crate::gateway::{Gateway, RequestSource, TextOptions};
use crate::locale::{Lang, Locale, Tone};
use crate::output::{OutputContext, UiEvent, emit_status};
use crate::scroll::ScrollSuppressor;
use crate::session::{GenerationState, RequestToken};
use crate::settings::{SetOutcome, SettingKey, SettingsState, StoredSettings, TranslateMode};
use crate::transcript::{Transcript, TranscriptMessage};

/// Lock that tolerates a poisoned mutex. State behind these locks is plain
/// data; a panicked writer cannot leave it half-updated in a way reads care
/// about.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

/// Structured command mode the composer can sit in. The token is stripped
/// from the visible input while the badge is shown beside it, and prepended
/// again at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBadge {
    Image,
    Video,
    Slide,
}

impl CommandBadge {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Image => "@image",
            Self::Video => "@video",
            Self::Slide => "@slide",
        }
    }

    const ALL: [Self; 3] = [Self::Image, Self::Video, Self::Slide];

    /// Badge engagement while typing: the token plus a following space.
    pub(crate) fn strip(text: &str) -> Option<(Self, &str)> {
        let lowered = text.to_lowercase();
        for badge in Self::ALL {
            let token = badge.token();
            if let Some(rest) = lowered.strip_prefix(token)
                && rest.starts_with(char::is_whitespace)
                && text.is_char_boundary(token.len())
            {
                return Some((badge, text[token.len()..].trim_start()));
            }
        }
        None
    }

    /// Dispatch-time classification: the token alone or token plus text.
    pub(crate) fn parse(text: &str) -> Option<(Self, &str)> {
        let lowered = text.to_lowercase();
        for badge in Self::ALL {
            let token = badge.token();
            if let Some(rest) = lowered.strip_prefix(token)
                && (rest.is_empty() || rest.starts_with(char::is_whitespace))
                && text.is_char_boundary(token.len())
            {
                return Some((badge, text[token.len()..].trim()));
            }
        }
        None
    }
}

/// Composer-side state: visible text, active badge, suggestion panel.
#[derive(Debug, Default)]
pub(crate) struct ComposeState {
    pub(crate) input: String,
    pub(crate) badge: Option<CommandBadge>,
    pub(crate) suggest: SuggestState,
}

/// The conversational session controller.
///
/// One instance owns one conversation: its transcript, the single in-flight
/// generation slot, settings, and the composer state. All methods take
/// `&self`; interior state sits behind short-lived mutexes that are never
/// held across an await, so overlapping calls interleave safely.
pub struct SessionController<G: Gateway, B: SettingsBridge> {
    pub(crate) gateway: Arc<G>,
    pub(crate) bridge: Arc<B>,
    pub(crate) output: OutputContext,
    pub(crate) config: SessionConfig,
    pub(crate) locale: Mutex<Locale>,
    pub(crate) transcript: Mutex<Transcript>,
    pub(crate) generation: Mutex<GenerationState>,
    pub(crate) settings: Mutex<SettingsState>,
    pub(crate) compose: Mutex<ComposeState>,
    pub(crate) dispatching: AtomicBool,
    pub(crate) scroll: ScrollSuppressor,
}

impl<G, B> SessionController<G, B>
where
    G: Gateway + 'static,
    B: SettingsBridge + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        bridge: Arc<B>,
        config: SessionConfig,
        output: OutputContext,
    ) -> Self {
        let transcript = Transcript::new(config.history_ttl());
        Self {
            gateway,
            bridge,
            output,
            locale: Mutex::new(Locale::default()),
            transcript: Mutex::new(transcript),
            generation: Mutex::default(),
            settings: Mutex::default(),
            compose: Mutex::default(),
            dispatching: AtomicBool::new(false),
            scroll: ScrollSuppressor::new(),
            config,
        }
    }

    /// Pull persisted settings from the bridge. Unavailability is a soft
    /// failure: one status line, then the built-in defaults.
    pub async fn load_settings(&self) {
        match self.bridge.load().await {
            Ok(stored) => lock(&self.settings).load(stored),
            Err(Error::BridgeUnavailable(_)) => {
                let locale = self.locale();
                emit_status(&self.output, locale.unavailable().to_string());
            }
            Err(err) => {
                tracing::debug!("settings load failed: {err}");
            }
        }
    }

    pub fn locale(&self) -> Locale {
        *lock(&self.locale)
    }

    pub fn set_locale(&self, locale: Locale) {
        *lock(&self.locale) = locale;
    }

    pub fn set_language(&self, lang: Lang) {
        lock(&self.locale).lang = lang;
    }

    pub fn set_tone(&self, tone: Tone) {
        lock(&self.locale).tone = tone;
    }

    /// Visible composer text (badge token excluded).
    pub fn input(&self) -> String {
        lock(&self.compose).input.clone()
    }

    /// Replace the composer text, engaging a command badge when the text
    /// starts with `@image`/`@video`/`@slide` plus a space, and refresh the
    /// suggestion panel.
    pub fn set_input(&self, text: &str) {
        let mut compose = lock(&self.compose);
        if compose.badge.is_none()
            && let Some((badge, rest)) = CommandBadge::strip(text)
        {
            compose.badge = Some(badge);
            compose.input = rest.to_string();
        } else {
            compose.input = text.to_string();
        }
        let input = compose.input.clone();
        compose.suggest.refresh(&input);
    }

    pub fn badge(&self) -> Option<CommandBadge> {
        lock(&self.compose).badge
    }

    pub fn clear_badge(&self) {
        lock(&self.compose).badge = None;
    }

    /// Current suggestion panel rows; empty when the panel is hidden.
    pub fn candidates(&self) -> Vec<Candidate> {
        let compose = lock(&self.compose);
        if compose.suggest.visible() {
            compose.suggest.candidates().to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn selected_index(&self) -> usize {
        lock(&self.compose).suggest.selected_index()
    }

    /// Offer a key event to the suggestion panel. Returns true when the
    /// panel consumed it and the host should skip its default handling.
    pub async fn on_key(&self, key: &KeyEvent) -> bool {
        let outcome = lock(&self.compose).suggest.on_key(key);
        self.apply_outcome(outcome).await
    }

    /// Mouse-down on a rendered candidate. Mouse-down rather than click so
    /// the choice lands before the input loses focus.
    pub async fn on_candidate_mouse_down(&self, index: usize) -> bool {
        let outcome = lock(&self.compose).suggest.choose(index);
        self.apply_outcome(outcome).await
    }

    async fn apply_outcome(&self, outcome: KeyOutcome) -> bool {
        match outcome {
            KeyOutcome::Pass => false,
            KeyOutcome::Handled => true,
            KeyOutcome::Expanded(text) => {
                self.set_input(&text);
                true
            }
            KeyOutcome::Submit(text) => {
                self.set_input("");
                self.dispatch(&text, &[]).await;
                true
            }
        }
    }

    /// Send the current composer text. The composer clears immediately; the
    /// badge survives into the dispatch that consumes it.
    pub async fn submit(&self, attachments: &[crate::gateway::Attachment]) {
        let text = self.input();
        self.set_input("");
        self.dispatch(&text, attachments).await;
    }

    pub fn is_generating(&self) -> bool {
        lock(&self.generation).is_generating()
    }

    /// User-requested cancellation. The local effect is immediate: the slot
    /// is torn down and the UI returns to idle before the remote best-effort
    /// call goes out on a detached task.
    pub fn cancel(&self) {
        if !lock(&self.generation).cancel() {
            return;
        }
        let locale = self.locale();
        emit_status(&self.output, locale.canceled().to_string());
        self.output.emit(UiEvent::GenerationFinished);
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            if let Err(err) = gateway.cancel_generation().await {
                tracing::debug!("remote cancel failed: {err}");
            }
        });
    }

    /// Snapshot of the transcript for rendering.
    pub fn transcript_messages(&self) -> Vec<TranscriptMessage> {
        lock(&self.transcript).messages().to_vec()
    }

    /// Snapshot of the current settings values.
    pub fn settings(&self) -> StoredSettings {
        lock(&self.settings).snapshot()
    }

    pub fn scroll(&self) -> &ScrollSuppressor {
        &self.scroll
    }

    /// Apply one raw value to one setting, emit the updated/already status,
    /// and persist on change.
    pub async fn apply_setting(&self, key: SettingKey, raw: &str) {
        let outcome = lock(&self.settings).set(key, raw);
        let locale = self.locale();
        match outcome {
            SetOutcome::Updated { key, value } => {
                emit_status(&self.output, locale.setting_updated(key, &value));
                self.persist_settings();
            }
            SetOutcome::Already { key, value } => {
                emit_status(&self.output, locale.setting_already(key, &value));
            }
        }
    }

    /// Fold in a translate-mode change pushed by the host (another window,
    /// a settings screen). A pending local change swallows its own echo.
    pub fn apply_translate_mode_push(&self, incoming: TranslateMode) {
        use crate::settings::PushOutcome;
        match lock(&self.settings).apply_translate_push(incoming) {
            PushOutcome::Applied(mode) => {
                let locale = self.locale();
                emit_status(
                    &self.output,
                    locale.setting_updated(SettingKey::TranslateMode, mode.as_str()),
                );
            }
            PushOutcome::Acknowledged | PushOutcome::Ignored => {}
        }
    }

    /// Fire-and-forget persistence. In-memory state is already authoritative
    /// for the session, so a store failure is logged and swallowed.
    pub(crate) fn persist_settings(&self) {
        let bridge = Arc::clone(&self.bridge);
        let snapshot = lock(&self.settings).snapshot();
        tokio::spawn(async move {
            if let Err(err) = bridge.store(&snapshot).await {
                tracing::debug!("settings persist failed: {err}");
            }
        });
    }

    /// Open a new generation slot and flip the UI to its busy affordance.
    pub(crate) fn begin_generation(&self) -> RequestToken {
        let token = lock(&self.generation).begin();
        self.output.emit(UiEvent::GenerationStarted);
        token
    }

    pub(crate) fn text_options(&self, source: RequestSource) -> TextOptions {
        TextOptions {
            model: self.config.model.clone(),
            generation_config: self.config.generation_config.clone(),
            use_web_search: lock(&self.settings).values().web_search,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MockBridge;
    use crate::gateway::mock::MockGateway;
    use crate::output::OutputContext;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn controller() -> (
        SessionController<MockGateway, MockBridge>,
        UnboundedReceiver<UiEvent>,
    ) {
        let (output, rx) = OutputContext::new_channel();
        let controller = SessionController::new(
            Arc::new(MockGateway::new()),
            Arc::new(MockBridge::new()),
            SessionConfig::default(),
            output,
        );
        (controller, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn statuses(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                UiEvent::Status(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_badge_engages_on_token_plus_space() {
        let (controller, _rx) = controller();
        controller.set_input("@image a red fox");
        assert_eq!(controller.badge(), Some(CommandBadge::Image));
        assert_eq!(controller.input(), "a red fox");
    }

    #[test]
    fn test_badge_requires_following_space() {
        let (controller, _rx) = controller();
        controller.set_input("@imagery");
        assert_eq!(controller.badge(), None);
        assert_eq!(controller.input(), "@imagery");
    }

    #[test]
    fn test_badge_not_redetected_while_active() {
        let (controller, _rx) = controller();
        controller.set_input("@video launch teaser");
        assert_eq!(controller.badge(), Some(CommandBadge::Video));
        controller.set_input("@video but said twice");
        assert_eq!(controller.input(), "@video but said twice");
        controller.clear_badge();
        assert_eq!(controller.badge(), None);
    }

    #[test]
    fn test_candidates_follow_input() {
        let (controller, _rx) = controller();
        controller.set_input("/vi");
        let candidates = controller.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, "/video");

        controller.set_input("hello");
        assert!(controller.candidates().is_empty());
    }

    #[tokio::test]
    async fn test_key_navigation_and_expansion() {
        let (controller, _rx) = controller();
        controller.set_input("/video ");
        assert_eq!(controller.candidates().len(), 4);

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(controller.on_key(&down).await);
        assert_eq!(controller.selected_index(), 1);

        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert!(controller.on_key(&right).await);
        assert_eq!(controller.input(), "/video quality ");
        assert_eq!(controller.candidates().len(), 2);
    }

    #[tokio::test]
    async fn test_unhandled_key_passes_through() {
        let (controller, _rx) = controller();
        controller.set_input("plain text");
        let key = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(!controller.on_key(&key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_on_leaf_submits_and_clears_input() {
        let (controller, mut rx) = controller();
        controller.set_input("/video size 9");
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert!(controller.on_key(&enter).await);

        assert_eq!(controller.input(), "");
        assert_eq!(controller.settings().video_aspect, crate::settings::VideoAspect::Portrait);
        let events = drain(&mut rx);
        assert!(
            statuses(&events)
                .iter()
                .any(|status| status.contains("9:16"))
        );
    }

    #[tokio::test]
    async fn test_load_settings_unavailable_falls_back_with_status() {
        let (output, mut rx) = OutputContext::new_channel();
        let controller = SessionController::new(
            Arc::new(MockGateway::new()),
            Arc::new(MockBridge::unavailable()),
            SessionConfig::default(),
            output,
        );
        controller.load_settings().await;

        assert_eq!(controller.settings(), StoredSettings::default());
        let events = drain(&mut rx);
        assert_eq!(statuses(&events), vec!["Settings are unavailable right now."]);
    }

    #[tokio::test]
    async fn test_load_settings_applies_stored_values() {
        let mut stored = StoredSettings::default();
        stored.image_count = 3;
        let (output, _rx) = OutputContext::new_channel();
        let controller = SessionController::new(
            Arc::new(MockGateway::new()),
            Arc::new(MockBridge::seeded(stored.clone())),
            SessionConfig::default(),
            output,
        );
        controller.load_settings().await;
        assert_eq!(controller.settings(), stored);
    }

    #[tokio::test]
    async fn test_load_settings_clamps_out_of_domain_counts() {
        let mut stored = StoredSettings::default();
        stored.image_count = 200;
        let (output, _rx) = OutputContext::new_channel();
        let controller = SessionController::new(
            Arc::new(MockGateway::new()),
            Arc::new(MockBridge::seeded(stored)),
            SessionConfig::default(),
            output,
        );
        controller.load_settings().await;
        assert_eq!(controller.settings().image_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_setting_persists_once_per_change() {
        let (output, mut rx) = OutputContext::new_channel();
        let bridge = Arc::new(MockBridge::new());
        let controller = SessionController::new(
            Arc::new(MockGateway::new()),
            Arc::clone(&bridge),
            SessionConfig::default(),
            output,
        );

        controller.apply_setting(SettingKey::ImageCount, "2").await;
        controller.apply_setting(SettingKey::ImageCount, "2").await;
        // Let the spawned store task settle.
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;

        assert_eq!(bridge.store_calls(), 1);
        assert_eq!(bridge.stored().image_count, 2);
        let statuses = statuses(&drain(&mut rx));
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].contains("set to 2"));
        assert!(statuses[1].contains("already"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_translate_push_echo_is_silent_but_external_change_is_not() {
        let (controller, mut rx) = controller();
        controller
            .apply_setting(SettingKey::TranslateMode, "literal")
            .await;
        drain(&mut rx);

        // Echo of the local change: no status.
        controller.apply_translate_mode_push(TranslateMode::Literal);
        assert!(statuses(&drain(&mut rx)).is_empty());

        // Genuinely external change: one status.
        controller.apply_translate_mode_push(TranslateMode::Free);
        let statuses = statuses(&drain(&mut rx));
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].contains("free"));
        assert_eq!(
            controller.settings().translate_mode,
            TranslateMode::Free
        );
    }

    #[tokio::test]
    async fn test_cancel_without_generation_is_silent() {
        let (controller, mut rx) = controller();
        controller.cancel();
        assert!(drain(&mut rx).is_empty());
    }
}
