// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::sync::Arc;

use tokio::sync::mpsc;

/// Events the controller pushes to whatever front end is attached.
///
/// Status and error lines travel here only; they are never written into the
/// transcript that feeds prompt context.
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A generation request went out; swap "send" for a stop affordance.
    GenerationStarted,
    /// The current generation finished, failed, or was canceled; back to idle.
    GenerationFinished,
    /// An assistant reply was appended to the transcript.
    AssistantReply { text: String, sources: Vec<String> },
    /// A generated image is ready (base64 payload).
    ImageReady { data: String, mime_type: String },
    /// A generated video clip is ready (base64 payload).
    VideoReady { data: String, mime_type: String },
    /// Transient status line (canceled, updated, already set, help).
    Status(String),
    /// Error status line.
    Error(String),
    /// The transcript was cleared wholesale.
    TranscriptCleared,
    /// The transcript was replaced by a summary.
    TranscriptCompacted { messages_compacted: usize },
}

/// Trait for listening to controller events synchronously.
pub trait UiListener: Send + Sync {
    fn on_event(&self, event: &UiEvent);
}

/// Context for emitting controller events. Cheap to clone (Arc internally).
#[derive(Clone, Default)]
pub struct OutputContext {
    listener: Option<Arc<dyn UiListener>>,
    event_sender: Option<mpsc::UnboundedSender<UiEvent>>,
}

impl OutputContext {
    /// Create an output context that calls a listener on every event.
    pub fn new_listener(listener: Arc<dyn UiListener>) -> Self {
        Self {
            listener: Some(listener),
            event_sender: None,
        }
    }

    /// Create an output context backed by an event channel, returning the
    /// receiving half for the front end's event loop.
    pub fn new_channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = Self {
            listener: None,
            event_sender: Some(tx),
        };
        (ctx, rx)
    }

    /// Create a null output context that discards all events.
    pub fn null() -> Self {
        Self {
            listener: None,
            event_sender: None,
        }
    }

    /// Emit an event to both listener and channel.
    pub(crate) fn emit(&self, event: UiEvent) {
        if let Some(listener) = &self.listener {
            listener.on_event(&event);
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

/// Emit a transient status line.
pub(crate) fn emit_status(ctx: &OutputContext, message: String) {
    ctx.emit(UiEvent::Status(message));
}

/// Emit an error status line.
pub(crate) fn emit_error(ctx: &OutputContext, message: String) {
    ctx.emit(UiEvent::Error(message));
}
