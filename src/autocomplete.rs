// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Suggestion panel state for slash commands. Pure functions over the
//! command tree plus a small reducer the host feeds key events into.

use crossterm::event::{KeyCode, KeyEvent};

use crate::commands::{COMMANDS, CommandNode};

/// One row of the suggestion panel. `value` is the full canonical path,
/// for example `/video size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub description: &'static str,
    /// Separator appended when expanding into this candidate's children.
    pub separator: &'static str,
    pub has_children: bool,
}

impl Candidate {
    /// Composer text after choosing this candidate. Parents re-open the
    /// panel on their children by ending with their separator.
    pub fn expansion(&self) -> String {
        if self.has_children {
            format!("{}{}", self.value, self.separator)
        } else {
            self.value.clone()
        }
    }
}

/// Candidates for the current composer text. Empty unless the text starts
/// with `/`. Matching is case-insensitive; values keep canonical case.
pub fn candidates_for(input: &str) -> Vec<Candidate> {
    let trimmed = input.trim_start();
    if !trimmed.starts_with('/') {
        return Vec::new();
    }
    let lowered = trimmed.to_lowercase();
    let mut out = Vec::new();
    collect(COMMANDS, "", &lowered, &mut out);
    out
}

/// Walk one level of the tree. `prefix` is the canonical path already
/// matched, including the trailing separator. A fully matched token followed
/// by its separator descends; anything else prefix-filters the level, so a
/// bare separator ending lists every child unfiltered.
fn collect(nodes: &'static [CommandNode], prefix: &str, rest: &str, out: &mut Vec<Candidate>) {
    for node in nodes {
        let value = format!("{prefix}{}", node.token);
        if let Some(after) = rest.strip_prefix(node.token)
            && let Some(next) = after.strip_prefix(node.separator)
            && !node.children.is_empty()
        {
            let child_prefix = format!("{value}{}", node.separator);
            collect(node.children, &child_prefix, next, out);
            continue;
        }
        if node.token.starts_with(rest) {
            out.push(Candidate {
                value,
                description: node.description,
                separator: node.separator,
                has_children: !node.children.is_empty(),
            });
        }
    }
}

/// What the host should do with a key event it offered to the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not consumed; apply the default editing behavior.
    Pass,
    /// Consumed; composer text unchanged.
    Handled,
    /// Consumed; replace the composer text with this string.
    Expanded(String),
    /// Consumed; submit this string as the final input.
    Submit(String),
}

/// Suggestion panel state. The host refreshes it on every edit and offers
/// it key events before its own handling.
#[derive(Debug, Default)]
pub(crate) struct SuggestState {
    candidates: Vec<Candidate>,
    selected: usize,
    dismissed: bool,
}

impl SuggestState {
    /// Recompute candidates for the new composer text. Any Escape dismissal
    /// ends here, with the selection back on the first row.
    pub(crate) fn refresh(&mut self, input: &str) {
        self.candidates = candidates_for(input);
        self.selected = 0;
        self.dismissed = false;
    }

    pub(crate) fn visible(&self) -> bool {
        !self.dismissed && !self.candidates.is_empty()
    }

    pub(crate) fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub(crate) fn selected_index(&self) -> usize {
        self.selected
    }

    pub(crate) fn selected_candidate(&self) -> Option<&Candidate> {
        if !self.visible() {
            return None;
        }
        self.candidates.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let len = self.candidates.len() as isize;
        if len == 0 {
            return;
        }
        let selected = self.selected as isize;
        self.selected = (selected + delta).rem_euclid(len) as usize;
    }

    /// Choose the candidate under the pointer. Same outcome as pressing
    /// Enter on it.
    pub(crate) fn choose(&mut self, index: usize) -> KeyOutcome {
        if !self.visible() || index >= self.candidates.len() {
            return KeyOutcome::Pass;
        }
        self.selected = index;
        self.confirm()
    }

    pub(crate) fn on_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.visible() {
            return KeyOutcome::Pass;
        }
        match key.code {
            KeyCode::Down | KeyCode::Tab => {
                self.move_selection(1);
                KeyOutcome::Handled
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.move_selection(-1);
                KeyOutcome::Handled
            }
            // Right expands a parent into its children; on a leaf the key
            // falls through to normal cursor movement.
            KeyCode::Right => match self.selected_candidate() {
                Some(candidate) if candidate.has_children => {
                    KeyOutcome::Expanded(candidate.expansion())
                }
                _ => KeyOutcome::Pass,
            },
            KeyCode::Enter => self.confirm(),
            KeyCode::Esc => {
                self.dismissed = true;
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Pass,
        }
    }

    /// Enter semantics: parents drill in like Tab, leaves submit their full
    /// path immediately.
    fn confirm(&mut self) -> KeyOutcome {
        match self.selected_candidate() {
            Some(candidate) if candidate.has_children => {
                KeyOutcome::Expanded(candidate.expansion())
            }
            Some(candidate) => KeyOutcome::Submit(candidate.value.clone()),
            None => KeyOutcome::Pass,
        }
    }
}
