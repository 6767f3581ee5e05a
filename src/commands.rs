// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Slash command definitions: one static tree drives both the suggestion
//! panel and execution routing.

use crate::locale::Locale;

/// One node of the slash-command tree.
#[derive(Debug, Clone, Copy)]
pub struct CommandNode {
    /// Canonical lowercase match string. Root nodes carry the leading `/`.
    pub token: &'static str,
    pub description: &'static str,
    /// Joins this node's full prefix to its children.
    pub separator: &'static str,
    pub children: &'static [CommandNode],
}

const fn leaf(token: &'static str, description: &'static str) -> CommandNode {
    CommandNode {
        token,
        description,
        separator: " ",
        children: &[],
    }
}

const IMAGE_SIZES: &[CommandNode] = &[
    leaf("1:1", "Square"),
    leaf("16:9", "Landscape"),
    leaf("9:16", "Portrait"),
    leaf("4:3", "Standard"),
    leaf("3:4", "Tall"),
];

const IMAGE_COUNTS: &[CommandNode] = &[leaf("1", ""), leaf("2", ""), leaf("3", ""), leaf("4", "")];

const VIDEO_SIZES: &[CommandNode] = &[leaf("16:9", "Landscape"), leaf("9:16", "Portrait")];

const VIDEO_QUALITIES: &[CommandNode] = &[leaf("720p", "HD"), leaf("1080p", "Full HD")];

const VIDEO_DURATIONS: &[CommandNode] =
    &[leaf("5", ""), leaf("6", ""), leaf("7", ""), leaf("8", "")];

const VIDEO_COUNTS: &[CommandNode] = &[leaf("1", ""), leaf("2", "")];

const SLIDE_SIZES: &[CommandNode] = &[leaf("16:9", "Widescreen"), leaf("4:3", "Standard")];

const TRANSLATE_MODES: &[CommandNode] = &[
    leaf("literal", "Stay close to the original wording"),
    leaf("free", "Prioritize natural phrasing"),
];

const IMAGE_CHILDREN: &[CommandNode] = &[
    CommandNode {
        token: "size",
        description: "Aspect ratio for generated images",
        separator: " ",
        children: IMAGE_SIZES,
    },
    CommandNode {
        token: "count",
        description: "Images per request",
        separator: " ",
        children: IMAGE_COUNTS,
    },
];

const VIDEO_CHILDREN: &[CommandNode] = &[
    CommandNode {
        token: "size",
        description: "Aspect ratio for generated clips",
        separator: " ",
        children: VIDEO_SIZES,
    },
    CommandNode {
        token: "quality",
        description: "Clip resolution",
        separator: " ",
        children: VIDEO_QUALITIES,
    },
    CommandNode {
        token: "duration",
        description: "Clip length in seconds",
        separator: " ",
        children: VIDEO_DURATIONS,
    },
    CommandNode {
        token: "count",
        description: "Clips per request",
        separator: " ",
        children: VIDEO_COUNTS,
    },
];

const SLIDE_CHILDREN: &[CommandNode] = &[
    CommandNode {
        token: "size",
        description: "Slide aspect ratio",
        separator: " ",
        children: SLIDE_SIZES,
    },
    leaf("prompt", "Set a custom slide-authoring prompt"),
];

const SEARCH_CHILDREN: &[CommandNode] = &[
    leaf("on", "Allow web search during replies"),
    leaf("off", "Answer from the model alone"),
];

const TRANSLATE_CHILDREN: &[CommandNode] = &[
    leaf("english", "English"),
    leaf("japanese", "Japanese"),
    leaf("chinese", "Chinese"),
    leaf("korean", "Korean"),
    leaf("french", "French"),
    leaf("german", "German"),
    leaf("spanish", "Spanish"),
    leaf("italian", "Italian"),
    CommandNode {
        token: "mode",
        description: "literal or free translation",
        separator: " ",
        children: TRANSLATE_MODES,
    },
];

pub const COMMANDS: &[CommandNode] = &[
    leaf("/clear", "Clear the conversation"),
    leaf("/compact", "Summarize the conversation to free up context"),
    leaf("/help", "Show available commands"),
    CommandNode {
        token: "/image",
        description: "Image generation settings",
        separator: " ",
        children: IMAGE_CHILDREN,
    },
    CommandNode {
        token: "/search",
        description: "Toggle web search",
        separator: " ",
        children: SEARCH_CHILDREN,
    },
    CommandNode {
        token: "/slide",
        description: "Slide generation settings",
        separator: " ",
        children: SLIDE_CHILDREN,
    },
    CommandNode {
        token: "/translate",
        description: "Translate the last AI reply",
        separator: "_",
        children: TRANSLATE_CHILDREN,
    },
    CommandNode {
        token: "/video",
        description: "Video generation settings",
        separator: " ",
        children: VIDEO_CHILDREN,
    },
];

/// Typed command produced by [`parse`]. Setting values stay raw here; the
/// settings state machine normalizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Compact,
    Help,
    SetImageAspect(String),
    SetImageCount(String),
    SetSlideAspect(String),
    SetSlidePrompt(String),
    SetTranslateMode(String),
    SetVideoAspect(String),
    SetVideoCount(String),
    SetVideoDuration(String),
    SetVideoQuality(String),
    SetWebSearch(String),
    Translate { language: String },
}

/// Argument-taking routes. Matched against the lowered input; the argument is
/// cut from the original input so user text keeps its case.
const ROUTES: &[(&str, fn(String) -> Command)] = &[
    ("/image count", Command::SetImageCount),
    ("/image size", Command::SetImageAspect),
    ("/search", Command::SetWebSearch),
    ("/slide prompt", Command::SetSlidePrompt),
    ("/slide size", Command::SetSlideAspect),
    ("/translate_mode", Command::SetTranslateMode),
    ("/video count", Command::SetVideoCount),
    ("/video duration", Command::SetVideoDuration),
    ("/video quality", Command::SetVideoQuality),
    ("/video size", Command::SetVideoAspect),
];

/// Resolve a slash input to a typed command. Resolution order: exact simple
/// commands, then the argument routes above, then the `/translate_<language>`
/// fallback. Unknown input yields None and a status line, never an error.
pub(crate) fn parse(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    match lowered.as_str() {
        "/clear" => return Some(Command::Clear),
        "/compact" => return Some(Command::Compact),
        "/help" => return Some(Command::Help),
        _ => {}
    }

    for (prefix, build) in ROUTES {
        let Some(rest) = lowered.strip_prefix(prefix) else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }
        // Unicode lowercasing can shift byte offsets; fall back to the
        // lowered slice when the original does not line up.
        let arg = if trimmed.is_char_boundary(prefix.len()) {
            trimmed[prefix.len()..].trim()
        } else {
            rest.trim()
        };
        return Some(build(arg.to_string()));
    }

    if let Some(rest) = lowered.strip_prefix("/translate_")
        && let Some(language) = rest.split_whitespace().next()
    {
        return Some(Command::Translate {
            language: language.to_string(),
        });
    }

    None
}

/// Render the command list for the /help status message.
pub(crate) fn help_text(locale: &Locale) -> String {
    let mut lines = vec![locale.help_header().to_string()];
    for node in COMMANDS {
        if node.children.is_empty() {
            lines.push(format!("  {} - {}", node.token, node.description));
        } else {
            let children: Vec<&str> = node.children.iter().map(|child| child.token).collect();
            lines.push(format!(
                "  {}{}<{}> - {}",
                node.token,
                node.separator,
                children.join("|"),
                node.description
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("/clear"), Some(Command::Clear));
        assert_eq!(parse("  /compact  "), Some(Command::Compact));
        assert_eq!(parse("/HELP"), Some(Command::Help));
    }

    #[test]
    fn test_parse_setting_routes() {
        assert_eq!(
            parse("/image count 2"),
            Some(Command::SetImageCount("2".to_string()))
        );
        assert_eq!(
            parse("/video duration 8"),
            Some(Command::SetVideoDuration("8".to_string()))
        );
        assert_eq!(
            parse("/VIDEO SIZE 9:16"),
            Some(Command::SetVideoAspect("9:16".to_string()))
        );
        assert_eq!(
            parse("/search on"),
            Some(Command::SetWebSearch("on".to_string()))
        );
    }

    #[test]
    fn test_parse_preserves_argument_case() {
        assert_eq!(
            parse("/slide prompt Launch Deck for ACME"),
            Some(Command::SetSlidePrompt("Launch Deck for ACME".to_string()))
        );
    }

    #[test]
    fn test_parse_translate_language() {
        assert_eq!(
            parse("/translate_japanese"),
            Some(Command::Translate {
                language: "japanese".to_string()
            })
        );
        assert_eq!(
            parse("/translate_mode literal"),
            Some(Command::SetTranslateMode("literal".to_string()))
        );
    }

    #[test]
    fn test_parse_bare_parents_and_unknown() {
        assert_eq!(parse("/image"), None);
        assert_eq!(parse("/translate"), None);
        assert_eq!(parse("/bogus"), None);
        // Token boundaries matter: "countx" is not "count".
        assert_eq!(parse("/image countx"), None);
    }

    #[test]
    fn test_parse_empty_argument_routes() {
        assert_eq!(
            parse("/image count"),
            Some(Command::SetImageCount(String::new()))
        );
    }

    #[test]
    fn test_help_text_lists_every_root() {
        let help = help_text(&Locale::default());
        for node in COMMANDS {
            assert!(help.contains(node.token), "missing {}", node.token);
        }
    }
}
