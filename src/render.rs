//! Terminal rendering of the session state. Pure string building; the REPL
//! decides when to print.

use chrono::Local;
use crossterm::style::{Color, Stylize};

use crate::locale;
use crate::message::{Language, Message, SessionState, Theme};

struct Palette {
    accent: Color,
    user: Color,
    assistant: Color,
    muted: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: Color::Yellow,
            user: Color::Cyan,
            assistant: Color::Yellow,
            muted: Color::DarkGrey,
        },
        Theme::Light => Palette {
            accent: Color::DarkYellow,
            user: Color::DarkBlue,
            assistant: Color::DarkYellow,
            muted: Color::Grey,
        },
    }
}

/// Title bar: product title, then the avatar marker or name initial and the name.
pub fn header(state: &SessionState, title: &str) -> String {
    let colors = palette(state.theme);
    let mut line = format!("{}", title.with(colors.accent).bold());
    if let Some(profile) = &state.profile {
        let badge = if profile.avatar.is_some() {
            "◉".to_string()
        } else {
            format!("[{}]", profile.initial())
        };
        line.push_str(&format!("  {} {}", badge.with(colors.accent), profile.name));
    }
    line
}

/// Onboarding text shown while the conversation is empty.
pub fn empty_state(language: Language, theme: Theme) -> String {
    let colors = palette(theme);
    let mut out = String::new();
    out.push_str(&format!("{}\n", locale::welcome_title(language).with(colors.accent).bold()));
    out.push_str(locale::welcome_body(language));
    out.push('\n');
    out.push_str(&format!("\n{}\n", locale::features_heading(language).bold()));
    for feature in locale::features(language) {
        out.push_str(&format!("  • {feature}\n"));
    }
    out.push_str(&format!("\n{}", locale::disclaimer(language).with(colors.muted)));
    out
}

pub fn message_line(message: &Message, language: Language, theme: Theme) -> String {
    let colors = palette(theme);
    let time = message.timestamp.with_timezone(&Local).format("%H:%M").to_string();
    let sender = if message.origin.is_assistant() {
        locale::assistant(language).with(colors.assistant).bold()
    } else {
        locale::you(language).with(colors.user).bold()
    };
    format!("{} {}: {}", time.with(colors.muted), sender, message.text)
}

pub fn loading_line(language: Language, theme: Theme) -> String {
    format!("{}", locale::loading(language).with(palette(theme).muted).italic())
}

/// Clipboard text for the latest assistant reply, signed with the
/// attribution line.
pub fn copy_text(messages: &[Message], language: Language) -> Option<String> {
    let reply = messages.iter().rev().find(|m| m.origin.is_assistant())?;
    Some(format!("{}\n\n{}", reply.text, locale::attribution(language)))
}

/// The whole conversation pane: onboarding when empty, otherwise the
/// ordered messages followed by the loading indicator while a request runs.
pub fn conversation(state: &SessionState) -> String {
    if state.messages.is_empty() && !state.loading {
        return empty_state(state.language, state.theme);
    }
    let mut lines: Vec<String> = state
        .messages
        .iter()
        .map(|m| message_line(m, state.language, state.theme))
        .collect();
    if state.loading {
        lines.push(loading_line(state.language, state.theme));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Gender, UserProfile};

    fn state_with_profile(avatar: Option<&str>) -> SessionState {
        SessionState {
            profile: Some(UserProfile {
                name: "Sara".to_string(),
                gender: Gender::Female,
                avatar: avatar.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_shows_initial_without_avatar() {
        let header = header(&state_with_profile(None), "Fatwa AI");
        assert!(header.contains("Fatwa AI"));
        assert!(header.contains("[S]"));
        assert!(header.contains("Sara"));
    }

    #[test]
    fn test_header_shows_marker_with_avatar() {
        let header = header(&state_with_profile(Some("data:image/png;base64,AA==")), "x");
        assert!(header.contains('◉'));
        assert!(!header.contains("[S]"));
    }

    #[test]
    fn test_empty_conversation_shows_onboarding() {
        let state = SessionState {
            language: Language::English,
            ..Default::default()
        };
        let out = conversation(&state);
        assert!(out.contains("Welcome to Fatwa AI!"));
        assert!(out.contains("Bilingual support (Arabic & English)"));
        assert!(out.contains("AI can make mistakes"));
    }

    #[test]
    fn test_messages_render_in_order_with_loading() {
        let state = SessionState {
            messages: vec![Message::user("first question"), Message::assistant("first answer")],
            loading: true,
            language: Language::English,
            ..Default::default()
        };
        let out = conversation(&state);
        let q = out.find("first question").unwrap();
        let a = out.find("first answer").unwrap();
        assert!(q < a);
        assert!(out.contains("You"));
        assert!(out.contains("Mufti"));
        assert!(out.ends_with(&loading_line(Language::English, Theme::Dark)));
        assert!(!out.contains("Welcome"));
    }

    #[test]
    fn test_copy_text_takes_latest_reply() {
        let messages = vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
            Message::user("q3"),
        ];
        assert_eq!(
            copy_text(&messages, Language::English).as_deref(),
            Some("a2\n\nGuidance by IrshadAI - irshadai.vercel.app")
        );
        assert_eq!(
            copy_text(&messages, Language::Arabic).as_deref(),
            Some("a2\n\nإرشاد من إرشاد - irshadai.vercel.app")
        );
        assert_eq!(copy_text(&messages[..1], Language::English), None);
    }

    #[test]
    fn test_arabic_labels() {
        let line = message_line(&Message::user("سؤال"), Language::Arabic, Theme::Light);
        assert!(line.contains("أنت"));
        assert!(line.contains("سؤال"));
    }
}
