//! Interactive terminal session: profile capture, then chat with slash
//! commands for the settings.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arboard::Clipboard;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::locale;
use crate::message::{Language, Message, SessionState};
use crate::profile::{self, Gender, ProfileError, ProfileForm, ProfileStage, ProfileUpdate, UserProfile};
use crate::render;
use crate::session::{Rejection, SessionController, TurnOutcome};

const HELP: &str = "\
Commands:
  /help            Show this help
  /clear           Clear the conversation
  /theme           Toggle dark/light colours
  /lang            Toggle Arabic/English interface
  /name <NAME>     Change your display name
  /avatar <PATH>   Set your avatar image (/avatar none to remove)
  /profile         Show your profile
  /copy            Copy the last answer with its attribution
  /quit            Leave the session
Anything else is sent as a question. End a line with \\ to continue the
question on the next line.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Help,
    Clear,
    Theme,
    Language,
    Rename(String),
    Avatar(PathBuf),
    RemoveAvatar,
    ShowProfile,
    Copy,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Send(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "help" | "?" => ReplCommand::Help,
        "clear" => ReplCommand::Clear,
        "theme" => ReplCommand::Theme,
        "lang" | "language" => ReplCommand::Language,
        "name" if arg.is_empty() => ReplCommand::Usage("/name <NAME>"),
        "name" => ReplCommand::Rename(arg.to_string()),
        "avatar" if arg.is_empty() => ReplCommand::Usage("/avatar <PATH> | /avatar none"),
        "avatar" if arg == "none" => ReplCommand::RemoveAvatar,
        "avatar" => ReplCommand::Avatar(PathBuf::from(arg)),
        "profile" => ReplCommand::ShowProfile,
        "copy" => ReplCommand::Copy,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Joins lines ending in `\\` into one multi-line input. Returns the input
/// once a line without the marker completes it.
pub fn join_continued(pending: &mut Option<String>, line: &str) -> Option<String> {
    let (part, continues) = match line.trim_end().strip_suffix('\\') {
        Some(part) => (part, true),
        None => (line, false),
    };
    let joined = match pending.take() {
        Some(mut text) => {
            text.push('\n');
            text.push_str(part);
            text
        }
        None => part.to_string(),
    };
    if continues {
        *pending = Some(joined);
        None
    } else {
        Some(joined)
    }
}

pub fn parse_gender(input: &str) -> Option<Gender> {
    match input.trim().to_lowercase().as_str() {
        "m" | "male" | "ذكر" => Some(Gender::Male),
        "f" | "female" | "أنثى" | "انثى" => Some(Gender::Female),
        _ => None,
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush().context("Failed to flush stdout")
}

/// Asks for name, gender and an optional avatar until the answers are
/// valid. Returns `None` if input ends first.
pub async fn capture_profile<R>(lines: &mut Lines<R>, language: Language) -> Result<Option<UserProfile>>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", locale::disclaimer(language));

    let name = loop {
        prompt(locale::name_prompt(language))?;
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        if !line.trim().is_empty() {
            break line.trim().to_string();
        }
    };

    let gender = loop {
        prompt(locale::gender_prompt(language))?;
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        if let Some(gender) = parse_gender(&line) {
            break gender;
        }
    };

    loop {
        prompt(locale::avatar_prompt(language))?;
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let avatar_path = match line.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };
        let form = ProfileForm {
            name: name.clone(),
            gender: Some(gender),
            avatar_path,
        };
        match form.submit().await {
            Ok(profile) => return Ok(Some(profile)),
            Err(e @ (ProfileError::NotAnImage(_) | ProfileError::AvatarRead { .. })) => {
                println!("{e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Messages after the one with id `last_shown`. When that message is gone
/// (the log was cleared) every message is new.
fn unseen<'a>(messages: &'a [Message], last_shown: Option<&str>) -> &'a [Message] {
    let Some(id) = last_shown else {
        return messages;
    };
    match messages.iter().position(|m| m.id == id) {
        Some(index) => &messages[index + 1..],
        None => messages,
    }
}

/// Prints messages as they are appended, and the loading indicator whenever
/// a request starts. After `stop` fires it prints what is left and returns.
async fn render_updates(
    mut rx: watch::Receiver<SessionState>,
    mut last_shown: Option<String>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut was_loading = rx.borrow().loading;
    loop {
        let closing = tokio::select! {
            changed = rx.changed() => changed.is_err(),
            _ = &mut stop => true,
        };
        let state = rx.borrow_and_update().clone();
        for message in unseen(&state.messages, last_shown.as_deref()) {
            println!("{}", render::message_line(message, state.language, state.theme));
        }
        last_shown = state.messages.last().map(|m| m.id.clone());
        if closing {
            break;
        }
        if state.loading && !was_loading {
            println!("{}", render::loading_line(state.language, state.theme));
        }
        was_loading = state.loading;
    }
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    let gender = match profile.gender {
        Gender::Male => "male",
        Gender::Female => "female",
    };
    let avatar = if profile.avatar.is_some() { "set" } else { "none" };
    println!("name: {}\ngender: {}\navatar: {}", profile.name, gender, avatar);
}

pub async fn run(session: Arc<SessionController>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if ProfileStage::from_stored(session.profile()) == ProfileStage::Incomplete {
        let language = session.snapshot().language;
        match capture_profile(&mut lines, language).await? {
            Some(profile) => session.complete_profile(profile),
            None => return Ok(()),
        }
    }

    let state = session.snapshot();
    println!("{}", render::header(&state, &session.persona().title));
    println!("{}", render::conversation(&state));
    let (stop_renderer, stop) = oneshot::channel();
    let last_shown = state.messages.last().map(|m| m.id.clone());
    let renderer = tokio::spawn(render_updates(session.subscribe(), last_shown, stop));
    info!("Interactive session started");

    let mut turn: Option<JoinHandle<()>> = None;
    let mut pending: Option<String> = None;
    loop {
        let input = match lines.next_line().await? {
            Some(line) => match join_continued(&mut pending, &line) {
                Some(input) => input,
                None => continue,
            },
            None => match pending.take() {
                Some(input) => input,
                None => break,
            },
        };
        let language = session.snapshot().language;
        match parse_command(&input) {
            ReplCommand::Send(text) => {
                if turn.as_ref().is_some_and(|t| !t.is_finished()) {
                    println!("{}", locale::busy(language));
                    continue;
                }
                let session = Arc::clone(&session);
                turn = Some(tokio::spawn(async move {
                    match session.send_user_message(&text).await {
                        TurnOutcome::Rejected(Rejection::Busy) => println!("{}", locale::busy(language)),
                        outcome => debug!(?outcome, "Turn finished"),
                    }
                }));
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Clear => {
                session.clear_conversation();
                println!("{}", locale::cleared(language));
            }
            ReplCommand::Theme => {
                let theme = session.toggle_theme();
                println!("theme: {theme:?}");
            }
            ReplCommand::Language => {
                let language = session.toggle_language();
                let state = session.snapshot();
                println!("{}", render::header(&state, &session.persona().title));
                println!("language: {language:?}");
            }
            ReplCommand::Rename(name) => {
                session.update_profile(ProfileUpdate {
                    name: Some(name),
                    ..Default::default()
                });
                println!("{}", render::header(&session.snapshot(), &session.persona().title));
            }
            ReplCommand::Avatar(path) => match profile::read_avatar(&path).await {
                Ok(avatar) => {
                    session.update_profile(ProfileUpdate {
                        avatar: Some(Some(avatar)),
                        ..Default::default()
                    });
                    println!("{}", render::header(&session.snapshot(), &session.persona().title));
                }
                Err(e) => println!("{e}"),
            },
            ReplCommand::RemoveAvatar => {
                session.update_profile(ProfileUpdate {
                    avatar: Some(None),
                    ..Default::default()
                });
                println!("{}", render::header(&session.snapshot(), &session.persona().title));
            }
            ReplCommand::ShowProfile => {
                if let Some(profile) = session.profile() {
                    print_profile(&profile);
                }
            }
            ReplCommand::Copy => match render::copy_text(&session.snapshot().messages, language) {
                Some(text) => match copy_to_clipboard(&text) {
                    Ok(()) => println!("{}", locale::copied(language)),
                    Err(e) => {
                        warn!(error = %e, "Clipboard unavailable, printing instead");
                        println!("{text}");
                    }
                },
                None => println!("{}", locale::nothing_to_copy(language)),
            },
            ReplCommand::Quit => break,
            ReplCommand::Usage(usage) => println!("usage: {usage}"),
            ReplCommand::Unknown(name) => println!("unknown command /{name}, try /help"),
        }
    }

    // The reply of a running turn still gets stored and printed.
    if let Some(turn) = turn.take() {
        if let Err(e) = turn.await {
            error!(error = %e, "Turn task failed");
        }
    }
    let _ = stop_renderer.send(());
    renderer.await.context("Renderer task failed")?;
    info!("Interactive session ended");
    Ok(())
}
