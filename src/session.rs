//! The session controller: sole owner and writer of [`SessionState`].
//!
//! State lives behind a `watch` channel. Readers get a snapshot or a
//! receiver; every mutation goes through the sender, and the check-and-set of
//! the `loading` flag happens under the channel's write lock, so at most one
//! completion request is ever in flight.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::completion::{CompletionClient, CompletionError};
use crate::locale;
use crate::message::{Language, Message, SessionState, Theme};
use crate::persona::Persona;
use crate::profile::{ProfileUpdate, UserProfile};
use crate::prompt::{self, DEFAULT_HISTORY_WINDOW};
use crate::storage::{Persistence, StorageError};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub persona: Persona,
    pub history_window: usize,
    pub theme: Theme,
    pub language: Language,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            persona: Persona::preset(Default::default()),
            history_window: DEFAULT_HISTORY_WINDOW,
            theme: Theme::default(),
            language: Language::default(),
        }
    }
}

/// Why a message was not sent. Nothing is appended in these cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyText,
    /// Another completion request is still in flight.
    Busy,
    /// No profile has been captured yet.
    NoProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered,
    /// The user saw the generic error reply; the cause is kept here.
    Failed(CompletionError),
    Rejected(Rejection),
}

pub struct SessionController {
    state: watch::Sender<SessionState>,
    persistence: Persistence,
    client: Arc<dyn CompletionClient>,
    persona: Persona,
    history_window: usize,
}

impl SessionController {
    /// Restores history and profile from storage.
    pub fn load(
        persistence: Persistence,
        client: Arc<dyn CompletionClient>,
        options: SessionOptions,
    ) -> Result<Self, StorageError> {
        let messages = persistence.load_history()?;
        let profile = persistence.load_profile()?;
        info!(
            messages = messages.len(),
            has_profile = profile.is_some(),
            "Session restored"
        );

        let state = SessionState {
            messages,
            loading: false,
            theme: options.theme,
            language: options.language,
            profile,
        };
        let (state, _) = watch::channel(state);

        Ok(Self {
            state,
            persistence,
            client,
            persona: options.persona,
            history_window: options.history_window,
        })
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.borrow().profile.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Runs one conversational turn.
    ///
    /// The user message is appended before the request goes out; the
    /// assistant reply (or the localized error reply) follows it.
    pub async fn send_user_message(&self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Rejected(Rejection::EmptyText);
        }

        let mut admitted: Result<(UserProfile, Vec<Message>), Rejection> = Err(Rejection::Busy);
        self.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            let Some(profile) = state.profile.clone() else {
                admitted = Err(Rejection::NoProfile);
                return false;
            };
            admitted = Ok((profile, state.messages.clone()));
            state.messages.push(Message::user(text));
            state.loading = true;
            true
        });
        let (profile, history) = match admitted {
            Ok(turn) => turn,
            Err(rejection) => {
                debug!(?rejection, "Message rejected");
                return TurnOutcome::Rejected(rejection);
            }
        };
        self.persist_history();

        let payload = prompt::compose(&self.persona, &profile, &history, text, self.history_window);
        debug!(
            system_len = payload.system.len(),
            history = history.len().min(self.history_window),
            "Composed prompt"
        );

        let result = self.client.send(&payload).await;
        if let Err(e) = &result {
            error!(kind = e.kind(), error = %e, "Completion request failed");
        }

        self.state.send_modify(|state| {
            let reply = match &result {
                Ok(text) => Message::assistant(text.as_str()),
                Err(_) => Message::assistant(locale::error_reply(state.language)),
            };
            state.messages.push(reply);
            state.loading = false;
        });
        self.persist_history();

        match result {
            Ok(_) => TurnOutcome::Answered,
            Err(e) => TurnOutcome::Failed(e),
        }
    }

    pub fn clear_conversation(&self) {
        self.state.send_modify(|state| state.messages.clear());
        if let Err(e) = self.persistence.clear_history() {
            error!(error = %e, "Failed to remove stored history");
        }
        info!("Conversation cleared");
    }

    /// Stores the profile produced by the capture dialogue.
    pub fn complete_profile(&self, profile: UserProfile) {
        if let Err(e) = self.persistence.save_profile(&profile) {
            error!(error = %e, "Failed to store profile");
        }
        info!(name = %profile.name, "Profile completed");
        self.state.send_modify(|state| state.profile = Some(profile));
    }

    /// Merges `update` into the current profile. Returns false when there is
    /// no profile yet.
    pub fn update_profile(&self, update: ProfileUpdate) -> bool {
        let mut updated = None;
        self.state.send_if_modified(|state| match state.profile.as_mut() {
            Some(profile) => {
                profile.merge(update);
                updated = Some(profile.clone());
                true
            }
            None => false,
        });

        match updated {
            Some(profile) => {
                if let Err(e) = self.persistence.save_profile(&profile) {
                    error!(error = %e, "Failed to store profile");
                }
                true
            }
            None => false,
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut theme = Theme::default();
        self.state.send_modify(|state| {
            state.theme = state.theme.toggled();
            theme = state.theme;
        });
        theme
    }

    pub fn toggle_language(&self) -> Language {
        let mut language = Language::default();
        self.state.send_modify(|state| {
            state.language = state.language.toggled();
            language = state.language;
        });
        language
    }

    fn persist_history(&self) {
        let messages = self.state.borrow().messages.clone();
        if let Err(e) = self.persistence.save_history(&messages) {
            error!(error = %e, "Failed to store history");
        }
    }
}
