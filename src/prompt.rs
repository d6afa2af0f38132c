use serde::Serialize;

use crate::message::Message;
use crate::persona::Persona;
use crate::profile::{Gender, UserProfile};

/// Number of prior messages included in a prompt unless configured otherwise.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Provider-agnostic request: the persona-bearing system text plus the new
/// user utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

impl PromptPayload {
    /// Single prompt string for endpoints that take no role structure.
    pub fn flatten(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Builds the request for one turn.
///
/// `history` is the conversation *before* `utterance`; only its last
/// `window` entries are included.
pub fn compose(
    persona: &Persona,
    profile: &UserProfile,
    history: &[Message],
    utterance: &str,
    window: usize,
) -> PromptPayload {
    let labels = &persona.labels;
    let gender = match profile.gender {
        Gender::Male => &labels.male,
        Gender::Female => &labels.female,
    };

    let mut sections = vec![
        persona.identity.clone(),
        format!(
            "{}\n- {}: {}\n- {}: {}",
            labels.profile_heading, labels.name, profile.name, labels.gender, gender
        ),
        labels.language_rule.clone(),
    ];

    let recent = &history[history.len().saturating_sub(window)..];
    if !recent.is_empty() {
        let lines = recent
            .iter()
            .map(|m| {
                let speaker = if m.origin.is_assistant() { "AI" } else { "User" };
                format!("{}: {}", speaker, m.text)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("{}\n{}", labels.history_heading, lines));
    }

    sections.push(persona.doctrine.clone());
    sections.push(persona.answer_template.clone());
    sections.push(persona.tone.clone());

    PromptPayload {
        system: sections.join("\n\n"),
        user: utterance.to_string(),
    }
}
