use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::UserProfile;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn is_assistant(self) -> bool {
        matches!(self, Origin::Assistant)
    }
}

/// One entry of the conversation log. Never mutated once appended.
///
/// The record layout matches the `chatHistory` format written by the web
/// client (`id`, `text`, `isAi`, `timestamp`) so existing histories load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    #[serde(rename = "isAi", with = "origin_flag", default = "default_origin")]
    pub origin: Origin,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_origin() -> Origin {
    Origin::User
}

impl Message {
    pub fn new(origin: Origin, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            origin,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Origin::Assistant, text)
    }
}

mod origin_flag {
    use super::Origin;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(origin: &Origin, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(origin.is_assistant())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Origin, D::Error> {
        let is_ai = bool::deserialize(deserializer)?;
        Ok(if is_ai { Origin::Assistant } else { Origin::User })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "ar")]
    Arabic,
    #[value(name = "en")]
    English,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Arabic => Language::English,
            Language::English => Language::Arabic,
        }
    }
}

/// Everything the presentation layer needs to draw the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub messages: Vec<Message>,
    /// True only while a completion request is in flight.
    pub loading: bool,
    pub theme: Theme,
    pub language: Language,
    pub profile: Option<UserProfile>,
}
