//! User identity captured once before the chat becomes reachable.

use std::path::{Path, PathBuf};

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub gender: Gender,
    /// Embeddable image as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// Uppercased first character of the name, shown when there is no avatar.
    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn merge(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            let name = name.trim();
            if !name.is_empty() {
                self.name = name.to_string();
            }
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
    }
}

/// Partial profile edit from the settings commands.
///
/// `avatar: Some(None)` removes the avatar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("gender must be chosen")]
    MissingGender,
    #[error("{0} is not an image file")]
    NotAnImage(PathBuf),
    #[error("failed to read avatar {path}: {source}")]
    AvatarRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileStage {
    Incomplete,
    Complete(UserProfile),
}

impl ProfileStage {
    pub fn from_stored(profile: Option<UserProfile>) -> Self {
        match profile {
            Some(p) => ProfileStage::Complete(p),
            None => ProfileStage::Incomplete,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ProfileStage::Complete(_))
    }
}

/// Raw answers from the profile capture dialogue.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub gender: Option<Gender>,
    pub avatar_path: Option<PathBuf>,
}

impl ProfileForm {
    /// Validates the form and, when an avatar was picked, embeds it.
    pub async fn submit(self) -> Result<UserProfile, ProfileError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let gender = self.gender.ok_or(ProfileError::MissingGender)?;
        let avatar = match self.avatar_path {
            Some(path) => Some(read_avatar(&path).await?),
            None => None,
        };
        Ok(UserProfile {
            name: name.to_string(),
            gender,
            avatar,
        })
    }
}

/// Reads an image file into a `data:<mime>;base64,...` URL.
pub async fn read_avatar(path: &Path) -> Result<String, ProfileError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(ProfileError::NotAnImage(path.to_path_buf()));
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ProfileError::AvatarRead {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), size = bytes.len(), "Encoded avatar image");
    Ok(format!(
        "data:{};base64,{}",
        mime.essence_str(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sara() -> UserProfile {
        UserProfile {
            name: "Sara".to_string(),
            gender: Gender::Female,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_submit_without_avatar_completes() {
        let form = ProfileForm {
            name: "Sara".to_string(),
            gender: Some(Gender::Female),
            avatar_path: None,
        };
        let profile = form.submit().await.unwrap();
        assert_eq!(profile, sara());
        assert_eq!(profile.initial(), "S");
        assert!(ProfileStage::from_stored(Some(profile)).is_complete());
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_name() {
        let form = ProfileForm {
            name: "   ".to_string(),
            gender: Some(Gender::Male),
            avatar_path: None,
        };
        assert!(matches!(form.submit().await, Err(ProfileError::EmptyName)));
    }

    #[tokio::test]
    async fn test_submit_requires_gender() {
        let form = ProfileForm {
            name: "Omar".to_string(),
            gender: None,
            avatar_path: None,
        };
        assert!(matches!(form.submit().await, Err(ProfileError::MissingGender)));
    }

    #[tokio::test]
    async fn test_avatar_is_embedded_as_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let form = ProfileForm {
            name: "Omar".to_string(),
            gender: Some(Gender::Male),
            avatar_path: Some(path),
        };
        let profile = form.submit().await.unwrap();
        assert_eq!(profile.avatar.as_deref(), Some("data:image/png;base64,iVBORw=="));
    }

    #[tokio::test]
    async fn test_non_image_avatar_is_rejected() {
        let result = read_avatar(Path::new("notes.txt")).await;
        assert!(matches!(result, Err(ProfileError::NotAnImage(_))));
    }

    #[test]
    fn test_incomplete_without_stored_profile() {
        assert_eq!(ProfileStage::from_stored(None), ProfileStage::Incomplete);
    }

    #[test]
    fn test_merge_partial_update() {
        let mut profile = sara();
        profile.merge(ProfileUpdate {
            name: Some("  Sarah ".to_string()),
            avatar: Some(Some("data:image/png;base64,AA==".to_string())),
            ..Default::default()
        });
        assert_eq!(profile.name, "Sarah");
        assert_eq!(profile.gender, Gender::Female);
        assert!(profile.avatar.is_some());

        profile.merge(ProfileUpdate {
            name: Some(String::new()),
            avatar: Some(None),
            ..Default::default()
        });
        assert_eq!(profile.name, "Sarah");
        assert!(profile.avatar.is_none());
    }

    #[test]
    fn test_profile_record_layout() {
        let json = serde_json::to_string(&sara()).unwrap();
        assert_eq!(json, r#"{"name":"Sara","gender":"female"}"#);
    }
}
