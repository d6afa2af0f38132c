use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::completion::{ChatCompletionsClient, CompletionClient, OllamaClient, PromptQueryClient};
use crate::constants;
use crate::message::{Language, Theme};
use crate::persona::{Persona, PersonaPreset};
use crate::prompt::DEFAULT_HISTORY_WINDOW;
use crate::session::SessionOptions;
use crate::storage::{FileStore, Persistence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// JSON POST to an OpenAI-style /chat/completions endpoint (OpenRouter).
    #[value(name = "openrouter")]
    OpenRouter,
    /// JSON POST to Ollama's /api/generate.
    Ollama,
    /// GET with the URL-encoded prompt as the last path segment.
    Query,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    #[arg(long, global = true, value_enum, env = "IRSHAD_PROVIDER", default_value_t = Provider::OpenRouter, help = "Completion endpoint flavour.")]
    pub provider: Provider,
    #[arg(long, global = true, env = "IRSHAD_API_URL", help = "Base URL of the completion endpoint.")]
    pub api_url: Option<String>,
    #[arg(long, global = true, env = "OPENROUTER_API_KEY", hide_env_values = true, help = "Bearer credential for the openrouter provider.")]
    pub api_key: Option<String>,
    #[arg(long, global = true, env = "IRSHAD_MODEL", help = "Model name sent to the endpoint.")]
    pub model: Option<String>,
    #[arg(long, global = true, value_enum, env = "IRSHAD_PERSONA", default_value_t = PersonaPreset::Fatwa, help = "Built-in persona.")]
    pub persona: PersonaPreset,
    #[arg(long, global = true, env = "IRSHAD_PERSONA_FILE", help = "TOML persona definition replacing the built-in one.")]
    pub persona_file: Option<PathBuf>,
    #[arg(long, global = true, env = "IRSHAD_HISTORY_WINDOW", default_value_t = DEFAULT_HISTORY_WINDOW, help = "Number of prior messages included in each prompt.")]
    pub history_window: usize,
    #[arg(long, global = true, env = "IRSHAD_DATA_DIR", help = "Directory holding chat history and profile.")]
    pub data_dir: Option<PathBuf>,
    #[arg(long, global = true, value_enum, env = "IRSHAD_LANG", default_value_t = Language::Arabic, help = "Interface language at startup.")]
    pub lang: Language,
    #[arg(long, global = true, help = "Start with the light colour theme.")]
    pub light: bool,
}

/// Resolved configuration: flags over environment over built-in defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: Provider,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub persona: Persona,
    pub history_window: usize,
    pub data_dir: PathBuf,
    pub theme: Theme,
    pub language: Language,
}

impl AppConfig {
    pub async fn from_args(args: GlobalArgs) -> Result<Self> {
        let persona = match &args.persona_file {
            Some(path) => Persona::from_file(path).await?,
            None => Persona::preset(args.persona),
        };
        let (default_url, default_model) = match args.provider {
            Provider::OpenRouter => (constants::OPENROUTER_URL, constants::OPENROUTER_MODEL),
            Provider::Ollama => (constants::OLLAMA_URL, constants::OLLAMA_MODEL),
            Provider::Query => (constants::QUERY_URL, ""),
        };

        Ok(Self {
            provider: args.provider,
            api_url: args.api_url.unwrap_or_else(|| default_url.to_string()),
            api_key: args.api_key.unwrap_or_default(),
            model: args.model.unwrap_or_else(|| default_model.to_string()),
            persona,
            history_window: args.history_window,
            data_dir: args
                .data_dir
                .unwrap_or_else(|| constants::DEFAULT_DATA_DIR.clone()),
            theme: if args.light { Theme::Light } else { Theme::Dark },
            language: args.lang,
        })
    }

    pub fn persistence(&self) -> Persistence {
        Persistence::new(Arc::new(FileStore::new(&self.data_dir)))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            persona: self.persona.clone(),
            history_window: self.history_window,
            theme: self.theme,
            language: self.language,
        }
    }

    pub fn build_client(&self) -> Result<Arc<dyn CompletionClient>> {
        info!(provider = ?self.provider, url = %self.api_url, model = %self.model, "Using completion endpoint");
        let client: Arc<dyn CompletionClient> = match self.provider {
            Provider::OpenRouter => {
                if self.api_key.is_empty() {
                    warn!("OPENROUTER_API_KEY is not set; requests will likely be refused");
                }
                Arc::new(
                    ChatCompletionsClient::new(&self.api_url, &self.api_key, &self.model)
                        .with_attribution(&self.persona.title, Some(constants::APP_REFERER.to_string())),
                )
            }
            Provider::Ollama => Arc::new(OllamaClient::new(&self.api_url, &self.model)),
            Provider::Query => Arc::new(PromptQueryClient::new(&self.api_url)?),
        };
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        global: GlobalArgs,
    }

    fn parse(args: &[&str]) -> GlobalArgs {
        let mut argv = vec!["irshad"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).global
    }

    #[tokio::test]
    async fn test_provider_defaults() {
        let config = AppConfig::from_args(parse(&["--provider", "ollama", "--data-dir", "/tmp/x"]))
            .await
            .unwrap();
        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.api_url, constants::OLLAMA_URL);
        assert_eq!(config.model, constants::OLLAMA_MODEL);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
    }

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let config = AppConfig::from_args(parse(&[
            "--provider",
            "openrouter",
            "--api-url",
            "http://localhost:9999/v1",
            "--model",
            "test-model",
            "--history-window",
            "5",
            "--lang",
            "en",
            "--light",
            "--persona",
            "irshad",
        ]))
        .await
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:9999/v1");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.history_window, 5);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.persona, Persona::preset(PersonaPreset::Irshad));
        assert!(config.build_client().is_ok());
    }

    #[tokio::test]
    async fn test_persona_file_replaces_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.toml");
        std::fs::write(
            &path,
            "title = \"Custom\"\nidentity = \"i\"\ndoctrine = \"d\"\nanswer_template = \"a\"\ntone = \"t\"\n",
        )
        .unwrap();
        let config = AppConfig::from_args(parse(&["--persona-file", path.to_str().unwrap()]))
            .await
            .unwrap();
        assert_eq!(config.persona.title, "Custom");
    }
}
