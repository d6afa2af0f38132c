use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use irshad::config::{AppConfig, GlobalArgs};
use irshad::profile::{Gender, ProfileForm, ProfileUpdate};
use irshad::{render, repl, SessionController, TurnOutcome};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session.
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        #[arg(help = "The question to send.")]
        text: String,
    },
    /// Show or edit your profile.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Delete the stored conversation.
    Clear,
    /// Print the stored conversation.
    History,
}

#[derive(clap::Subcommand, Debug)]
enum ProfileCommands {
    /// Print the stored profile.
    Show,
    /// Create the profile, or update the given fields of an existing one.
    Set {
        #[arg(long, help = "Display name.")]
        name: Option<String>,
        #[arg(long, value_enum, help = "Gender used to address you.")]
        gender: Option<Gender>,
        #[arg(long, help = "Image file to use as avatar.")]
        avatar: Option<PathBuf>,
    },
}

fn open_session(config: &AppConfig) -> Result<Arc<SessionController>> {
    let session = SessionController::load(
        config.persistence(),
        config.build_client()?,
        config.session_options(),
    )
    .with_context(|| format!("Failed to load session from {}", config.data_dir.display()))?;
    Ok(Arc::new(session))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays the transcript. RUST_LOG=irshad=debug for detail.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("irshad starting with command: {:?}", cli.command);

    let config = AppConfig::from_args(cli.global).await?;
    let session = open_session(&config)?;

    match cli.command {
        Commands::Chat => {
            repl::run(session).await.context("Chat session failed")?;
        }
        Commands::Ask { text } => {
            if session.profile().is_none() {
                bail!("No profile yet. Run `irshad profile set --name <NAME> --gender <GENDER>` or `irshad chat` first.");
            }
            let outcome = session.send_user_message(&text).await;
            let state = session.snapshot();
            match outcome {
                TurnOutcome::Answered | TurnOutcome::Failed(_) => {
                    if let Some(reply) = state.messages.last() {
                        println!("{}", reply.text);
                    }
                }
                TurnOutcome::Rejected(rejection) => bail!("Message not sent: {:?}", rejection),
            }
            if let TurnOutcome::Failed(e) = outcome {
                return Err(e).context("Completion request failed");
            }
        }
        Commands::Profile { action } => match action {
            ProfileCommands::Show => match session.profile() {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("No profile yet."),
            },
            ProfileCommands::Set {
                name,
                gender,
                avatar,
            } => {
                if session.profile().is_some() {
                    let avatar = match avatar {
                        Some(path) => Some(Some(irshad::profile::read_avatar(&path).await?)),
                        None => None,
                    };
                    session.update_profile(ProfileUpdate {
                        name,
                        gender,
                        avatar,
                    });
                } else {
                    let profile = ProfileForm {
                        name: name.unwrap_or_default(),
                        gender,
                        avatar_path: avatar,
                    }
                    .submit()
                    .await
                    .context("Invalid profile")?;
                    session.complete_profile(profile);
                }
                println!("{}", render::header(&session.snapshot(), &config.persona.title));
            }
        },
        Commands::Clear => {
            session.clear_conversation();
            println!("Conversation cleared.");
        }
        Commands::History => {
            println!("{}", render::conversation(&session.snapshot()));
        }
    }

    Ok(())
}
