//! Terminal chat client for an Islamic-guidance persona backed by a remote
//! LLM completion endpoint.

pub mod completion;
pub mod config;
pub mod constants;
pub mod locale;
pub mod message;
pub mod persona;
pub mod profile;
pub mod prompt;
pub mod render;
pub mod repl;
pub mod session;
pub mod storage;

pub use completion::{CompletionClient, CompletionError};
pub use message::{Language, Message, Origin, SessionState, Theme};
pub use profile::{Gender, ProfileUpdate, UserProfile};
pub use prompt::PromptPayload;
pub use session::{Rejection, SessionController, SessionOptions, TurnOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
