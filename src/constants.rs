// Defaults for the completion endpoints and storage. CLI flags and IRSHAD_* env vars override these.

use std::path::PathBuf;

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_MODEL: &str = "google/gemini-2.0-pro-exp-02-05:free";
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const OLLAMA_MODEL: &str = "gemma3:12b";
pub const QUERY_URL: &str = "https://text.pollinations.ai";
pub const APP_REFERER: &str = "https://fatwa-ai.vercel.app";

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref DEFAULT_DATA_DIR: PathBuf = dirs::data_dir()
        .map(|d| d.join("irshad"))
        .unwrap_or_else(|| PathBuf::from(".irshad"));
}
