//! Conversation state and the files that outlive a run.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::lib::{ChatMessage, ChatRequest, HistorySink, WrenResult};
use crate::services::ai::SYSTEM_PROMPT;

pub const HISTORY_FILE: &str = "history.json";
pub const SESSION_FILE: &str = "session.json";

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> WrenResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Command history stored as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved entries, or nothing when the file is missing or unreadable.
    pub fn load(&self) -> Vec<String> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable history file: {}", e);
                Vec::new()
            }
        }
    }

    fn read(&self) -> WrenResult<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl HistorySink for JsonHistoryFile {
    fn persist(&self, entries: &[String]) -> WrenResult<()> {
        write_json(&self.path, entries)
    }
}

/// Last few conversation turns, saved between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE))
    }

    pub fn load(&self) -> WrenResult<Vec<ChatMessage>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let messages: Vec<ChatMessage> = serde_json::from_str(&text)?;
        Ok(messages.into_iter().filter(|m| m.role != "system").collect())
    }

    pub fn save(&self, messages: &[ChatMessage]) -> WrenResult<()> {
        write_json(&self.path, messages)
    }
}

/// Everything the chat path needs, owned by the application rather than
/// held in globals.
#[derive(Debug)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    max_conversations: usize,
    auto_save: bool,
    store: Option<SessionStore>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        let defaults = Config::default();
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            messages: Vec::new(),
            model: model.into(),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            max_conversations: defaults.max_conversations,
            auto_save: false,
            store: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new(config.model.clone());
        session.apply_config(config);
        session
    }

    /// Attaches a store and restores the turns it holds. A broken session
    /// file starts an empty conversation.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        match store.load() {
            Ok(messages) => {
                debug!(restored = messages.len(), "restored chat session");
                self.messages = messages;
                self.trim();
            }
            Err(e) => warn!("ignoring unreadable session file: {}", e),
        }
        self.store = Some(store);
        self
    }

    /// Picks up changed settings. The model stays as is so a command-line
    /// override survives `/config set`.
    pub fn apply_config(&mut self, config: &Config) {
        self.temperature = config.temperature;
        self.max_tokens = config.max_tokens;
        self.max_conversations = config.max_conversations;
        self.auto_save = config.auto_save;
        self.trim();
    }

    /// Conversation turns so far, excluding the system prompt.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Request for `user_input` on top of the current conversation.
    pub fn request(&self, user_input: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.messages.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.messages.iter().cloned());
        messages.push(ChatMessage::user(user_input));

        ChatRequest { model: self.model.clone(), messages, temperature: self.temperature, max_tokens: self.max_tokens }
    }

    /// Records a completed turn and saves the session when auto-save is on.
    pub fn record(&mut self, user_input: &str, reply: &str) {
        self.messages.push(ChatMessage::user(user_input));
        self.messages.push(ChatMessage::assistant(reply));
        self.trim();

        if self.auto_save {
            self.save();
        }
    }

    pub fn save(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.messages) {
                warn!("failed to save chat session: {}", e);
            }
        }
    }

    fn trim(&mut self) {
        let keep = self.max_conversations * 2;
        if self.messages.len() > keep {
            self.messages.drain(..self.messages.len() - keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::CommandHistory;
    use tempfile::TempDir;

    #[test]
    fn history_file_follows_every_append() {
        let dir = TempDir::new().unwrap();
        let file = JsonHistoryFile::in_dir(dir.path());
        let mut history = CommandHistory::new(2).with_sink(Box::new(file.clone()));

        history.push("whoami");
        history.push("hostname");
        history.push("ping example.com");
        assert_eq!(file.load(), vec!["hostname", "ping example.com"]);

        history.clear();
        assert!(file.load().is_empty());
    }

    #[test]
    fn corrupt_history_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let file = JsonHistoryFile::in_dir(dir.path());
        fs::write(file.path(), "not json").unwrap();
        assert!(file.load().is_empty());
    }

    #[test]
    fn request_starts_with_system_prompt() {
        let mut session = ChatSession::new("grok-2-latest");
        session.record("hi", "hello!");
        let request = session.request("what can you do?");

        let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(request.messages[3].content, "what can you do?");
        assert_eq!(request.model, "grok-2-latest");
        assert_eq!(request.max_tokens, 1000);
    }

    #[test]
    fn only_recent_turns_are_kept() {
        let config = Config { max_conversations: 2, auto_save: false, ..Config::default() };
        let mut session = ChatSession::from_config(&config);
        for i in 0..5 {
            session.record(&format!("q{}", i), &format!("a{}", i));
        }
        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q3", "a3", "q4", "a4"]);
    }

    #[test]
    fn session_survives_a_restart() {
        let dir = TempDir::new().unwrap();
        let config = Config { auto_save: true, ..Config::default() };

        let mut first = ChatSession::from_config(&config).with_store(SessionStore::in_dir(dir.path()));
        first.record("what is rust?", "A systems language.");

        let second = ChatSession::from_config(&config).with_store(SessionStore::in_dir(dir.path()));
        assert_eq!(second.messages(), first.messages());
        assert_eq!(second.request("next").messages[0].role, "system");
    }

    #[test]
    fn broken_session_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "{").unwrap();
        let session = ChatSession::new("m").with_store(SessionStore::in_dir(dir.path()));
        assert!(session.messages().is_empty());
    }
}
