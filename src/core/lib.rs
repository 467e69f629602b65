use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::registry::CommandSpec;

/// A single turn in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub source: String,
}

/// A fully resolved process invocation: program plus a discrete argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Renders the invocation for logs and history. Never used to spawn.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured output of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// The stream worth showing: stdout, or stderr when stdout is blank.
    pub fn text(&self) -> &str {
        if self.stdout.trim().is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> WrenResult<ChatReply>;
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> WrenResult<Vec<SearchResult>>;
}

/// Spawns a resolved invocation and waits for it. Timeouts and retries are
/// applied by the caller.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// Operating-system capabilities the executor depends on.
pub trait Platform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Maps an allow-listed command to the binary and leading arguments that
    /// implement it here. Unknown mappings fall back to the bare keyword.
    fn resolve(&self, spec: &CommandSpec) -> Invocation;

    /// Whether `argument` may be passed to `spec` on this platform.
    fn accepts_argument(&self, _spec: &CommandSpec, _argument: &str) -> bool {
        true
    }

    fn is_elevated(&self) -> bool;

    /// Asks the OS for elevated rights. Returns true only when later
    /// invocations of this process can run elevated.
    fn request_elevation(&self) -> bool;

    /// Wraps an invocation so it runs with the rights granted by
    /// `request_elevation`.
    fn elevate(&self, invocation: Invocation) -> Invocation {
        invocation
    }

    /// Prefix used when searching the web for commands on this platform.
    fn search_context(&self) -> &'static str;
}

/// Durable storage for the command history.
pub trait HistorySink: Send + Sync {
    fn persist(&self, entries: &[String]) -> WrenResult<()>;
}

#[derive(Debug, Error)]
pub enum WrenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("AI processing error: {0}")]
    AIProcessingError(String),
    #[error("Search error: {0}")]
    SearchError(String),
    #[error("Input error: {0}")]
    InputError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type WrenResult<T> = Result<T, WrenError>;
