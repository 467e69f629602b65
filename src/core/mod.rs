pub mod config;
pub mod extract;
pub mod history;
pub mod intent;
pub mod lib;
pub mod logging;
pub mod registry;

pub use self::config::Config;
pub use self::history::CommandHistory;
pub use self::intent::{Intent, IntentClassifier};
pub use self::lib::{
    ChatMessage, ChatProvider, ChatReply, ChatRequest, CommandOutput, HistorySink, Invocation, Platform,
    ProcessRunner, SearchProvider, SearchResult, Usage, WrenError, WrenResult,
};
pub use self::registry::CommandSpec;
