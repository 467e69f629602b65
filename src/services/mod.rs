pub mod ai;
pub mod command;
pub mod dispatch;
pub mod output;
pub mod platform;
pub mod search;
pub mod session;

pub use self::ai::GrokClient;
pub use self::command::{ExecutionError, ExecutionPolicy, RetryPolicy, SafeExecutor, TokioProcessRunner};
pub use self::dispatch::{Dispatcher, Reply};
pub use self::search::DuckDuckGoSearch;
pub use self::session::{ChatSession, JsonHistoryFile, SessionStore};
