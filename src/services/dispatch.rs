use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::intent::{Intent, IntentClassifier};
use crate::core::lib::{ChatProvider, SearchProvider, SearchResult, WrenError};
use crate::core::registry::{self, CommandSpec};
use crate::services::command::{ExecutionError, ExecutionPolicy, ExecutionResult, SafeExecutor};
use crate::services::output;
use crate::services::session::ChatSession;

/// Results shown per search.
pub const MAX_RESULTS: usize = 3;

/// What the terminal should show for one line of input.
#[derive(Debug)]
pub enum Reply {
    Command { keyword: String, exit_code: i32, text: String },
    Rejected(ExecutionError),
    WebResults { query: String, results: Vec<SearchResult> },
    CommandSuggestions { query: String, results: Vec<SearchResult> },
    CommandHelp(&'static CommandSpec),
    GeneralHelp,
    Chat(String),
    ChatError(WrenError),
}

/// Routes classified input to the executor, web search, help or chat.
pub struct Dispatcher {
    classifier: IntentClassifier<'static>,
    executor: SafeExecutor,
    chat: Box<dyn ChatProvider>,
    search: Box<dyn SearchProvider>,
    session: ChatSession,
}

impl Dispatcher {
    pub fn new(
        executor: SafeExecutor,
        chat: Box<dyn ChatProvider>,
        search: Box<dyn SearchProvider>,
        session: ChatSession,
    ) -> Self {
        Self { classifier: IntentClassifier::builtin(), executor, chat, search, session }
    }

    pub fn executor(&self) -> &SafeExecutor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut SafeExecutor {
        &mut self.executor
    }

    pub fn session_mut(&mut self) -> &mut ChatSession {
        &mut self.session
    }

    /// Pushes changed settings into the running executor, history and session.
    pub fn apply_config(&mut self, config: &Config) {
        self.executor.set_policy(ExecutionPolicy::from_config(config));
        self.executor.history_mut().set_capacity(config.max_history);
        self.session.apply_config(config);
    }

    pub async fn handle(&mut self, input: &str) -> Reply {
        let intent = self.classifier.classify(input);
        debug!(kind = intent.kind(), "dispatching input");

        match intent {
            Intent::WebSearch { query } => {
                let results = self.search_top(&query).await;
                Reply::WebResults { query, results }
            }
            Intent::Help { command: Some(spec) } => Reply::CommandHelp(spec),
            Intent::Help { command: None } => Reply::GeneralHelp,
            Intent::Search { query } => {
                let scoped = format!("{} command line {}", self.executor.platform().search_context(), query);
                let results = self.search_top(&scoped).await;
                Reply::CommandSuggestions { query, results }
            }
            Intent::Execute { command, argument } => {
                let result = self.executor.execute(command, argument.as_deref()).await;
                Self::command_reply(command.keyword, result)
            }
            Intent::None => self.chat(input).await,
        }
    }

    /// Runs a raw command line through the allow-list, skipping classification.
    pub async fn execute_line(&mut self, line: &str) -> Reply {
        let keyword = line
            .split_whitespace()
            .next()
            .and_then(registry::lookup)
            .map_or("", |spec| spec.keyword);
        let result = self.executor.execute_line(line).await;
        Self::command_reply(keyword, result)
    }

    pub fn request_elevation(&mut self) -> bool {
        self.executor.ensure_privileges()
    }

    async fn chat(&mut self, input: &str) -> Reply {
        let request = self.session.request(input);
        match self.chat.complete(&request).await {
            Ok(reply) => {
                debug!(
                    prompt_tokens = reply.usage.prompt_tokens,
                    completion_tokens = reply.usage.completion_tokens,
                    "chat reply received"
                );
                self.session.record(input, &reply.content);
                Reply::Chat(reply.content)
            }
            Err(e) => Reply::ChatError(e),
        }
    }

    async fn search_top(&self, query: &str) -> Vec<SearchResult> {
        match self.search.search(query).await {
            Ok(mut results) => {
                results.truncate(MAX_RESULTS);
                results
            }
            Err(e) => {
                warn!(query, "web search failed: {}", e);
                Vec::new()
            }
        }
    }

    fn command_reply(keyword: &str, result: ExecutionResult) -> Reply {
        match result {
            Ok(output) => Reply::Command {
                keyword: keyword.to_string(),
                exit_code: output.return_code,
                text: output::normalize(keyword, &output),
            },
            Err(e) => Reply::Rejected(e),
        }
    }
}
