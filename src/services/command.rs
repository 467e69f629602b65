use std::collections::HashSet;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::core::config::Config;
use crate::core::history::CommandHistory;
use crate::core::lib::{CommandOutput, Invocation, Platform, ProcessRunner};
use crate::core::registry::{self, CommandSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("the command '{keyword}' is not allowed for security reasons. Allowed commands: {}", .allowed.join(", "))]
    NotAllowed { keyword: String, allowed: Vec<String> },
    #[error("command '{keyword}' requires administrator privileges. Run wren as administrator (or with sudo) and try again")]
    InsufficientPrivilege { keyword: String },
    #[error("command '{keyword}' timed out after {secs} seconds")]
    Timeout { keyword: String, secs: u64 },
    #[error("command '{keyword}' failed to start: {message}")]
    ProcessFailure { keyword: String, message: String },
    #[error("argument '{argument}' cannot be passed to '{keyword}' safely on this platform")]
    UnsafeArgument { keyword: String, argument: String },
}

pub type ExecutionResult = Result<CommandOutput, ExecutionError>;

/// Exponential backoff for invocation failures. Attempt `n` (0-based) that
/// fails is followed by a pause of `base_delay * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPolicy {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), retry: RetryPolicy::default() }
    }
}

impl ExecutionPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.command_timeout(),
            retry: RetryPolicy { max_attempts: config.retry_attempts, base_delay: config.retry_delay() },
        }
    }
}

/// Spawns real processes with captured output.
#[derive(Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let output = TokioCommand::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            // Killed by a signal.
            return_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Runs allow-listed commands with privilege, timeout and retry policy.
pub struct SafeExecutor {
    allow_list: HashSet<&'static str>,
    platform: Box<dyn Platform>,
    runner: Box<dyn ProcessRunner>,
    policy: ExecutionPolicy,
    history: CommandHistory,
    elevation: Option<bool>,
}

impl SafeExecutor {
    pub fn new(
        platform: Box<dyn Platform>,
        runner: Box<dyn ProcessRunner>,
        policy: ExecutionPolicy,
        history: CommandHistory,
    ) -> Self {
        SafeExecutor {
            allow_list: registry::allowed_keywords().into_iter().collect(),
            platform,
            runner,
            policy,
            history,
            elevation: None,
        }
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn set_policy(&mut self, policy: ExecutionPolicy) {
        self.policy = policy;
    }

    pub fn is_allowed(&self, keyword: &str) -> bool {
        self.allow_list.contains(keyword)
    }

    /// Whether privileged commands can run, asking the OS at most once.
    pub fn ensure_privileges(&mut self) -> bool {
        if self.platform.is_elevated() {
            return true;
        }
        if let Some(granted) = self.elevation {
            return granted;
        }
        let granted = self.platform.request_elevation();
        info!(granted, "requested elevated privileges");
        self.elevation = Some(granted);
        granted
    }

    /// Executes a raw command line such as `ping example.com`. Arguments are
    /// split on whitespace.
    pub async fn execute_line(&mut self, line: &str) -> ExecutionResult {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or("");
        let args: Vec<String> = words.map(str::to_string).collect();

        match registry::lookup(keyword) {
            Some(spec) => self.run_checked(spec, args).await,
            None => {
                self.history.push(line.trim());
                Err(self.not_allowed(keyword))
            }
        }
    }

    /// Executes `spec` with an extracted argument, passed through as a single
    /// argument even when it contains spaces.
    pub async fn execute(&mut self, spec: &CommandSpec, argument: Option<&str>) -> ExecutionResult {
        let args = argument.map(|argument| vec![argument.to_string()]).unwrap_or_default();
        self.run_checked(spec, args).await
    }

    async fn run_checked(&mut self, spec: &CommandSpec, args: Vec<String>) -> ExecutionResult {
        let raw = std::iter::once(spec.keyword).chain(args.iter().map(String::as_str)).collect::<Vec<_>>().join(" ");
        self.history.push(raw.as_str());

        if !self.is_allowed(spec.keyword) {
            warn!(keyword = spec.keyword, "rejected command outside the allow-list");
            return Err(self.not_allowed(spec.keyword));
        }

        if let Some(argument) = args.iter().find(|argument| !self.platform.accepts_argument(spec, argument)) {
            return Err(ExecutionError::UnsafeArgument {
                keyword: spec.keyword.to_string(),
                argument: argument.clone(),
            });
        }

        let mut invocation = self.platform.resolve(spec);
        if spec.requires_privilege && !self.platform.is_elevated() {
            if !self.ensure_privileges() {
                return Err(ExecutionError::InsufficientPrivilege { keyword: spec.keyword.to_string() });
            }
            invocation = self.platform.elevate(invocation);
        }
        invocation.args.extend(args);

        info!(keyword = spec.keyword, platform = self.platform.name(), command = %invocation.display(), "executing");
        self.run_with_retry(spec.keyword, &invocation).await
    }

    async fn run_with_retry(&self, keyword: &str, invocation: &Invocation) -> ExecutionResult {
        let attempts = self.policy.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match timeout(self.policy.timeout, self.runner.run(invocation)).await {
                Err(_) => {
                    warn!(keyword, "command timed out");
                    return Err(ExecutionError::Timeout {
                        keyword: keyword.to_string(),
                        secs: self.policy.timeout.as_secs(),
                    });
                }
                Ok(Ok(output)) => {
                    debug!(keyword, return_code = output.return_code, "command finished");
                    return Ok(output);
                }
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    if attempt + 1 < attempts {
                        let delay = self.policy.retry.delay_after(attempt);
                        warn!(keyword, attempt = attempt + 1, ?delay, "invocation failed, retrying: {}", e);
                        sleep(delay).await;
                    }
                }
            }
        }

        warn!(keyword, attempts, "giving up: {}", last_error);
        Err(ExecutionError::ProcessFailure { keyword: keyword.to_string(), message: last_error })
    }

    fn not_allowed(&self, keyword: &str) -> ExecutionError {
        let mut allowed: Vec<String> = self.allow_list.iter().map(|k| k.to_string()).collect();
        allowed.sort();
        ExecutionError::NotAllowed { keyword: keyword.to_string(), allowed }
    }
}
