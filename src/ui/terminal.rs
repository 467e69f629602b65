use colored::*;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{MatchingBracketValidator, Validator};
use rustyline::{CompletionType, Config as EditorConfig, EditMode, Editor};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::config::Config;
use crate::core::lib::{WrenError, WrenResult};
use crate::core::registry;
use crate::services::dispatch::{Dispatcher, Reply};
use crate::ui::render;
use crate::ui::slash::{self, SlashCommand};

pub struct WrenCompleter {
    filename_completer: FilenameCompleter,
    words: Vec<String>,
}

impl WrenCompleter {
    fn new() -> Self {
        let mut words: Vec<String> = slash::USAGE
            .iter()
            .filter_map(|(usage, _)| usage.split_whitespace().next())
            .map(str::to_string)
            .collect();
        words.dedup();
        words.extend(registry::allowed_keywords().into_iter().map(str::to_string));
        Self { filename_completer: FilenameCompleter::new(), words }
    }
}

impl Completer for WrenCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let word = head.split_whitespace().last().unwrap_or("");
        let word = if head.ends_with(char::is_whitespace) { "" } else { word };
        let start = pos - word.len();

        // Paths only make sense as arguments to `/exec dir` or `/exec type`.
        if head.starts_with("/exec ") && head.split_whitespace().count() >= 2 && start > "/exec ".len() {
            return self.filename_completer.complete(line, pos, ctx);
        }

        let matches: Vec<Pair> = self
            .words
            .iter()
            .filter(|candidate| !word.is_empty() && candidate.starts_with(word))
            .map(|candidate| Pair { display: candidate.clone(), replacement: candidate.clone() })
            .collect();

        Ok((start, matches))
    }
}

pub struct WrenHelper {
    completer: WrenCompleter,
    validator: MatchingBracketValidator,
    highlighter: MatchingBracketHighlighter,
    hinter: HistoryHinter,
}

impl rustyline::Helper for WrenHelper {}

impl WrenHelper {
    fn new() -> Self {
        Self {
            completer: WrenCompleter::new(),
            validator: MatchingBracketValidator::new(),
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter {},
        }
    }
}

impl Completer for WrenHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Validator for WrenHelper {
    fn validate(
        &self,
        ctx: &mut rustyline::validate::ValidationContext,
    ) -> rustyline::Result<rustyline::validate::ValidationResult> {
        self.validator.validate(ctx)
    }
}

impl Highlighter for WrenHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}

impl Hinter for WrenHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

pub struct WrenTerminal {
    editor: Editor<WrenHelper, DefaultHistory>,
    dispatcher: Dispatcher,
    config: Config,
    config_path: PathBuf,
    has_api_key: bool,
}

impl WrenTerminal {
    pub fn new(dispatcher: Dispatcher, config: Config, config_path: PathBuf, has_api_key: bool) -> WrenResult<Self> {
        let editor_config = EditorConfig::builder()
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(editor_config)
            .map_err(|e| WrenError::InputError(format!("Failed to initialize line editor: {}", e)))?;
        editor.set_helper(Some(WrenHelper::new()));

        // Seed arrow-key recall with the commands that ran before.
        for entry in dispatcher.executor().history().entries() {
            let _ = editor.add_history_entry(entry);
        }

        Ok(Self { editor, dispatcher, config, config_path, has_api_key })
    }

    pub fn display_welcome(&self) {
        render::print_welcome(self.dispatcher.executor().platform().is_elevated(), self.has_api_key);
    }

    pub async fn run(&mut self) {
        self.display_welcome();

        loop {
            match self.editor.readline(&format!("{} ", "wren>".green().bold())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(input);
                    if !self.process_input(input).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C pressed. Use 'exit' or 'quit' to exit properly.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    render::print_error(&err);
                    break;
                }
            }
        }

        self.dispatcher.session_mut().save();
        println!("{}", "Goodbye!".green());
    }

    /// Handles one line. Returns false when the user asked to leave.
    pub async fn process_input(&mut self, input: &str) -> bool {
        let command = match SlashCommand::parse(input) {
            Ok(command) => command,
            Err(e) => {
                render::print_error(&e);
                return true;
            }
        };

        match command {
            None => {
                let reply = self.dispatcher.handle(input).await;
                render::print_reply(&reply);
            }
            Some(SlashCommand::Exit) => return false,
            Some(SlashCommand::Help) => render::print_reply(&Reply::GeneralHelp),
            Some(SlashCommand::Exec(line)) => {
                let reply = self.dispatcher.execute_line(&line).await;
                render::print_reply(&reply);
            }
            Some(SlashCommand::History) => render::print_history(self.dispatcher.executor().history().entries()),
            Some(SlashCommand::ClearHistory) => {
                self.dispatcher.executor_mut().history_mut().clear();
                println!("{}", "Command history cleared.".green());
            }
            Some(SlashCommand::ShowConfig) => render::print_config(&self.config),
            Some(SlashCommand::SetConfig { key, value }) => self.set_config(&key, &value),
            Some(SlashCommand::Admin) => {
                if self.dispatcher.request_elevation() {
                    println!("{}", "Administrator privileges are available.".green());
                } else {
                    println!(
                        "{}",
                        "Administrator privileges were not granted. Restart wren as administrator (or with sudo)."
                            .yellow()
                    );
                }
            }
        }
        true
    }

    fn set_config(&mut self, key: &str, value: &str) {
        if let Err(e) = self.config.set(key, value) {
            render::print_error(&e);
            return;
        }

        self.dispatcher.apply_config(&self.config);
        if key == "model" {
            self.dispatcher.session_mut().model = self.config.model.clone();
        }

        match self.config.save(&self.config_path) {
            Ok(()) => {
                info!(key, "setting updated");
                println!("{}", format!("{} set to {}", key, value).green());
            }
            Err(e) => {
                warn!("failed to save settings: {}", e);
                render::print_error(&e);
            }
        }
    }
}
