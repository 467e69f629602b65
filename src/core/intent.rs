//! Rule-based intent classification.
//!
//! Rules run in a fixed priority order and the first match wins:
//! web search, help, command search, per-command phrases (exact, then word
//! overlap), direct keyword invocation. Anything else is chat.

use std::collections::HashSet;
use tracing::debug;

use crate::core::extract::{extract_argument, text_after};
use crate::core::registry::{self, CommandSpec, PhraseSets};

/// A phrase matches fuzzily when strictly more than this share of its words
/// appear in the input.
pub const FUZZY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<'a> {
    WebSearch { query: String },
    Help { command: Option<&'a CommandSpec> },
    Search { query: String },
    Execute { command: &'a CommandSpec, argument: Option<String> },
    None,
}

impl<'a> Intent<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::WebSearch { .. } => "web_search",
            Intent::Help { .. } => "help",
            Intent::Search { .. } => "search",
            Intent::Execute { .. } => "execute",
            Intent::None => "none",
        }
    }

    /// Keyword of the command this intent targets, if any.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Intent::Execute { command, .. } => Some(command.keyword),
            Intent::Help { command: Some(command) } => Some(command.keyword),
            _ => None,
        }
    }

    pub fn argument(&self) -> Option<&str> {
        match self {
            Intent::WebSearch { query } | Intent::Search { query } => Some(query),
            Intent::Execute { argument, .. } => argument.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier<'a> {
    commands: &'a [CommandSpec],
    phrases: PhraseSets<'a>,
}

impl IntentClassifier<'static> {
    /// Classifier over the built-in command table.
    pub fn builtin() -> Self {
        Self::new(registry::COMMANDS, registry::PHRASES)
    }
}

impl<'a> IntentClassifier<'a> {
    pub fn new(commands: &'a [CommandSpec], phrases: PhraseSets<'a>) -> Self {
        Self { commands, phrases }
    }

    pub fn classify(&self, input: &str) -> Intent<'a> {
        let input = input.trim();
        let lowered = input.to_ascii_lowercase();

        let intent = self
            .web_search(input, &lowered)
            .or_else(|| self.help(&lowered))
            .or_else(|| self.search(input, &lowered))
            .or_else(|| self.command_phrases(input, &lowered))
            .or_else(|| self.direct_invocation(input, &lowered))
            .unwrap_or(Intent::None);

        debug!(kind = intent.kind(), keyword = intent.keyword(), "classified input");
        intent
    }

    fn executable(&self) -> impl Iterator<Item = &'a CommandSpec> {
        self.commands.iter().filter(|spec| !registry::is_reserved(spec.keyword))
    }

    fn web_search(&self, input: &str, lowered: &str) -> Option<Intent<'a>> {
        let phrase = self.phrases.web_search.iter().find(|phrase| lowered.contains(*phrase))?;
        let query = text_after(input, phrase).unwrap_or_else(|| input.to_string());
        Some(Intent::WebSearch { query })
    }

    fn help(&self, lowered: &str) -> Option<Intent<'a>> {
        if !self.phrases.help.iter().any(|phrase| lowered.contains(phrase)) {
            return None;
        }
        let command = self.executable().find(|spec| lowered.contains(spec.keyword));
        Some(Intent::Help { command })
    }

    fn search(&self, input: &str, lowered: &str) -> Option<Intent<'a>> {
        if !self.phrases.search.iter().any(|phrase| lowered.contains(phrase)) {
            return None;
        }

        let mut query = input.to_string();
        let mut query_lowered = lowered.to_string();
        for phrase in self.phrases.search {
            while let Some(start) = query_lowered.find(phrase) {
                let range = start..start + phrase.len();
                query.replace_range(range.clone(), " ");
                query_lowered.replace_range(range, " ");
            }
        }

        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(Intent::Search { query })
    }

    fn command_phrases(&self, input: &str, lowered: &str) -> Option<Intent<'a>> {
        let words: HashSet<&str> = lowered.split_whitespace().collect();

        let command = self.executable().find(|spec| {
            spec.trigger_phrases.iter().any(|phrase| lowered.contains(phrase))
                || spec.trigger_phrases.iter().any(|phrase| word_overlap(phrase, &words) > FUZZY_THRESHOLD)
        })?;

        Some(Intent::Execute { command, argument: extract_argument(command.keyword, input) })
    }

    fn direct_invocation(&self, input: &str, lowered: &str) -> Option<Intent<'a>> {
        let command = self.executable().find(|spec| lowered.starts_with(spec.keyword))?;
        let rest = input[command.keyword.len()..].trim();
        let argument = (!rest.is_empty()).then(|| rest.to_string());
        Some(Intent::Execute { command, argument })
    }
}

/// Share of `phrase`'s distinct words present in `words`.
pub fn word_overlap(phrase: &str, words: &HashSet<&str>) -> f64 {
    let phrase_words: HashSet<&str> = phrase.split_whitespace().collect();
    if phrase_words.is_empty() {
        return 0.0;
    }
    let shared = phrase_words.intersection(words).count();
    shared as f64 / phrase_words.len() as f64
}
