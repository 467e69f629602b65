use colored::*;

use crate::core::config::Config;
use crate::core::lib::SearchResult;
use crate::core::registry::{Category, CommandSpec, COMMANDS};
use crate::services::command::ExecutionError;
use crate::services::dispatch::Reply;
use crate::ui::slash;

/// Natural-language phrasings shown for a command in help.
fn examples(spec: &CommandSpec) -> Vec<String> {
    if spec.trigger_phrases.is_empty() {
        return vec![spec.syntax.to_string()];
    }
    spec.trigger_phrases.iter().take(2).map(|phrase| format!("\"{}\"", phrase)).collect()
}

pub fn command_help(spec: &CommandSpec) -> String {
    let mut text = format!("{}\n\nSyntax: {}\n", spec.summary, spec.syntax);
    if spec.requires_privilege {
        text.push_str("Requires administrator privileges.\n");
    }
    text.push_str("\nTry asking:\n");
    for example in spec.trigger_phrases.iter().take(5) {
        text.push_str(&format!("  - {}\n", example));
    }
    if spec.trigger_phrases.is_empty() {
        text.push_str(&format!("  - /exec {}\n", spec.syntax));
    }
    text
}

pub fn general_help() -> String {
    let mut text = String::new();
    for category in Category::ALL {
        text.push_str(&format!("{}\n", category.title()));
        for spec in COMMANDS.iter().filter(|spec| spec.category == category) {
            text.push_str(&format!("  {:<12}{}\n", spec.keyword, spec.summary));
            text.push_str(&format!("  {:<12}e.g. {}\n", "", examples(spec).join(", ")));
        }
        text.push('\n');
    }

    text.push_str("Web\n");
    text.push_str("  \"search for rust ownership\", \"tell me about tokio\"\n");
    text.push_str("  \"which command shows open ports\"\n\n");

    text.push_str("Terminal commands\n");
    for (usage, meaning) in slash::USAGE {
        text.push_str(&format!("  {:<28}{}\n", usage, meaning));
    }
    text
}

fn print_panel(title: &str, body: &str) {
    println!("{}", format!("=== {} ===", title).blue().bold());
    println!("{}", body.trim_end());
    println!();
}

fn print_results(heading: &str, results: &[SearchResult], empty: &str) {
    if results.is_empty() {
        println!("{}", empty.yellow());
        return;
    }
    println!("{}", heading.bold());
    for result in results {
        println!();
        println!("{}", result.title.cyan());
        if !result.snippet.is_empty() {
            println!("{}", result.snippet);
        }
        println!("{}", format!("Source: {} - {}", result.source, result.url).dimmed());
    }
}

pub fn print_error(error: &dyn std::fmt::Display) {
    eprintln!("{} {}", "Error:".red().bold(), error.to_string().red());
}

pub fn print_reply(reply: &Reply) {
    match reply {
        Reply::Command { keyword, exit_code, text } => {
            if *exit_code != 0 {
                println!("{}", format!("{} exited with code {}", keyword, exit_code).yellow());
            }
            println!("{}", text.trim_end());
        }
        Reply::Rejected(error @ ExecutionError::InsufficientPrivilege { .. }) => {
            print_error(error);
            println!("{}", "Use /admin to request elevated rights.".yellow());
        }
        Reply::Rejected(error) => print_error(error),
        Reply::WebResults { query, results } => {
            println!("{}", format!("Searching the web for '{}'...", query).cyan());
            print_results("Here's what I found:", results, "No relevant information found.");
        }
        Reply::CommandSuggestions { query, results } => {
            println!("{}", format!("Looking for commands that help with '{}'...", query).cyan());
            print_results("Found these potentially helpful commands:", results, "No relevant commands found.");
        }
        Reply::CommandHelp(spec) => print_panel(&format!("Help: {}", spec.keyword), &command_help(spec)),
        Reply::GeneralHelp => print_panel("Wren help", &general_help()),
        Reply::Chat(text) => {
            println!("{}", text.green());
        }
        Reply::ChatError(error) => print_error(error),
    }
}

pub fn print_history<'a>(entries: impl Iterator<Item = &'a str>) {
    let mut any = false;
    for (index, entry) in entries.enumerate() {
        any = true;
        println!("{:>4}  {}", index + 1, entry);
    }
    if !any {
        println!("{}", "No commands executed yet.".yellow());
    }
}

pub fn print_config(config: &Config) {
    println!("{}", "=== Settings ===".blue().bold());
    for (key, value) in config.entries() {
        println!("  {:<22}{}", key.cyan(), value);
    }
}

pub fn print_welcome(elevated: bool, has_api_key: bool) {
    println!("{}", "=== Welcome to Wren - your command-line assistant ===".green().bold());
    println!("{}", "Ask in plain words: \"what is my ip\", \"ping google.com\", \"search for rust ownership\".".blue());
    if !elevated {
        println!(
            "{}",
            "Running without administrator rights; ipconfig, systeminfo and netstat will ask for elevation.".yellow()
        );
    }
    if !has_api_key {
        println!("{}", "No API key found (GROK_API_KEY); chat replies are unavailable.".yellow());
    }
    println!("{}", "Type /help for more information or 'exit' to quit.".yellow());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::lookup;

    #[test]
    fn general_help_lists_every_command_by_category() {
        let text = general_help();
        for spec in COMMANDS {
            assert!(text.contains(spec.keyword), "missing {}", spec.keyword);
        }
        let network = text.find("Network").unwrap();
        let time = text.find("Time").unwrap();
        assert!(network < text.find("ipconfig").unwrap());
        assert!(time < text.find("  date").unwrap());
        assert!(text.contains("\"what is my ip\", \"show my ip\""));
        assert!(text.contains("/config set <key> <value>"));
    }

    #[test]
    fn command_help_mentions_privilege() {
        let text = command_help(lookup("netstat").unwrap());
        assert!(text.starts_with("Show network connections"));
        assert!(text.contains("Requires administrator privileges."));
        assert!(text.contains("  - network status"));

        let text = command_help(lookup("whoami").unwrap());
        assert!(!text.contains("administrator"));
    }

    #[test]
    fn commands_without_phrases_show_exec_usage() {
        let text = command_help(lookup("type").unwrap());
        assert!(text.contains("/exec type <file>"));
    }
}
