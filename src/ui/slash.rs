use crate::core::lib::WrenError;

/// Terminal commands that bypass intent classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Exit,
    Exec(String),
    History,
    ClearHistory,
    ShowConfig,
    SetConfig { key: String, value: String },
    Admin,
}

pub const USAGE: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/exec <command>", "Run an allowed command directly"),
    ("/history", "Show executed commands"),
    ("/history clear", "Forget executed commands"),
    ("/config", "Show settings"),
    ("/config set <key> <value>", "Change a setting"),
    ("/admin", "Request administrator privileges"),
    ("/exit", "Leave wren (also: exit, quit)"),
];

impl SlashCommand {
    /// Parses a terminal command. Returns `Ok(None)` for input that should be
    /// classified normally.
    pub fn parse(input: &str) -> Result<Option<Self>, WrenError> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            return Ok(Some(SlashCommand::Exit));
        }
        let Some(body) = input.strip_prefix('/') else {
            return Ok(None);
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let command = match (name.to_ascii_lowercase().as_str(), rest) {
            ("help", _) => SlashCommand::Help,
            ("exit" | "quit", _) => SlashCommand::Exit,
            ("exec", "") => return Err(WrenError::InputError("Usage: /exec <command>".to_string())),
            ("exec", line) => SlashCommand::Exec(line.to_string()),
            ("history", "") => SlashCommand::History,
            ("history", "clear") => SlashCommand::ClearHistory,
            ("config", "") => SlashCommand::ShowConfig,
            ("config", args) => {
                let mut parts = args.splitn(3, char::is_whitespace);
                match (parts.next(), parts.next(), parts.next().map(str::trim)) {
                    (Some("set"), Some(key), Some(value)) if !value.is_empty() => {
                        SlashCommand::SetConfig { key: key.to_string(), value: value.to_string() }
                    }
                    _ => return Err(WrenError::InputError("Usage: /config set <key> <value>".to_string())),
                }
            }
            ("admin", _) => SlashCommand::Admin,
            _ => {
                return Err(WrenError::InputError(format!(
                    "Unknown command '/{}'. Type /help for available commands.",
                    name
                )))
            }
        };
        Ok(Some(command))
    }
}
