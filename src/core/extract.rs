//! Pulls a command argument (host, path) out of a natural-language request.
//!
//! Rules are keyed by command keyword. Matching runs on an ASCII-lowercased
//! copy of the input while the returned text is sliced from the original, so
//! paths keep their case.

const PING_REACH: &str = "can i reach";
const PING_VERBS: &[&str] = &["test", "check"];
const PING_FILLER: &[&str] = &[
    "connection", "connectivity", "network", "internet", "website", "server", "if", "online", "to", "the", "my",
];

const ROUTE_LEADINS: &[&str] =
    &["how does traffic get to", "trace route to", "trace path to", "show path to", "network path to", "route to"];

const LISTING_LEADINS: &[&str] = &["show files in", "list files in", "what files are in", "what is in"];

/// Extracts the argument for `keyword` from `input`. Returns `None` when no
/// rule applies; the command then runs without arguments.
pub fn extract_argument(keyword: &str, input: &str) -> Option<String> {
    match keyword {
        "ping" => ping_target(input),
        "tracert" => text_after_any(input, ROUTE_LEADINS),
        "dir" => text_after_any(input, LISTING_LEADINS),
        _ => None,
    }
}

fn ping_target(input: &str) -> Option<String> {
    if let Some(target) = text_after(input, PING_REACH) {
        return Some(target);
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let verb = tokens.iter().position(|token| PING_VERBS.contains(&token.to_ascii_lowercase().as_str()))?;
    tokens[verb + 1..]
        .iter()
        .map(|token| clean(token))
        .find(|token| !token.is_empty() && !PING_FILLER.contains(&token.to_ascii_lowercase().as_str()))
        .map(str::to_string)
}

fn text_after_any(input: &str, leadins: &[&str]) -> Option<String> {
    leadins.iter().find_map(|leadin| text_after(input, leadin))
}

/// Text following the first occurrence of `phrase`, or `None` if the phrase
/// is absent or nothing follows it.
pub(crate) fn text_after(input: &str, phrase: &str) -> Option<String> {
    let lowered = input.to_ascii_lowercase();
    let start = lowered.find(phrase)? + phrase.len();
    let tail = clean(&input[start..]);
    (!tail.is_empty()).then(|| tail.to_string())
}

fn clean(text: &str) -> &str {
    text.trim().trim_end_matches(['?', '!', ',']).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_prefers_reach_phrase() {
        assert_eq!(extract_argument("ping", "can i reach example.com?"), Some("example.com".to_string()));
    }

    #[test]
    fn ping_takes_token_after_test_or_check() {
        assert_eq!(extract_argument("ping", "check github.com please"), Some("github.com".to_string()));
        assert_eq!(extract_argument("ping", "test connection to 8.8.8.8"), Some("8.8.8.8".to_string()));
    }

    #[test]
    fn ping_without_target_is_none() {
        assert_eq!(extract_argument("ping", "test internet"), None);
        assert_eq!(extract_argument("ping", "ping test"), None);
    }

    #[test]
    fn tracert_reads_route_leadins() {
        assert_eq!(
            extract_argument("tracert", "how does traffic get to rust-lang.org"),
            Some("rust-lang.org".to_string())
        );
        assert_eq!(extract_argument("tracert", "show path to 1.1.1.1"), Some("1.1.1.1".to_string()));
        assert_eq!(extract_argument("tracert", "trace route"), None);
    }

    #[test]
    fn dir_keeps_path_case() {
        assert_eq!(extract_argument("dir", "List files in C:\\Users\\Ada"), Some("C:\\Users\\Ada".to_string()));
        assert_eq!(extract_argument("dir", "what is in /tmp/Build"), Some("/tmp/Build".to_string()));
    }

    #[test]
    fn other_commands_take_no_argument() {
        assert_eq!(extract_argument("ipconfig", "what is my ip on eth0"), None);
        assert_eq!(extract_argument("whoami", "who am i"), None);
    }
}
