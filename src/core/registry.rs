//! The allow-listed command table.
//!
//! Every command the terminal may run is declared here together with the
//! natural-language phrases that unlock it. Order matters: when phrases of
//! two commands overlap, the command registered first wins.

/// How a command is implemented on one operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binary {
    /// A standalone executable, optionally with fixed leading arguments.
    Exe { program: &'static str, base_args: &'static [&'static str] },
    /// Built into the platform shell; runs through the shell's inline flag.
    ShellBuiltin { base_args: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Network,
    System,
    FileSystem,
    Time,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Network, Category::System, Category::FileSystem, Category::Time];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Network => "Network Commands",
            Category::System => "System Information",
            Category::FileSystem => "File System",
            Category::Time => "Time and Date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub keyword: &'static str,
    pub summary: &'static str,
    pub syntax: &'static str,
    pub category: Category,
    pub trigger_phrases: &'static [&'static str],
    pub requires_privilege: bool,
    pub windows: Option<Binary>,
    pub unix: Option<Binary>,
}

/// Pseudo-commands whose phrases live in [`PhraseSets`]; never executable.
pub const RESERVED_KEYWORDS: &[&str] = &["help", "search", "web_search"];

/// Phrase sets for the non-executing intents.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSets<'a> {
    pub web_search: &'a [&'a str],
    pub help: &'a [&'a str],
    pub search: &'a [&'a str],
}

pub static PHRASES: PhraseSets<'static> = PhraseSets {
    web_search: &[
        "search for",
        "look up",
        "find information about",
        "tell me about",
        "search online",
        "look online",
        "find online",
        "web search",
        "internet search",
        "search the web",
        "search internet",
        "find out about",
        "learn about",
        "get information about",
        "search duckduckgo",
        "duckduckgo search",
        "search duck duck go",
        "what do you know about",
        "tell me more about",
        "find details about",
        "get details about",
        "search details about",
    ],
    help: &[
        "how do i use",
        "what does",
        "explain command",
        "command help",
        "usage of",
        "syntax for",
        "examples of",
        "how to use",
        "help with",
        "explain how",
        "show how",
        "guide me",
        "can you explain",
    ],
    search: &[
        "find command",
        "lookup command",
        "what command",
        "is there a command",
        "command to",
        "how to",
        "what can i use",
        "which command",
        "find a way to",
        "how can i",
        "what should i use",
        "looking for command",
        "need command",
        "want to",
    ],
};

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        keyword: "ipconfig",
        summary: "Display network configuration",
        syntax: "ipconfig [/all]",
        category: Category::Network,
        trigger_phrases: &[
            "what is my ip",
            "show my ip",
            "display ip",
            "network config",
            "show network",
            "ip address",
            "network address",
            "my network",
            "network settings",
            "connection info",
            "internet settings",
            "wifi info",
            "ethernet info",
            "network adapter",
        ],
        requires_privilege: true,
        windows: Some(Binary::Exe { program: "ipconfig.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "ip", base_args: &["-4", "addr", "show"] }),
    },
    CommandSpec {
        keyword: "systeminfo",
        summary: "Display system information",
        syntax: "systeminfo",
        category: Category::System,
        trigger_phrases: &[
            "system info",
            "computer info",
            "pc info",
            "hardware info",
            "show system",
            "about my computer",
            "system details",
            "computer specs",
            "hardware specs",
            "system configuration",
            "computer details",
            "pc details",
            "system hardware",
        ],
        requires_privilege: true,
        windows: Some(Binary::Exe { program: "systeminfo.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "uname", base_args: &["-a"] }),
    },
    CommandSpec {
        keyword: "whoami",
        summary: "Show current user",
        syntax: "whoami",
        category: Category::System,
        trigger_phrases: &[
            "who am i",
            "current user",
            "my username",
            "logged in as",
            "show user",
            "user name",
            "my account",
            "current account",
            "user account",
            "login info",
            "account name",
        ],
        requires_privilege: false,
        windows: Some(Binary::Exe { program: "whoami.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "whoami", base_args: &[] }),
    },
    CommandSpec {
        keyword: "hostname",
        summary: "Display computer name",
        syntax: "hostname",
        category: Category::System,
        trigger_phrases: &[
            "computer name",
            "machine name",
            "host name",
            "pc name",
            "what is my computer called",
            "system name",
            "computer id",
            "machine id",
            "pc identifier",
            "computer identifier",
        ],
        requires_privilege: false,
        windows: Some(Binary::Exe { program: "hostname.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "hostname", base_args: &[] }),
    },
    CommandSpec {
        keyword: "dir",
        summary: "List directory contents",
        syntax: "dir [path]",
        category: Category::FileSystem,
        trigger_phrases: &[
            "show files",
            "list files",
            "show directory",
            "list directory",
            "what files are here",
            "show folder contents",
            "folder contents",
            "directory contents",
            "list folder",
            "show folder",
            "files here",
            "what is in this folder",
            "folder files",
            "directory files",
        ],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &[] }),
        unix: Some(Binary::Exe { program: "ls", base_args: &["-la"] }),
    },
    CommandSpec {
        keyword: "ping",
        summary: "Test network connectivity",
        syntax: "ping <host>",
        category: Category::Network,
        trigger_phrases: &[
            "test connection",
            "check connection",
            "ping test",
            "can i reach",
            "network test",
            "test network",
            "check network",
            "test internet",
            "check internet",
            "test website",
            "check website",
            "test server",
            "check server",
            "test if online",
            "check if online",
            "test connectivity",
        ],
        requires_privilege: false,
        windows: Some(Binary::Exe { program: "ping.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "ping", base_args: &["-c", "4"] }),
    },
    CommandSpec {
        keyword: "tracert",
        summary: "Trace network route",
        syntax: "tracert <host>",
        category: Category::Network,
        trigger_phrases: &[
            "trace route",
            "show route",
            "network path",
            "how does traffic get to",
            "trace path",
            "show path",
            "network trace",
            "route trace",
            "trace network",
            "show network path",
            "trace internet path",
            "how data travels",
            "data path",
            "connection path",
        ],
        requires_privilege: false,
        windows: Some(Binary::Exe { program: "tracert.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "traceroute", base_args: &[] }),
    },
    CommandSpec {
        keyword: "netstat",
        summary: "Show network connections",
        syntax: "netstat [-an]",
        category: Category::Network,
        trigger_phrases: &[
            "network status",
            "show connections",
            "active connections",
            "network statistics",
            "port usage",
            "network ports",
            "active ports",
            "connection status",
            "network activity",
            "port status",
            "connection list",
            "network connections",
            "active network",
            "port connections",
        ],
        requires_privilege: true,
        windows: Some(Binary::Exe { program: "netstat.exe", base_args: &[] }),
        unix: Some(Binary::Exe { program: "netstat", base_args: &["-tun"] }),
    },
    CommandSpec {
        keyword: "ver",
        summary: "Show operating system version",
        syntax: "ver",
        category: Category::System,
        trigger_phrases: &[
            "windows version",
            "os version",
            "system version",
            "what version",
            "which windows",
            "windows info",
            "os info",
            "system info",
            "version info",
            "windows details",
            "os details",
            "system details",
        ],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &[] }),
        unix: Some(Binary::Exe { program: "uname", base_args: &["-sr"] }),
    },
    CommandSpec {
        keyword: "date",
        summary: "Show current date",
        syntax: "date",
        category: Category::Time,
        trigger_phrases: &[
            "what date",
            "current date",
            "today date",
            "show date",
            "what day is it",
            "today",
            "current day",
            "what day",
            "date today",
            "show today",
            "what is today",
            "today's date",
        ],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &["/t"] }),
        unix: Some(Binary::Exe { program: "date", base_args: &[] }),
    },
    CommandSpec {
        keyword: "time",
        summary: "Show current time",
        syntax: "time",
        category: Category::Time,
        trigger_phrases: &[
            "what time",
            "current time",
            "show time",
            "tell me the time",
            "what is the time",
            "current hour",
            "what hour",
            "time now",
            "show current time",
            "what is now",
            "current moment",
        ],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &["/t"] }),
        unix: Some(Binary::Exe { program: "date", base_args: &["+%T"] }),
    },
    CommandSpec {
        keyword: "type",
        summary: "Display file contents",
        syntax: "type <file>",
        category: Category::FileSystem,
        trigger_phrases: &[],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &[] }),
        unix: Some(Binary::Exe { program: "cat", base_args: &[] }),
    },
    CommandSpec {
        keyword: "echo",
        summary: "Display text",
        syntax: "echo <text>",
        category: Category::FileSystem,
        trigger_phrases: &[],
        requires_privilege: false,
        windows: Some(Binary::ShellBuiltin { base_args: &[] }),
        unix: Some(Binary::Exe { program: "echo", base_args: &[] }),
    },
];

pub fn lookup(keyword: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.keyword.eq_ignore_ascii_case(keyword))
}

pub fn is_reserved(keyword: &str) -> bool {
    RESERVED_KEYWORDS.contains(&keyword)
}

/// Keywords of every executable command, sorted for display.
pub fn allowed_keywords() -> Vec<&'static str> {
    let mut keywords: Vec<&'static str> =
        COMMANDS.iter().map(|spec| spec.keyword).filter(|keyword| !is_reserved(keyword)).collect();
    keywords.sort_unstable();
    keywords
}
