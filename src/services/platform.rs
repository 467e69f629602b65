use std::env;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use tracing::{info, warn};
use which::which;

use crate::core::lib::{Invocation, Platform};
use crate::core::registry::{Binary, CommandSpec};

/// Characters `cmd.exe` treats as syntax even inside an argument list.
const CMD_METACHARACTERS: &[char] = &['&', '|', '<', '>', '^', '%', '\n', '\r'];

/// The platform this binary was built for.
pub fn native() -> Box<dyn Platform> {
    if cfg!(windows) {
        Box::new(WindowsPlatform::new())
    } else {
        Box::new(UnixPlatform::new())
    }
}

#[derive(Debug)]
pub struct WindowsPlatform {
    system32: PathBuf,
    elevated: OnceLock<bool>,
}

impl WindowsPlatform {
    pub fn new() -> Self {
        let root = env::var("SystemRoot").unwrap_or_else(|_| String::from("C:\\Windows"));
        Self::with_system_root(root)
    }

    pub fn with_system_root(root: impl Into<PathBuf>) -> Self {
        Self { system32: root.into().join("System32"), elevated: OnceLock::new() }
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn resolve(&self, spec: &CommandSpec) -> Invocation {
        match spec.windows {
            Some(Binary::Exe { program, base_args }) => {
                Invocation::new(self.system32.join(program)).with_args(base_args.iter().copied())
            }
            Some(Binary::ShellBuiltin { base_args }) => Invocation::new(self.system32.join("cmd.exe"))
                .with_args(["/c", spec.keyword])
                .with_args(base_args.iter().copied()),
            None => Invocation::new(spec.keyword),
        }
    }

    fn accepts_argument(&self, spec: &CommandSpec, argument: &str) -> bool {
        !matches!(spec.windows, Some(Binary::ShellBuiltin { .. })) || !argument.contains(CMD_METACHARACTERS)
    }

    fn is_elevated(&self) -> bool {
        *self.elevated.get_or_init(|| {
            // `net session` only succeeds from an elevated token.
            Command::new("net")
                .arg("session")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        })
    }

    fn request_elevation(&self) -> bool {
        let exe = match env::current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                warn!("cannot locate current executable for elevation: {}", e);
                return false;
            }
        };

        let script = format!("Start-Process -FilePath '{}' -Verb RunAs", exe.display().to_string().replace('\'', "''"));
        match Command::new("powershell").args(["-NoProfile", "-Command", script.as_str()]).status() {
            Ok(status) if status.success() => {
                info!("launched an elevated instance; this session stays unprivileged");
            }
            Ok(status) => warn!("elevation request declined: {}", status),
            Err(e) => warn!("elevation request failed: {}", e),
        }
        // Rights never transfer to the running process.
        false
    }

    fn search_context(&self) -> &'static str {
        "windows"
    }
}

#[derive(Debug, Default)]
pub struct UnixPlatform {
    sudo_granted: OnceLock<bool>,
}

impl UnixPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for UnixPlatform {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn resolve(&self, spec: &CommandSpec) -> Invocation {
        match spec.unix {
            Some(Binary::Exe { program, base_args }) => {
                let path = which(program).unwrap_or_else(|_| PathBuf::from(program));
                Invocation::new(path).with_args(base_args.iter().copied())
            }
            Some(Binary::ShellBuiltin { base_args }) => {
                // Arguments reach the builtin as positional parameters, never as script text.
                let script = format!("{} {} \"$@\"", spec.keyword, base_args.join(" "));
                Invocation::new("/bin/sh").with_args(["-c", script.as_str(), "sh"])
            }
            None => Invocation::new(spec.keyword),
        }
    }

    fn is_elevated(&self) -> bool {
        effective_uid_is_root()
    }

    fn request_elevation(&self) -> bool {
        *self.sudo_granted.get_or_init(|| {
            Command::new("sudo")
                .args(["-n", "true"])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        })
    }

    fn elevate(&self, invocation: Invocation) -> Invocation {
        let mut args = vec!["-n".to_string(), invocation.program.display().to_string()];
        args.extend(invocation.args);
        Invocation { program: PathBuf::from("sudo"), args }
    }

    fn search_context(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        }
    }
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn effective_uid_is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{lookup, Category};

    fn spec(keyword: &str) -> &'static CommandSpec {
        lookup(keyword).unwrap()
    }

    #[test]
    fn windows_resolves_executables_under_system32() {
        let platform = WindowsPlatform::with_system_root("C:\\Windows");
        let invocation = platform.resolve(spec("ipconfig"));
        assert_eq!(invocation.program, PathBuf::from("C:\\Windows").join("System32").join("ipconfig.exe"));
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn windows_runs_builtins_through_cmd() {
        let platform = WindowsPlatform::with_system_root("C:\\Windows");
        let invocation = platform.resolve(spec("date"));
        assert_eq!(invocation.program, PathBuf::from("C:\\Windows").join("System32").join("cmd.exe"));
        assert_eq!(invocation.args, vec!["/c", "date", "/t"]);
    }

    #[test]
    fn windows_rejects_cmd_syntax_in_builtin_arguments() {
        let platform = WindowsPlatform::with_system_root("C:\\Windows");
        assert!(!platform.accepts_argument(spec("dir"), "C:\\ & del *"));
        assert!(platform.accepts_argument(spec("dir"), "C:\\Users"));
        assert!(platform.accepts_argument(spec("ping"), "a&b"));
    }

    #[test]
    fn missing_mapping_falls_back_to_keyword() {
        let custom = CommandSpec {
            keyword: "uptime",
            summary: "",
            syntax: "",
            category: Category::System,
            trigger_phrases: &[],
            requires_privilege: false,
            windows: None,
            unix: None,
        };
        assert_eq!(WindowsPlatform::with_system_root("C:\\Windows").resolve(&custom).program, PathBuf::from("uptime"));
        assert_eq!(UnixPlatform::new().resolve(&custom).program, PathBuf::from("uptime"));
    }

    #[test]
    fn unix_keeps_base_arguments() {
        let invocation = UnixPlatform::new().resolve(spec("ping"));
        assert_eq!(invocation.args, vec!["-c", "4"]);
        assert!(invocation.program.ends_with("ping"));
    }

    #[test]
    fn unix_builtins_pass_arguments_positionally() {
        let builtin = CommandSpec {
            keyword: "ulimit",
            summary: "",
            syntax: "",
            category: Category::System,
            trigger_phrases: &[],
            requires_privilege: false,
            windows: None,
            unix: Some(Binary::ShellBuiltin { base_args: &["-a"] }),
        };
        let invocation = UnixPlatform::new().resolve(&builtin);
        assert_eq!(invocation.program, PathBuf::from("/bin/sh"));
        assert_eq!(invocation.args, vec!["-c", "ulimit -a \"$@\"", "sh"]);
    }

    #[test]
    fn unix_elevation_wraps_in_sudo() {
        let invocation = Invocation::new("/usr/bin/netstat").with_args(["-tun"]);
        let elevated = UnixPlatform::new().elevate(invocation);
        assert_eq!(elevated.program, PathBuf::from("sudo"));
        assert_eq!(elevated.args, vec!["-n", "/usr/bin/netstat", "-tun"]);
    }
}
