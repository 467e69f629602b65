//! Turns raw tool output into a short readable summary.
//!
//! Each rule returns `None` when the output does not have the expected shape,
//! in which case the raw text is shown unchanged.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::core::lib::CommandOutput;

lazy_static! {
    static ref IPV4: Regex = Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})\b").unwrap();
    static ref MAC: Regex = Regex::new(r"\b([0-9A-Fa-f]{2}(?:[-:][0-9A-Fa-f]{2}){5})\b").unwrap();
    /// `2: eth0: <BROADCAST,...>` from `ip addr`, or `en0: flags=` from ifconfig.
    static ref UNIX_INTERFACE: Regex = Regex::new(r"^(?:\d+:\s+)?([A-Za-z0-9_.@-]+):\s+(?:<|flags=)").unwrap();
}

const SYSTEMINFO_FIELDS: &[&str] =
    &["OS Name", "OS Version", "System Type", "Total Physical Memory", "Available Physical Memory"];

pub fn normalize(keyword: &str, output: &CommandOutput) -> String {
    let raw = output.text();
    if raw.trim().is_empty() {
        return raw.to_string();
    }

    let summary = match keyword {
        "ipconfig" => network_summary(raw),
        "systeminfo" => system_summary(raw),
        "netstat" => connection_summary(raw),
        "ping" => ping_summary(raw),
        "tracert" => route_summary(raw),
        "dir" => listing_summary(raw),
        "whoami" => Some(format!("You are logged in as {}", raw.trim())),
        "hostname" => Some(format!("Your computer's name is {}", raw.trim())),
        "ver" => Some(format!("You are running {}", raw.trim())),
        "date" => Some(format!("Current date: {}", raw.trim())),
        "time" => Some(format!("Current time: {}", raw.trim())),
        _ => return format!("Command output:\n{}", raw),
    };

    summary.unwrap_or_else(|| {
        debug!(keyword, "output did not match the expected shape; showing raw text");
        raw.to_string()
    })
}

fn non_blank(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim_end).filter(|line| !line.trim().is_empty())
}

#[derive(Debug, Default)]
struct Adapter {
    name: String,
    ip: Option<String>,
    mac: Option<String>,
}

fn network_summary(raw: &str) -> Option<String> {
    let mut adapters: Vec<Adapter> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let header = if trimmed.contains("adapter") && trimmed.ends_with(':') {
            Some(trimmed.trim_end_matches(':').to_string())
        } else {
            UNIX_INTERFACE.captures(trimmed).map(|caps| caps[1].to_string())
        };
        if let Some(name) = header {
            adapters.push(Adapter { name, ..Default::default() });
            continue;
        }

        let is_ipv4 = trimmed.starts_with("IPv4 Address") || trimmed.starts_with("inet ");
        let is_mac = trimmed.starts_with("Physical Address") || trimmed.starts_with("link/ether");
        if !is_ipv4 && !is_mac {
            continue;
        }

        if adapters.is_empty() {
            adapters.push(Adapter { name: "Network adapter".to_string(), ..Default::default() });
        }
        let current = adapters.last_mut()?;
        if is_ipv4 {
            current.ip = current.ip.take().or_else(|| IPV4.captures(trimmed).map(|caps| caps[1].to_string()));
        } else {
            current.mac = current.mac.take().or_else(|| MAC.captures(trimmed).map(|caps| caps[1].to_string()));
        }
    }

    let mut response = String::from("Your network information:\n");
    let mut found = false;
    for adapter in adapters.iter().filter(|adapter| adapter.ip.is_some() || adapter.mac.is_some()) {
        found = true;
        response.push_str(&format!("\n{}:\n", adapter.name));
        if let Some(ip) = &adapter.ip {
            response.push_str(&format!("  IP Address: {}\n", ip));
        }
        if let Some(mac) = &adapter.mac {
            response.push_str(&format!("  MAC Address: {}\n", mac));
        }
    }
    found.then_some(response)
}

fn system_summary(raw: &str) -> Option<String> {
    let fields: Vec<(String, String)> = raw
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let picked: Vec<String> = SYSTEMINFO_FIELDS
        .iter()
        .filter_map(|field| {
            let (key, value) = fields.iter().find(|(key, _)| key == field)?;
            Some(format!("{}: {}", key, value))
        })
        .collect();

    if picked.is_empty() {
        return None;
    }
    Some(format!("Your system information:\n\n{}", picked.join("\n")))
}

fn connection_summary(raw: &str) -> Option<String> {
    let mut connections = Vec::new();

    for line in raw.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(protocol) = parts.first() else { continue };
        let upper = protocol.to_ascii_uppercase();
        if !upper.starts_with("TCP") && !upper.starts_with("UDP") {
            continue;
        }

        // Unix netstat inserts Recv-Q and Send-Q before the addresses.
        let offset = if parts.len() >= 5 && parts[1].parse::<u64>().is_ok() && parts[2].parse::<u64>().is_ok() {
            3
        } else {
            1
        };
        let (Some(local), Some(remote)) = (parts.get(offset), parts.get(offset + 1)) else { continue };
        let state = parts.get(offset + 2).copied().unwrap_or("N/A");
        connections.push(format!("{} {} -> {} ({})", protocol, local, remote, state));
    }

    if connections.is_empty() {
        return None;
    }
    Some(format!("Active network connections:\n\n{}", connections.join("\n")))
}

fn ping_summary(raw: &str) -> Option<String> {
    let lines: Vec<&str> = non_blank(raw).collect();
    if lines.len() < 3 {
        return None;
    }

    // "Pinging example.com [93.184.216.34] ..." or "PING example.com (93.184.216.34) ..."
    let target = lines[0].split_whitespace().nth(1)?;
    let stats = &lines[lines.len() - 2..];
    let stats: Vec<&str> = stats.iter().map(|line| line.trim()).collect();
    Some(format!("Ping results for {}:\n{}", target, stats.join("\n")))
}

fn route_summary(raw: &str) -> Option<String> {
    let lines: Vec<&str> = non_blank(raw).collect();
    let (header, hops) = lines.split_first()?;
    if hops.is_empty() {
        return None;
    }

    // "Tracing route to example.com [...]" or "traceroute to example.com (...)"
    let mut words = header.split_whitespace();
    words.find(|word| word.eq_ignore_ascii_case("to"))?;
    let target = words.next()?.trim_end_matches(',');

    let hops: Vec<&str> =
        hops.iter().copied().filter(|line| !line.trim_start().starts_with("Trace complete")).collect();
    Some(format!("Route to {}:\n\n{}", target, hops.join("\n")))
}

fn listing_summary(raw: &str) -> Option<String> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for line in non_blank(raw) {
        let trimmed = line.trim_start();
        if trimmed.starts_with("total ") {
            continue;
        }
        let unix_dir = trimmed.starts_with('d') && trimmed.chars().nth(1).map_or(false, |c| c == 'r' || c == '-');
        if line.contains("<DIR>") || unix_dir {
            dirs.push(line);
        } else {
            files.push(line);
        }
    }

    if dirs.is_empty() && files.is_empty() {
        return None;
    }

    let mut response = String::from("Directory contents:\n");
    if !dirs.is_empty() {
        response.push_str("\nDirectories:\n");
        response.push_str(&dirs.join("\n"));
    }
    if !files.is_empty() {
        response.push_str("\n\nFiles:\n");
        response.push_str(&files.join("\n"));
    }
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(stdout: &str) -> CommandOutput {
        CommandOutput { stdout: stdout.to_string(), stderr: String::new(), return_code: 0 }
    }

    const WINDOWS_IPCONFIG: &str = "
Windows IP Configuration


Ethernet adapter Ethernet:

   Connection-specific DNS Suffix  . : lan
   Physical Address. . . . . . . . . : 00-1A-2B-3C-4D-5E
   IPv4 Address. . . . . . . . . . . : 192.168.1.42(Preferred)
   Subnet Mask . . . . . . . . . . . : 255.255.255.0

Wireless LAN adapter Wi-Fi:

   Media State . . . . . . . . . . . : Media disconnected
";

    #[test]
    fn ipconfig_lists_adapter_addresses() {
        let text = normalize("ipconfig", &out(WINDOWS_IPCONFIG));
        assert!(text.starts_with("Your network information:"));
        assert!(text.contains("Ethernet adapter Ethernet:"));
        assert!(text.contains("IP Address: 192.168.1.42"));
        assert!(text.contains("MAC Address: 00-1A-2B-3C-4D-5E"));
        assert!(!text.contains("Wi-Fi"));
    }

    #[test]
    fn ipconfig_accepts_bare_ipv4_line() {
        let text = normalize("ipconfig", &out("   IPv4 Address. . . . . . . . . . . : 10.0.0.7\n"));
        assert!(text.contains("IP Address: 10.0.0.7"));
    }

    #[test]
    fn ipconfig_reads_ip_addr_output() {
        let raw = "1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue\n    inet 127.0.0.1/8 scope host lo\n2: eth0: <BROADCAST,MULTICAST,UP> mtu 1500\n    inet 172.17.0.2/16 brd 172.17.255.255 scope global eth0\n";
        let text = normalize("ipconfig", &out(raw));
        assert!(text.contains("lo:\n  IP Address: 127.0.0.1"));
        assert!(text.contains("eth0:\n  IP Address: 172.17.0.2"));
    }

    #[test]
    fn unrecognized_shape_returns_raw_output() {
        assert_eq!(normalize("ipconfig", &out("no adapters\n")), "no adapters\n");
        assert_eq!(normalize("systeminfo", &out("Linux box 6.1.0 x86_64\n")), "Linux box 6.1.0 x86_64\n");
        assert_eq!(normalize("ping", &out("ping: unknown host\n")), "ping: unknown host\n");
    }

    #[test]
    fn systeminfo_picks_key_fields() {
        let raw = "Host Name:                 DESK\nOS Name:                   Microsoft Windows 11 Pro\nOS Version:                10.0.22631 N/A Build 22631\nSystem Type:               x64-based PC\n";
        let text = normalize("systeminfo", &out(raw));
        assert_eq!(
            text,
            "Your system information:\n\nOS Name: Microsoft Windows 11 Pro\nOS Version: 10.0.22631 N/A Build 22631\nSystem Type: x64-based PC"
        );
    }

    #[test]
    fn netstat_handles_both_layouts() {
        let windows = "Active Connections\n\n  Proto  Local Address          Foreign Address        State\n  TCP    10.0.0.5:50000         93.184.216.34:443      ESTABLISHED\n  UDP    0.0.0.0:5353           *:*\n";
        let text = normalize("netstat", &out(windows));
        assert!(text.contains("TCP 10.0.0.5:50000 -> 93.184.216.34:443 (ESTABLISHED)"));
        assert!(text.contains("UDP 0.0.0.0:5353 -> *:* (N/A)"));

        let unix = "Active Internet connections (w/o servers)\nProto Recv-Q Send-Q Local Address           Foreign Address         State\ntcp        0      0 172.17.0.2:41234        140.82.112.3:443        ESTABLISHED\n";
        let text = normalize("netstat", &out(unix));
        assert!(text.contains("tcp 172.17.0.2:41234 -> 140.82.112.3:443 (ESTABLISHED)"));
    }

    #[test]
    fn ping_keeps_last_two_statistics_lines() {
        let raw = "\nPinging example.com [93.184.216.34] with 32 bytes of data:\nReply from 93.184.216.34: bytes=32 time=12ms TTL=56\n\nPing statistics for 93.184.216.34:\n    Packets: Sent = 4, Received = 4, Lost = 0 (0% loss),\nApproximate round trip times in milli-seconds:\n    Minimum = 11ms, Maximum = 13ms, Average = 12ms\n";
        let text = normalize("ping", &out(raw));
        assert_eq!(
            text,
            "Ping results for example.com:\nApproximate round trip times in milli-seconds:\nMinimum = 11ms, Maximum = 13ms, Average = 12ms"
        );
    }

    #[test]
    fn tracert_names_target_and_hops() {
        let raw = "traceroute to example.com (93.184.216.34), 30 hops max, 60 byte packets\n 1  gateway (10.0.0.1)  0.4 ms\n 2  93.184.216.34  11.2 ms\n";
        let text = normalize("tracert", &out(raw));
        assert!(text.starts_with("Route to example.com:"));
        assert!(text.contains(" 2  93.184.216.34  11.2 ms"));
    }

    #[test]
    fn dir_splits_directories_and_files() {
        let raw = " Directory of C:\\src\n\n01/02/2024  10:00 AM    <DIR>          crate\n01/02/2024  10:00 AM             1,024 notes.txt\n";
        let text = normalize("dir", &out(raw));
        assert!(text.contains("Directories:\n01/02/2024  10:00 AM    <DIR>          crate"));
        assert!(text.contains("Files:\n Directory of C:\\src\n01/02/2024  10:00 AM             1,024 notes.txt"));

        let unix = "total 8\ndrwxr-xr-x 2 ada ada 4096 Jan  2 10:00 crate\n-rw-r--r-- 1 ada ada 1024 Jan  2 10:00 notes.txt\n";
        let text = normalize("dir", &out(unix));
        assert!(text.contains("Directories:\ndrwxr-xr-x"));
        assert!(text.contains("Files:\n-rw-r--r--"));
    }

    #[test]
    fn simple_commands_get_sentences() {
        assert_eq!(normalize("whoami", &out("desk\\ada\r\n")), "You are logged in as desk\\ada");
        assert_eq!(normalize("hostname", &out("DESK\n")), "Your computer's name is DESK");
        assert_eq!(normalize("time", &out("10:42\n")), "Current time: 10:42");
    }

    #[test]
    fn unknown_commands_get_generic_prefix() {
        assert_eq!(normalize("echo", &out("hi\n")), "Command output:\nhi\n");
    }

    #[test]
    fn stderr_is_used_when_stdout_is_empty() {
        let output = CommandOutput { stdout: String::new(), stderr: "access denied\n".into(), return_code: 5 };
        assert_eq!(normalize("type", &output), "Command output:\naccess denied\n");
    }

    #[test]
    fn empty_output_is_returned_as_is() {
        assert_eq!(normalize("whoami", &out("")), "");
    }
}
