//! Candidate port derivation
//!
//! Guesses which local TCP ports a server might listen on from its
//! environment and launch arguments. The order of the returned list is the
//! order in which ports are probed.

use std::collections::{BTreeMap, HashSet};

use crate::mcp::McpServer;

/// Environment variables consulted first, in priority order
pub const PRIMARY_PORT_ENV: [&str; 3] = ["MCP_PORT", "HTTP_PORT", "API_PORT"];

/// Generic port variables, consulted after [`PRIMARY_PORT_ENV`]
pub const SECONDARY_PORT_ENV: [&str; 5] =
    ["PORT", "SERVER_PORT", "APP_PORT", "WEB_PORT", "SERVICE_PORT"];

/// Ports tried when configuration yields no numeric candidate
pub const FALLBACK_PORTS: [u16; 7] = [8080, 3000, 5000, 8000, 8888, 9000, 4000];

/// A raw extraction; `None` when the text did not parse as a number.
type RawPort = Option<i64>;

pub fn candidate_ports(server: &McpServer) -> Vec<u16> {
    derive_ports(Some(&server.args), &server.env)
}

/// Derive candidates from launch arguments and environment.
///
/// `args` of `None` skips argument scanning.
pub fn derive_ports(args: Option<&[String]>, env: &BTreeMap<String, String>) -> Vec<u16> {
    let mut raw = collect_env(|key| env.get(key).cloned());
    if let Some(args) = args {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        raw.extend(collect_args(&args));
    }
    finalize(raw)
}

fn collect_env(lookup: impl Fn(&str) -> Option<String>) -> Vec<RawPort> {
    PRIMARY_PORT_ENV
        .iter()
        .chain(SECONDARY_PORT_ENV.iter())
        .filter_map(|key| lookup(*key))
        .filter(|value| !value.is_empty())
        .map(|value| parse_int(&value))
        .collect()
}

fn collect_args(args: &[&str]) -> Vec<RawPort> {
    let mut raw = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = args[i];
        let has_next = i + 1 < args.len();

        if arg.contains("--port=") {
            raw.push(value_after_eq(arg));
        } else if arg == "--port" && has_next {
            raw.push(parse_int(args[i + 1]));
            i += 1;
        } else if arg == "-p" && has_next {
            raw.push(parse_int(args[i + 1]));
            i += 1;
        } else if arg.contains("--http-port=") || arg.contains("--api-port=") {
            raw.push(value_after_eq(arg));
        } else if matches_named_port_flag(arg) {
            raw.push(value_after_eq(arg));
        }

        i += 1;
    }

    raw
}

fn finalize(raw: Vec<RawPort>) -> Vec<u16> {
    let raw = if raw.iter().all(Option::is_none) {
        FALLBACK_PORTS.iter().map(|&p| Some(i64::from(p))).collect()
    } else {
        raw
    };

    let mut seen = HashSet::new();
    raw.into_iter()
        .flatten()
        .filter(|&port| port > 0 && port < 65536)
        .filter_map(|port| u16::try_from(port).ok())
        .filter(|port| seen.insert(*port))
        .collect()
}

/// The text between the first and second `=`.
fn value_after_eq(arg: &str) -> RawPort {
    arg.split('=').nth(1).and_then(parse_int)
}

/// Lenient integer parse: leading whitespace, optional sign, then the
/// longest run of decimal digits. `"8080abc"` is 8080; `"abc"` is `None`.
pub(crate) fn parse_int(text: &str) -> RawPort {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Matches `--<word>-port=<digits>` anywhere in the argument.
fn matches_named_port_flag(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    let mut start = 0;
    while let Some(offset) = arg[start..].find("--") {
        let mut j = start + offset + 2;
        let word_start = j;
        while j < bytes.len() && is_word(bytes[j]) {
            j += 1;
        }
        if j > word_start
            && arg[j..].starts_with("-port=")
            && bytes.get(j + "-port=".len()).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
        start += offset + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fallback_when_nothing_configured() {
        assert_eq!(
            derive_ports(Some(&[]), &BTreeMap::new()),
            vec![8080, 3000, 5000, 8000, 8888, 9000, 4000]
        );
    }

    #[test]
    fn fallback_when_nothing_numeric() {
        let ports = derive_ports(Some(&args(&["--port=abc"])), &env(&[("PORT", "http")]));
        assert_eq!(ports, FALLBACK_PORTS.to_vec());
    }

    #[test]
    fn env_priority_order() {
        let ports = derive_ports(
            Some(&[]),
            &env(&[
                ("SERVICE_PORT", "7005"),
                ("PORT", "7001"),
                ("API_PORT", "7003"),
                ("MCP_PORT", "7000"),
                ("HTTP_PORT", "7002"),
            ]),
        );
        assert_eq!(ports, vec![7000, 7002, 7003, 7001, 7005]);
    }

    #[test]
    fn env_before_args() {
        let ports = derive_ports(Some(&args(&["--port=9001"])), &env(&[("PORT", "9000")]));
        assert_eq!(ports, vec![9000, 9001]);
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let ports = derive_ports(Some(&args(&["--port=9001"])), &env(&[("MCP_PORT", "")]));
        assert_eq!(ports, vec![9001]);
    }

    #[test]
    fn out_of_range_env_is_discarded() {
        let ports = derive_ports(
            Some(&args(&["--port=4100"])),
            &env(&[("PORT", "99999")]),
        );
        assert_eq!(ports, vec![4100]);

        let only_out_of_range = derive_ports(Some(&[]), &env(&[("PORT", "99999")]));
        assert!(only_out_of_range.is_empty());
    }

    #[test]
    fn zero_and_negative_are_discarded() {
        let ports = derive_ports(
            Some(&args(&["--port=0", "-p", "-5", "--port", "6000"])),
            &BTreeMap::new(),
        );
        assert_eq!(ports, vec![6000]);
    }

    #[test]
    fn port_flag_forms() {
        let ports = derive_ports(
            Some(&args(&[
                "--port=1001",
                "--port",
                "1002",
                "-p",
                "1003",
                "--http-port=1004",
                "--api-port=1005",
                "--admin-port=1006",
            ])),
            &BTreeMap::new(),
        );
        assert_eq!(ports, vec![1001, 1002, 1003, 1004, 1005, 1006]);
    }

    #[test]
    fn flag_value_is_not_rescanned() {
        let ports = derive_ports(
            Some(&args(&["--port", "--port=2000", "--debug-port=2001"])),
            &BTreeMap::new(),
        );
        // "--port=2000" is consumed as the value of "--port" and is not a number.
        assert_eq!(ports, vec![2001]);
    }

    #[test]
    fn trailing_flag_without_value() {
        let ports = derive_ports(Some(&args(&["serve", "--port"])), &BTreeMap::new());
        assert_eq!(ports, FALLBACK_PORTS.to_vec());
    }

    #[test]
    fn duplicates_are_removed() {
        let ports = derive_ports(
            Some(&args(&["--port=8080", "--port=8080"])),
            &BTreeMap::new(),
        );
        assert_eq!(ports, vec![8080]);
    }

    #[test]
    fn http_port_scenario() {
        let ports = derive_ports(Some(&args(&["--http-port=4321", "start"])), &BTreeMap::new());
        assert_eq!(ports, vec![4321]);
    }

    #[test]
    fn generic_pattern_requires_digits() {
        let ports = derive_ports(Some(&args(&["--metrics-port=abc"])), &BTreeMap::new());
        assert_eq!(ports, FALLBACK_PORTS.to_vec());
        assert!(!matches_named_port_flag("--foo-bar-port=1"));
        assert!(matches_named_port_flag("x--foo_1-port=12"));
        assert!(!matches_named_port_flag("--port=12"));
    }

    #[test]
    fn derivation_is_idempotent() {
        let a = args(&["-p", "3100", "--x-port=3200"]);
        let e = env(&[("APP_PORT", "3000")]);
        assert_eq!(derive_ports(Some(&a), &e), derive_ports(Some(&a), &e));
    }

    #[test]
    fn lenient_integer_parse() {
        assert_eq!(parse_int("8080"), Some(8080));
        assert_eq!(parse_int("  8080abc"), Some(8080));
        assert_eq!(parse_int("-12"), Some(-12));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("99999999999999999999999"), Some(i64::MAX));
    }
}
