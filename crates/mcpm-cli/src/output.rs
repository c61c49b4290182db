//! Terminal rendering for CLI results.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use console::style;

use mcpm_core::mcp::McpServer;
use mcpm_core::probe::ProbeResult;
use mcpm_core::status::ServerStatus;

pub fn print_server_table(servers: &[(String, McpServer)], config_path: &Path) {
    println!("Registry: {}", config_path.display());
    println!();

    if servers.is_empty() {
        println!("No MCP servers configured.");
        println!("Add one with: mcpm add <id> -- <command> [args...]");
        return;
    }

    println!("MCP Servers ({}):", servers.len());
    println!("  {:<24} {:<16} {:<30} Env", "ID", "Command", "Arguments");
    println!("  {}", "-".repeat(80));

    for (id, server) in servers {
        let env = if server.env.is_empty() {
            "-".to_string()
        } else {
            server.env.keys().cloned().collect::<Vec<_>>().join(", ")
        };
        let args = if server.args.is_empty() {
            "-".to_string()
        } else {
            server.args.join(" ")
        };

        println!(
            "  {:<24} {:<16} {:<30} {}",
            truncate(id, 24),
            truncate(&server.command, 16),
            truncate(&args, 30),
            env
        );
    }
}

pub fn print_servers_json(servers: &[(String, McpServer)]) -> Result<()> {
    let output: Vec<_> = servers
        .iter()
        .map(|(id, server)| {
            serde_json::json!({
                "id": id,
                "command": server.command,
                "args": server.args,
                "env": server.env,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_server_details(id: &str, server: &McpServer) {
    println!("{}", style(id).bold().cyan());
    println!("  Command:  {}", style(&server.command).green());

    if server.args.is_empty() {
        println!("  Args:     -");
    } else {
        println!("  Args:");
        for arg in &server.args {
            println!("    {}", arg);
        }
    }

    if server.env.is_empty() {
        println!("  Env:      -");
    } else {
        println!("  Env:");
        for (key, value) in &server.env {
            println!("    {}={}", key, value);
        }
    }
}

pub fn print_ping_table(results: &BTreeMap<String, ProbeResult>) {
    if results.is_empty() {
        println!("No MCP servers configured.");
        return;
    }

    println!("  {:<24} {:<10} {:<7} Detail", "ID", "Status", "Port");
    println!("  {}", "-".repeat(70));

    for (id, result) in results {
        let port = result
            .port
            .map(|port| port.to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = result.error.as_deref().unwrap_or("");
        println!(
            "  {:<24} {:<10} {:<7} {}",
            truncate(id, 24),
            status_badge(ServerStatus::from(result)),
            port,
            detail
        );
    }

    let online = results.values().filter(|result| result.reachable).count();
    println!();
    println!("{}/{} online", online, results.len());
}

pub fn print_ping_json(results: &BTreeMap<String, ProbeResult>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

/// Print one line per unreachable server and return how many there were.
pub fn print_offline(results: &BTreeMap<String, ProbeResult>) -> usize {
    let mut offline = 0;
    for (id, result) in results.iter().filter(|(_, result)| !result.reachable) {
        offline += 1;
        println!(
            "⚠ {}: {}",
            id,
            result.error.as_deref().unwrap_or("Connection failed")
        );
    }
    offline
}

fn status_badge(status: ServerStatus) -> String {
    // Pad before styling so ANSI codes do not break column widths.
    let label = format!("{:<10}", status.label());
    match status {
        ServerStatus::Online => style(label).green().to_string(),
        ServerStatus::Offline => style(label).red().to_string(),
        ServerStatus::Checking => style(label).yellow().to_string(),
        ServerStatus::Unknown => style(label).dim().to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("files", 10), "files");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ñññññññññ", 6), "ñññ...");
    }

    #[test]
    fn print_offline_counts_unreachable() {
        let mut results = BTreeMap::new();
        results.insert("a".to_string(), ProbeResult::reachable(8080));
        results.insert("b".to_string(), ProbeResult::unreachable("refused"));
        results.insert("c".to_string(), ProbeResult::unreachable("Command not available"));

        assert_eq!(print_offline(&results), 2);
    }
}
