//! mcpm - MCP server registry manager
//!
//! Usage:
//!   mcpm                      # List configured servers
//!   mcpm add files -- npx -y @modelcontextprotocol/server-filesystem
//!   mcpm ping                 # Probe every server
//!   mcpm --gui                # Launch GUI

mod output;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpm_core::config::paths::CONFIG_ENV_VAR;
use mcpm_core::config::stringify_config;
use mcpm_core::context::AppContext;
use mcpm_core::error::ConfigError;
use mcpm_core::mcp::McpServer;
use mcpm_core::probe::ProbeResult;
use mcpm_core::status::ping_all;

#[derive(Parser)]
#[command(name = "mcpm")]
#[command(about = "Manage the MCP servers Claude Desktop launches", long_about = None)]
struct Cli {
    /// Launch GUI interface
    #[arg(long)]
    gui: bool,

    /// Registry file to edit (overrides MCPM_CONFIG and mcpm.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured servers
    #[command(alias = "ls")]
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one server definition
    Show {
        /// Server ID
        id: String,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a server
    ///
    /// Pass an empty ID ("") to have one generated.
    Add {
        /// Server ID
        id: String,

        /// Environment variable (KEY=VALUE)
        #[arg(long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Launch command and its arguments (after --)
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Change an existing server
    Edit {
        /// Server ID
        id: String,

        /// Move the server to a new ID
        #[arg(long, value_name = "NEW_ID")]
        rename: Option<String>,

        /// Replace the launch command
        #[arg(long)]
        command: Option<String>,

        /// Replace the arguments (repeatable)
        #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
        args: Vec<String>,

        /// Remove all arguments
        #[arg(long, conflicts_with = "args")]
        clear_args: bool,

        /// Set an environment variable (KEY=VALUE)
        #[arg(long, value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Remove an environment variable
        #[arg(long, value_name = "KEY")]
        unset_env: Vec<String>,
    },

    /// Remove a server
    #[command(alias = "rm")]
    Remove {
        /// Server ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Import servers from a JSON file (`-` reads stdin)
    ///
    /// Only servers whose ID is not already configured are added.
    Import {
        /// File to read
        source: String,
    },

    /// Print the registry as JSON
    Export,

    /// Check whether servers are listening
    Ping {
        /// Only probe this server
        id: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the registry file location, or store a new default in mcpm.toml
    Path {
        /// Remember this registry file for future runs
        #[arg(long, value_name = "PATH")]
        set: Option<PathBuf>,

        /// Forget a stored registry file
        #[arg(long, conflicts_with = "set")]
        reset: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only show issues (non-zero exit if problems)
    Quiet,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.gui {
        return run_gui(cli.config);
    }

    let mut ctx = AppContext::with_defaults(cli.config)?;
    let command = cli.command.unwrap_or(Commands::List {
        format: OutputFormat::Table,
    });
    run_cli(&mut ctx, command)
}

fn run_cli(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::List { format } => run_list(ctx, format),
        Commands::Show { id, format } => run_show(ctx, &id, format),
        Commands::Add { id, env, command } => run_add(ctx, &id, &env, command),
        Commands::Edit {
            id,
            rename,
            command,
            args,
            clear_args,
            env,
            unset_env,
        } => {
            let changes = EditChanges {
                rename,
                command,
                args,
                clear_args,
                env,
                unset_env,
            };
            run_edit(ctx, &id, changes)
        }
        Commands::Remove { id, yes } => run_remove(ctx, &id, yes),
        Commands::Import { source } => run_import(ctx, &source),
        Commands::Export => {
            let config = ctx.config_store().load()?;
            println!("{}", stringify_config(&config)?);
            Ok(())
        }
        Commands::Ping { id, format } => run_ping(ctx, id.as_deref(), format),
        Commands::Path { set, reset } => run_path(ctx, set, reset),
    }
}

fn run_path(ctx: &mut AppContext, set: Option<PathBuf>, reset: bool) -> Result<()> {
    if set.is_none() && !reset {
        println!("{}", ctx.config_path().display());
        return Ok(());
    }

    ctx.remember_config_path(set)?;
    match &ctx.settings().config_path {
        Some(path) => println!("✓ Registry set to {}", path.display()),
        None => println!("✓ Registry reset to the Claude Desktop default"),
    }
    println!("  Saved in {}", ctx.settings_path().display());
    Ok(())
}

fn run_list(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let servers = ctx.server_command().list()?;
    match format {
        OutputFormat::Table => output::print_server_table(&servers, ctx.config_path()),
        OutputFormat::Json => output::print_servers_json(&servers)?,
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn run_show(ctx: &AppContext, id: &str, format: OutputFormat) -> Result<()> {
    let server = ctx.server_command().get(id)?;
    match format {
        OutputFormat::Table => output::print_server_details(id, &server),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&server)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn run_add(ctx: &AppContext, id: &str, env: &[String], command: Vec<String>) -> Result<()> {
    let mut parts = command.into_iter();
    let program = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("Missing launch command after --"))?;

    let mut server = McpServer::new(program).with_args(parts);
    for pair in env {
        let (key, value) = parse_env_pair(pair)?;
        server = server.with_env(key, value);
    }

    let report = ctx.server_command().add(id, server)?;
    println!("✓ Added server '{}'", report.id);
    Ok(())
}

/// Field changes requested by `mcpm edit`
#[derive(Debug, Default)]
struct EditChanges {
    rename: Option<String>,
    command: Option<String>,
    args: Vec<String>,
    clear_args: bool,
    env: Vec<String>,
    unset_env: Vec<String>,
}

impl EditChanges {
    fn apply(&self, mut server: McpServer) -> Result<McpServer> {
        if let Some(command) = &self.command {
            server.command = command.clone();
        }
        if self.clear_args {
            server.args.clear();
        } else if !self.args.is_empty() {
            server.args = self.args.clone();
        }
        for key in &self.unset_env {
            if server.env.remove(key).is_none() {
                tracing::warn!("Environment variable {} was not set", key);
            }
        }
        for pair in &self.env {
            let (key, value) = parse_env_pair(pair)?;
            server.env.insert(key, value);
        }
        Ok(server)
    }
}

fn run_edit(ctx: &AppContext, id: &str, changes: EditChanges) -> Result<()> {
    let command = ctx.server_command();
    let server = changes.apply(command.get(id)?)?;
    let new_id = changes.rename.as_deref().unwrap_or(id);

    let report = command.update_with_id(id, new_id, server)?;
    match report.renamed_from {
        Some(from) => println!("✓ Renamed server '{}' to '{}'", from, report.id),
        None => println!("✓ Updated server '{}'", report.id),
    }
    Ok(())
}

fn run_remove(ctx: &AppContext, id: &str, yes: bool) -> Result<()> {
    let command = ctx.server_command();
    // Fail on unknown IDs before prompting.
    command.get(id)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete server '{}'? This action cannot be undone.",
                id
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("• Kept server '{}'", id);
            return Ok(());
        }
    }

    command.delete(id)?;
    println!("✓ Deleted server '{}'", id);
    Ok(())
}

fn run_import(ctx: &AppContext, source: &str) -> Result<()> {
    let content = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read JSON from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read import file: {}", source))?
    };

    let report = ctx.server_command().import_str(&content)?;
    println!("✓ Imported {} new server(s)", report.added_count());
    for id in &report.skipped {
        println!("  ⚠ Skipped '{}': already configured", id);
    }
    Ok(())
}

fn run_ping(ctx: &AppContext, id: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ctx.config_store().load()?;
    let prober = ctx.prober();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let results: BTreeMap<String, ProbeResult> = match id {
        Some(id) => {
            let server = config
                .find_server(id)
                .ok_or_else(|| ConfigError::ServerNotFound(id.to_string()))?;
            let result = runtime.block_on(prober.probe(server));
            std::iter::once((id.to_string(), result)).collect()
        }
        None => runtime.block_on(ping_all(Arc::new(prober), &config)),
    };

    match format {
        OutputFormat::Table => output::print_ping_table(&results),
        OutputFormat::Json => output::print_ping_json(&results)?,
        OutputFormat::Quiet => {
            let offline = output::print_offline(&results);
            if offline > 0 {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Split `KEY=VALUE`; the key must be non-empty, the value may contain `=`.
fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid env '{}': expected KEY=VALUE", pair))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid env '{}': key is empty", pair);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Hand off to the `mcpm-gui` binary, preferring the one next to this executable.
fn run_gui(config: Option<PathBuf>) -> Result<()> {
    let sibling = std::env::current_exe().ok().and_then(|exe| {
        let name = format!("mcpm-gui{}", std::env::consts::EXE_SUFFIX);
        let candidate = exe.with_file_name(name);
        candidate.exists().then_some(candidate)
    });
    let program = sibling.unwrap_or_else(|| PathBuf::from("mcpm-gui"));

    let mut command = std::process::Command::new(&program);
    if let Some(path) = config {
        command.env(CONFIG_ENV_VAR, path);
    }

    tracing::debug!("Launching {}", program.display());
    let status = command
        .status()
        .with_context(|| format!("Failed to launch {}", program.display()))?;
    if !status.success() {
        anyhow::bail!("mcpm-gui exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_pair_splits_on_first_equals() {
        let (key, value) = parse_env_pair("DB_URL=postgres://u:p@h/db?x=1").unwrap();
        assert_eq!(key, "DB_URL");
        assert_eq!(value, "postgres://u:p@h/db?x=1");
    }

    #[test]
    fn parse_env_pair_rejects_missing_key() {
        assert!(parse_env_pair("=value").is_err());
        assert!(parse_env_pair("NOEQUALS").is_err());
    }

    #[test]
    fn parse_env_pair_allows_empty_value() {
        assert_eq!(
            parse_env_pair("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
    }

    #[test]
    fn add_collects_command_after_separator() {
        let cli = Cli::try_parse_from([
            "mcpm", "add", "files", "--env", "PORT=3001", "--", "npx", "-y", "server",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add { id, env, command }) => {
                assert_eq!(id, "files");
                assert_eq!(env, vec!["PORT=3001"]);
                assert_eq!(command, vec!["npx", "-y", "server"]);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn add_requires_command() {
        assert!(Cli::try_parse_from(["mcpm", "add", "files"]).is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["mcpm", "list", "--config", "/tmp/reg.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/reg.json")));
    }

    #[test]
    fn ping_accepts_optional_id_and_format() {
        let cli = Cli::try_parse_from(["mcpm", "ping", "files", "--format", "json"]).unwrap();
        match cli.command {
            Some(Commands::Ping { id, format }) => {
                assert_eq!(id.as_deref(), Some("files"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected ping command"),
        }
    }

    #[test]
    fn path_set_and_reset_conflict() {
        let cli = Cli::try_parse_from(["mcpm", "path", "--set", "/tmp/reg.json"]).unwrap();
        match cli.command {
            Some(Commands::Path { set, reset }) => {
                assert_eq!(set, Some(PathBuf::from("/tmp/reg.json")));
                assert!(!reset);
            }
            _ => panic!("expected path command"),
        }

        assert!(Cli::try_parse_from(["mcpm", "path", "--set", "/tmp/a.json", "--reset"]).is_err());
    }

    #[test]
    fn edit_arg_accepts_flag_values() {
        let cli =
            Cli::try_parse_from(["mcpm", "edit", "files", "--arg", "--port=8080"]).unwrap();
        match cli.command {
            Some(Commands::Edit { args, .. }) => assert_eq!(args, vec!["--port=8080"]),
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn edit_changes_apply_in_order() {
        let server = McpServer::new("node")
            .with_args(["a.js"])
            .with_env("OLD", "1")
            .with_env("KEEP", "2");
        let changes = EditChanges {
            command: Some("deno".to_string()),
            args: vec!["run".to_string(), "b.ts".to_string()],
            env: vec!["NEW=3".to_string()],
            unset_env: vec!["OLD".to_string()],
            ..EditChanges::default()
        };

        let updated = changes.apply(server).unwrap();

        assert_eq!(updated.command, "deno");
        assert_eq!(updated.args, vec!["run", "b.ts"]);
        assert_eq!(updated.env.len(), 2);
        assert_eq!(updated.env.get("NEW").map(String::as_str), Some("3"));
        assert!(!updated.env.contains_key("OLD"));
    }

    #[test]
    fn edit_clear_args() {
        let changes = EditChanges {
            clear_args: true,
            ..EditChanges::default()
        };
        let updated = changes
            .apply(McpServer::new("node").with_args(["a.js"]))
            .unwrap();
        assert!(updated.args.is_empty());
    }
}
