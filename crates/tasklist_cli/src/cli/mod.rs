use clap::{Args, Parser, Subcommand};
use tasklist_core::ActionTarget;
use tasklist_core::config::{ConfigOverrides, canonicalize_name};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk"
    Add { text: Option<String> },
    /// Mark a pending task as finished
    ///
    /// Example: tasklist finish 6188800000
    /// Example: tasklist finish --text "Buy milk"
    Finish(TargetArgs),
    /// Delete a pending or finished task
    ///
    /// Example: tasklist delete 6188800000
    Delete(TargetArgs),
    /// Move a finished task back to pending
    ///
    /// Example: tasklist repeat --text "Buy milk"
    Repeat(TargetArgs),
    /// Show details of a task
    ///
    /// Example: tasklist show 6188800000
    Show { id: String },
    /// List pending and finished tasks
    ///
    /// Example: tasklist list
    List,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Task id, or the task's text with --text
    pub target: String,

    /// Match the task by its text instead of its id
    #[arg(long)]
    pub text: bool,
}

impl TargetArgs {
    pub fn action_target(&self) -> ActionTarget {
        if self.text {
            ActionTarget::DisplayText(self.target.clone())
        } else {
            ActionTarget::Id(self.target.trim().to_string())
        }
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    RemovalDelayMs,
    ErrorVisibleMs,
    DesktopNotifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonicalize_name(key_raw);
    if key.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "removal_delay" | "removal_delay_ms" => ConfigOverrideTarget::RemovalDelayMs,
        "error_visible" | "error_visible_ms" => ConfigOverrideTarget::ErrorVisibleMs,
        "notifications" | "desktop_notifications" => ConfigOverrideTarget::DesktopNotifications,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

pub fn parse_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::RemovalDelayMs => {
                overrides.removal_delay_ms = Some(parse_millis(&parsed.value)?);
            }
            ConfigOverrideTarget::ErrorVisibleMs => {
                overrides.error_visible_ms = Some(parse_millis(&parsed.value)?);
            }
            ConfigOverrideTarget::DesktopNotifications => {
                overrides.desktop_notifications = Some(parse_switch(&parsed.value)?);
            }
        }
    }
    Ok(overrides)
}

fn parse_millis(value: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("'{value}' is not a number of milliseconds"))
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(format!("'{value}' is not on or off")),
    }
}

/// Splits an interactive input line into arguments. Double quotes group
/// words; inside quotes `\"` and `\\` are escapes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err("unterminated quote in command".to_string());
    }
    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
