use clap::{Parser, Subcommand};
use smart_todo_core::config::ConfigOverrides;
use smart_todo_core::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "To-do list with an AI assistant", long_about = None)]
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
    /// Example: smart_todo add "Buy milk"
    Add { text: Option<String> },
    /// Mark a task as done, or reopen a done task
    ///
    /// Example: smart_todo toggle task-1734652800000000000
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: smart_todo delete task-1734652800000000000
    Delete { id: String },
    /// Delete every task
    ///
    /// Example: smart_todo clear --yes
    Clear {
        /// Confirm that all tasks should be deleted
        #[arg(long)]
        yes: bool,
    },
    /// List tasks
    ///
    /// Example: smart_todo list
    List,
    /// Show how many tasks are done
    ///
    /// Example: smart_todo progress
    Progress,
    /// Export all tasks as JSON
    ///
    /// Example: smart_todo export backup.json
    Export { path: Option<PathBuf> },
    /// Add randomly picked improvement ideas as tasks
    ///
    /// Example: smart_todo suggest --count 3
    Suggest {
        #[arg(long, default_value_t = smart_todo_core::suggestions::DEFAULT_SUGGESTION_COUNT)]
        count: usize,
    },
    /// Ask the assistant; it can add tasks for you
    ///
    /// Example: smart_todo chat "Add tasks for planning a birthday party"
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Manage the assistant API key
    ///
    /// Example: smart_todo key set sk-...
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Store the API key
    Set { value: String },
    /// Remove the stored API key
    Clear,
    /// Report whether an API key is available
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverrideTarget {
    Theme,
    Endpoint,
    Model,
    MaxTokens,
    Temperature,
    HistoryLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
///
/// Keys are matched loosely: `assistant.max-tokens`, `MAX_TOKENS` and
/// `assistant.maxTokens` all name the same field.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let key = canonical_key(key_raw);
    if key.is_empty() {
        return Err("override key cannot be empty".to_string());
    }
    let field = key.strip_prefix("assistant.").unwrap_or(&key);

    let target = match field {
        "theme" if !key.starts_with("assistant.") => ConfigOverrideTarget::Theme,
        "endpoint" => ConfigOverrideTarget::Endpoint,
        "model" => ConfigOverrideTarget::Model,
        "maxtokens" => ConfigOverrideTarget::MaxTokens,
        "temperature" => ConfigOverrideTarget::Temperature,
        "historylimit" => ConfigOverrideTarget::HistoryLimit,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

fn canonical_key(raw: &str) -> String {
    raw.split('.')
        .map(|segment| {
            segment
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric())
                .map(|ch| ch.to_ascii_lowercase())
                .collect::<String>()
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

pub fn collect_overrides(raw_overrides: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        let value = parsed.value;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(value),
            ConfigOverrideTarget::Endpoint => overrides.endpoint = Some(value),
            ConfigOverrideTarget::Model => overrides.model = Some(value),
            ConfigOverrideTarget::MaxTokens => {
                overrides.max_tokens = Some(parse_number(&value, "max_tokens")?)
            }
            ConfigOverrideTarget::Temperature => {
                overrides.temperature = Some(parse_number(&value, "temperature")?)
            }
            ConfigOverrideTarget::HistoryLimit => {
                overrides.history_limit = Some(parse_number(&value, "history_limit")?)
            }
        }
    }
    Ok(overrides)
}

fn parse_number<N: std::str::FromStr>(value: &str, field: &str) -> Result<N, AppError> {
    value
        .parse()
        .map_err(|_| AppError::invalid_input(format!("{field} must be a number")))
}

/// Splits an interactive line into arguments. Double quotes group words;
/// inside quotes `\"` and `\\` are escapes and any other backslash is kept.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
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
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
