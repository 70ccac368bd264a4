use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use secrecy::SecretString;
use smart_todo_cli::cli::{Cli, Command, KeyCommand, collect_overrides, split_command_line};
use smart_todo_cli::render;
use smart_todo_core::TaskApi;
use smart_todo_core::assistant::{AssistantBridge, HttpTransport};
use smart_todo_core::config::{Palette, load_config_with_fallback, merge_overrides};
use smart_todo_core::error::AppError;
use smart_todo_core::storage::FileKvStore;
use std::io::{self, BufRead};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

struct Session {
    api: TaskApi<FileKvStore, HttpTransport>,
    palette: Palette,
}

impl Session {
    fn open(raw_overrides: &[String]) -> Result<Self, AppError> {
        let loaded = load_config_with_fallback();
        if let Some(err) = loaded.error.as_ref() {
            warn!(error = %err, "ignoring unreadable config file");
        }
        let overrides = collect_overrides(raw_overrides)?;
        let config = merge_overrides(&loaded.config, &overrides)?;

        let transport = HttpTransport::new(config.assistant.endpoint.clone());
        let bridge = AssistantBridge::new(transport, config.assistant.clone());
        let api = TaskApi::new(FileKvStore::from_env()?, bridge).with_credential(env_credential());

        Ok(Self {
            api,
            palette: config.theme().palette(),
        })
    }
}

fn env_credential() -> Option<SecretString> {
    std::env::var(API_KEY_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_json(value: serde_json::Value) {
    println!("{}", value);
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

async fn run_command(session: &mut Session, cli: Cli) -> Result<(), AppError> {
    let api = &mut session.api;
    match cli.command {
        Command::Add { text } => {
            let text = text.unwrap_or_default();
            let task = api.add_task(&text)?;
            if cli.json {
                print_json(render::task_json(&task));
            } else {
                println!("Added task: {} ({})", task.text, task.id);
            }
        }
        Command::Toggle { id } => {
            let task = api.toggle_task(&id)?;
            if cli.json {
                print_json(render::task_json(&task));
            } else if task.completed {
                println!("Completed task: {} ({})", task.text, task.id);
            } else {
                println!("Reopened task: {} ({})", task.text, task.id);
            }
        }
        Command::Delete { id } => {
            let task = api.delete_task(&id)?;
            if cli.json {
                print_json(render::task_json(&task));
            } else {
                println!("Deleted task: {} ({})", task.text, task.id);
            }
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(AppError::invalid_input(
                    "clear deletes every task; pass --yes to confirm",
                ));
            }
            let removed = api.clear_all();
            if cli.json {
                print_json(serde_json::json!({ "removed": removed }));
            } else {
                println!("Deleted {removed} tasks");
            }
        }
        Command::List => {
            if cli.json {
                print_json(render::tasks_json(api.tasks()));
            } else {
                println!("{}", render::task_table(api.tasks(), &session.palette));
                println!("{}", render::progress_line(&api.summary()));
            }
        }
        Command::Progress => {
            let summary = api.summary();
            if cli.json {
                print_json(serde_json::json!({
                    "total": summary.total,
                    "completed": summary.completed,
                    "incomplete": summary.incomplete,
                    "percent": summary.percent_complete(),
                }));
            } else {
                println!("{}", render::progress_line(&summary));
            }
        }
        Command::Export { path } => {
            let snapshot = api.export_snapshot()?;
            match path {
                Some(path) => {
                    std::fs::write(&path, &snapshot).map_err(|err| AppError::io(err.to_string()))?;
                    if cli.json {
                        print_json(serde_json::json!({
                            "path": path.display().to_string(),
                            "count": api.tasks().len(),
                        }));
                    } else {
                        println!("Exported {} tasks to {}", api.tasks().len(), path.display());
                    }
                }
                None => println!("{snapshot}"),
            }
        }
        Command::Suggest { count } => {
            let added = api.generate_suggestions(&mut rand::thread_rng(), count);
            if cli.json {
                print_json(render::tasks_json(&added));
            } else {
                for task in &added {
                    println!("Suggested task: {} ({})", task.text, task.id);
                }
            }
        }
        Command::Chat { message } => {
            let before = api.tasks().len();
            let reply = api.send_chat_message(&message.join(" ")).await?;
            let added = &api.tasks()[before.min(api.tasks().len())..];
            if cli.json {
                print_json(serde_json::json!({
                    "reply": reply.content,
                    "added_tasks": render::tasks_json(added),
                }));
            } else {
                println!("Assistant: {}", reply.content);
                for task in added {
                    println!("Added task: {} ({})", task.text, task.id);
                }
            }
        }
        Command::Key { action } => match action {
            KeyCommand::Set { value } => {
                api.set_credential(&SecretString::from(value))?;
                println!("API key saved");
            }
            KeyCommand::Clear => {
                api.clear_credential()?;
                println!("API key removed");
            }
            KeyCommand::Status => {
                let configured = api.has_credential();
                if cli.json {
                    print_json(serde_json::json!({ "configured": configured }));
                } else if configured {
                    println!("API key is configured");
                } else {
                    println!("API key is not configured");
                }
            }
        },
    }

    Ok(())
}

async fn run_interactive() -> Result<(), AppError> {
    let mut session = Session::open(&[])?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) if args.is_empty() => continue,
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let argv = std::iter::once("smart_todo".to_string()).chain(args);
        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("config overrides are only accepted at startup")
            );
            continue;
        }

        if let Err(err) = run_command(&mut session, cli).await {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive().await {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let result = match Session::open(&cli.config_override) {
        Ok(mut session) => run_command(&mut session, cli).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
