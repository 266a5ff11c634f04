use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tasklist_cli::cli::{
    CONFIG_OVERRIDE_FLAG, Cli, Command, TargetArgs, parse_config_overrides, split_command_line,
};
use tasklist_cli::terminal::{TerminalPresenter, task_json, task_table};
use tasklist_core::clock::SystemClock;
use tasklist_core::config::{Config, load_config_with_fallback, merge_overrides};
use tasklist_core::error::AppError;
use tasklist_core::model::Task;
use tasklist_core::notify::notifier_for;
use tasklist_core::present::Surface;
use tasklist_core::storage::JsonFileStore;
use tasklist_core::{Action, TaskListManager};
use tracing_subscriber::EnvFilter;

type Manager = TaskListManager<JsonFileStore, TerminalPresenter, SystemClock>;

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!(error = %err, "falling back to default configuration");
    }
    let overrides = parse_config_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

/// With `interactive` the presenter draws every row change itself; otherwise
/// the command prints a one-line summary.
fn open_manager(config: &Config, interactive: bool) -> Result<Manager, AppError> {
    let store = JsonFileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "store opened");
    let presenter = TerminalPresenter::new(
        config.palette(),
        notifier_for(config.desktop_notifications),
        interactive,
    );
    TaskListManager::load(store, presenter, SystemClock, config.timings())
}

fn print_task(task: &Task, json: bool, verb: &str) {
    if json {
        println!("{}", task_json(task));
    } else {
        println!("{verb} task: {} ({})", task.text, task.id);
    }
}

fn run_command(manager: &mut Manager, cli: &Cli, interactive: bool) -> Result<(), AppError> {
    match &cli.command {
        Command::Add { text } => {
            let task = manager.add_task(text.as_deref().unwrap_or_default())?;
            if !interactive || cli.json {
                print_task(&task, cli.json, "Added");
            }
        }
        Command::Finish(target) => {
            run_action(manager, cli, interactive, Action::Finish, target)?;
        }
        Command::Delete(target) => {
            run_action(manager, cli, interactive, Action::Delete, target)?;
        }
        Command::Repeat(target) => {
            run_action(manager, cli, interactive, Action::Repeat, target)?;
        }
        Command::Show { id } => {
            let task = manager
                .locate_by_id(id.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if cli.json {
                println!("{}", task_json(task));
            } else {
                let line = manager
                    .presenter()
                    .row_line(task, Surface::for_task(task));
                println!("{line}");
                println!("created:  {}", task.created_at);
                println!("finished: {}", task.finished_at.as_deref().unwrap_or("-"));
            }
        }
        Command::List => {
            if cli.json {
                let pending: Vec<_> = manager.pending_display_order().map(task_json).collect();
                let finished: Vec<_> = manager.finished().iter().map(task_json).collect();
                println!(
                    "{}",
                    serde_json::json!({ "pending": pending, "finished": finished })
                );
            } else {
                println!(
                    "{}",
                    task_table(manager.pending_display_order(), manager.finished())
                );
            }
        }
    }

    Ok(())
}

fn run_action(
    manager: &mut Manager,
    cli: &Cli,
    interactive: bool,
    action: Action,
    target: &TargetArgs,
) -> Result<(), AppError> {
    match manager.handle_action(action, &target.action_target())? {
        Some(task) if cli.json => println!("{}", task_json(&task)),
        Some(task) if !interactive => {
            let verb = match action {
                Action::Finish => "Finished",
                Action::Delete => "Deleted",
                Action::Repeat => "Repeated",
            };
            print_task(&task, false, verb);
        }
        Some(_) => {}
        None if cli.json => println!("null"),
        None => println!("Nothing to {}: no matching task.", action.as_str()),
    }
    Ok(())
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

fn run_interactive() -> Result<(), AppError> {
    let config = resolve_config(&[])?;
    let mut manager = open_manager(&config, true)?;
    manager.render_all();

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;
        manager.tick();

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
            Ok(args) => args,
            Err(message) => {
                eprintln!("ERROR: {}", AppError::invalid_input(message));
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        if args.iter().any(|arg| arg.starts_with(CONFIG_OVERRIDE_FLAG)) {
            let err =
                AppError::invalid_input("configuration overrides only apply when a session starts");
            eprintln!("ERROR: {}", err);
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                println!("{}", err.render());
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(&mut manager, &cli, true) {
            eprintln!("ERROR: {}", err);
        }
    }

    manager.flush_removals();
    Ok(())
}

fn run_once(cli: &Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli.config_override)?;
    let mut manager = open_manager(&config, false)?;
    let result = run_command(&mut manager, cli, false);
    manager.flush_removals();
    result
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
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

    if let Err(err) = run_once(&cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
