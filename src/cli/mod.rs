use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::{NotesScreen, TasksScreen};
use crate::config::ConfigLoader;
use crate::list::NoticeTimer;
use crate::prompt::{AutoConfirm, ConfirmationPrompt, StdinPrompt};
use crate::storage;
use crate::tasks::TaskStore;

pub mod commands;

use self::commands::{NoteArgs, TaskArgs};

#[derive(Parser, Debug)]
#[command(
    name = "jotlist",
    version,
    about = "Notes and checklist tasks from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file location (takes precedence over JOTLIST_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over JOTLIST_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Answer yes to every confirmation prompt
    #[arg(long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with notes
    Note(NoteArgs),
    /// Work with checklist tasks
    Task(TaskArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("JOTLIST_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("JOTLIST_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;

    let mut prompt: Box<dyn ConfirmationPrompt> = if cli.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(StdinPrompt)
    };

    match cli.command {
        Commands::Note(args) => {
            let store = storage::init(&config.storage)?;
            let notifier = NoticeTimer::new(config.search.no_match_delay());
            let mut screen = NotesScreen::load(store, notifier)?;
            commands::handle_note_command(&mut screen, prompt.as_mut(), args.command)
        }
        Commands::Task(args) => {
            let store = TaskStore::new(config.storage.tasks_path.clone());
            let mut screen = TasksScreen::load(store)?;
            commands::handle_task_command(&mut screen, prompt.as_mut(), args.command)
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
