use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use crate::app::notes::NO_MATCH_MESSAGE;
use crate::app::{NotesScreen, TaskRegion, TasksScreen};
use crate::prompt::ConfirmationPrompt;
use crate::tasks::TaskId;

#[derive(Args, Debug, Clone)]
pub struct NoteArgs {
    #[command(subcommand)]
    pub command: NoteCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NoteCommand {
    /// Create a new note
    Add(NoteAddArgs),
    /// Print all notes
    List,
    /// Filter notes by title
    Search(QueryArgs),
    /// Replace a note's title and/or description
    Edit(NoteEditArgs),
    /// Delete a note (asks for confirmation)
    Delete(NoteDeleteArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NoteAddArgs {
    /// Title for the note (prompted if omitted)
    #[arg()]
    pub title: Option<String>,
    /// Note description (prompted if omitted)
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Query terms, matched case-insensitively against titles
    #[arg()]
    pub query: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct NoteEditArgs {
    /// Note identifier
    pub note_id: i64,
    /// New title (keeps the current one if omitted)
    #[arg(long)]
    pub title: Option<String>,
    /// New description (keeps the current one if omitted)
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct NoteDeleteArgs {
    /// Note identifier
    pub note_id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task to the active list
    Add(TaskAddArgs),
    /// Print active and completed tasks with their positions
    List,
    /// Filter active tasks by title
    Search(QueryArgs),
    /// Mark tasks complete by position (asks for confirmation)
    Done(TaskSelectArgs),
    /// Delete tasks by position (asks for confirmation)
    Delete(TaskSelectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TaskAddArgs {
    /// Task title
    #[arg(required = true)]
    pub title: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TaskSelectArgs {
    /// Positions as printed by `task list` (active tasks first)
    #[arg(required = true)]
    pub positions: Vec<usize>,
}

pub fn handle_note_command(
    screen: &mut NotesScreen,
    prompt: &mut dyn ConfirmationPrompt,
    command: NoteCommand,
) -> Result<()> {
    match command {
        NoteCommand::Add(args) => note_add(screen, args),
        NoteCommand::List => {
            print!("{}", format_notes(screen));
            Ok(())
        }
        NoteCommand::Search(args) => note_search(screen, &args.query.join(" ")),
        NoteCommand::Edit(args) => note_edit(screen, args),
        NoteCommand::Delete(args) => note_delete(screen, prompt, args.note_id),
    }
}

pub fn handle_task_command(
    screen: &mut TasksScreen,
    prompt: &mut dyn ConfirmationPrompt,
    command: TaskCommand,
) -> Result<()> {
    match command {
        TaskCommand::Add(args) => {
            let task = screen.add_task(&args.title.join(" "))?;
            println!("Added task '{}'", task.title);
            Ok(())
        }
        TaskCommand::List => {
            print!("{}", format_tasks(screen));
            Ok(())
        }
        TaskCommand::Search(args) => {
            let query = args.query.join(" ");
            screen.search(&query);
            if screen.active_rows().is_empty() {
                println!("No matches found.");
                return Ok(());
            }
            for task in screen.active_rows() {
                println!("[ ] {}", task.title);
            }
            Ok(())
        }
        TaskCommand::Done(args) => {
            let moved = mark_done(screen, prompt, &args.positions)?;
            report_count(moved, "completed");
            Ok(())
        }
        TaskCommand::Delete(args) => {
            let removed = delete_tasks(screen, prompt, &args.positions)?;
            report_count(removed, "deleted");
            Ok(())
        }
    }
}

fn note_add(screen: &mut NotesScreen, args: NoteAddArgs) -> Result<()> {
    let title = match args.title {
        Some(title) => title,
        None => read_line("Title")?,
    };
    let body = match args.body {
        Some(body) => body,
        None => read_line("Description")?,
    };
    let note = screen.save_note(&title, &body, None)?;
    println!("Created note #{}", note.id);
    Ok(())
}

fn note_search(screen: &mut NotesScreen, query: &str) -> Result<()> {
    let has_match = screen.search(query, Instant::now());
    if !has_match {
        // One-shot invocation: surface the notice immediately instead of
        // waiting out the interactive debounce.
        println!("{NO_MATCH_MESSAGE}");
        return Ok(());
    }
    print!("{}", format_notes(screen));
    Ok(())
}

fn note_edit(screen: &mut NotesScreen, args: NoteEditArgs) -> Result<()> {
    let current = screen
        .rows()
        .iter()
        .find(|note| note.id == args.note_id)
        .cloned();
    let Some(current) = current else {
        bail!("note #{} not found", args.note_id);
    };
    let title = args.title.unwrap_or(current.title);
    let body = args.body.unwrap_or(current.body);
    screen.save_note(&title, &body, Some(args.note_id))?;
    println!("Updated note #{}", args.note_id);
    Ok(())
}

fn note_delete(
    screen: &mut NotesScreen,
    prompt: &mut dyn ConfirmationPrompt,
    note_id: i64,
) -> Result<()> {
    if screen.rows().iter().all(|note| note.id != note_id) {
        bail!("note #{note_id} not found");
    }
    if screen.delete_note(prompt, note_id)? {
        println!("Deleted note #{note_id}");
    } else {
        println!("Kept note #{note_id}");
    }
    Ok(())
}

/// Marks the tasks at `positions` complete. One position confirms via the
/// single-task prompt; several enter multi-select and confirm the batch.
fn mark_done(
    screen: &mut TasksScreen,
    prompt: &mut dyn ConfirmationPrompt,
    positions: &[usize],
) -> Result<usize> {
    let targets = resolve_positions(screen, positions)?;
    if let [(region, id)] = targets[..] {
        if region != TaskRegion::Active {
            bail!("task at position {} is already completed", positions[0]);
        }
        return Ok(usize::from(screen.checkbox_tap(prompt, region, id)?));
    }

    select(screen, &targets);
    if !screen.complete_action_visible() {
        screen.clear_selection();
        bail!("completed tasks cannot be completed again");
    }
    screen.complete_selected(prompt)
}

fn delete_tasks(
    screen: &mut TasksScreen,
    prompt: &mut dyn ConfirmationPrompt,
    positions: &[usize],
) -> Result<usize> {
    let targets = resolve_positions(screen, positions)?;
    select(screen, &targets);
    screen.delete_selected(prompt)
}

fn select(screen: &mut TasksScreen, targets: &[(TaskRegion, TaskId)]) {
    let mut targets = targets.iter();
    if let Some((region, id)) = targets.next() {
        screen.long_press(*region, *id);
    }
    for (region, id) in targets {
        screen.tap(*region, *id);
    }
}

/// Maps 1-based positions from the printed combined list (active tasks
/// first, then completed) to concrete tasks.
fn resolve_positions(
    screen: &TasksScreen,
    positions: &[usize],
) -> Result<Vec<(TaskRegion, TaskId)>> {
    let active = screen.active_rows();
    let completed = screen.completed_rows();
    positions
        .iter()
        .map(|&position| {
            if position == 0 || position > active.len() + completed.len() {
                bail!("no task at position {position}");
            }
            if position <= active.len() {
                Ok((TaskRegion::Active, active[position - 1].id))
            } else {
                Ok((
                    TaskRegion::Completed,
                    completed[position - active.len() - 1].id,
                ))
            }
        })
        .collect()
}

fn format_notes(screen: &NotesScreen) -> String {
    if screen.rows().is_empty() {
        return "No notes yet.\n".to_string();
    }
    let mut out = String::new();
    for note in screen.rows() {
        let _ = writeln!(&mut out, "#{}  {}", note.id, note.title);
        let _ = writeln!(&mut out, "    {}", note.date_time);
    }
    out
}

fn format_tasks(screen: &TasksScreen) -> String {
    if screen.active_rows().is_empty() && !screen.completed_section_visible() {
        return "No tasks yet.\n".to_string();
    }
    let mut out = String::new();
    let mut position = 0;
    for task in screen.active_rows() {
        position += 1;
        let _ = writeln!(&mut out, "{position}. [ ] {}", task.title);
    }
    if screen.completed_section_visible() {
        let _ = writeln!(&mut out, "Completed:");
        for task in screen.completed_rows() {
            position += 1;
            let _ = writeln!(&mut out, "{position}. [x] {}", task.title);
        }
    }
    out
}

fn report_count(count: usize, verb: &str) {
    let plural = if count == 1 { "" } else { "s" };
    println!("{count} task{plural} {verb}");
}

fn read_line(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}
