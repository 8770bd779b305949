//! Command-line interface for todo
//!
//! This module defines the CLI structure using clap derive macros.
//! Command handlers live in the submodules.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::Result;
use crate::task::{Priority, TaskId};

mod endpoints;
mod task;

/// todo - terminal client for a to-do list server
///
/// Lists, creates, edits, completes and deletes tasks through the
/// server's `/api/tasks/` REST API.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Server origin, e.g. http://localhost:8000
    #[arg(long, global = true, env = "TODO_SERVER")]
    pub server: Option<String>,

    /// Path to a todo.toml config file
    #[arg(long, global = true, env = "TODO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Completion filter for `list`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Todo,
    Done,
}

impl StatusFilter {
    pub fn is_done(self) -> bool {
        matches!(self, StatusFilter::Done)
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List one page of tasks
    List {
        /// Page number (starting at 1)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Tasks per page (one of the configured page sizes)
        #[arg(long)]
        page_size: Option<u32>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Only open or only completed tasks
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,

        /// Only tasks with this priority (low, normal, high)
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD, defaults to today; "none" for no date)
        #[arg(long)]
        due: Option<String>,

        /// Priority (low, normal, high)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Edit a task's fields
    Edit {
        /// Task ID
        id: TaskId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New due date (YYYY-MM-DD, or "none" to clear)
        #[arg(long)]
        due: Option<String>,

        /// New priority (low, normal, high)
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Mark a task as done
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Mark a task as not done
    Undone {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark several tasks as done in one request
    BulkDone {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<TaskId>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete several tasks in one request
    BulkDelete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<TaskId>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the API endpoints in use
    Endpoints,

    /// Open the interactive task viewer
    Tui {
        /// Initial tasks per page
        #[arg(long)]
        page_size: Option<u32>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = task::ContextOptions {
            server: self.server,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::List {
                page,
                page_size,
                search,
                status,
                priority,
            } => task::run_list(task::ListOptions {
                page,
                page_size,
                search,
                is_done: status.map(StatusFilter::is_done),
                priority,
                ctx,
            }),
            Commands::Add {
                title,
                description,
                due,
                priority,
            } => task::run_add(task::AddOptions {
                title,
                description,
                due,
                priority,
                ctx,
            }),
            Commands::Edit {
                id,
                title,
                description,
                due,
                priority,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                due,
                priority,
                ctx,
            }),
            Commands::Done { id } => task::run_set_done(task::SetDoneOptions {
                id,
                is_done: true,
                ctx,
            }),
            Commands::Undone { id } => task::run_set_done(task::SetDoneOptions {
                id,
                is_done: false,
                ctx,
            }),
            Commands::Delete { id, yes } => task::run_delete(task::DeleteOptions { id, yes, ctx }),
            Commands::BulkDone { ids, yes } => task::run_bulk(task::BulkOptions {
                kind: crate::collection::BulkKind::MarkDone,
                ids,
                yes,
                ctx,
            }),
            Commands::BulkDelete { ids, yes } => task::run_bulk(task::BulkOptions {
                kind: crate::collection::BulkKind::Delete,
                ids,
                yes,
                ctx,
            }),
            Commands::Endpoints => endpoints::run(endpoints::EndpointsOptions { ctx }),
            Commands::Tui { page_size } => task::run_tui(task::TuiOptions { page_size, ctx }),
        }
    }
}
