//! todo - terminal client for a paginated to-do list REST API
//!
//! This library provides the core functionality for the `todo` CLI and its
//! interactive task viewer.
//!
//! # Core Concepts
//!
//! - **Tasks**: Server-owned records with title, description, due date,
//!   priority and a done flag
//! - **Pages**: One server page of tasks under the current search and filters
//! - **Selection**: A set of visible task ids that bulk actions apply to
//! - **Confirmation**: Destructive and bulk actions run only once confirmed
//!
//! # Module Organization
//!
//! - `api`: The `TaskApi` trait and its reqwest-backed client
//! - `endpoints`: URL construction for the task endpoints
//! - `page`: Page, page size, search and filter state with stale-response guards
//! - `collection`: Visible rows, selection and pending bulk actions
//! - `row`: Per-task row state (expansion, inline editor)
//! - `draft`: Creation form and edit drafts with validation
//! - `actions`: Mutations and their outcomes, including the bulk-delete fallback
//! - `config`: Configuration loading from `todo.toml`
//! - `output`: Human and JSON output envelopes
//! - `ui`: Terminal task viewer

pub mod actions;
pub mod api;
pub mod cli;
pub mod collection;
pub mod config;
pub mod draft;
pub mod endpoints;
pub mod error;
pub mod output;
pub mod page;
pub mod row;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
