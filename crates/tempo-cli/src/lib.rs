//! Tempo CLI library.
//!
//! This crate provides the command-line interface for the tempo
//! time-tracking client.

mod cli;
pub mod commands;
mod config;
pub mod output;
mod session;

pub use cli::{
    AddItem, AddRecord, ChangeItem, ChangeRecord, Cli, Commands, DeleteItem, DeleteRecord,
    GetItem, PrintItem, UserAction,
};
pub use config::Config;
pub use output::OutputOptions;
pub use session::Session;
