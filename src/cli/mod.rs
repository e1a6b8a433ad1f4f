//! CLI module - Command-line interface for ubiquo
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Ubiquo back-office account and settings administration
#[derive(Parser)]
#[command(name = "ubiquo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the first superadmin (refused in production or once users exist)
    CreateAdmin {
        /// Login for the new admin
        login: String,
        /// Initial password
        password: String,
    },

    /// Check a login/password pair
    #[command(alias = "auth")]
    Authenticate {
        login: String,
        password: String,
    },

    /// Generate and print a new random password for a user
    ResetPassword {
        login: String,
    },

    /// List users
    #[command(alias = "ls")]
    Users {
        /// Match name, surname or login
        #[arg(long)]
        text: Option<String>,
        /// Only admins (true) or only non-admins (false)
        #[arg(long)]
        admin: Option<bool>,
        /// Only active (true) or only inactive (false) users
        #[arg(long)]
        active: Option<bool>,
    },

    /// Manage integer settings
    Setting {
        #[command(subcommand)]
        command: SettingCommands,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Show one setting
    Get { context: String, key: String },
    /// List the integer settings of a context
    #[command(alias = "ls")]
    List { context: String },
    /// Set a setting; pass `null` to clear it
    Set {
        context: String,
        key: String,
        value: String,
    },
}

pub use commands::*;
