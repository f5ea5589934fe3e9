//! Dotfiles repository manager.
//!
//! Keeps configuration files in a single repository directory and exposes
//! them in the home directory through symlinks. Files are moved in with
//! `add`, moved back out with `remove`, and linked or unlinked without moving
//! with `link` and `unlink`. Drift between the two sides is reported per file
//! as a [`State`](dotfile::State).
//!
//! The public API is organised into layers, leaf first:
//!
//! - **[`policy`]** maps home-directory names to repository targets
//! - **[`fs`]** wraps the filesystem calls operations are built from
//! - **[`dotfile`]** validates and performs single-file operations
//! - **[`repository`]** discovers, resolves, and prunes dotfiles
//! - **[`commands`]** drives operations over batches of files
//! - **[`config`]**, **[`logging`]**, and **[`cli`]** form the ambient layers
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod dotfile;
pub mod error;
pub mod fs;
pub mod logging;
pub mod policy;
pub mod repository;
