// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running Detect, using
//! `tokio::process::Command`, and turning the outcome into a
//! [`DetectResponse`](crate::types::DetectResponse).
//!
//! - [`interpreter`] builds interpreter paths and launchers (pure).
//! - [`command_line`] assembles the argument list and its loggable form.
//! - [`runner`] spawns the process and relays its output.
//! - [`probe`] prints interpreter details at DEBUG level.

pub mod command_line;
pub mod interpreter;
pub mod probe;
pub mod runner;

pub use command_line::{CommandLine, Identification};
pub use interpreter::{interpreter_path, Launcher};
pub use runner::{RemoteProcessRunner, RunnerOptions};
