//! ndm-lib: turn a Node.js project's dependencies into OS services.
//!
//! This crate holds everything behind the `ndm` command line:
//! - `config`: layered configuration from defaults, environment, the
//!   project override file and explicit overrides
//! - `platform`: the supported service managers and their conventions
//! - `manifest`: the `service.json` deployment manifest
//! - `service`: per-process service entities, wrapper generation and control
//! - `commands`: the command table the CLI drives

pub mod commands;
pub mod config;
pub mod consts;
pub mod execute;
pub mod init;
pub mod locate;
pub mod manifest;
pub mod placeholder;
pub mod platform;
pub mod service;
pub mod template;
pub mod util;
