//! # Toolpin Core Library
//!
//! This crate contains the core logic of the `toolpin` tool – a local manifest
//! manager that pins versioned command-line tools to a project directory.
//!
//! The heart of the crate is the manifest engine: it parses `toolpin.json`
//! into a typed in-memory document, validates it against a versioned schema
//! while collecting every violation in one pass, applies idempotent
//! add/edit/remove operations with conflict detection, and writes the result
//! back as deterministic, human-editable JSON.
//!
//! This library is built for the `toolpin` CLI, but you can also reuse it as a
//! backend in other tools.
//!
//! ## Modules Overview
//! - [`manifest`] – Schema model, tolerant parsing, and serialization of `toolpin.json`
//! - [`resolve`] – Validation producing resolved, directory-bound tool entries
//! - [`editor`] – The Add / Edit / Remove / Read operation facade
//! - [`scanner`] – Mark-of-the-web taint detection for downloaded manifests
//! - [`error`] – The structured error taxonomy
//! - [`util`] – Shared path helpers

pub mod editor;
pub mod error;
pub mod manifest;
pub mod resolve;
pub mod scanner;
pub mod util;

pub use editor::*;
pub use error::*;
pub use manifest::*;
pub use resolve::*;
pub use scanner::*;
pub use util::*;
