//! navtoc: multilingual collapsible navigation trees for documentation TOCs.
//!
//! Layers, innermost first:
//! - [`domain`]: tree store, labels, languages, TOC parsing and rendering
//! - [`application`]: loader, language selector and navigation session
//! - [`infrastructure`]: filesystem and preference store, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
