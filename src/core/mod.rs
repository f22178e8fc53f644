//! # Core Application Logic
//!
//! Everything that builds and delivers a prompt. It knows nothing about
//! ratatui or crossterm.
//!
//! ```text
//!     ┌──────────────────────────────────────────┐
//!     │                  CORE                    │
//!     │                                          │
//!     │  tree, templates      what to ask about  │
//!     │  expand, workspace    filling it in      │
//!     │  clipboard, relay     delivering it      │
//!     │  config               settings           │
//!     └──────────────────┬───────────────────────┘
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!     ┌────────────┐          ┌──────────────┐
//!     │    TUI     │          │  WebSocket   │
//!     │  wizard    │          │  /ws, /ping  │
//!     │ (ratatui)  │          │   (axum)     │
//!     └────────────┘          └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: The project file tree shown in the file step
//! - [`templates`]: The built-in prompt templates, per prompt kind
//! - [`expand`]: `$(files)` and `$(git ...)` substitution
//! - [`workspace`]: The project root plus the command runner bound to it
//! - [`clipboard`]: System clipboard behind a trait
//! - [`relay`]: Fan-out of prompts to connected browser extensions
//! - [`config`]: Layered configuration

pub mod clipboard;
pub mod config;
pub mod expand;
pub mod relay;
pub mod templates;
pub mod tree;
pub mod workspace;
