// Crate root library declaration and module exports.

// User-facing strings live in locales/; pt-BR is the only shipped locale.
rust_i18n::i18n!("locales", fallback = "pt-BR");

pub mod calendar;
pub mod cli;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod locale;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod selection;
pub mod storage;
pub mod store;
pub mod system;

#[cfg(feature = "tui")]
pub mod tui;
