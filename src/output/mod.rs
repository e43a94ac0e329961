//! Output formatting for provider results.
//!
//! - [`terminal`] - aligned state and colored diagnostics

mod terminal;

pub use terminal::{quote_value, render_diagnostics, render_state};
