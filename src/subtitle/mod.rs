//! Subtitle serialization.

pub mod ass;

pub use ass::{format_ass_time, render_document, save_to_file};
