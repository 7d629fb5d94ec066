//! adaptest-report — Rendering of session results and training diagnostics.

pub mod classification;
pub mod html;
