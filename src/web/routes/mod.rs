//! Route handlers organized by page.

pub mod health;
pub mod samples;
