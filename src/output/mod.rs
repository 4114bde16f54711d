//! Output: result formatting, terminal feedback and the resume builder

pub mod builder;
pub mod chart;
pub mod formatter;
pub mod progress;
pub mod report;
