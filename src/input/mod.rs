//! Input processing module
//! Handles job description loading, resume rendering and input management

pub mod file_detector;
pub mod job_description;
pub mod manager;
pub mod pdf_renderer;
