//! Output table and run summary

pub mod summary;
pub mod writer;

pub use summary::{SummaryLine, summarize};
pub use writer::{default_output_name, default_output_path, header, save_results, write_results};
