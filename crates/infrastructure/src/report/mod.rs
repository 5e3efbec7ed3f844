//! Console report of a finished run.

mod table;

pub use table::{render_report, result_cell, summary_line, REPORT_TITLE};
