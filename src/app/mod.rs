//! Run orchestration and the end-of-run report.
mod runner;
mod summary;


pub use runner::{RunOutcome, run_load};
pub use summary::{RunReport, build_report, print_report, report_lines};
