// monitoring/mod.rs
pub mod cli;
pub mod signal_log;

pub use cli::{apply_command, render_status, run_cli, Command, CommandError};
pub use signal_log::{
    append_snapshot, generate_report_summary, log_snapshot, read_signal_log, ReportSummary,
    SignalLogRecord,
};
