//! # Server support
//!
//! Helpers shared by the language server executable and the analyzer:
//! logging setup, command line handling, diagnostic construction, and the
//! performance monitor behind the `dump-performance-stats` request.

use std::io::Write;
use std::str::FromStr;
use std::collections::BTreeMap;
use std::time::Duration;
use lsp_types as lsp;

pub fn basic_diag(range: lsp::Range, mess: &str, severity: lsp::DiagnosticSeverity) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range,
        severity: Some(severity),
        code: None,
        code_description: None,
        source: None,
        message: mess.to_string(),
        related_information: None,
        tags: None,
        data: None
    }
}

fn setup_env_logger(filt: log::LevelFilter, path: &str) {
    if filt==log::LevelFilter::Off {
        return;
    }
    let logging_file = Box::new(std::fs::File::create(path).expect("failed to create log file"));
    env_logger::Builder::new().format(|buf,record| {
        writeln!(buf,"{}:{} [{}] - {}",record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.level(),
            record.args()
        )
    })
    .filter(Some("ca65kit"),filt)
    .target(env_logger::Target::Pipe(logging_file))
    .init();
}

/// Parse the language server's command line arguments.
/// Sets up logging based on the arguments, panics if log level or log file are invalid.
pub fn parse_args() {
    let mut log_level = log::LevelFilter::Off;
    let mut log_file = "ca65kit_log.txt".to_string();

    let mut args = std::env::args().into_iter();
    args.next();
    while let Some(val) = args.next() {
        if &val == "--log-level" {
            if let Some(val) = args.next() {
                log_level = log::LevelFilter::from_str(&val).expect("invalid logging filter");
            }
        } else if &val == "--log-file" {
            if let Some(val) = args.next() {
                log_file = val;
            }
        }
    }
    setup_env_logger(log_level, &log_file);
}

/// Accumulates call counts and wall time per operation.
/// The map is ordered so the dump is stable.
pub struct PerfMonitor {
    stats: BTreeMap<String,(u64,Duration)>
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self { stats: BTreeMap::new() }
    }
    pub fn add(&mut self, op: &str, elapsed: Duration) {
        let entry = self.stats.entry(op.to_string()).or_insert((0,Duration::ZERO));
        entry.0 += 1;
        entry.1 += elapsed;
    }
    pub fn report(&self) -> String {
        let mut ans = String::new();
        ans += &format!("{:<24}{:>10}{:>14}{:>14}\n","operation","calls","total ms","mean us");
        for (op,(count,total)) in &self.stats {
            let mean = match *count {
                0 => 0,
                n => total.as_micros() / n as u128
            };
            ans += &format!("{:<24}{:>10}{:>14}{:>14}\n",op,count,total.as_millis(),mean);
        }
        ans
    }
}
