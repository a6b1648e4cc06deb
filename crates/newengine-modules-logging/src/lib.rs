//! Process-wide logger setup.
//!
//! Lines look like `[<unix ms>] [LEVEL] [target] message`. `RUST_LOG`, when
//! set, overrides the filter passed by the host.

use std::fmt::Arguments;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use env_logger::{Builder, Env};
use log::Level;

/// Install the logger. Returns false if a logger was already installed.
pub fn init(filter: &str) -> bool {
    builder(filter).try_init().is_ok()
}

/// Same as [`init`] but captured by the test harness.
pub fn init_for_tests(filter: &str) -> bool {
    builder(filter).is_test(true).try_init().is_ok()
}

fn builder(filter: &str) -> Builder {
    let mut b = Builder::from_env(Env::default().default_filter_or(filter));
    b.format(|buf, record| {
        let line = format_line(unix_millis(), record.level(), record.target(), record.args());
        writeln!(buf, "{line}")
    });
    b
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn format_line(ms: u128, level: Level, target: &str, args: &Arguments<'_>) -> String {
    format!("[{ms}] [{level}] [{target}] {args}")
}
