use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the global logger. `RUST_LOG` wins over the default filter,
/// which is `debug` when verbose and `info` otherwise.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Logger for tests: output is captured by the test harness and repeated
/// calls are ignored.
pub fn init_test_logger() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
