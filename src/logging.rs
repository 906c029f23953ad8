use std::io::Write;

use log::LevelFilter;

/// Maps `-v` occurrences to a level: none = warn, -v = info, -vv = debug,
/// -vvv = trace.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger. Every line carries `label`, usually the
/// artist's. `RUST_LOG` still overrides the level.
pub fn init(verbosity: u8, label: &str) {
    let label = label.to_string();
    let _ = env_logger::Builder::new()
        .filter_level(level_for(verbosity))
        .parse_default_env()
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                buf.timestamp(),
                label,
                record.level(),
                record.args()
            )
        })
        .try_init();
}
