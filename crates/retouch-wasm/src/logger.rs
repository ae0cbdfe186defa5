//! `log` records forwarded to the browser console.

use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;
static INSTALL: Once = Once::new();

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[retouch] {}: {}", record.level(), record.args());
        write_line(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::info_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Install the console logger and panic hook. Later calls only change the
/// level.
pub(crate) fn install(level: LevelFilter) {
    INSTALL.call_once(|| {
        // Another logger may already be set by the embedding page.
        let _ = log::set_logger(&LOGGER);

        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&format!("[retouch] panic: {info}").into());
        }));
    });
    log::set_max_level(level);
}

/// Parse a level name as used by `set_log_level`. Unknown names mean `Info`.
pub(crate) fn parse_level(name: &str) -> LevelFilter {
    match name.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
