//! `tracing` output routed to the browser console.
//!
//! Each formatted event is buffered and emitted as one console call when
//! the writer is dropped, using the console method matching the level.
//! Debug and trace lines are dropped unless [`set_debug`] turned them on.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Toggle forwarding of debug and trace events.
pub(crate) fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

fn emits(level: Level) -> bool {
    level <= Level::INFO || DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Buffers one formatted event.
pub(crate) struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    /// The buffered line without its trailing newline.
    fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() || !emits(self.level) {
            return;
        }
        let line = JsValue::from_str(&self.line());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

/// [`MakeWriter`] handing out one [`ConsoleWriter`] per event.
pub(crate) struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Install the console subscriber. Safe to call more than once.
pub(crate) fn init_logging() {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .try_init();

    if installed.is_err() {
        web_sys::console::warn_1(&JsValue::from_str(
            "webpify: a tracing subscriber is already set",
        ));
    }
}
