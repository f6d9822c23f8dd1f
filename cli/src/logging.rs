//! Logs go to the file named by `LOG_FILE` or nowhere; stdout is reserved for JSON.
//!
//! `RUST_LOG` sets the filter (default `info`).

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper_util=off,reqwest=warn"));

    match std::env::var("LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(StripAnsi::new(file)))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
            tracing::info!(path = %path, "linkpost logging to file");
        }
        _ => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    /// Saw ESC.
    Start,
    /// Inside `ESC [ ...`.
    Csi,
}

/// Drops ANSI CSI sequences (`ESC [ params final`) from everything written through it.
struct StripAnsi<W> {
    inner: W,
    escape: Escape,
}

impl<W: Write> StripAnsi<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            escape: Escape::None,
        }
    }
}

impl<W: Write> Write for StripAnsi<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut out = Vec::with_capacity(buf.len());
        for &b in buf {
            self.escape = match (self.escape, b) {
                (Escape::None, 0x1b) => Escape::Start,
                (Escape::None, _) => {
                    out.push(b);
                    Escape::None
                }
                (Escape::Start, b'[') => Escape::Csi,
                (Escape::Start, _) => {
                    out.push(0x1b);
                    out.push(b);
                    Escape::None
                }
                (Escape::Csi, 0x40..=0x7e) => Escape::None,
                (Escape::Csi, _) => Escape::Csi,
            };
        }
        self.inner.write_all(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
