//! Log line formatting

use super::color::{ColorCycle, ColorFn};
use std::collections::HashMap;
use std::io::Write;
use tracing::warn;

/// Space between the longest service name and the `|` separator
const PADDING: usize = 3;

/// Formats interleaved log events from many services.
///
/// Every line is prefixed with its service name, padded to a shared
/// column and colored per service. The column grows when a service with
/// a longer name shows up; lines already written keep their old padding.
///
/// The consumer takes `&mut self`, so a single owner serializes state
/// updates and sink writes.
pub struct LogConsumer<W: Write> {
    colors: HashMap<String, ColorFn>,
    width: usize,
    writer: W,
    palette: ColorCycle,
}

impl<W: Write> LogConsumer<W> {
    /// Create a consumer writing to `writer`
    pub fn new(writer: W, palette: ColorCycle) -> Self {
        Self {
            colors: HashMap::new(),
            width: 0,
            writer,
            palette,
        }
    }

    /// Write one log event
    pub fn log(&mut self, service: &str, _container: &str, message: &str) {
        let color = match self.colors.get(service) {
            Some(color) => *color,
            None => {
                let color = self.palette.next_color();
                self.colors.insert(service.to_string(), color);
                self.compute_width();
                color
            }
        };

        let prefix = color.paint(&format!("{:<width$} |", service, width = self.width));

        for line in message.split('\n') {
            let formatted = format!("{} {}\n", prefix, line);
            if let Err(e) = self.writer.write_all(formatted.as_bytes()) {
                warn!("Failed to write log line for {}: {}", service, e);
            }
        }

        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush log output: {}", e);
        }
    }

    fn compute_width(&mut self) {
        let longest = self
            .colors
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0);
        self.width = longest + PADDING;
    }

    /// Current prefix column width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Color assigned to a service, if it has been seen
    pub fn color_of(&self, service: &str) -> Option<ColorFn> {
        self.colors.get(service).copied()
    }

    /// Number of distinct services seen
    pub fn service_count(&self) -> usize {
        self.colors.len()
    }

    /// Recover the sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}
