//! Per-service prefix colors

use crossterm::style::{Color, Stylize};

/// Palette used for terminal output, in allocation order
pub const RAINBOW: [Color; 10] = [
    Color::DarkCyan,
    Color::DarkYellow,
    Color::DarkGreen,
    Color::DarkMagenta,
    Color::DarkBlue,
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Blue,
];

/// A color formatting function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFn {
    /// Leave text untouched
    Plain,
    /// Wrap text in foreground color escapes
    Foreground(Color),
}

impl ColorFn {
    /// Render `text` in this color
    pub fn paint(&self, text: &str) -> String {
        match self {
            ColorFn::Plain => text.to_string(),
            ColorFn::Foreground(color) => text.with(*color).to_string(),
        }
    }
}

/// Endless round-robin over a fixed palette.
///
/// Each log session gets its own cycle, so color assignment is
/// independent between sessions and reproducible in tests.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<ColorFn>,
    position: usize,
}

impl ColorCycle {
    /// Cycle over the given palette; an empty palette yields [`ColorFn::Plain`]
    pub fn new(palette: Vec<ColorFn>) -> Self {
        Self {
            palette,
            position: 0,
        }
    }

    /// The terminal palette
    pub fn rainbow() -> Self {
        Self::new(RAINBOW.iter().copied().map(ColorFn::Foreground).collect())
    }

    /// No colors at all
    pub fn monochrome() -> Self {
        Self::new(vec![ColorFn::Plain])
    }

    /// Start over from the first color
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Next color in the cycle
    pub fn next_color(&mut self) -> ColorFn {
        if self.palette.is_empty() {
            return ColorFn::Plain;
        }
        let color = self.palette[self.position];
        self.position = (self.position + 1) % self.palette.len();
        color
    }
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::rainbow()
    }
}

impl Iterator for ColorCycle {
    type Item = ColorFn;

    fn next(&mut self) -> Option<ColorFn> {
        Some(self.next_color())
    }
}
