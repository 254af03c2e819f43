//! Header/body/footer boundary detection.
//!
//! Project Gutenberg books wrap the actual text in legal boilerplate. The
//! body starts after a line beginning with `*** START` and ends at a line
//! beginning with `*** END`. [`BoundaryDetector`] classifies lines one at a
//! time and [`BodyLines`] lazily yields only the body.
//!
//! # State machine
//!
//! ```text
//!  Header ──"*** START"──▶ Body ──"*** END"──▶ Footer (terminal)
//! ```
//!
//! - Header lines are discarded, including the start marker itself.
//! - Body lines are yielded, blank lines included.
//! - The end marker line is yielded, then the detector stops.
//! - Without a start marker the whole document stays in `Header` and
//!   nothing is yielded.
//!
//! # Example
//!
//! ```rust
//! use gutenberg_chunker_core::boundary::body_lines;
//!
//! let text = "license\n*** START OF THE BOOK\nCall me Ishmael.\n\n*** END\ntrailer";
//! let lines: Vec<&str> = body_lines(text).collect();
//! assert_eq!(lines, vec!["Call me Ishmael.", "", "*** END"]);
//! ```

/// Marker that opens the body of a book.
pub const START_MARKER: &str = "*** START";

/// Marker that closes the body of a book.
pub const END_MARKER: &str = "*** END";

/// Region of the document a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Header,
    Body,
    Footer,
}

/// Per-document boundary state. One detector per document; never shared.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    region: Region,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Whether the detector has reached the footer and will accept no more lines.
    pub fn is_done(&self) -> bool {
        self.region == Region::Footer
    }

    /// Classify one line, returning its trimmed text if it belongs to the body.
    ///
    /// A `*** START` line is always swallowed, even when it repeats inside
    /// the body. Once in [`Region::Footer`] every line is rejected.
    pub fn step<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        if self.region == Region::Footer {
            return None;
        }

        let text = line.trim();
        if text.starts_with(START_MARKER) {
            self.region = Region::Body;
            return None;
        }

        match self.region {
            Region::Header | Region::Footer => None,
            Region::Body => {
                if text.starts_with(END_MARKER) {
                    self.region = Region::Footer;
                }
                Some(text)
            }
        }
    }
}

/// Lazy iterator over the trimmed body lines of a document.
pub struct BodyLines<'a> {
    lines: std::str::Lines<'a>,
    detector: BoundaryDetector,
}

impl<'a> Iterator for BodyLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.detector.is_done() {
            let line = self.lines.next()?;
            if let Some(text) = self.detector.step(line) {
                return Some(text);
            }
        }
        None
    }
}

/// Yield the body lines of `content`, trimmed, in document order.
pub fn body_lines(content: &str) -> BodyLines<'_> {
    BodyLines {
        lines: content.lines(),
        detector: BoundaryDetector::new(),
    }
}
