//! ESC/POS command builder
//!
//! Emits the handful of ESC/POS commands every job uses, and the payload
//! formatter that wraps plain receipt text in them.

use tracing::instrument;

const ESC: char = '\x1B';
const GS: char = '\x1D';
const LF: char = '\x0A';

/// Thermal paper roll width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperWidth {
    Mm58,
    #[default]
    Mm80,
}

/// String-based ESC/POS command builder
///
/// Accumulates text and control codes in a `String`; the caller encodes it
/// to bytes for the target printer (see `encode_payload`).
#[derive(Debug, Default)]
pub struct EscPosTextBuilder {
    buf: String,
}

impl EscPosTextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize printer (ESC @)
    pub fn init(&mut self) -> &mut Self {
        self.buf.push(ESC);
        self.buf.push('@');
        self
    }

    pub fn write(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    pub fn write_line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self.buf.push(LF);
        self
    }

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.push(ESC);
        self.buf.push('d');
        self.buf.push(char::from(lines));
        self
    }

    /// ESC a 1
    pub fn align_center(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x61\x01");
        self
    }

    /// ESC a 0
    pub fn align_left(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x61\x00");
        self
    }

    /// Double width and height (GS ! 0x11)
    pub fn size_double(&mut self) -> &mut Self {
        self.buf.push_str("\x1D\x21\x11");
        self
    }

    /// Back to normal size (GS ! 0x00)
    pub fn size_reset(&mut self) -> &mut Self {
        self.buf.push_str("\x1D\x21\x00");
        self
    }

    /// Full cut (GS V 0)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.push(GS);
        self.buf.push('V');
        self.buf.push('\x00');
        self
    }

    pub fn finalize(self) -> String {
        self.buf
    }
}

/// Wrap plain receipt text in the control codes every job is sent with
///
/// The first line is printed centered in double size as the header; the
/// rest is left aligned in normal size. Line breaks (`\n`, `\r\n`, `\r`)
/// become LF, and the job ends with a 3-line feed and a full cut.
///
/// `paper` is accepted for every job but does not change the emitted
/// codes: line length is decided by whoever laid out `content`.
#[instrument(skip(content), fields(len = content.len()))]
pub fn format_for_printer(content: &str, paper: PaperWidth) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let (header, body) = match normalized.split_once('\n') {
        Some((header, body)) => (header, Some(body)),
        None => (normalized.as_str(), None),
    };

    let mut b = EscPosTextBuilder::new();
    b.init();
    b.align_center();
    b.size_double();
    b.write_line(header);
    b.size_reset();
    b.align_left();

    if let Some(body) = body {
        b.write(body);
    }

    b.feed(3);
    b.cut();
    b.finalize()
}
