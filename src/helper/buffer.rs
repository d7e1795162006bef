//! Fixed-capacity scratch buffer with truncate-on-overflow semantics.

use core::fmt::{self, Write};
use heapless::String;

/// A reusable text buffer that silently truncates what does not fit.
///
/// Truncation always happens on a UTF-8 character boundary, so the contents
/// are valid `str` at all times.
#[derive(Debug, Default)]
pub struct ScratchBuffer<const N: usize> {
    buf: String<N>,
    truncated: bool,
}

impl<const N: usize> ScratchBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            truncated: false,
        }
    }

    /// Discard the previous contents.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    /// Replace the contents with `args`, truncating at capacity.
    ///
    /// Returns `Err` only if a `Display` implementation inside `args` reported
    /// an error; running out of space is not an error.
    pub fn format(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.clear();
        match self.write_fmt(args) {
            Ok(()) => Ok(()),
            // The writer aborts formatting once full; that is truncation, not failure.
            Err(_) if self.truncated => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The current contents.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Whether the last write had to drop data.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Whether the buffer holds no data.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl<const N: usize> Write for ScratchBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }
        let room = N - self.buf.len();
        if s.len() <= room {
            // Cannot fail: the length was checked above.
            let _ = self.buf.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        let _ = self.buf.push_str(&s[..cut]);
        self.truncated = true;
        Err(fmt::Error)
    }
}
