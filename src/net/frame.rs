//! Line protocol spoken with the Wi-Fi/MQTT co-processor.
//!
//! One frame per `\n`-terminated line:
//!
//! | Direction         | Frame                   |
//! |-------------------|-------------------------|
//! | device → co-proc  | `SUB <topic>`           |
//! | device → co-proc  | `PUB <topic> <payload>` |
//! | co-proc → device  | `MSG <topic> <payload>` |
//! | co-proc → device  | `UP` / `DOWN`           |
//!
//! Topics never contain spaces; payloads run to the end of the line.

use heapless::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    Sub { topic: &'a str },
    Pub { topic: &'a str, payload: &'a [u8] },
    Msg { topic: &'a str, payload: &'a [u8] },
    /// Broker session established.
    Up,
    /// Broker session lost.
    Down,
}

fn valid_topic(topic: &str) -> bool {
    !topic.is_empty() && !topic.bytes().any(|b| b == b' ' || b == b'\n' || b == b'\r')
}

fn valid_payload(payload: &[u8]) -> bool {
    !payload.iter().any(|&b| b == b'\n' || b == b'\r')
}

/// Write `frame` plus the terminating newline into `out`.
///
/// Returns the number of bytes written, or `None` if the frame cannot be
/// represented or does not fit.
pub fn encode(frame: &Frame<'_>, out: &mut [u8]) -> Option<usize> {
    let mut w = Writer { out, len: 0 };
    match *frame {
        Frame::Sub { topic } => {
            if !valid_topic(topic) {
                return None;
            }
            w.put(b"SUB ")?;
            w.put(topic.as_bytes())?;
        }
        Frame::Pub { topic, payload } | Frame::Msg { topic, payload } => {
            if !valid_topic(topic) || !valid_payload(payload) {
                return None;
            }
            let tag: &[u8] = if matches!(frame, Frame::Pub { .. }) {
                b"PUB "
            } else {
                b"MSG "
            };
            w.put(tag)?;
            w.put(topic.as_bytes())?;
            w.put(b" ")?;
            w.put(payload)?;
        }
        Frame::Up => w.put(b"UP")?,
        Frame::Down => w.put(b"DOWN")?,
    }
    w.put(b"\n")?;
    Some(w.len)
}

struct Writer<'a> {
    out: &'a mut [u8],
    len: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) -> Option<()> {
        let end = self.len.checked_add(bytes.len())?;
        self.out.get_mut(self.len..end)?.copy_from_slice(bytes);
        self.len = end;
        Some(())
    }
}

/// Parse one line, with or without its line ending.
pub fn decode(line: &[u8]) -> Option<Frame<'_>> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    match line {
        b"UP" => return Some(Frame::Up),
        b"DOWN" => return Some(Frame::Down),
        _ => {}
    }

    let split = line.iter().position(|&b| b == b' ')?;
    let (tag, rest) = (&line[..split], &line[split + 1..]);
    let (topic, payload) = match rest.iter().position(|&b| b == b' ') {
        Some(at) => (&rest[..at], &rest[at + 1..]),
        None => (rest, &rest[rest.len()..]),
    };
    let topic = core::str::from_utf8(topic).ok().filter(|t| valid_topic(t))?;

    match tag {
        b"SUB" if payload.is_empty() => Some(Frame::Sub { topic }),
        b"PUB" => Some(Frame::Pub { topic, payload }),
        b"MSG" => Some(Frame::Msg { topic, payload }),
        _ => None,
    }
}

/// Reassembles newline-terminated lines from a byte stream.
///
/// A line longer than `N` is discarded whole.
pub struct LineBuffer<const N: usize> {
    line: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Feed one byte; returns a complete line (without `\n`) when one ends.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, N>> {
        if byte == b'\n' {
            let line = core::mem::take(&mut self.line);
            if core::mem::replace(&mut self.overflowed, false) {
                warn!("link: dropping over-long line");
                return None;
            }
            return Some(line);
        }
        if !self.overflowed && self.line.push(byte).is_err() {
            self.overflowed = true;
        }
        None
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
