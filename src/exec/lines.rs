// src/exec/lines.rs

//! Splitting raw process output into lines.
//!
//! Downloaders redraw their progress bar with a bare carriage return, so `\r`,
//! `\n` and `\r\n` all end a line here. Bytes that are not valid UTF-8 are
//! replaced rather than treated as a read failure.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

const READ_CHUNK: usize = 8 * 1024;

/// Longest line kept in memory; longer runs without a terminator are
/// emitted in pieces of this size.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental line splitter over arbitrary byte chunks.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buf: Vec<u8>,
    /// Last chunk ended in `\r`; a leading `\n` in the next chunk belongs to it.
    pending_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut bytes = chunk;
        if bytes.is_empty() {
            return lines;
        }

        if self.pending_cr {
            self.pending_cr = false;
            if let Some((&b'\n', rest)) = bytes.split_first() {
                bytes = rest;
            }
        }

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    lines.push(self.take_line());
                }
                b'\r' => {
                    lines.push(self.take_line());
                    match bytes.get(i + 1) {
                        Some(b'\n') => i += 1,
                        Some(_) => {}
                        None => self.pending_cr = true,
                    }
                }
                b => {
                    self.buf.push(b);
                    if self.buf.len() >= MAX_LINE_BYTES {
                        lines.push(self.take_line());
                    }
                }
            }
            i += 1;
        }

        lines
    }

    /// Flush the trailing partial line, if any, at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        self.pending_cr = false;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

/// Read `reader` to the end, sending each line to `tx`.
///
/// A read error is forwarded as the last item and ends the pump. Returns
/// early (without error) if the receiver has gone away.
pub async fn pump_lines<R>(mut reader: R, tx: mpsc::UnboundedSender<io::Result<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut splitter = LineSplitter::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                if let Some(last) = splitter.finish() {
                    let _ = tx.send(Ok(last));
                }
                return;
            }
            Ok(n) => {
                for line in splitter.push(&chunk[..n]) {
                    if tx.send(Ok(line)).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}
