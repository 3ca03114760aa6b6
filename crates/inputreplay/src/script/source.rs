use std::collections::VecDeque;
use std::io::{self, BufRead, Read};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes of recent input kept for error snippets.
pub(crate) const CONTEXT_WINDOW: usize = 160;

/// Reader that skips a leading UTF-8 byte-order mark and remembers the last
/// [`CONTEXT_WINDOW`] bytes handed to the parser.
pub(crate) struct SourceReader<R> {
    inner: R,
    started: bool,
    window: VecDeque<u8>,
}

impl<R: BufRead> SourceReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            started: false,
            window: VecDeque::with_capacity(CONTEXT_WINDOW),
        }
    }

    /// The most recently consumed input, lossily decoded.
    pub(crate) fn context(&self) -> String {
        let bytes: Vec<u8> = self.window.iter().copied().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn skip_bom(&mut self) -> io::Result<()> {
        self.started = true;
        if self.inner.fill_buf()?.starts_with(UTF8_BOM) {
            self.inner.consume(UTF8_BOM.len());
        }
        Ok(())
    }

    fn remember(&mut self, bytes: &[u8]) {
        for byte in bytes {
            if self.window.len() == CONTEXT_WINDOW {
                self.window.pop_front();
            }
            self.window.push_back(*byte);
        }
    }
}

impl<R: BufRead> Read for SourceReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.started {
            self.skip_bom()?;
        }
        let read = self.inner.read(buf)?;
        if let Some(bytes) = buf.get(..read) {
            self.remember(bytes);
        }
        Ok(read)
    }
}
