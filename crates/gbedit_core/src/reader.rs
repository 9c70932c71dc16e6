use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::core_api::{CoreError, CoreErrorCode};

/// Line cursor over a source file that remembers where it is, so decode
/// errors can point at `path:line`.
pub struct LineReader<R> {
    inner: R,
    path: PathBuf,
    line_number: usize,
    peeked: Option<String>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
            line_number: 0,
            peeked: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based number of the last line handed out.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>, CoreError> {
        let line = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.read_raw()?,
        };
        if line.is_some() {
            self.line_number += 1;
        }
        Ok(line)
    }

    pub fn peek_line(&mut self) -> Result<Option<&str>, CoreError> {
        if self.peeked.is_none() {
            self.peeked = self.read_raw()?;
        }
        Ok(self.peeked.as_deref())
    }

    /// Like [`LineReader::next_line`] but end of input is a decode error.
    pub fn expect_line(&mut self, what: &str) -> Result<String, CoreError> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(self.error(format!("unexpected end of file while reading {what}"))),
        }
    }

    pub fn expect_non_blank(&mut self, what: &str) -> Result<String, CoreError> {
        loop {
            let line = self.expect_line(what)?;
            if !line.trim().is_empty() {
                return Ok(line);
            }
        }
    }

    pub fn error(&self, message: impl AsRef<str>) -> CoreError {
        self.located(CoreErrorCode::Parse, message.as_ref())
    }

    pub fn out_of_range(&self, message: impl AsRef<str>) -> CoreError {
        self.located(CoreErrorCode::OutOfRange, message.as_ref())
    }

    fn located(&self, code: CoreErrorCode, message: &str) -> CoreError {
        CoreError::new(
            code,
            format!("{}:{}: {}", self.path.display(), self.line_number, message),
        )
    }

    /// Invalid UTF-8 becomes U+FFFD. Saves write passthrough lines back
    /// from the file's raw bytes, not from this view.
    fn read_raw(&mut self) -> Result<Option<String>, CoreError> {
        let mut buf = Vec::new();
        let read = self
            .inner
            .read_until(b'\n', &mut buf)
            .map_err(|e| CoreError::io("read", &self.path, e))?;
        if read == 0 {
            return Ok(None);
        }
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::LineReader;
    use crate::core_api::CoreErrorCode;

    #[test]
    fn tracks_line_numbers_across_peeks() {
        let mut reader = LineReader::new(Cursor::new("a\r\nb\n\nc"), "x.c");
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("a"));
        assert_eq!(reader.peek_line().unwrap(), Some("b"));
        assert_eq!(reader.line_number(), 1);
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("b"));
        assert_eq!(reader.expect_non_blank("c").unwrap(), "c");
        assert_eq!(reader.line_number(), 4);
        assert_eq!(reader.next_line().unwrap(), None);
    }

    #[test]
    fn end_of_input_is_a_located_parse_error() {
        let mut reader = LineReader::new(Cursor::new("only\n"), "gfx.c");
        reader.next_line().unwrap();
        let err = reader.expect_line("graphics body").expect_err("eof");
        assert_eq!(err.code, CoreErrorCode::Parse);
        assert!(err.message.starts_with("gfx.c:1:"));
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let mut reader = LineReader::new(Cursor::new(b"// caf\xE9\nint x;\n".to_vec()), "x.c");
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("// caf\u{FFFD}"));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("int x;"));
    }
}
