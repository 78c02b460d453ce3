/// Incremental byte-to-line framing for streamed response bodies.
///
/// Chunk boundaries from the transport land anywhere, including mid-line.
/// `feed` buffers the trailing partial line until its terminator arrives;
/// `finish` drains whatever is left once the byte stream ends.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    /// Feed arbitrary bytes and drain the complete lines they terminate.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut lines = Vec::new();

        while let Some(split) = self.buffer.find('\n') {
            let mut line = self.buffer[..split].to_string();
            self.buffer.drain(0..=split);
            strip_carriage_return(&mut line);
            lines.push(line);
        }

        lines
    }

    /// Drain the trailing unterminated line, if any.
    ///
    /// Call once after the byte stream ends; a final line without `\n` is
    /// still a line.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        let mut line = std::mem::take(&mut self.buffer);
        strip_carriage_return(&mut line);
        Some(line)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn strip_carriage_return(line: &mut String) {
    if line.ends_with('\r') {
        line.pop();
    }
}
