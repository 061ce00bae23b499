use super::*;

/// Newline framing with a bounded reassembly buffer. A line longer than the
/// limit is dropped up to its terminating newline instead of failing the
/// stream.
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    next_index: usize,
    discarding: bool,
}

impl LineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    fn take_line(buf: &mut BytesMut, end: usize) -> String {
        let line = buf.split_to(end + 1);
        let mut line = &line[..line.len() - 1];

        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        String::from_utf8_lossy(line).into_owned()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        loop {
            if let Some(offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
                let end = self.next_index + offset;
                self.next_index = 0;

                if self.discarding {
                    buf.advance(end + 1);
                    self.discarding = false;
                    continue;
                }

                if end > self.max_length {
                    warn!("Dropping {end} byte line exceeding {} bytes", self.max_length);
                    buf.advance(end + 1);
                    continue;
                }

                let line = Self::take_line(buf, end);

                if line.is_empty() {
                    continue;
                }

                return Ok(Some(line));
            }

            if buf.len() > self.max_length {
                warn!(
                    "Discarding {} buffered bytes without a newline, limit is {}",
                    buf.len(),
                    self.max_length
                );
                buf.clear();
                self.next_index = 0;
                self.discarding = true;
            } else if self.discarding {
                buf.clear();
                self.next_index = 0;
            } else {
                self.next_index = buf.len();
            }

            return Ok(None);
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, io::Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        self.next_index = 0;

        if buf.is_empty() || std::mem::take(&mut self.discarding) {
            buf.clear();
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&buf[..]).trim_end_matches('\r').to_string();
        buf.clear();

        Ok((!line.is_empty()).then_some(line))
    }
}

impl Encoder<String> for LineCodec {
    type Error = io::Error;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), io::Error> {
        buf.reserve(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\n");
        Ok(())
    }
}
