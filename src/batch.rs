//! Line-oriented batch solving.
//!
//! A blocking task reads frames one per line and pushes each outcome through
//! a bounded channel; the caller consumes them as a stream in input order.

use futures::stream::Stream;
use std::io::BufRead;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::frame::Frame;

const CHANNEL_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    /// 1-based line number in the input.
    pub line: usize,
    pub result: Result<u16>,
}

/// Blank lines and `#` comments carry no frame.
fn is_frame_line(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.starts_with('#')
}

pub fn solve_lines<R>(reader: R) -> impl Stream<Item = LineOutcome>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    task::spawn_blocking(move || run_batch_reader(reader, tx));

    tokio_stream::wrappers::ReceiverStream::new(rx)
}

fn run_batch_reader<R: BufRead>(mut reader: R, tx: mpsc::Sender<LineOutcome>) {
    let mut raw = Vec::new();
    let mut line = 0usize;
    let mut solved = 0usize;
    loop {
        raw.clear();
        line += 1;
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error!("Batch reader failed at line {}: {}", line, e);
                let result = Err(Error::Io {
                    line,
                    message: e.to_string(),
                });
                let _ = tx.blocking_send(LineOutcome { line, result });
                return;
            }
        }

        let result = match std::str::from_utf8(&raw) {
            Ok(text) if !is_frame_line(text) => continue,
            Ok(text) => Frame::from_hex(text).and_then(|frame| frame.recover_prefix()),
            Err(_) => Err(Error::InvalidUtf8 { line }),
        };
        debug!(line, ok = result.is_ok(), "batch line");
        solved += 1;

        if tx.blocking_send(LineOutcome { line, result }).is_err() {
            // Receiver dropped
            return;
        }
    }
    info!("Batch input exhausted after {} frames", solved);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::to_hex;
    use futures::StreamExt;
    use std::io::{self, BufReader, Cursor, Read};

    #[test]
    fn frame_lines_skip_blanks_and_comments() {
        assert!(is_frame_line("1234abcd"));
        assert!(is_frame_line("  1234abcd  "));
        assert!(!is_frame_line(""));
        assert!(!is_frame_line("   "));
        assert!(!is_frame_line("# header"));
    }

    #[tokio::test]
    async fn batch_reports_each_line_in_order() {
        let good = to_hex(&Frame::seal(0x1D0F, b"hello").to_bytes());
        let input = format!("# frames\n{good}\n\n123\nabcd\nzz00\n");

        let outcomes: Vec<LineOutcome> = solve_lines(Cursor::new(input)).collect().await;

        assert_eq!(
            outcomes,
            vec![
                LineOutcome { line: 2, result: Ok(0x1D0F) },
                LineOutcome { line: 4, result: Err(Error::OddHexLength { digits: 3 }) },
                LineOutcome { line: 5, result: Ok(0xABCD) },
                LineOutcome {
                    line: 6,
                    result: Err(Error::InvalidHexDigit { position: 0, found: 'z' }),
                },
            ]
        );
    }

    #[tokio::test]
    async fn batch_continues_past_invalid_utf8() {
        let input = b"abcd\n\xff\xfe\n1234\nabcd\n".to_vec();

        let outcomes: Vec<LineOutcome> = solve_lines(Cursor::new(input)).collect().await;

        assert_eq!(
            outcomes,
            vec![
                LineOutcome { line: 1, result: Ok(0xABCD) },
                LineOutcome { line: 2, result: Err(Error::InvalidUtf8 { line: 2 }) },
                LineOutcome { line: 3, result: Ok(0x1234) },
                LineOutcome { line: 4, result: Ok(0xABCD) },
            ]
        );
    }

    /// Yields its data, then fails every later read.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device gone")),
                n => Ok(n),
            }
        }
    }

    #[tokio::test]
    async fn batch_reports_read_failure() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"abcd\n".to_vec()),
        });

        let outcomes: Vec<LineOutcome> = solve_lines(reader).collect().await;

        assert_eq!(
            outcomes,
            vec![
                LineOutcome { line: 1, result: Ok(0xABCD) },
                LineOutcome {
                    line: 2,
                    result: Err(Error::Io { line: 2, message: "device gone".to_string() }),
                },
            ]
        );
    }

    #[tokio::test]
    async fn batch_of_empty_input_is_empty() {
        let outcomes: Vec<LineOutcome> = solve_lines(Cursor::new(String::new())).collect().await;
        assert!(outcomes.is_empty());
    }
}
