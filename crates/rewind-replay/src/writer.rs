//! Log writer.
//!
//! [`LogWriter`] streams records to any `Write` sink in the text log
//! format. The header is written immediately on construction and every
//! appended record is flushed, so a crash loses at most the command in
//! flight.

use std::io::Write;

use rewind_core::{CommandRecord, ReplayHeader};

use crate::codec::{encode_header, encode_record};
use crate::error::ReplayError;

/// Writes a command log to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use rewind_core::{ActionTag, CommandRecord, ReplayHeader, SlotId, TickId};
/// use rewind_replay::{decode, DecodeMode, LogWriter};
///
/// let header = ReplayHeader::default();
/// let mut buf = Vec::new();
/// let mut writer = LogWriter::new(&mut buf, &header).unwrap();
/// for tick in 1..=2u64 {
///     let rec = CommandRecord::new(TickId(tick), ActionTag::Stop)
///         .with_actor(SlotId(3), "unit-knight")
///         .with_checksum(tick as u32);
///     writer.append(&rec).unwrap();
/// }
/// assert_eq!(writer.records_written(), 2);
/// drop(writer);
///
/// let text = String::from_utf8(buf).unwrap();
/// let (decoded, log) = decode(&text, DecodeMode::Strict).unwrap();
/// assert_eq!(decoded, header);
/// assert_eq!(log.len(), 2);
/// ```
#[derive(Debug)]
pub struct LogWriter<W: Write> {
    writer: W,
    records_written: u64,
}

impl<W: Write> LogWriter<W> {
    /// Create a new log writer, immediately writing the header.
    pub fn new(mut writer: W, header: &ReplayHeader) -> Result<Self, ReplayError> {
        writer.write_all(encode_header(header).as_bytes())?;
        writer.flush()?;
        Ok(Self {
            writer,
            records_written: 0,
        })
    }

    /// Wrap a sink whose header is already written.
    #[cfg(test)]
    pub(crate) fn resume(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    /// Write one record line and flush it.
    pub fn append(&mut self, record: &CommandRecord) -> Result<(), ReplayError> {
        self.writer.write_all(encode_record(record).as_bytes())?;
        self.writer.flush()?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
