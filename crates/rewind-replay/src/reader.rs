//! Log reader.
//!
//! Reads a whole log from a file or any `Read` source and decodes it.
//! Logs are small text files, so decoding works on the full text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rewind_core::{CommandLog, ReplayHeader};

use crate::codec::{decode, DecodeMode};
use crate::error::ReplayError;

/// Read and decode a log from any byte source.
pub fn read_log<R: Read>(
    mut reader: R,
    mode: DecodeMode,
) -> Result<(ReplayHeader, CommandLog), ReplayError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode(&text, mode)
}

/// Open `path` and decode its log.
///
/// # Errors
///
/// [`ReplayError::Io`] when the file cannot be opened or is not UTF-8,
/// [`ReplayError::MalformedLog`] when it does not decode.
pub fn read_log_file(
    path: &Path,
    mode: DecodeMode,
) -> Result<(ReplayHeader, CommandLog), ReplayError> {
    let file = File::open(path)?;
    let (header, log) = read_log(file, mode)?;
    tracing::debug!(path = %path.display(), records = log.len(), "log read");
    Ok((header, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use rewind_core::{ActionTag, CommandRecord, TickId};

    #[test]
    fn reads_from_byte_slice() {
        let header = ReplayHeader::default();
        let log = CommandLog::from_records(vec![
            CommandRecord::new(TickId(2), ActionTag::Stop).with_checksum(5)
        ])
        .unwrap();
        let bytes = encode(&header, &log).into_bytes();
        let (h, l) = read_log(bytes.as_slice(), DecodeMode::Strict).unwrap();
        assert_eq!(h, header);
        assert_eq!(l, log);
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let bytes = [0xffu8, 0xfe, 0x00];
        let err = read_log(bytes.as_slice(), DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("rewind_reader_missing_file.log");
        let err = read_log_file(&path, DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }
}
