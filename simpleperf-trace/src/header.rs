// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::TraceBuffer;
use crate::error::ParseError;
use std::fmt;

/// Magic string that should appear in the very beginning of a trace.
pub const MAGIC: &[u8; 10] = b"SIMPLEPERF";

/// Format version of a trace, as written right after [`MAGIC`]. No range is
/// enforced on it; it is kept so consumers can make compatibility decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct TraceVersion(pub u16);

impl From<u16> for TraceVersion {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for TraceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Verifies the magic string and reads the version, leaving the cursor at the
/// first frame.
pub fn read_header(buffer: &mut TraceBuffer) -> Result<TraceVersion, ParseError> {
    let magic = buffer.read_bytes(MAGIC.len())?;
    if magic.as_ref() != MAGIC {
        return Err(ParseError::magic_mismatch(&magic));
    }
    Ok(TraceVersion(buffer.read_u16_le()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn reads_version_after_magic() {
        let mut buffer = TraceBuffer::new(b"SIMPLEPERF\x01\x00rest".to_vec());
        assert_eq!(read_header(&mut buffer).unwrap(), TraceVersion(1));
        assert_eq!(buffer.position(), 12);
    }

    #[test]
    fn any_version_is_accepted() {
        let mut buffer = TraceBuffer::new(b"SIMPLEPERF\xff\xff".to_vec());
        assert_eq!(read_header(&mut buffer).unwrap(), TraceVersion(u16::MAX));
    }

    #[test]
    fn wrong_magic() {
        let mut buffer = TraceBuffer::new(b"SIMPLEPERG\x01\x00\x00\x00\x00\x00".to_vec());
        let err = read_header(&mut buffer).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Format);
        assert!(matches!(err, ParseError::MagicMismatch { ref found } if found == b"SIMPLEPERG"));
    }

    #[test]
    fn too_short_for_magic() {
        let mut buffer = TraceBuffer::new(b"SIMPLE".to_vec());
        let err = read_header(&mut buffer).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Format);
    }

    #[test]
    fn missing_version() {
        let mut buffer = TraceBuffer::new(b"SIMPLEPERF\x01".to_vec());
        assert!(matches!(
            read_header(&mut buffer),
            Err(ParseError::Truncated(_))
        ));
    }
}
