// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;

/// A read ran past the end of a [`crate::TraceBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("unexpected end of trace at offset {offset}: needed {requested} bytes, {remaining} left")]
    UnexpectedEof {
        offset: usize,
        requested: usize,
        remaining: usize,
    },
}

/// Represents errors that occur while parsing a trace. Any of them means the
/// trace has no usable result; nothing partially parsed is handed out.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file does not start with [`crate::MAGIC`].
    #[error("simpleperf trace could not be parsed due to magic number mismatch (found {found:?})")]
    MagicMismatch { found: Vec<u8> },
    /// A header field or frame extends past the end of the data, or the
    /// frame stream has no terminator.
    #[error(transparent)]
    Truncated(#[from] BufferError),
    /// A frame payload is not a valid record.
    #[error("failed to decode the record framed at offset {offset}")]
    Decode {
        offset: usize,
        #[source]
        source: prost::DecodeError,
    },
    /// The number of samples read differs from the count declared by the
    /// lost-situation record.
    #[error("samples count doesn't match the number of samples read: declared {declared}, read {read}")]
    SampleCountMismatch { declared: u64, read: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Coarse classification of [`ParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The container framing is wrong: bad magic, or truncated data.
    Format,
    /// A framed payload could not be deserialized.
    Decode,
    /// The records decoded fine but contradict each other.
    State,
    Io,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::MagicMismatch { .. } | ParseError::Truncated(_) => ParseErrorKind::Format,
            ParseError::Decode { .. } => ParseErrorKind::Decode,
            ParseError::SampleCountMismatch { .. } => ParseErrorKind::State,
            ParseError::Io(_) => ParseErrorKind::Io,
        }
    }

    pub(crate) fn magic_mismatch(found: &[u8]) -> Self {
        ParseError::MagicMismatch {
            found: found.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_is_a_format_error() {
        let err = ParseError::from(BufferError::UnexpectedEof {
            offset: 12,
            requested: 4,
            remaining: 1,
        });
        assert_eq!(err.kind(), ParseErrorKind::Format);
        assert_eq!(
            err.to_string(),
            "unexpected end of trace at offset 12: needed 4 bytes, 1 left"
        );
    }

    #[test]
    fn sample_count_mismatch_display() {
        let err = ParseError::SampleCountMismatch {
            declared: 3,
            read: 2,
        };
        assert_eq!(err.kind(), ParseErrorKind::State);
        assert_eq!(
            err.to_string(),
            "samples count doesn't match the number of samples read: declared 3, read 2"
        );
    }

    #[test]
    fn io_errors_pass_through() {
        let err = ParseError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ParseErrorKind::Io);
        assert_eq!(err.to_string(), "gone");
    }
}
