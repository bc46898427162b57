// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::TraceBuffer;
use crate::error::ParseError;
use crate::record::{decode_record, TraceRecord};
use bytes::Bytes;

/// One length-prefixed chunk of the record stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Offset of the frame's length prefix within the trace.
    pub offset: usize,
    pub payload: Bytes,
}

impl Frame {
    pub fn decode(&self) -> Result<TraceRecord, ParseError> {
        decode_record(self.payload.clone()).map_err(|source| ParseError::Decode {
            offset: self.offset,
            source,
        })
    }
}

/// Iterates the frames that follow the header, up to the zero-length
/// terminator. Anything after the terminator is not looked at.
///
/// The iterator is fused: after the terminator or the first error it only
/// returns `None`.
#[derive(Debug)]
pub struct Frames<'a> {
    buffer: &'a mut TraceBuffer,
    done: bool,
}

impl<'a> Frames<'a> {
    /// `buffer` must be positioned right after the header.
    pub fn new(buffer: &'a mut TraceBuffer) -> Self {
        Self {
            buffer,
            done: false,
        }
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, ParseError> {
        let offset = self.buffer.position();
        let len = self.buffer.read_u32_le()?;
        if len == 0 {
            return Ok(None);
        }
        let payload = self.buffer.read_bytes(len as usize)?;
        tracing::trace!(offset, len, "read frame");
        Ok(Some(Frame { offset, payload }))
    }
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.read_frame().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }
}

impl std::iter::FusedIterator for Frames<'_> {}
