// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::BufferError;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use std::path::Path;

/// An immutable, fully loaded trace with a read cursor.
///
/// Every read is bounds checked. A read that doesn't fit in the remaining
/// bytes fails with [`BufferError::UnexpectedEof`] and leaves the cursor where
/// it was.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    data: Bytes,
    position: usize,
}

impl TraceBuffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Reads the whole file into memory. The file is closed before this
    /// returns.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    /// Offset of the cursor from the start of the trace.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u16_le(&mut self) -> Result<u16, BufferError> {
        let slice = self.advance(2)?;
        Ok(LittleEndian::read_u16(slice))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, BufferError> {
        let slice = self.advance(4)?;
        Ok(LittleEndian::read_u32(slice))
    }

    /// Returns the next `len` bytes without copying them.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, BufferError> {
        let start = self.position;
        self.advance(len)?;
        Ok(self.data.slice(start..start + len))
    }

    fn advance(&mut self, len: usize) -> Result<&[u8], BufferError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(BufferError::UnexpectedEof {
                offset: self.position,
                requested: len,
                remaining,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }
}
