// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::header::{TraceVersion, MAGIC};
use byteorder::{LittleEndian, WriteBytesExt};
use prost::Message;
use simpleperf_protobuf::Record;
use std::io::{self, Write};

/// Writes a trace in the format [`crate::parse`] reads:
///
/// ```text
/// char magic[10] = "SIMPLEPERF";
/// LittleEndian16(version);
/// LittleEndian32(record_size_0)
/// Record (having record_size_0 bytes)
/// ...
/// LittleEndian32(record_size_N)
/// Record (having record_size_N bytes)
/// LittleEndian32(0)
/// ```
///
/// Serialization happens in small writes, so a buffered writer should
/// probably be used.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    writer: W,
}

impl<W: Write> TraceWriter<W> {
    /// Writes the header.
    pub fn new(mut writer: W, version: TraceVersion) -> io::Result<Self> {
        writer.write_all(MAGIC)?;
        writer.write_u16::<LittleEndian>(version.0)?;
        Ok(Self { writer })
    }

    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.write_frame(&record.encode_to_vec())
    }

    /// Frames an already encoded record.
    pub fn write_frame(&mut self, payload: &[u8]) -> io::Result<()> {
        if payload.is_empty() {
            // It would read back as the end of the trace.
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot frame an empty record",
            ));
        }
        let len = u32::try_from(payload.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("record of {} bytes does not fit in a frame", payload.len()),
            )
        })?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_all(payload)
    }

    /// Writes the terminating frame and hands back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.write_u32::<LittleEndian>(0)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
