// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::buffer::TraceBuffer;
use crate::error::ParseError;
use crate::frame::Frames;
use crate::header::read_header;
use crate::trace::{ParsedTrace, TraceAccumulator};
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, info};

/// Parses the trace file at `path`. The whole file is read into memory first.
pub fn parse(path: impl AsRef<Path>) -> Result<ParsedTrace, ParseError> {
    let path = path.as_ref();
    let buffer = TraceBuffer::from_file(path)?;
    debug!(path = %path.display(), len = buffer.remaining(), "read trace file");
    parse_buffer(buffer)
}

pub fn parse_bytes(bytes: impl Into<Bytes>) -> Result<ParsedTrace, ParseError> {
    parse_buffer(TraceBuffer::new(bytes))
}

/// Validates the header, applies every framed record in order, then checks
/// the samples read against the declared count. Any error aborts the whole
/// parse.
pub fn parse_buffer(mut buffer: TraceBuffer) -> Result<ParsedTrace, ParseError> {
    let version = read_header(&mut buffer)?;
    let mut accumulator = TraceAccumulator::new(version);

    for frame in Frames::new(&mut buffer) {
        accumulator.apply(frame?.decode()?);
    }

    let trace = accumulator.finish()?;
    info!(
        version = %trace.version(),
        files = trace.files().len(),
        threads = trace.threads().len(),
        samples = trace.samples().len(),
        lost_samples = trace.lost_sample_count(),
        "parsed simpleperf trace"
    );
    Ok(trace)
}
