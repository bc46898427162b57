// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use bytes::Buf;
use prost::Message;
use simpleperf_protobuf::{File, LostSituation, MetaInfo, Record, RecordData, Sample, Thread};
use std::fmt;

/// The decoded content of one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceRecord {
    File(File),
    Lost(LostSituation),
    Sample(Sample),
    Thread(Thread),
    MetaInfo(MetaInfo),
    /// A record this parser has no use for. It is reported and skipped.
    Unrecognized(UnrecognizedRecord),
}

/// Why a record was classified as [`TraceRecord::Unrecognized`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnrecognizedRecord {
    ContextSwitch,
    /// None of the known record kinds is set, e.g. the record was written by
    /// a newer simpleperf.
    NotSet,
}

impl fmt::Display for UnrecognizedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnrecognizedRecord::ContextSwitch => "CONTEXT_SWITCH",
            UnrecognizedRecord::NotSet => "RECORDDATA_NOT_SET",
        })
    }
}

impl From<Record> for TraceRecord {
    fn from(record: Record) -> Self {
        match record.record_data {
            Some(RecordData::File(file)) => TraceRecord::File(file),
            Some(RecordData::Lost(lost)) => TraceRecord::Lost(lost),
            Some(RecordData::Sample(sample)) => TraceRecord::Sample(sample),
            Some(RecordData::Thread(thread)) => TraceRecord::Thread(thread),
            Some(RecordData::MetaInfo(meta_info)) => TraceRecord::MetaInfo(meta_info),
            Some(RecordData::ContextSwitch(_)) => {
                TraceRecord::Unrecognized(UnrecognizedRecord::ContextSwitch)
            }
            None => TraceRecord::Unrecognized(UnrecognizedRecord::NotSet),
        }
    }
}

/// Decodes one frame payload. There is no recovery from a malformed payload.
pub fn decode_record(payload: impl Buf) -> Result<TraceRecord, prost::DecodeError> {
    Record::decode(payload).map(TraceRecord::from)
}
