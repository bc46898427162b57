// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Message types for the records stored in a simpleperf report-sample trace
//! (the output of `simpleperf report-sample --protobuf`).
//!
//! The types are declared by hand with the prost derives rather than being
//! generated by `prost-build`, so no `protoc` is needed at build time. Nested
//! messages of the upstream schema are flattened into this module; the wire
//! format is unaffected by that.
//!
//! The upstream schema is proto2. Scalars are declared without `optional`, so
//! an absent field reads back as its zero value, which is also what the
//! generated Java accessors return.

/// One frame of a trace. Exactly one of the variants is expected to be set,
/// but a record produced by a newer simpleperf may carry none of the variants
/// known here, in which case `record_data` is `None`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Record {
    #[prost(oneof = "RecordData", tags = "1, 2, 3, 4, 5, 6")]
    pub record_data: Option<RecordData>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum RecordData {
    #[prost(message, tag = "1")]
    Sample(Sample),
    #[prost(message, tag = "2")]
    Lost(LostSituation),
    #[prost(message, tag = "3")]
    File(File),
    #[prost(message, tag = "4")]
    Thread(Thread),
    #[prost(message, tag = "5")]
    MetaInfo(MetaInfo),
    #[prost(message, tag = "6")]
    ContextSwitch(ContextSwitch),
}

impl From<RecordData> for Record {
    fn from(record_data: RecordData) -> Self {
        Self {
            record_data: Some(record_data),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Sample {
    /// Monotonic clock time in nanoseconds.
    #[prost(uint64, tag = "1")]
    pub time: u64,
    #[prost(int32, tag = "2")]
    pub thread_id: i32,
    /// Leaf first: the last entry is the root of the stack.
    #[prost(message, repeated, tag = "3")]
    pub callchain: Vec<CallChainEntry>,
    #[prost(uint64, tag = "4")]
    pub event_count: u64,
    /// Index into [`MetaInfo::event_type`].
    #[prost(uint32, tag = "5")]
    pub event_type_id: u32,
    #[prost(message, optional, tag = "6")]
    pub unwinding_result: Option<UnwindingResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CallChainEntry {
    /// Virtual address of the instruction in the ELF file.
    #[prost(uint64, tag = "1")]
    pub vaddr_in_file: u64,
    #[prost(uint32, tag = "2")]
    pub file_id: u32,
    /// Index into [`File::symbol`], or -1 when the lookup failed.
    #[prost(int32, tag = "3")]
    pub symbol_id: i32,
    #[prost(enumeration = "ExecutionType", tag = "4")]
    pub execution_type: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ExecutionType {
    NativeMethod = 0,
    InterpretedJvmMethod = 1,
    JitJvmMethod = 2,
    /// Only present for the art frames of a java method.
    ArtMethod = 3,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct UnwindingResult {
    #[prost(uint32, tag = "1")]
    pub raw_error_code: u32,
    #[prost(uint64, tag = "2")]
    pub error_addr: u64,
    #[prost(enumeration = "UnwindErrorCode", tag = "3")]
    pub error_code: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum UnwindErrorCode {
    None = 0,
    Unknown = 1,
    NotEnoughStack = 2,
    MemoryInvalid = 3,
    UnwindInfo = 4,
    InvalidMap = 5,
    MaxFrameExceeded = 6,
    RepeatedFrame = 7,
    InvalidElf = 8,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct LostSituation {
    #[prost(uint64, tag = "1")]
    pub sample_count: u64,
    #[prost(uint64, tag = "2")]
    pub lost_count: u64,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct File {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub path: String,
    /// Demangled symbol names, indexed by [`CallChainEntry::symbol_id`].
    #[prost(string, repeated, tag = "3")]
    pub symbol: Vec<String>,
    #[prost(string, repeated, tag = "4")]
    pub mangled_symbol: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Thread {
    #[prost(uint32, tag = "1")]
    pub thread_id: u32,
    #[prost(uint32, tag = "2")]
    pub process_id: u32,
    #[prost(string, tag = "3")]
    pub thread_name: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct MetaInfo {
    #[prost(string, repeated, tag = "1")]
    pub event_type: Vec<String>,
    #[prost(string, tag = "2")]
    pub app_package_name: String,
    #[prost(string, tag = "3")]
    pub app_type: String,
    #[prost(string, tag = "4")]
    pub android_sdk_version: String,
    #[prost(string, tag = "5")]
    pub android_build_type: String,
    #[prost(bool, tag = "6")]
    pub trace_offcpu: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ContextSwitch {
    #[prost(bool, tag = "1")]
    pub switch_on: bool,
    #[prost(uint64, tag = "2")]
    pub time: u64,
    #[prost(uint32, tag = "3")]
    pub thread_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn negative_symbol_id_survives_the_wire() {
        let entry = CallChainEntry {
            vaddr_in_file: 0x1234,
            file_id: 7,
            symbol_id: -1,
            execution_type: ExecutionType::JitJvmMethod as i32,
        };
        let decoded = CallChainEntry::decode(entry.encode_to_vec().as_slice()).unwrap();
        assert_eq!(entry, decoded);
        assert_eq!(decoded.execution_type(), ExecutionType::JitJvmMethod);
    }

    #[test]
    fn unknown_oneof_member_is_unset() {
        // Field 9, wire type 2 (length-delimited), empty payload.
        let bytes: [u8; 2] = [(9 << 3) | 2, 0];
        let record = Record::decode(bytes.as_slice()).unwrap();
        assert_eq!(record.record_data, None);
    }

    #[test]
    fn oneof_member_decodes() {
        let record = Record::from(RecordData::Lost(LostSituation {
            sample_count: 10,
            lost_count: 2,
        }));
        let decoded = Record::decode(record.encode_to_vec().as_slice()).unwrap();
        assert_eq!(
            decoded.record_data,
            Some(RecordData::Lost(LostSituation {
                sample_count: 10,
                lost_count: 2
            }))
        );
    }
}
