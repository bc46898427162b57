// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Parses trace files obtained using simpleperf (`simpleperf report-sample
//! --protobuf`), which have the following format:
//!
//! ```text
//! char magic[10] = "SIMPLEPERF";
//! LittleEndian16(version) = 1;
//! LittleEndian32(record_size_0)
//! Record (having record_size_0 bytes)
//! LittleEndian32(record_size_1)
//! Record (having record_size_1 bytes)
//! ...
//! LittleEndian32(record_size_N)
//! Record (having record_size_N bytes)
//! LittleEndian32(0)
//! ```
//!
//! Each record is a protobuf message from [`simpleperf_protobuf`]. The parser
//! only accumulates what the records say: the file and thread tables, the
//! samples in order, the lost-sample counters and the session's meta info.
//! Resolving symbols or building call trees is left to the consumer.
//!
//! [`fixup`] rewrites a trace to repair main-thread samples whose unwinding
//! stopped short of the stack root.

pub mod buffer;
pub mod call_chain;
pub mod error;
pub mod fixup;
pub mod frame;
pub mod header;
pub mod parser;
pub mod record;
pub mod tags;
pub mod trace;
pub mod writer;

pub use buffer::TraceBuffer;
pub use call_chain::{same_frame, INVALID_SYMBOL_ID};
pub use error::{BufferError, ParseError, ParseErrorKind};
pub use fixup::{fix_detached_main_samples, FixError, FixSummary};
pub use header::{TraceVersion, MAGIC};
pub use parser::{parse, parse_buffer, parse_bytes};
pub use record::{decode_record, TraceRecord, UnrecognizedRecord};
pub use tags::{classify, compare_tags, Tag, TagClass, TagSet};
pub use trace::{ParsedTrace, TraceAccumulator, DATA_APP_DIR};
pub use writer::TraceWriter;
