// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fixture helpers shared by the integration tests.

#![allow(dead_code)]

use simpleperf_protobuf::{
    CallChainEntry, ContextSwitch, File, LostSituation, MetaInfo, Record, RecordData, Sample,
    Thread,
};
use simpleperf_trace::{TraceVersion, TraceWriter};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn file(id: u32, path: &str, symbols: &[&str]) -> Record {
    Record::from(RecordData::File(File {
        id,
        path: path.to_string(),
        symbol: symbols.iter().map(|s| s.to_string()).collect(),
        mangled_symbol: Vec::new(),
    }))
}

pub fn thread(thread_id: u32, process_id: u32, name: &str) -> Record {
    Record::from(RecordData::Thread(Thread {
        thread_id,
        process_id,
        thread_name: name.to_string(),
    }))
}

/// `callchain` is leaf first, as (file_id, symbol_id) pairs.
pub fn sample(thread_id: u32, time: u64, callchain: &[(u32, i32)]) -> Record {
    Record::from(RecordData::Sample(Sample {
        time,
        thread_id: thread_id as i32,
        callchain: callchain
            .iter()
            .map(|&(file_id, symbol_id)| CallChainEntry {
                vaddr_in_file: 0x1000 + symbol_id.unsigned_abs() as u64,
                file_id,
                symbol_id,
                ..Default::default()
            })
            .collect(),
        event_count: 1,
        ..Default::default()
    }))
}

pub fn lost(sample_count: u64, lost_count: u64) -> Record {
    Record::from(RecordData::Lost(LostSituation {
        sample_count,
        lost_count,
    }))
}

pub fn meta_info(package: &str, event_types: &[&str]) -> Record {
    Record::from(RecordData::MetaInfo(MetaInfo {
        event_type: event_types.iter().map(|s| s.to_string()).collect(),
        app_package_name: package.to_string(),
        ..Default::default()
    }))
}

pub fn context_switch(thread_id: u32) -> Record {
    Record::from(RecordData::ContextSwitch(ContextSwitch {
        switch_on: true,
        time: 1,
        thread_id,
    }))
}

pub fn encode_trace(records: &[Record]) -> Vec<u8> {
    let mut writer = TraceWriter::new(Vec::new(), TraceVersion(1)).expect("header");
    for record in records {
        writer.write_record(record).expect("record");
    }
    writer.finish().expect("terminator")
}

/// Writes `bytes` to a file in a fresh temporary directory. The directory is
/// removed when the returned guard is dropped.
pub fn write_temp_trace(bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("perf.trace");
    let mut file = std::fs::File::create(&path).expect("create trace");
    file.write_all(bytes).expect("write trace");
    (dir, path)
}
