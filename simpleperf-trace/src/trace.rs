// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;
use crate::header::TraceVersion;
use crate::record::TraceRecord;
use crate::tags::TagSet;
use simpleperf_protobuf::{File, Sample, Thread};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Directory containing files (.art, .odex, .so, .apk) related to apps. Each
/// app's files are located in a subdirectory whose name starts with the app
/// id, e.g. "/data/app/com.google.sample.tunnel-qpKipbnc0pE6uQs6gxAmbQ==".
pub const DATA_APP_DIR: &str = "/data/app";

/// Everything read from one trace.
#[derive(Clone, Debug, Default)]
pub struct ParsedTrace {
    version: TraceVersion,
    files: HashMap<u32, File>,
    threads: HashMap<u32, Thread>,
    samples: Vec<Sample>,
    sample_count: u64,
    lost_sample_count: u64,
    event_types: Vec<String>,
    app_package_name: Option<String>,
    app_data_folder_prefix: Option<String>,
    tags: TagSet,
}

impl ParsedTrace {
    pub fn version(&self) -> TraceVersion {
        self.version
    }

    pub fn files(&self) -> &HashMap<u32, File> {
        &self.files
    }

    pub fn file(&self, id: u32) -> Option<&File> {
        self.files.get(&id)
    }

    pub fn threads(&self) -> &HashMap<u32, Thread> {
        &self.threads
    }

    pub fn thread(&self, thread_id: u32) -> Option<&Thread> {
        self.threads.get(&thread_id)
    }

    /// Samples in the order they were recorded.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples the trace declares, which is also the number of
    /// samples it holds.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Number of samples dropped at capture time.
    pub fn lost_sample_count(&self) -> u64 {
        self.lost_sample_count
    }

    /// Event types (e.g. cpu-cycles, sched:sched_switch) present in the trace.
    pub fn event_types(&self) -> &[String] {
        &self.event_types
    }

    pub fn app_package_name(&self) -> Option<&str> {
        self.app_package_name.as_deref()
    }

    /// Prefix (up to the app name) of the [`DATA_APP_DIR`] subfolder of the
    /// profiled app, e.g. "/data/app/com.google.sample.tunnel".
    pub fn app_data_folder_prefix(&self) -> Option<&str> {
        self.app_data_folder_prefix.as_deref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// For adding tags beyond the ones derived from the file table.
    pub fn tags_mut(&mut self) -> &mut TagSet {
        &mut self.tags
    }
}

/// Builds a [`ParsedTrace`] one record at a time.
#[derive(Debug, Default)]
pub struct TraceAccumulator {
    trace: ParsedTrace,
}

impl TraceAccumulator {
    pub fn new(version: TraceVersion) -> Self {
        Self {
            trace: ParsedTrace {
                version,
                ..Default::default()
            },
        }
    }

    /// Only the state the record targets is touched. Files and threads are
    /// keyed by id and a later record replaces an earlier one with the same
    /// id; a later lost-situation or meta-info record replaces the earlier
    /// one as well.
    pub fn apply(&mut self, record: TraceRecord) {
        let trace = &mut self.trace;
        match record {
            TraceRecord::File(file) => {
                trace.files.insert(file.id, file);
            }
            TraceRecord::Thread(thread) => {
                trace.threads.insert(thread.thread_id, thread);
            }
            TraceRecord::Sample(sample) => trace.samples.push(sample),
            TraceRecord::Lost(lost) => {
                // Only one occurrence is expected.
                trace.sample_count = lost.sample_count;
                trace.lost_sample_count = lost.lost_count;
            }
            TraceRecord::MetaInfo(info) => {
                debug!(
                    app_package_name = %info.app_package_name,
                    event_types = ?info.event_type,
                    "read meta info"
                );
                trace.app_data_folder_prefix =
                    Some(format!("{DATA_APP_DIR}/{}", info.app_package_name));
                trace.app_package_name = Some(info.app_package_name);
                trace.event_types = info.event_type;
            }
            TraceRecord::Unrecognized(kind) => {
                warn!("Unexpected record data type {kind}");
            }
        }
    }

    /// Checks that the samples read match the declared count, and derives the
    /// tag set from the file table.
    ///
    /// Traces carry no tag records. Every non-empty file path becomes a tag,
    /// except that paths under the app's data folder collapse into a single
    /// `"{prefix}*"` tag.
    pub fn finish(self) -> Result<ParsedTrace, ParseError> {
        let mut trace = self.trace;
        let read = trace.samples.len();
        if read as u64 != trace.sample_count {
            return Err(ParseError::SampleCountMismatch {
                declared: trace.sample_count,
                read,
            });
        }

        let prefix = trace.app_data_folder_prefix.as_deref();
        let tags: Vec<String> = trace
            .files
            .values()
            .map(|file| file.path.as_str())
            .filter(|path| !path.is_empty())
            .map(|path| match prefix {
                Some(prefix) if path.starts_with(prefix) => format!("{prefix}*"),
                _ => path.to_string(),
            })
            .collect();
        trace.tags.extend(tags);

        Ok(trace)
    }
}
