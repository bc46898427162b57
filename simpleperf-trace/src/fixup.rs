// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Repairs main-thread samples whose call chain was cut short by the
//! unwinder, so that they no longer show up detached from the rest of the
//! main thread's stacks.
//!
//! The main thread is the thread whose id equals its process id. Its stack
//! root is taken from the first main-thread sample. A later main-thread sample
//! that does not end at that root is broken; it gets the root-side frames it
//! is missing appended from the valid samples around it.

use crate::buffer::TraceBuffer;
use crate::call_chain::{same_frame, shared_root_depth};
use crate::error::ParseError;
use crate::frame::Frames;
use crate::header::read_header;
use crate::record::TraceRecord;
use crate::writer::TraceWriter;
use simpleperf_protobuf::{CallChainEntry, Record, RecordData, Sample};
use std::collections::HashMap;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// There must be exactly one thread whose id is its process id.
    #[error("expected exactly one main thread, found {candidates:?}")]
    MainThread { candidates: Vec<u32> },
    #[error("main thread {thread_id} has no sample to take the stack root from")]
    NoMainThreadSample { thread_id: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub main_thread_samples: usize,
    pub fixed_samples: usize,
}

struct MainThreadMetadata {
    thread_id: u32,
    call_stack_root: CallChainEntry,
}

fn is_on_thread(sample: &Sample, thread_id: u32) -> bool {
    u32::try_from(sample.thread_id) == Ok(thread_id)
}

/// Reads `source`, writes the repaired trace to `destination` (replacing it if
/// it exists).
///
/// The output goes to a temporary file in the destination's directory that is
/// renamed over `destination` once complete, so on error `destination` is left
/// as it was.
pub fn fix_detached_main_samples(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<FixSummary, FixError> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    let buffer = TraceBuffer::from_file(source)?;
    let main_thread = read_main_thread_metadata(buffer.clone())?;

    info!("Copying {} to {}", source.display(), destination.display());
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut output = NamedTempFile::new_in(directory)?;
    let summary = fix_with_metadata(buffer, BufWriter::new(output.as_file_mut()), &main_thread)?;
    output.persist(destination).map_err(|err| err.error)?;
    Ok(summary)
}

/// Same as [`fix_detached_main_samples`], over an in-memory trace. Nothing is
/// written to `output` unless the main thread can be identified.
pub fn fix_main_thread_samples<W: Write>(
    buffer: TraceBuffer,
    output: W,
) -> Result<FixSummary, FixError> {
    let main_thread = read_main_thread_metadata(buffer.clone())?;
    fix_with_metadata(buffer, output, &main_thread)
}

fn fix_with_metadata<W: Write>(
    buffer: TraceBuffer,
    output: W,
    main_thread: &MainThreadMetadata,
) -> Result<FixSummary, FixError> {
    debug!(
        thread_id = main_thread.thread_id,
        root_file_id = main_thread.call_stack_root.file_id,
        root_symbol_id = main_thread.call_stack_root.symbol_id,
        "found main thread"
    );
    let summary = copy_fixing_stack_root(buffer, output, main_thread)?;
    info!(
        "Done fixing trace, fixed {} / {} main thread samples",
        summary.fixed_samples, summary.main_thread_samples
    );
    Ok(summary)
}

fn read_main_thread_metadata(mut buffer: TraceBuffer) -> Result<MainThreadMetadata, FixError> {
    read_header(&mut buffer)?;

    let mut threads = HashMap::new();
    // Per thread, the root of its first sample. None if that call chain is
    // empty.
    let mut first_roots: HashMap<i32, Option<CallChainEntry>> = HashMap::new();
    for frame in Frames::new(&mut buffer) {
        match frame?.decode()? {
            TraceRecord::Thread(thread) => {
                threads.insert(thread.thread_id, thread.process_id);
            }
            TraceRecord::Sample(sample) => {
                first_roots
                    .entry(sample.thread_id)
                    .or_insert_with(|| sample.callchain.last().cloned());
            }
            _ => {}
        }
    }

    let mut candidates: Vec<u32> = threads
        .into_iter()
        .filter(|(thread_id, process_id)| thread_id == process_id)
        .map(|(thread_id, _)| thread_id)
        .collect();
    if candidates.len() != 1 {
        candidates.sort_unstable();
        return Err(FixError::MainThread { candidates });
    }
    let thread_id = candidates[0];

    let call_stack_root = i32::try_from(thread_id)
        .ok()
        .and_then(|tid| first_roots.remove(&tid))
        .flatten()
        .ok_or(FixError::NoMainThreadSample { thread_id })?;
    Ok(MainThreadMetadata {
        thread_id,
        call_stack_root,
    })
}

fn write_fixed<W: Write>(
    output: &mut TraceWriter<W>,
    broken: impl Iterator<Item = Sample>,
    shared_call_chain: &[CallChainEntry],
) -> io::Result<()> {
    for mut sample in broken {
        sample.callchain.extend_from_slice(shared_call_chain);
        output.write_record(&Record::from(RecordData::Sample(sample)))?;
    }
    Ok(())
}

fn copy_fixing_stack_root<W: Write>(
    mut buffer: TraceBuffer,
    output: W,
    main_thread: &MainThreadMetadata,
) -> Result<FixSummary, FixError> {
    let version = read_header(&mut buffer)?;
    let mut output = TraceWriter::new(output, version)?;
    let mut summary = FixSummary::default();

    let mut last_valid_sample: Option<Sample> = None;
    let mut broken_samples: Vec<Sample> = Vec::new();
    for frame in Frames::new(&mut buffer) {
        let frame = frame?;
        let sample = match frame.decode()? {
            TraceRecord::Sample(sample) if is_on_thread(&sample, main_thread.thread_id) => sample,
            _ => {
                output.write_frame(&frame.payload)?;
                continue;
            }
        };

        summary.main_thread_samples += 1;
        let reaches_root = sample
            .callchain
            .last()
            .is_some_and(|root| same_frame(root, &main_thread.call_stack_root));
        if !reaches_root {
            broken_samples.push(sample);
            summary.fixed_samples += 1;
            continue;
        }

        if !broken_samples.is_empty() {
            // The frames where the last valid call chain and this one have
            // not diverged yet, leaf first.
            let shared_call_chain: &[CallChainEntry] = match &last_valid_sample {
                Some(last) => {
                    let depth = shared_root_depth(&last.callchain, &sample.callchain);
                    &sample.callchain[sample.callchain.len() - depth..]
                }
                None => &[],
            };
            write_fixed(&mut output, broken_samples.drain(..), shared_call_chain)?;
        }
        output.write_frame(&frame.payload)?;
        last_valid_sample = Some(sample);
    }

    // Trailing broken samples get the whole last valid call chain.
    if !broken_samples.is_empty() {
        let shared_call_chain = last_valid_sample
            .as_ref()
            .map(|sample| sample.callchain.as_slice())
            .unwrap_or_default();
        write_fixed(&mut output, broken_samples.drain(..), shared_call_chain)?;
    }
    output.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TraceVersion;
    use crate::parser::parse_bytes;
    use simpleperf_protobuf::{LostSituation, Thread};

    const MAIN: u32 = 100;
    const WORKER: u32 = 101;

    fn entry(symbol_id: i32) -> CallChainEntry {
        CallChainEntry {
            file_id: 1,
            symbol_id,
            ..Default::default()
        }
    }

    fn thread(thread_id: u32, process_id: u32) -> Record {
        Record::from(RecordData::Thread(Thread {
            thread_id,
            process_id,
            thread_name: format!("t{thread_id}"),
        }))
    }

    /// `symbols` is leaf first.
    fn sample(thread_id: u32, time: u64, symbols: &[i32]) -> Record {
        Record::from(RecordData::Sample(Sample {
            time,
            thread_id: thread_id as i32,
            callchain: symbols.iter().copied().map(entry).collect(),
            ..Default::default()
        }))
    }

    fn trace_of(records: &[Record]) -> TraceBuffer {
        let sample_count = records
            .iter()
            .filter(|r| matches!(r.record_data, Some(RecordData::Sample(_))))
            .count() as u64;
        let mut writer = TraceWriter::new(Vec::new(), TraceVersion(1)).unwrap();
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer
            .write_record(&Record::from(RecordData::Lost(LostSituation {
                sample_count,
                lost_count: 0,
            })))
            .unwrap();
        TraceBuffer::new(writer.finish().unwrap())
    }

    fn symbols_by_time(bytes: Vec<u8>) -> Vec<(u64, Vec<i32>)> {
        let trace = parse_bytes(bytes).unwrap();
        trace
            .samples()
            .iter()
            .map(|s| (s.time, s.callchain.iter().map(|e| e.symbol_id).collect()))
            .collect()
    }

    #[test]
    fn broken_samples_get_the_shared_prefix() {
        // Root is symbol 0, main() is 1.
        let buffer = trace_of(&[
            thread(MAIN, MAIN),
            thread(WORKER, MAIN),
            sample(MAIN, 1, &[5, 2, 1, 0]),
            sample(MAIN, 2, &[9, 8]),
            sample(WORKER, 3, &[7]),
            sample(MAIN, 4, &[8]),
            sample(MAIN, 5, &[6, 3, 1, 0]),
        ]);
        let mut output = Vec::new();
        let summary = fix_main_thread_samples(buffer, &mut output).unwrap();
        assert_eq!(
            summary,
            FixSummary {
                main_thread_samples: 4,
                fixed_samples: 2,
            }
        );

        assert_eq!(
            symbols_by_time(output),
            [
                (1, vec![5, 2, 1, 0]),
                (3, vec![7]),
                (2, vec![9, 8, 1, 0]),
                (4, vec![8, 1, 0]),
                (5, vec![6, 3, 1, 0]),
            ]
        );
    }

    #[test]
    fn trailing_broken_samples_get_the_last_valid_chain() {
        let buffer = trace_of(&[
            thread(MAIN, MAIN),
            sample(MAIN, 1, &[2, 1, 0]),
            sample(MAIN, 2, &[4]),
        ]);
        let mut output = Vec::new();
        let summary = fix_main_thread_samples(buffer, &mut output).unwrap();
        assert_eq!(summary.fixed_samples, 1);
        assert_eq!(
            symbols_by_time(output),
            [(1, vec![2, 1, 0]), (2, vec![4, 2, 1, 0])]
        );
    }

    #[test]
    fn intact_trace_is_copied_verbatim() {
        let buffer = trace_of(&[
            thread(MAIN, MAIN),
            sample(MAIN, 1, &[2, 1, 0]),
            sample(WORKER, 2, &[3]),
            sample(MAIN, 3, &[4, 1, 0]),
        ]);
        let mut output = Vec::new();
        let summary = fix_main_thread_samples(buffer.clone(), &mut output).unwrap();
        assert_eq!(summary.fixed_samples, 0);
        assert_eq!(summary.main_thread_samples, 2);
        let mut input = buffer;
        assert_eq!(input.read_bytes(input.remaining()).unwrap().as_ref(), output);
    }

    #[test]
    fn needs_exactly_one_main_thread() {
        let buffer = trace_of(&[thread(1, 1), thread(2, 2), sample(1, 1, &[0])]);
        assert!(matches!(
            fix_main_thread_samples(buffer, Vec::new()),
            Err(FixError::MainThread { candidates }) if candidates == [1, 2]
        ));

        let buffer = trace_of(&[thread(WORKER, MAIN), sample(WORKER, 1, &[0])]);
        assert!(matches!(
            fix_main_thread_samples(buffer, Vec::new()),
            Err(FixError::MainThread { candidates }) if candidates.is_empty()
        ));
    }

    #[test]
    fn nothing_written_without_a_main_thread() {
        let buffer = trace_of(&[thread(1, 1), thread(2, 2), sample(1, 1, &[0])]);
        let mut output = Vec::new();
        assert!(fix_main_thread_samples(buffer, &mut output).is_err());
        assert!(output.is_empty());
    }

    #[test]
    fn needs_a_main_thread_sample() {
        let buffer = trace_of(&[thread(MAIN, MAIN), sample(WORKER, 1, &[0])]);
        assert!(matches!(
            fix_main_thread_samples(buffer, Vec::new()),
            Err(FixError::NoMainThreadSample { thread_id: MAIN })
        ));
    }

    #[test]
    fn rejects_non_traces() {
        let buffer = TraceBuffer::new(b"NOTATRACE!\x01\x00\x00\x00\x00\x00".to_vec());
        assert!(matches!(
            fix_main_thread_samples(buffer, Vec::new()),
            Err(FixError::Parse(ParseError::MagicMismatch { .. }))
        ));
    }
}
