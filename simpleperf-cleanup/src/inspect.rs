// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::stats::DepthStats;
use simpleperf_protobuf::{CallChainEntry, Sample};
use simpleperf_trace::ParsedTrace;
use std::io::{self, Write};

/// "symbol (path)", or the address in the file when the symbol is unknown.
pub fn describe_frame(trace: &ParsedTrace, entry: &CallChainEntry) -> String {
    let Some(file) = trace.file(entry.file_id) else {
        return format!("{:#x} (unknown file {})", entry.vaddr_in_file, entry.file_id);
    };
    let symbol = usize::try_from(entry.symbol_id)
        .ok()
        .and_then(|index| file.symbol.get(index));
    match symbol {
        Some(symbol) => format!("{symbol} ({})", file.path),
        None => format!("{:#x} ({})", entry.vaddr_in_file, file.path),
    }
}

fn describe_thread(trace: &ParsedTrace, sample: &Sample) -> String {
    let name = u32::try_from(sample.thread_id)
        .ok()
        .and_then(|tid| trace.thread(tid))
        .map(|thread| thread.thread_name.as_str())
        .unwrap_or("?");
    format!("{name} ({})", sample.thread_id)
}

pub fn print_summary<W: Write>(out: &mut W, trace: &ParsedTrace) -> io::Result<()> {
    writeln!(out, "Trace version: {}", trace.version())?;
    writeln!(
        out,
        "Number of samples: {} ({} lost).",
        trace.sample_count(),
        trace.lost_sample_count()
    )?;
    writeln!(
        out,
        "Files: {}, threads: {}.",
        trace.files().len(),
        trace.threads().len()
    )?;
    if !trace.event_types().is_empty() {
        writeln!(out, "Event types: {}", trace.event_types().join(", "))?;
    }
    if let (Some(package), Some(prefix)) = (trace.app_package_name(), trace.app_data_folder_prefix())
    {
        writeln!(out, "App package: {package} (files under {prefix})")?;
    }
    if !trace.tags().is_empty() {
        writeln!(out, "Tags:")?;
        for tag in trace.tags() {
            writeln!(out, "  {tag}")?;
        }
    }

    let depths = trace.samples().iter().map(|s| s.callchain.len()).collect();
    if let Some(DepthStats {
        min,
        quartiles: [q1, q2, q3],
        max,
    }) = DepthStats::new(depths)
    {
        writeln!(out, "Min stack depth is {min}.")?;
        writeln!(out, "Q1 = {q1}, Q2 = {q2}, Q3 = {q3}.")?;
        writeln!(out, "Max stack depth is {max}.")?;
    }
    Ok(())
}

/// Prints each sample's call chain, leaf first.
pub fn print_samples<W: Write>(out: &mut W, trace: &ParsedTrace) -> io::Result<()> {
    for sample in trace.samples() {
        writeln!(
            out,
            "{} on {}:",
            sample.time,
            describe_thread(trace, sample)
        )?;
        for entry in &sample.callchain {
            writeln!(out, "  {}", describe_frame(trace, entry))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
