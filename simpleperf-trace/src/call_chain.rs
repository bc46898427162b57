// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use simpleperf_protobuf::CallChainEntry;

/// When the name of a function (symbol) is not found in the symbol table, the
/// symbol_id field is set to -1.
pub const INVALID_SYMBOL_ID: i32 = -1;

/// Whether two call-chain entries are the same frame.
///
/// Entries must come from the same file and have the same symbol id. If the
/// symbol is invalid, only the address within the file can tell frames apart.
/// This differs from the derived `PartialEq`, which compares every field.
pub fn same_frame(a: &CallChainEntry, b: &CallChainEntry) -> bool {
    if a.file_id != b.file_id || a.symbol_id != b.symbol_id {
        return false;
    }
    a.symbol_id != INVALID_SYMBOL_ID || a.vaddr_in_file == b.vaddr_in_file
}

/// Number of frames, counted from the root, that two leaf-first call chains
/// have in common.
pub fn shared_root_depth(a: &[CallChainEntry], b: &[CallChainEntry]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(a, b)| same_frame(a, b))
        .count()
}
