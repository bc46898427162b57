// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Median of a sorted slice.
fn median(values: &[usize]) -> Option<f64> {
    let len = values.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    if len % 2 == 0 {
        Some((values[mid - 1] + values[mid]) as f64 / 2.0)
    } else {
        Some(values[mid] as f64)
    }
}

/// Finds the Q1, Q2, Q3 values. Assumes the slice is sorted.
///
/// Q1 and Q3 are the medians of the lower and upper halves, excluding the
/// middle value when there is an odd number of values.
pub fn quartiles(values: &[usize]) -> Option<[f64; 3]> {
    if values.len() < 4 {
        return None;
    }
    let half = values.len() / 2;
    let q1 = median(&values[..half])?;
    let q2 = median(values)?;
    let q3 = median(&values[values.len() - half..])?;
    Some([q1, q2, q3])
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthStats {
    pub min: usize,
    pub quartiles: [f64; 3],
    pub max: usize,
}

impl DepthStats {
    /// No point computing quartiles for fewer than 4 samples.
    pub fn new(mut depths: Vec<usize>) -> Option<Self> {
        depths.sort_unstable();
        Some(Self {
            quartiles: quartiles(&depths)?,
            min: *depths.first()?,
            max: *depths.last()?,
        })
    }
}
