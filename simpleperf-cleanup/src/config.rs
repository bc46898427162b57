// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

pub const LOG_LEVEL_VAR: &str = "SIMPLEPERF_LOG_LEVEL";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// An `EnvFilter` directive, e.g. "debug" or "simpleperf_trace=trace".
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Config {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|val| val.trim().to_lowercase())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Config { log_level }
    }
}
