// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;
mod inspect;
mod stats;

use anyhow::Context;
use clap::{command, Arg, ArgAction, ArgMatches, Command};
use config::Config;
use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn input_arg() -> Arg {
    Arg::new("input")
        .short('i')
        .help("the simpleperf trace to read")
        .value_parser(clap::value_parser!(PathBuf))
        .required(true)
}

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .subcommand(
            Command::new("inspect")
                .about("Parses a trace and prints what it contains")
                .arg(input_arg())
                .arg(
                    Arg::new("print-samples")
                        .long("print-samples")
                        .action(ArgAction::SetTrue)
                        .help("verbose printing of the call chains"),
                ),
        )
        .subcommand(
            Command::new("fix")
                .about("Repairs main thread samples detached from the stack root")
                .arg(input_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .help("the path to save the result to, defaults to <input>-fixed")
                        .value_parser(clap::value_parser!(PathBuf))
                        .required(false),
                ),
        )
}

/// `a.trace` becomes `a-fixed.trace`, `a` becomes `a-fixed`.
fn fixed_output_path(input: &Path) -> PathBuf {
    let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push("-fixed");
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    input.with_file_name(name)
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .with_context(|| format!("invalid log level {:?}", config.log_level))?,
        )
        .with_writer(io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    debug!("Logging subsystem enabled");
    Ok(())
}

fn required_path<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .with_context(|| format!("missing argument {id}"))
}

fn run_inspect(matches: &ArgMatches) -> anyhow::Result<()> {
    let input = required_path(matches, "input")?;
    let trace = simpleperf_trace::parse(input)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let mut out = BufWriter::new(io::stdout().lock());
    inspect::print_summary(&mut out, &trace)?;
    if matches.get_flag("print-samples") {
        writeln!(out)?;
        inspect::print_samples(&mut out, &trace)?;
    }
    out.flush()?;
    Ok(())
}

fn run_fix(matches: &ArgMatches) -> anyhow::Result<()> {
    let input = required_path(matches, "input")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| fixed_output_path(input));

    let summary = simpleperf_trace::fix_detached_main_samples(input, &output)
        .with_context(|| format!("failed to fix {}", input.display()))?;
    println!(
        "Fixed {} of {} main thread samples, wrote {}",
        summary.fixed_samples,
        summary.main_thread_samples,
        output.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_logging(&Config::from_env())?;

    match matches.subcommand() {
        Some(("inspect", matches)) => run_inspect(matches),
        Some(("fix", matches)) => run_fix(matches),
        _ => anyhow::bail!("a subcommand is required"),
    }
}
