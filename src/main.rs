// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use specguard::scenarios::{catalog, Observation};
use specguard::{report, CallableId, SpecEntry, SpecRegistry, Tally};

mod cli;
use cli::display::{self, themed, BOLD, DIM};
use cli::{Cli, Commands, ScenarioFilter};

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "SPECGUARD_LOG";

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Scenarios {
            validated,
            direct,
            json,
        } => run_scenarios(ScenarioFilter::from_flags(validated, direct), json),
        Commands::Inspect { callable, json } => inspect(callable.as_deref(), json).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays usable for `--json`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

#[derive(Serialize)]
struct ScenarioReport {
    observations: Vec<Observation>,
    tally: Tally,
    passed: bool,
}

/// Run the reference scenarios. `Ok(false)` when any observation missed its
/// expectation.
fn run_scenarios(filter: ScenarioFilter, json: bool) -> Result<bool> {
    report::take_tally();
    let observations: Vec<Observation> = catalog()
        .iter()
        .filter(|s| filter.admits(s.validated))
        .map(|s| {
            let observation = s.run();
            tracing::info!(
                scenario = observation.name,
                validated = observation.validated,
                passed = observation.passed,
                "scenario finished"
            );
            observation
        })
        .collect();
    let tally = report::take_tally();
    let passed = observations.iter().all(|o| o.passed);

    if json {
        let report = ScenarioReport {
            observations,
            tally,
            passed,
        };
        let text = serde_json::to_string_pretty(&report).context("serializing scenario report")?;
        println!("{}", text);
        return Ok(passed);
    }

    display::section_top("SCENARIOS");
    for observation in &observations {
        display::row(&format!(
            " {} {} {}",
            display::verdict_badge(observation.passed),
            display::mode_label(observation.validated),
            themed(display::BLUE, &[BOLD], observation.name),
        ));
        display::row(&format!(
            "     expected {}",
            display::truncate(&observation.expected, 66)
        ));
        if !observation.passed || observation.expected != observation.observed {
            display::row(&format!(
                "     observed {}",
                display::truncate(&observation.observed, 66)
            ));
        }
    }
    display::section_mid("ASSERTIONS");
    display::row(&format!(" {}", display::tally_line(&tally)));
    display::section_bot();

    Ok(passed)
}

/// Print registered checks, for one callable or for all of them.
fn inspect(callable: Option<&str>, json: bool) -> Result<()> {
    let registry = SpecRegistry::global();
    let ids: Vec<CallableId> = match callable {
        Some(name) => {
            let id = CallableId::new(name);
            if registry.entries(&id).is_empty() {
                bail!("no checks registered for `{}`", name);
            }
            vec![id]
        }
        None => registry.callables(),
    };

    let entries: Vec<SpecEntry> = ids.iter().flat_map(|id| registry.entries(id)).collect();

    if json {
        let text = serde_json::to_string_pretty(&entries).context("serializing registry entries")?;
        println!("{}", text);
        return Ok(());
    }

    for id in &ids {
        display::section_top(id.name());
        for entry in entries.iter().filter(|e| &e.callable == id) {
            display::row(&format!(
                " {} {} {}",
                display::role_label(entry.role),
                display::pad_right(&entry.shape.to_string(), 60),
                themed(display::GRAY, &[DIM], &format!("#{}", entry.seq)),
            ));
        }
        display::section_bot();
    }
    println!("{} checks across {} callables", entries.len(), ids.len());
    Ok(())
}
