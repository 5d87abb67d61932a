// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the specguard command-line interface.
//!
//! Two subcommands: `scenarios` runs the reference calls and checks each one
//! against its expected outcome, and `inspect` lists the checks registered in
//! the process-wide registry.

pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "specguard",
    about = "Scope-bounded runtime pre/post-condition checks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the reference scenarios and compare each outcome to its expectation
    Scenarios {
        /// Only run calls made inside a validated scope
        #[arg(long, conflicts_with = "direct")]
        validated: bool,

        /// Only run calls made outside any validated scope
        #[arg(long)]
        direct: bool,

        /// Emit observations and the assertion tally as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered checks
    Inspect {
        /// Restrict the listing to one callable (full path, e.g.
        /// `specguard::scenarios::reverse`)
        callable: Option<String>,

        /// Emit entries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Which scenarios the `scenarios` subcommand runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFilter {
    All,
    Validated,
    Direct,
}

impl ScenarioFilter {
    pub fn from_flags(validated: bool, direct: bool) -> Self {
        match (validated, direct) {
            (true, _) => ScenarioFilter::Validated,
            (false, true) => ScenarioFilter::Direct,
            (false, false) => ScenarioFilter::All,
        }
    }

    pub fn admits(self, validated: bool) -> bool {
        match self {
            ScenarioFilter::All => true,
            ScenarioFilter::Validated => validated,
            ScenarioFilter::Direct => !validated,
        }
    }
}
