//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{path::PathBuf, process::exit};

use chrono::Utc;
use clap::{ArgAction, Parser as ClapParser};
use tracing_subscriber::EnvFilter;

use crater_asmgen::driver::{self, Config, Outcome, Output, DEFAULT_SPEC, DEFAULT_TEMPLATE};

/// Regenerates the instruction parse functions of the assembler.
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// YAML instruction table
	#[arg(short, long, default_value = DEFAULT_SPEC)]
	spec: PathBuf,

	/// C template containing the @AUTOGEN markers
	#[arg(short, long, default_value = DEFAULT_TEMPLATE)]
	template: PathBuf,

	/// Write the result here instead of back into the template
	#[arg(short, long, conflicts_with_all = ["stdout", "check"])]
	output: Option<PathBuf>,

	/// Print the result instead of writing it
	#[arg(long, conflicts_with = "check")]
	stdout: bool,

	/// Exit with an error if the template is not up to date
	#[arg(long)]
	check: bool,

	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

impl Args {
	fn config(&self) -> Config {
		let output = if self.check {
			Output::Check
		} else if self.stdout {
			Output::Stdout
		} else {
			match &self.output {
				Some(path) => Output::File(path.clone()),
				None => Output::InPlace,
			}
		};

		Config {
			spec: self.spec.clone(),
			template: self.template.clone(),
			output,
		}
	}

	fn log_level(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace",
		}
	}
}

fn main() {
	let cli = Args::parse();

	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	match driver::run(&cli.config(), Utc::now()) {
		Ok(Outcome::Stale) => {
			eprintln!(
				"\"{}\" is out of date; rerun without --check",
				cli.template.display()
			);
			exit(1);
		},
		Ok(_) => {},
		Err(err) => {
			eprintln!("Error: {:#}", err);
			exit(1);
		},
	}
}
