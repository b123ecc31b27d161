//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{process, spec::InstructionSet, template::format_stamp};

pub const DEFAULT_SPEC: &str = "src/assembler/instructions.yml";
pub const DEFAULT_TEMPLATE: &str = "src/assembler/instructions.inc.c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
	/// Overwrite the template with the patched text.
	InPlace,
	File(PathBuf),
	Stdout,
	/// Only compare; the date stamp is left out of the comparison.
	Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub spec: PathBuf,
	pub template: PathBuf,
	pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Written(PathBuf),
	Printed,
	UpToDate,
	Stale,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			spec: PathBuf::from(DEFAULT_SPEC),
			template: PathBuf::from(DEFAULT_TEMPLATE),
			output: Output::InPlace,
		}
	}
}

/// Runs one generation. Nothing is written unless every step succeeds.
pub fn run(config: &Config, now: DateTime<Utc>) -> Result<Outcome> {
	let yaml = fs::read_to_string(&config.spec)
		.with_context(|| format!("failed to read \"{}\"", config.spec.display()))?;
	let set = InstructionSet::from_yaml(&yaml)
		.with_context(|| format!("invalid instruction table \"{}\"", config.spec.display()))?;

	let template = fs::read_to_string(&config.template)
		.with_context(|| format!("failed to read \"{}\"", config.template.display()))?;

	let stamp = format_stamp(now);
	let stamp = match config.output {
		Output::Check => None,
		_ => Some(stamp.as_str()),
	};
	let result = process(&template, &set, stamp)
		.with_context(|| format!("failed to patch \"{}\"", config.template.display()))?;

	info!(instructions = set.len(), "rendered instruction table");

	let destination = match &config.output {
		Output::Check if result == template => return Ok(Outcome::UpToDate),
		Output::Check => {
			warn!(template = %config.template.display(), "generated code is out of date");
			return Ok(Outcome::Stale);
		},
		Output::Stdout => {
			print!("{}", result);
			return Ok(Outcome::Printed);
		},
		Output::InPlace => &config.template,
		Output::File(path) => path,
	};

	fs::write(destination, result)
		.with_context(|| format!("failed to write \"{}\"", destination.display()))?;
	info!(output = %destination.display(), "wrote generated code");

	Ok(Outcome::Written(destination.clone()))
}
