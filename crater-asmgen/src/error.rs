//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use thiserror::Error;

use crate::template::Rule;

/// One of the three fixed regions of the host template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	Date,
	InstructionBlock,
	LookupBlock,
}

impl Display for Marker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Date => write!(f, "@AUTOGEN_DATE"),
			Self::InstructionBlock => write!(f, "@AUTOGEN_INST_BLOCK"),
			Self::LookupBlock => write!(f, "@AUTOGEN_LOOKUP_BLOCK"),
		}
	}
}

#[derive(Debug, Error)]
pub enum TemplateError {
	#[error("template is missing the {0} marker")]
	MissingMarker(Marker),
	#[error("template contains the {0} marker more than once")]
	DuplicateMarker(Marker),
	#[error("unmatched {marker} marker on line {line}")]
	UnmatchedMarker { marker: Marker, line: usize },
	#[error("failed to scan template:\n{0}")]
	Syntax(#[from] Box<pest::error::Error<Rule>>),
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("missing return or case block for \"{mnemonic}\" instruction")]
	MissingBody { mnemonic: String },

	#[error("instruction \"{mnemonic}\" has both a return and a case block")]
	AmbiguousBody { mnemonic: String },

	#[error("unknown operand category \"{token}\" in \"{mnemonic}\" instruction")]
	UnknownCategory { mnemonic: String, token: String },

	#[error("malformed condition \"{pattern}\" in \"{mnemonic}\" instruction")]
	MalformedCondition { mnemonic: String, pattern: String },

	#[error(
		"subcase of \"{mnemonic}\" instruction has {found} conditions, but its case takes {expected} operands"
	)]
	ConditionArity {
		mnemonic: String,
		expected: usize,
		found: usize,
	},

	#[error("case of \"{mnemonic}\" instruction takes {found} operands (at most {max} are supported)")]
	TooManyOperands {
		mnemonic: String,
		found: usize,
		max: usize,
	},

	#[error("byte {value} of \"{mnemonic}\" instruction is out of range")]
	ByteOutOfRange { mnemonic: String, value: String },

	#[error("failed to parse instruction table: {0}")]
	Yaml(#[from] serde_yaml::Error),

	#[error(transparent)]
	Template(#[from] TemplateError),
}

pub type Result<T> = std::result::Result<T, Error>;
