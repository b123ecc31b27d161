//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! The instruction table, both as written in YAML and in its validated form.
//!
//! Everything the renderers consume goes through [`InstructionSet::from_raw`]
//! first, so a malformed table fails before a single line is rendered.

use std::{collections::BTreeMap, fmt::Display};

use litrs::IntegerLit;
use serde::Deserialize;

use crate::{
	category::OperandCategory,
	error::{Error, Result},
	expand::{expand_pattern, ConditionPattern},
};

/// The most operands a case may take; `INST_TAKES_ARGS` receives exactly this many masks.
pub const MAX_OPERANDS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
	Integer(i64),
	Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInstruction {
	pub args: bool,
	#[serde(rename = "return", default)]
	pub ret: Option<Vec<RawToken>>,
	#[serde(default)]
	pub cases: Option<Vec<RawCase>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCase {
	#[serde(rename = "type")]
	pub types: Vec<String>,
	pub cases: Vec<RawSubcase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubcase {
	pub cond: Vec<RawToken>,
	#[serde(rename = "return")]
	pub ret: Vec<RawToken>,
}

/// One element of an emitted byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteElement {
	Literal(u8),
	/// Emitted verbatim; whatever it names is resolved by the consuming C code.
	Placeholder(String),
}

pub type ReturnTemplate = Vec<ByteElement>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcase {
	pub conditions: Vec<ConditionPattern>,
	pub ret: ReturnTemplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
	pub categories: Vec<OperandCategory>,
	pub subcases: Vec<Subcase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionBody {
	Return(ReturnTemplate),
	Cases(Vec<Case>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSpec {
	pub mnemonic: String,
	pub takes_args: bool,
	pub body: InstructionBody,
}

/// All instructions of a table, keyed (and therefore ordered) by mnemonic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionSet {
	instructions: BTreeMap<String, InstructionSpec>,
}

impl Display for ByteElement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Literal(byte) => write!(f, "0x{:02X}", byte),
			Self::Placeholder(token) => write!(f, "{}", token),
		}
	}
}

impl RawToken {
	fn into_text(self) -> String {
		match self {
			Self::Integer(value) => value.to_string(),
			Self::Text(text) => text,
		}
	}
}

fn parse_byte(mnemonic: &str, token: RawToken) -> Result<ByteElement> {
	let (value, text) = match token {
		RawToken::Integer(value) => (u64::try_from(value).ok(), value.to_string()),
		RawToken::Text(text) => {
			let parsed = IntegerLit::parse(text.as_str()).map(|lit| lit.value::<u64>());

			match parsed {
				// too wide for u64 is still a literal, just not a byte
				Ok(value) => (value, text),
				Err(_) => return Ok(ByteElement::Placeholder(text)),
			}
		},
	};

	match value.and_then(|value| u8::try_from(value).ok()) {
		Some(byte) => Ok(ByteElement::Literal(byte)),
		None => Err(Error::ByteOutOfRange {
			mnemonic: mnemonic.to_owned(),
			value: text,
		}),
	}
}

fn parse_return(mnemonic: &str, tokens: Vec<RawToken>) -> Result<ReturnTemplate> {
	tokens
		.into_iter()
		.map(|token| parse_byte(mnemonic, token))
		.collect()
}

fn parse_case(mnemonic: &str, raw: RawCase) -> Result<Case> {
	if raw.types.len() > MAX_OPERANDS {
		return Err(Error::TooManyOperands {
			mnemonic: mnemonic.to_owned(),
			found: raw.types.len(),
			max: MAX_OPERANDS,
		});
	}

	let categories = raw
		.types
		.iter()
		.map(|token| {
			OperandCategory::from_token(token).ok_or_else(|| Error::UnknownCategory {
				mnemonic: mnemonic.to_owned(),
				token: token.clone(),
			})
		})
		.collect::<Result<Vec<_>>>()?;

	let subcases = raw
		.cases
		.into_iter()
		.map(|subcase| {
			if subcase.cond.len() != categories.len() {
				return Err(Error::ConditionArity {
					mnemonic: mnemonic.to_owned(),
					expected: categories.len(),
					found: subcase.cond.len(),
				});
			}

			let conditions = subcase
				.cond
				.into_iter()
				.zip(&categories)
				.map(|(token, &category)| {
					let text = token.into_text();
					expand_pattern(category, &text).ok_or_else(|| Error::MalformedCondition {
						mnemonic: mnemonic.to_owned(),
						pattern: text,
					})
				})
				.collect::<Result<Vec<_>>>()?;

			Ok(Subcase {
				conditions,
				ret: parse_return(mnemonic, subcase.ret)?,
			})
		})
		.collect::<Result<Vec<_>>>()?;

	Ok(Case {
		categories,
		subcases,
	})
}

impl InstructionSpec {
	pub fn from_raw(mnemonic: &str, raw: RawInstruction) -> Result<Self> {
		let body = match (raw.ret, raw.cases) {
			(Some(ret), None) => InstructionBody::Return(parse_return(mnemonic, ret)?),
			(None, Some(cases)) => InstructionBody::Cases(
				cases
					.into_iter()
					.map(|case| parse_case(mnemonic, case))
					.collect::<Result<Vec<_>>>()?,
			),
			(None, None) => {
				return Err(Error::MissingBody {
					mnemonic: mnemonic.to_owned(),
				})
			},
			(Some(_), Some(_)) => {
				return Err(Error::AmbiguousBody {
					mnemonic: mnemonic.to_owned(),
				})
			},
		};

		Ok(Self {
			mnemonic: mnemonic.to_owned(),
			takes_args: raw.args,
			body,
		})
	}

	/// The cases of this instruction; a fixed-return instruction has none.
	pub fn cases(&self) -> &[Case] {
		match &self.body {
			InstructionBody::Cases(cases) => cases,
			InstructionBody::Return(_) => &[],
		}
	}
}

impl InstructionSet {
	pub fn from_yaml(text: &str) -> Result<Self> {
		let raw: BTreeMap<String, RawInstruction> = serde_yaml::from_str(text)?;
		Self::from_raw(raw)
	}

	pub fn from_raw(raw: BTreeMap<String, RawInstruction>) -> Result<Self> {
		let instructions = raw
			.into_iter()
			.map(|(mnemonic, instruction)| {
				let spec = InstructionSpec::from_raw(&mnemonic, instruction)?;
				Ok((mnemonic, spec))
			})
			.collect::<Result<BTreeMap<_, _>>>()?;

		Ok(Self { instructions })
	}

	/// Iterates the instructions in lexicographic order of their mnemonics.
	pub fn iter(&self) -> impl Iterator<Item = &InstructionSpec> {
		self.instructions.values()
	}

	pub fn mnemonics(&self) -> impl Iterator<Item = &str> {
		self.instructions.keys().map(String::as_str)
	}

	pub fn get(&self, mnemonic: &str) -> Option<&InstructionSpec> {
		self.instructions.get(mnemonic)
	}

	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}
}
