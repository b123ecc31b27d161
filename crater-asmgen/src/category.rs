//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{collections::HashMap, fmt::Display};

use bitflags::bitflags;
use lazy_static::lazy_static;

/// The runtime class of a supplied operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandCategory {
	Register,
	Immediate,
	Indirect,
	Indexed,
	Condition,
	Port,
}

bitflags! {
	/// The categories an operand position accepts, as passed to `INST_TAKES_ARGS`.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct CategoryMask: u8 {
		const REGISTER = 1 << 0;
		const IMMEDIATE = 1 << 1;
		const INDIRECT = 1 << 2;
		const INDEXED = 1 << 3;
		const CONDITION = 1 << 4;
		const PORT = 1 << 5;
		const OPTIONAL = 1 << 6;
	}
}

lazy_static! {
	static ref CATEGORY_TOKENS: HashMap<&'static str, OperandCategory> = OperandCategory::ALL
		.iter()
		.map(|&category| (category.token(), category))
		.collect();
}

impl OperandCategory {
	pub const ALL: [Self; 6] = [
		Self::Register,
		Self::Immediate,
		Self::Indirect,
		Self::Indexed,
		Self::Condition,
		Self::Port,
	];

	/// Looks up a category by the token the instruction table uses for it.
	pub fn from_token(token: &str) -> Option<Self> {
		CATEGORY_TOKENS.get(token).copied()
	}

	pub const fn token(&self) -> &'static str {
		match self {
			Self::Register => "register",
			Self::Immediate => "immediate",
			Self::Indirect => "indirect",
			Self::Indexed => "indexed",
			Self::Condition => "condition",
			Self::Port => "port",
		}
	}

	pub const fn c_name(&self) -> &'static str {
		match self {
			Self::Register => "AT_REGISTER",
			Self::Immediate => "AT_IMMEDIATE",
			Self::Indirect => "AT_INDIRECT",
			Self::Indexed => "AT_INDEXED",
			Self::Condition => "AT_CONDITION",
			Self::Port => "AT_PORT",
		}
	}

	pub const fn flag(&self) -> CategoryMask {
		match self {
			Self::Register => CategoryMask::REGISTER,
			Self::Immediate => CategoryMask::IMMEDIATE,
			Self::Indirect => CategoryMask::INDIRECT,
			Self::Indexed => CategoryMask::INDEXED,
			Self::Condition => CategoryMask::CONDITION,
			Self::Port => CategoryMask::PORT,
		}
	}

	/// Everything a position declared with this category must accept at parse time.
	///
	/// Indexed addressing is a refinement of indirect addressing, so the
	/// operand parser has to be allowed to produce either.
	pub fn accepted(&self) -> CategoryMask {
		match self {
			Self::Indexed => CategoryMask::INDEXED | CategoryMask::INDIRECT,
			_ => self.flag(),
		}
	}

	/// Renders the C expression that tests operand `pos` against `value`.
	pub fn value_check(&self, pos: usize, value: &str) -> String {
		let upper = value.to_uppercase();

		match self {
			Self::Register => format!("INST_REG({}) == REG_{}", pos, upper),
			Self::Immediate => format!("INST_IMM({}).mask & IMM_{}", pos, upper),
			Self::Condition => format!("INST_COND({}) == COND_{}", pos, upper),
			Self::Indexed => format!("INST_INDEX({}).reg == REG_{}", pos, upper),
			Self::Indirect => addressed_check("INST_INDIRECT", "addr", pos, value),
			Self::Port => addressed_check("INST_PORT", "port", pos, value),
		}
	}
}

fn addressed_check(accessor: &str, field: &str, pos: usize, value: &str) -> String {
	match value {
		"reg" => format!("{}({}).type == AT_REGISTER", accessor, pos),
		"imm" => format!("{}({}).type == AT_IMMEDIATE", accessor, pos),
		_ => format!(
			"({0}({1}).type == AT_REGISTER && {0}({1}).{2}.reg == REG_{3})",
			accessor,
			pos,
			field,
			value.to_uppercase()
		),
	}
}

impl Display for OperandCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.token())
	}
}

impl Display for CategoryMask {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_empty() {
			return write!(f, "AT_NONE");
		}

		let names = OperandCategory::ALL
			.iter()
			.filter(|category| self.contains(category.flag()))
			.map(|category| category.c_name())
			.chain(self.contains(CategoryMask::OPTIONAL).then_some("AT_OPTIONAL"));

		for (i, name) in names.enumerate() {
			if i != 0 {
				write!(f, "|")?;
			}
			write!(f, "{}", name)?;
		}

		Ok(())
	}
}
