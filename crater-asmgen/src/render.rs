//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Turns validated instructions into the C parse functions and lookup table
//! consumed by the assembler's `INST_*` macros.
//!
//! Rendering happens in two steps: the instruction is first lowered into a
//! small tree of nodes ([`InstructionFunction`], [`CaseGuard`], [`Branch`]),
//! which is then printed through its [`Display`] implementation.

use std::fmt::{self, Display, Write};

use tracing::debug;

use crate::{
	adapt::adapt_return,
	category::{CategoryMask, OperandCategory},
	expand::permutations,
	resolve::arg_masks,
	spec::{Case, InstructionBody, InstructionSet, InstructionSpec, ReturnTemplate, MAX_OPERANDS},
};

const TAB: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnNode(pub ReturnTemplate);

/// A test of one operand's value; wildcard positions never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCheck {
	pub pos: usize,
	pub category: OperandCategory,
	pub value: String,
}

/// "If these checks hold, return these bytes." No checks means an unconditional return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
	pub checks: Vec<ValueCheck>,
	pub ret: ReturnNode,
}

/// Matches the operand count and categories of one case, then tries its branches in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseGuard {
	pub categories: Vec<OperandCategory>,
	pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
	NoArgs,
	Args([CategoryMask; MAX_OPERANDS]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionBody {
	Fixed(ReturnNode),
	Cases(Vec<CaseGuard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFunction {
	pub mnemonic: String,
	pub precondition: Precondition,
	pub body: FunctionBody,
}

/// Accumulates newline-separated, indented lines.
struct Lines<'a, 'b> {
	f: &'a mut fmt::Formatter<'b>,
	first: bool,
}

impl<'a, 'b> Lines<'a, 'b> {
	fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
		Self { f, first: true }
	}

	fn line(&mut self, depth: usize, text: impl Display) -> fmt::Result {
		if !self.first {
			self.f.write_char('\n')?;
		}
		self.first = false;

		for _ in 0..depth {
			self.f.write_str(TAB)?;
		}
		write!(self.f, "{}", text)
	}
}

impl Display for ReturnNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "INST_RETURN({}", self.0.len())?;
		for element in &self.0 {
			write!(f, ", {}", element)?;
		}
		write!(f, ")")
	}
}

impl Display for ValueCheck {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.category.value_check(self.pos, &self.value))
	}
}

impl Display for CaseGuard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut test = format!("INST_NARGS == {}", self.categories.len());
		for (pos, category) in self.categories.iter().enumerate() {
			write!(test, " && INST_TYPE({}) == {}", pos, category.c_name())?;
		}

		let mut lines = Lines::new(f);
		lines.line(1, format_args!("if ({}) {{", test))?;

		for branch in &self.branches {
			if branch.checks.is_empty() {
				lines.line(2, &branch.ret)?;
				continue;
			}

			let checks = branch
				.checks
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join(" && ");
			lines.line(2, format_args!("if ({})", checks))?;
			lines.line(3, &branch.ret)?;
		}

		lines.line(2, "INST_ERROR(ARG_VALUE)")?;
		lines.line(1, "}")
	}
}

impl Display for InstructionFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut lines = Lines::new(f);
		lines.line(0, format_args!("INST_FUNC({})", self.mnemonic))?;
		lines.line(0, "{")?;

		match &self.precondition {
			Precondition::NoArgs => lines.line(1, "INST_TAKES_NO_ARGS")?,
			Precondition::Args(masks) => {
				lines.line(1, "INST_TAKES_ARGS(")?;
				for (pos, mask) in masks.iter().enumerate() {
					let separator = if pos + 1 == masks.len() { "" } else { "," };
					lines.line(2, format_args!("{}{}", mask, separator))?;
				}
				lines.line(1, ")")?;
			},
		}

		match &self.body {
			FunctionBody::Fixed(ret) => lines.line(1, ret)?,
			FunctionBody::Cases(guards) => {
				for guard in guards {
					lines.line(0, guard)?;
				}
				lines.line(1, "INST_ERROR(ARG_TYPE)")?;
			},
		}

		lines.line(0, "}")
	}
}

/// Lowers one case: every permutation of every subcase becomes a branch, in declaration order.
pub fn render_case(case: &Case) -> CaseGuard {
	let mut branches = Vec::new();

	for subcase in &case.subcases {
		for perm in permutations(&subcase.conditions) {
			let checks = case
				.categories
				.iter()
				.zip(&perm)
				.enumerate()
				.filter_map(|(pos, (&category, value))| {
					value.map(|value| ValueCheck {
						pos,
						category,
						value: value.to_owned(),
					})
				})
				.collect();

			branches.push(Branch {
				checks,
				ret: ReturnNode(adapt_return(&case.categories, &perm, &subcase.ret)),
			});
		}
	}

	CaseGuard {
		categories: case.categories.clone(),
		branches,
	}
}

pub fn render_instruction(instr: &InstructionSpec) -> InstructionFunction {
	let precondition = if instr.takes_args {
		Precondition::Args(arg_masks(instr))
	} else {
		Precondition::NoArgs
	};

	let body = match &instr.body {
		InstructionBody::Return(ret) => FunctionBody::Fixed(ReturnNode(ret.clone())),
		InstructionBody::Cases(cases) => FunctionBody::Cases(cases.iter().map(render_case).collect()),
	};

	InstructionFunction {
		mnemonic: instr.mnemonic.clone(),
		precondition,
		body,
	}
}

/// Every parse function, ordered by mnemonic and separated by a blank line.
pub fn instruction_block(set: &InstructionSet) -> String {
	set.iter()
		.map(|instr| {
			let function = render_instruction(instr);
			if let FunctionBody::Cases(guards) = &function.body {
				debug!(
					mnemonic = %instr.mnemonic,
					cases = guards.len(),
					branches = guards.iter().map(|guard| guard.branches.len()).sum::<usize>(),
					"rendered instruction"
				);
			} else {
				debug!(mnemonic = %instr.mnemonic, "rendered fixed instruction");
			}
			function.to_string()
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}

/// The dispatch table entries, in the same order as [`instruction_block`].
pub fn lookup_block(set: &InstructionSet) -> String {
	set.mnemonics()
		.map(|mnemonic| format!("{}HANDLE({})", TAB, mnemonic))
		.collect::<Vec<_>>()
		.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::spec::ByteElement;

	fn load(yaml: &str) -> InstructionSet {
		InstructionSet::from_yaml(yaml).unwrap()
	}

	#[test]
	fn fixed_return_without_args() {
		let set = load("nop: {args: false, return: [0x00]}");

		assert_eq!(
			instruction_block(&set),
			"INST_FUNC(nop)\n{\n    INST_TAKES_NO_ARGS\n    INST_RETURN(1, 0x00)\n}"
		);
		assert_eq!(lookup_block(&set), "    HANDLE(nop)");
	}

	#[test]
	fn alternation_renders_one_branch_per_value() {
		let set = load(
			"
inc:
  args: true
  cases:
    - type: [register]
      cases:
        - cond: [b|c]
          return: [0x04]
",
		);

		let expected = "\
INST_FUNC(inc)
{
    INST_TAKES_ARGS(
        AT_REGISTER,
        AT_NONE,
        AT_NONE
    )
    if (INST_NARGS == 1 && INST_TYPE(0) == AT_REGISTER) {
        if (INST_REG(0) == REG_B)
            INST_RETURN(1, 0x04)
        if (INST_REG(0) == REG_C)
            INST_RETURN(1, 0x04)
        INST_ERROR(ARG_VALUE)
    }
    INST_ERROR(ARG_TYPE)
}";
		assert_eq!(instruction_block(&set), expected);
	}

	#[test]
	fn wildcards_emit_no_comparison() {
		let set = load(
			"
ld:
  args: true
  cases:
    - type: [register, immediate]
      cases:
        - cond: [ih, _]
          return: [0x26, INST_IMM(1).uval]
        - cond: [_, _]
          return: [0x00]
",
		);
		let function = render_instruction(set.get("ld").unwrap());
		let FunctionBody::Cases(guards) = &function.body else {
			panic!("expected cases");
		};
		let branches = &guards[0].branches;

		assert_eq!(branches.len(), 3);
		assert_eq!(
			branches[0].checks,
			vec![ValueCheck {
				pos: 0,
				category: OperandCategory::Register,
				value: "ixh".to_owned(),
			}]
		);
		assert_eq!(
			branches[1].ret,
			ReturnNode(vec![
				ByteElement::Placeholder("INST_IY_PREFIX".to_owned()),
				ByteElement::Literal(0x26),
				ByteElement::Placeholder("INST_IMM(1).uval".to_owned()),
			])
		);
		assert!(branches[2].checks.is_empty());

		let text = function.to_string();
		assert!(text.contains(
			"        if (INST_REG(0) == REG_IXH)\n            INST_RETURN(3, INST_IX_PREFIX, 0x26, INST_IMM(1).uval)\n"
		));
		assert!(text.contains("        INST_RETURN(1, 0x00)\n        INST_ERROR(ARG_VALUE)\n"));
	}

	#[test]
	fn two_prefixed_positions_keep_prepend_order() {
		let set = load(
			"
ld:
  args: true
  cases:
    - type: [register, register]
      cases:
        - cond: [ixh, iyl]
          return: [0x65]
",
		);
		let text = instruction_block(&set);

		assert!(text.contains("INST_RETURN(3, INST_IY_PREFIX, INST_IX_PREFIX, 0x65)"));
	}

	#[test]
	fn zero_operand_case() {
		let set = load(
			"
ret:
  args: true
  cases:
    - type: []
      cases: [{cond: [], return: [0xC9]}]
    - type: [condition]
      cases: [{cond: [nz], return: [0xC0]}]
",
		);
		let text = instruction_block(&set);

		assert!(text.contains(
			"    if (INST_NARGS == 0) {\n        INST_RETURN(1, 0xC9)\n        INST_ERROR(ARG_VALUE)\n    }"
		));
		assert!(text.contains("        AT_CONDITION|AT_OPTIONAL,\n"));
	}

	#[test]
	fn blocks_are_sorted_by_mnemonic() {
		let set = load(
			"
xor: {args: false, return: [0xAF]}
adc: {args: false, return: [0x8F]}
cp: {args: false, return: [0xBF]}
",
		);
		let block = instruction_block(&set);
		let positions: Vec<_> = ["INST_FUNC(adc)", "INST_FUNC(cp)", "INST_FUNC(xor)"]
			.iter()
			.map(|needle| block.find(needle).unwrap())
			.collect();

		assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
		assert!(block.contains("}\n\nINST_FUNC(cp)"));
		assert_eq!(
			lookup_block(&set),
			"    HANDLE(adc)\n    HANDLE(cp)\n    HANDLE(xor)"
		);
	}
}
