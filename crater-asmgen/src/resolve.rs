//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::{
	category::CategoryMask,
	spec::{InstructionSpec, MAX_OPERANDS},
};

/// The categories the operand parser may accept at position `pos`.
///
/// A position some case omits is marked optional, unless no case uses it
/// at all; then the mask is empty (`AT_NONE`).
pub fn arg_mask(instr: &InstructionSpec, pos: usize) -> CategoryMask {
	let mut mask = CategoryMask::empty();
	let mut optional = false;

	for case in instr.cases() {
		match case.categories.get(pos) {
			Some(category) => mask |= category.accepted(),
			None => optional = true,
		}
	}

	if !mask.is_empty() && optional {
		mask |= CategoryMask::OPTIONAL;
	}

	mask
}

/// The masks for every position `INST_TAKES_ARGS` receives.
pub fn arg_masks(instr: &InstructionSpec) -> [CategoryMask; MAX_OPERANDS] {
	let mut masks = [CategoryMask::empty(); MAX_OPERANDS];

	for (pos, mask) in masks.iter_mut().enumerate() {
		*mask = arg_mask(instr, pos);
	}

	masks
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::spec::InstructionSet;

	fn instruction(yaml: &str) -> InstructionSpec {
		InstructionSet::from_yaml(yaml)
			.unwrap()
			.iter()
			.next()
			.unwrap()
			.clone()
	}

	#[test]
	fn union_across_cases() {
		let jp = instruction(
			"
jp:
  args: true
  cases:
    - type: [immediate]
      cases: [{cond: [_], return: [0xC3]}]
    - type: [condition, immediate]
      cases: [{cond: [nz, _], return: [0xC2]}]
    - type: [indexed]
      cases: [{cond: [ix], return: [0xE9]}]
",
		);

		assert_eq!(
			arg_mask(&jp, 0),
			CategoryMask::IMMEDIATE
				| CategoryMask::CONDITION
				| CategoryMask::INDEXED
				| CategoryMask::INDIRECT
		);
		assert_eq!(
			arg_mask(&jp, 1),
			CategoryMask::IMMEDIATE | CategoryMask::OPTIONAL
		);
		assert_eq!(arg_mask(&jp, 2), CategoryMask::empty());
		assert_eq!(
			arg_masks(&jp).map(|mask| mask.to_string()),
			[
				"AT_IMMEDIATE|AT_INDIRECT|AT_INDEXED|AT_CONDITION",
				"AT_IMMEDIATE|AT_OPTIONAL",
				"AT_NONE"
			]
		);
	}

	#[test]
	fn fixed_return_accepts_nothing() {
		let nop = instruction("nop: {args: false, return: [0x00]}");
		assert_eq!(arg_masks(&nop), [CategoryMask::empty(); MAX_OPERANDS]);
	}

	#[test]
	fn position_shared_by_all_cases_is_required() {
		let inc = instruction(
			"
inc:
  args: true
  cases:
    - type: [register]
      cases: [{cond: [a], return: [0x3C]}]
    - type: [indirect]
      cases: [{cond: [hl], return: [0x34]}]
",
		);
		assert_eq!(
			arg_mask(&inc, 0),
			CategoryMask::REGISTER | CategoryMask::INDIRECT
		);
	}
}
