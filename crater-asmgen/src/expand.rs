//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::category::OperandCategory;

pub const WILDCARD: &str = "_";

lazy_static! {
	/// Half-register aliases and the index-register halves they stand for.
	static ref REGISTER_ALIASES: HashMap<&'static str, [&'static str; 2]> =
		HashMap::from([("ih", ["ixh", "iyh"]), ("il", ["ixl", "iyl"])]);
}

/// A condition on one operand position, with alternations and aliases already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionPattern {
	Wildcard,
	/// Never empty; declaration order, without duplicates.
	Values(Vec<String>),
}

/// One concrete value per operand position; `None` is a wildcard position.
pub type Permutation<'a> = Vec<Option<&'a str>>;

impl ConditionPattern {
	fn width(&self) -> usize {
		match self {
			Self::Wildcard => 1,
			Self::Values(values) => values.len(),
		}
	}

	fn value(&self, idx: usize) -> Option<&str> {
		match self {
			Self::Wildcard => None,
			Self::Values(values) => Some(values[idx].as_str()),
		}
	}
}

/// Expands a condition token of a position declared with `category`.
///
/// Returns `None` when the token is malformed: empty, containing an empty
/// alternative, or mixing the wildcard into an alternation.
pub fn expand_pattern(category: OperandCategory, token: &str) -> Option<ConditionPattern> {
	if token == WILDCARD {
		return Some(ConditionPattern::Wildcard);
	}

	let mut values: Vec<String> = Vec::new();

	for alternative in token.split('|') {
		if alternative.is_empty() || alternative == WILDCARD {
			return None;
		}

		let expanded: &[&str] = match REGISTER_ALIASES.get(alternative) {
			Some(halves) if category == OperandCategory::Register => halves,
			_ => std::slice::from_ref(&alternative),
		};

		for value in expanded {
			if !values.iter().any(|existing| existing == value) {
				values.push(value.to_string());
			}
		}
	}

	Some(ConditionPattern::Values(values))
}

/// Lazily walks the cartesian product of a subcase's patterns, rightmost position fastest.
#[derive(Debug, Clone)]
pub struct Permutations<'a> {
	patterns: &'a [ConditionPattern],
	indices: Vec<usize>,
	done: bool,
}

pub fn permutations(patterns: &[ConditionPattern]) -> Permutations<'_> {
	Permutations {
		patterns,
		indices: vec![0; patterns.len()],
		done: patterns.iter().any(|pattern| pattern.width() == 0),
	}
}

/// How many permutations [`permutations`] yields for `patterns`.
pub fn permutation_count(patterns: &[ConditionPattern]) -> usize {
	patterns.iter().map(ConditionPattern::width).product()
}

impl<'a> Iterator for Permutations<'a> {
	type Item = Permutation<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		let patterns = self.patterns;
		let current = patterns
			.iter()
			.zip(&self.indices)
			.map(|(pattern, &idx)| pattern.value(idx))
			.collect();

		// odometer step
		self.done = true;
		for pos in (0..patterns.len()).rev() {
			self.indices[pos] += 1;
			if self.indices[pos] < patterns[pos].width() {
				self.done = false;
				break;
			}
			self.indices[pos] = 0;
		}

		Some(current)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn values(list: &[&str]) -> ConditionPattern {
		ConditionPattern::Values(list.iter().map(|value| value.to_string()).collect())
	}

	#[test]
	fn literals_and_wildcards() {
		assert_eq!(
			expand_pattern(OperandCategory::Register, "a"),
			Some(values(&["a"]))
		);
		assert_eq!(
			expand_pattern(OperandCategory::Immediate, "_"),
			Some(ConditionPattern::Wildcard)
		);
	}

	#[test]
	fn aliases_expand_for_registers() {
		assert_eq!(
			expand_pattern(OperandCategory::Register, "ih"),
			Some(values(&["ixh", "iyh"]))
		);
		assert_eq!(
			expand_pattern(OperandCategory::Register, "il"),
			Some(values(&["ixl", "iyl"]))
		);
		assert_eq!(
			expand_pattern(OperandCategory::Register, "a|ih|il"),
			Some(values(&["a", "ixh", "iyh", "ixl", "iyl"]))
		);
		assert_eq!(
			expand_pattern(OperandCategory::Immediate, "ih"),
			Some(values(&["ih"]))
		);
	}

	#[test]
	fn duplicate_alternatives_collapse() {
		assert_eq!(
			expand_pattern(OperandCategory::Register, "ixh|ih"),
			Some(values(&["ixh", "iyh"]))
		);
	}

	#[test]
	fn malformed_patterns() {
		for token in ["", "|", "a|", "|b", "a||b", "a|_"] {
			assert_eq!(expand_pattern(OperandCategory::Register, token), None, "{token:?}");
		}
	}

	#[test]
	fn product_is_rightmost_fastest() {
		let patterns = [values(&["a", "b"]), ConditionPattern::Wildcard, values(&["x", "y"])];
		let all: Vec<_> = permutations(&patterns).collect();

		assert_eq!(
			all,
			vec![
				vec![Some("a"), None, Some("x")],
				vec![Some("a"), None, Some("y")],
				vec![Some("b"), None, Some("x")],
				vec![Some("b"), None, Some("y")],
			]
		);
		assert_eq!(permutation_count(&patterns), all.len());
	}

	#[test]
	fn alternation_with_wildcard_yields_two() {
		let patterns = [
			expand_pattern(OperandCategory::Register, "a|b").unwrap(),
			expand_pattern(OperandCategory::Register, "_").unwrap(),
		];
		assert_eq!(permutations(&patterns).count(), 2);
	}

	#[test]
	fn empty_subcase_has_one_permutation() {
		let all: Vec<_> = permutations(&[]).collect();
		assert_eq!(all, vec![Vec::<Option<&str>>::new()]);
	}

	#[test]
	fn iteration_restarts() {
		let patterns = [values(&["ixh", "iyh"]), values(&["ixl", "iyl"])];
		let iter = permutations(&patterns);
		let first: Vec<_> = iter.clone().collect();
		let second: Vec<_> = iter.collect();

		assert_eq!(first.len(), 4);
		assert_eq!(first, second);
	}
}
