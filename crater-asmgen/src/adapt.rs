//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::{
	category::OperandCategory,
	expand::Permutation,
	spec::{ByteElement, ReturnTemplate},
};

/// The prefix byte selecting one of the two index registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPrefix {
	Ix,
	Iy,
}

impl IndexPrefix {
	/// The prefix a register operand with this value needs, if any.
	pub fn for_register(value: &str) -> Option<Self> {
		if value.starts_with("ix") {
			Some(Self::Ix)
		} else if value.starts_with("iy") {
			Some(Self::Iy)
		} else {
			None
		}
	}

	pub const fn placeholder(&self) -> &'static str {
		match self {
			Self::Ix => "INST_IX_PREFIX",
			Self::Iy => "INST_IY_PREFIX",
		}
	}
}

/// The prefixes triggered by `perm`, in ascending operand position.
pub fn index_prefixes(categories: &[OperandCategory], perm: &Permutation) -> Vec<IndexPrefix> {
	categories
		.iter()
		.zip(perm)
		.filter_map(|(category, value)| match (category, value) {
			(OperandCategory::Register, Some(value)) => IndexPrefix::for_register(value),
			_ => None,
		})
		.collect()
}

/// Prepends each prefix, in the order given, in front of everything built so far.
///
/// A prefix from a later position therefore lands *before* one from an
/// earlier position.
pub fn apply_prefixes(ret: &ReturnTemplate, prefixes: &[IndexPrefix]) -> ReturnTemplate {
	let mut adapted = Vec::with_capacity(ret.len() + prefixes.len());

	adapted.extend(
		prefixes
			.iter()
			.rev()
			.map(|prefix| ByteElement::Placeholder(prefix.placeholder().to_owned())),
	);
	adapted.extend(ret.iter().cloned());

	adapted
}

/// The byte sequence a subcase returns for one concrete permutation.
pub fn adapt_return(
	categories: &[OperandCategory],
	perm: &Permutation,
	ret: &ReturnTemplate,
) -> ReturnTemplate {
	apply_prefixes(ret, &index_prefixes(categories, perm))
}
