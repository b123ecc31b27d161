//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Generates the assembler's instruction parse functions from a YAML table.
//!
//! The table maps each mnemonic to either a fixed byte sequence or a list of
//! operand cases. Each case is rendered into a C guard over the operand
//! count and categories, holding one `if` per concrete permutation of its
//! subcase conditions. The rendered blocks are spliced into a host template
//! at fixed markers.

pub mod adapt;
pub mod category;
pub mod driver;
pub mod error;
pub mod expand;
pub mod render;
pub mod resolve;
pub mod spec;
pub mod template;

pub use error::{Error, Marker, Result, TemplateError};
pub use spec::InstructionSet;

use template::Slots;

/// The two generated blocks, before they are spliced into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
	pub instructions: String,
	pub lookup: String,
}

pub fn render(set: &InstructionSet) -> Rendered {
	Rendered {
		instructions: render::instruction_block(set),
		lookup: render::lookup_block(set),
	}
}

/// Renders `set` into `template`.
///
/// `stamp` replaces the text after the date marker; `None` keeps whatever
/// is there. The template is checked before anything is rendered.
pub fn process(template: &str, set: &InstructionSet, stamp: Option<&str>) -> Result<String> {
	let slots = Slots::locate(template)?;
	let rendered = render(set);

	Ok(slots.patch(
		stamp.unwrap_or(slots.date_stamp()),
		&rendered.instructions,
		&rendered.lookup,
	))
}
