//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::ops::Range;

use chrono::{DateTime, Utc};
use pest::Parser;
use pest_derive::Parser;

use crate::error::{Marker, TemplateError};

#[derive(Parser)]
#[grammar = "template.pest"]
struct TemplateParser;

/// The three insertion points of a host template.
#[derive(Debug, Clone)]
pub struct Slots<'t> {
	text: &'t str,
	date: Range<usize>,
	instructions: Range<usize>,
	lookup: Range<usize>,
}

fn store(slot: &mut Option<Range<usize>>, marker: Marker, span: pest::Span) -> Result<(), TemplateError> {
	if slot.is_some() {
		return Err(TemplateError::DuplicateMarker(marker));
	}
	*slot = Some(span.start()..span.end());
	Ok(())
}

fn stray_marker(rule: Rule) -> Marker {
	match rule {
		Rule::lookup_start | Rule::lookup_end => Marker::LookupBlock,
		_ => Marker::InstructionBlock,
	}
}

impl<'t> Slots<'t> {
	pub fn locate(text: &'t str) -> Result<Self, TemplateError> {
		let pairs = TemplateParser::parse(Rule::template, text).map_err(Box::new)?;

		let mut date = None;
		let mut instructions = None;
		let mut lookup = None;

		for pair in pairs.flat_map(|template| template.into_inner()) {
			match pair.as_rule() {
				Rule::date_value => store(&mut date, Marker::Date, pair.as_span())?,
				Rule::inst_body => {
					store(&mut instructions, Marker::InstructionBlock, pair.as_span())?
				},
				Rule::lookup_body => store(&mut lookup, Marker::LookupBlock, pair.as_span())?,
				Rule::stray_marker => {
					let line = pair.line_col().0;
					let marker = pair
						.into_inner()
						.next()
						.map_or(Marker::InstructionBlock, |inner| stray_marker(inner.as_rule()));
					return Err(TemplateError::UnmatchedMarker { marker, line });
				},
				// the markers bracketing a matched region
				_ => {},
			}
		}

		Ok(Self {
			text,
			date: date.ok_or(TemplateError::MissingMarker(Marker::Date))?,
			instructions: instructions
				.ok_or(TemplateError::MissingMarker(Marker::InstructionBlock))?,
			lookup: lookup.ok_or(TemplateError::MissingMarker(Marker::LookupBlock))?,
		})
	}

	/// The text currently following the date marker.
	pub fn date_stamp(&self) -> &'t str {
		&self.text[self.date.clone()]
	}

	pub fn instruction_block(&self) -> &'t str {
		&self.text[self.instructions.clone()]
	}

	pub fn lookup_block(&self) -> &'t str {
		&self.text[self.lookup.clone()]
	}

	/// Rebuilds the template with each slot replaced; everything else is copied as is.
	///
	/// A stamp written right after a bare `@AUTOGEN_DATE` is separated from it by one space.
	pub fn patch(&self, date: &str, instructions: &str, lookup: &str) -> String {
		let separated = date.is_empty()
			|| self.text[..self.date.start].ends_with(|c: char| c == ' ' || c == '\t');
		let date = if separated {
			date.to_owned()
		} else {
			format!(" {}", date)
		};

		let mut replacements = [
			(self.date.clone(), date.as_str()),
			(self.instructions.clone(), instructions),
			(self.lookup.clone(), lookup),
		];
		replacements.sort_by_key(|(range, _)| range.start);

		let mut result = String::with_capacity(self.text.len() + instructions.len() + lookup.len());
		let mut cursor = 0;

		for (range, replacement) in replacements {
			result.push_str(&self.text[cursor..range.start]);
			result.push_str(replacement);
			cursor = range.end;
		}
		result.push_str(&self.text[cursor..]);

		result
	}
}

/// Formats a generation time the way `asctime` does, e.g. `Sun Oct 18 17:20:00 2026 UTC`.
pub fn format_stamp(now: DateTime<Utc>) -> String {
	now.format("%a %b %e %H:%M:%S %Y UTC").to_string()
}
