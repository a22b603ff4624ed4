//! Dotted/bracketed path grammar
//!
//! Paths address into JSON values: `user.name`, `items[0].price`,
//! `data['key.with.dots']`. Segments are bare identifiers, `[n]` integer
//! indexes, and `['key']` / `["key"]` quoted field lookups.

use serde_json::Value as JsonValue;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
	/// Field lookup on a mapping
	Field(String),
	/// Array index
	Index(usize),
}

/// Parse a path expression into segments.
///
/// Returns `None` on malformed input (empty expression, unterminated
/// bracket, bad index literal). The grammar:
///
/// ```text
/// path    := segment ( '.' ident | bracket )*
/// segment := ident | bracket
/// bracket := '[' digits ']' | '[' quote chars quote ']'
/// ```
pub fn parse_path(expr: &str) -> Option<Vec<PathSegment>> {
	let expr = expr.trim();
	if expr.is_empty() {
		return None;
	}

	let mut segments = Vec::new();
	let chars: Vec<char> = expr.chars().collect();
	let mut i = 0;

	while i < chars.len() {
		match chars[i] {
			'.' => {
				// A dot must be followed by an identifier and may not lead.
				if segments.is_empty() {
					return None;
				}
				i += 1;
				let ident = take_ident(&chars, &mut i)?;
				segments.push(PathSegment::Field(ident));
			}
			'[' => {
				i += 1;
				segments.push(take_bracket(&chars, &mut i)?);
			}
			_ => {
				if !segments.is_empty() {
					return None;
				}
				let ident = take_ident(&chars, &mut i)?;
				segments.push(PathSegment::Field(ident));
			}
		}
	}

	Some(segments)
}

fn take_ident(chars: &[char], i: &mut usize) -> Option<String> {
	let start = *i;
	while *i < chars.len() && (chars[*i].is_alphanumeric() || chars[*i] == '_' || chars[*i] == '-')
	{
		*i += 1;
	}
	if *i == start {
		return None;
	}
	Some(chars[start..*i].iter().collect())
}

fn take_bracket(chars: &[char], i: &mut usize) -> Option<PathSegment> {
	match chars.get(*i)? {
		quote @ ('\'' | '"') => {
			let quote = *quote;
			*i += 1;
			let start = *i;
			while *i < chars.len() && chars[*i] != quote {
				*i += 1;
			}
			if *i >= chars.len() {
				return None;
			}
			let key: String = chars[start..*i].iter().collect();
			*i += 1; // closing quote
			if chars.get(*i) != Some(&']') {
				return None;
			}
			*i += 1;
			Some(PathSegment::Field(key))
		}
		c if c.is_ascii_digit() => {
			let start = *i;
			while *i < chars.len() && chars[*i].is_ascii_digit() {
				*i += 1;
			}
			if chars.get(*i) != Some(&']') {
				return None;
			}
			let index: usize = chars[start..*i].iter().collect::<String>().parse().ok()?;
			*i += 1;
			Some(PathSegment::Index(index))
		}
		_ => None,
	}
}

/// Navigate `value` along `segments`.
///
/// Returns `None` when a segment does not apply: field lookup on a
/// non-object, index into a non-array or past its end, or any step landing
/// on JSON null.
pub fn navigate<'a>(value: &'a JsonValue, segments: &[PathSegment]) -> Option<&'a JsonValue> {
	let mut current = value;
	for segment in segments {
		current = match segment {
			PathSegment::Field(name) => current.as_object()?.get(name)?,
			PathSegment::Index(i) => current.as_array()?.get(*i)?,
		};
	}
	if current.is_null() { None } else { Some(current) }
}

/// Extract the value at `path` from `value`: parse + navigate in one step.
///
/// This is the context-free form used by data-source field mapping.
pub fn extract<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
	navigate(value, &parse_path(path)?)
}
