//! Slug derivation
//!
//! Page slugs derive from the page name: lowercase, non-alphanumerics
//! collapse to single dashes, leading/trailing dashes trimmed. Collisions
//! within a site disambiguate with the smallest `-N` suffix, `N >= 1`.

/// Derive a slug from a display name.
pub fn slugify(name: &str) -> String {
	let mut slug = String::with_capacity(name.len());
	let mut last_dash = true; // suppress a leading dash
	for c in name.chars() {
		if c.is_alphanumeric() {
			slug.extend(c.to_lowercase());
			last_dash = false;
		} else if !last_dash {
			slug.push('-');
			last_dash = true;
		}
	}
	while slug.ends_with('-') {
		slug.pop();
	}
	slug
}

/// Pick the first free slug given the set already taken.
///
/// Returns the base slug untouched when free, otherwise `base-N` with the
/// smallest `N >= 1` that is not taken.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
	if !taken(base) {
		return base.to_string();
	}
	let mut n = 1usize;
	loop {
		let candidate = format!("{base}-{n}");
		if !taken(&candidate) {
			return candidate;
		}
		n += 1;
	}
}
