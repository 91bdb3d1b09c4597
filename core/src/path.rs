//! Path splitting for directory traversal.
//!
//! Pure string manipulation: no filesystem access happens here. Output is
//! owned (`String`/`Vec`), so callers simply let it drop — there is no
//! `malloc`/`free` pairing to track as there was in the original.

/// A path split into its slash-delimited segments, in traversal order.
///
/// Mirrors the original's `strlen`-advance walk: for `/dir/file.txt` this
/// yields `"dir"`, then `"file.txt"`, then a final empty string that
/// terminates the walk. A bare `/` yields only the empty string.
pub struct Segments {
	rest: Vec<String>,
	pos: usize,
}

impl Segments {
	/// Returns the next segment, or `None` once the terminating empty
	/// segment has already been consumed.
	pub fn next(&mut self) -> Option<&str> {
		let seg = self.rest.get(self.pos)?;
		self.pos += 1;
		Some(seg.as_str())
	}
}

/// Splits `path` into segments with the leading slash consumed.
pub fn delimit(path: &str) -> Segments {
	let trimmed = path.strip_prefix('/').unwrap_or(path);
	let mut rest: Vec<String> = if trimmed.is_empty() {
		Vec::new()
	} else {
		trimmed.split('/').map(str::to_owned).collect()
	};
	rest.push(String::new());
	Segments { rest, pos: 0 }
}

/// Returns the longest prefix of `path` ending before the final slash,
/// excluding a trailing slash.
///
/// `/a/b` -> `/a`. `/a/b/` -> `/a`. `/a` -> `""`.
pub fn parent_of(path: &str) -> String {
	let trimmed = path.strip_suffix('/').unwrap_or(path);
	match trimmed.rfind('/') {
		Some(idx) => trimmed[..idx].to_owned(),
		None => String::new(),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn collect(mut segs: Segments) -> Vec<String> {
		let mut out = Vec::new();
		while let Some(s) = segs.next() {
			out.push(s.to_owned());
		}
		out
	}

	#[test]
	fn delimit_root() {
		assert_eq!(collect(delimit("/")), vec![""]);
	}

	#[test]
	fn delimit_nested() {
		assert_eq!(
			collect(delimit("/dir/file.txt")),
			vec!["dir", "file.txt", ""]
		);
	}

	#[test]
	fn delimit_single_component() {
		assert_eq!(collect(delimit("/f")), vec!["f", ""]);
	}

	#[test]
	fn parent_of_nested() {
		assert_eq!(parent_of("/a/b"), "/a");
	}

	#[test]
	fn parent_of_trailing_slash() {
		assert_eq!(parent_of("/a/b/"), "/a");
	}

	#[test]
	fn parent_of_top_level() {
		assert_eq!(parent_of("/a"), "");
	}
}
