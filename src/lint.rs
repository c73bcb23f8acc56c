//! Forbidden-import lint for keeping legacy crates out of a source tree.
//!
//! The rule is name-agnostic: configure it with the crates to ban and scan a
//! directory. Comments and string literals are stripped before matching, so
//! only real `use` and `extern crate` declarations count as offenders.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::AppError;

/// A source location that imports a banned crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offender {
    /// The offending source file.
    pub file: PathBuf,
    /// 1-based line of the import declaration.
    pub line: usize,
}

/// A configurable forbidden-import rule over a tree of Rust sources.
#[derive(Debug, Clone)]
pub struct ForbiddenImports {
    banned: Vec<String>,
}

impl ForbiddenImports {
    /// Create a rule banning the given crate names.
    ///
    /// A banned name matches `use name::...`, `use name;`, grouped and
    /// multi-line imports, and `extern crate name;`, with any visibility.
    pub fn new<I, S>(banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { banned: banned.into_iter().map(Into::into).collect() }
    }

    /// Scan all `*.rs` files under `root`, returning every banned import.
    ///
    /// Offenders are ordered by file name, then by line.
    pub fn scan(&self, root: &Path) -> Result<Vec<Offender>, AppError> {
        let use_re = Regex::new(r"\buse\s+(?:::)?([A-Za-z_][A-Za-z0-9_]*)")?;
        let extern_re = Regex::new(r"\bextern\s+crate\s+([A-Za-z_][A-Za-z0-9_]*)")?;

        let mut offenders = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file()
                || entry.path().extension().is_none_or(|ext| ext != "rs")
            {
                continue;
            }
            let source = fs::read_to_string(entry.path())?;
            self.scan_source(&source, entry.path(), &[&use_re, &extern_re], &mut offenders);
        }
        Ok(offenders)
    }

    fn scan_source(
        &self,
        source: &str,
        file: &Path,
        patterns: &[&Regex],
        offenders: &mut Vec<Offender>,
    ) {
        let stripped = strip_comments_and_strings(source);
        let mut lines = Vec::new();
        for pattern in patterns {
            for capture in pattern.captures_iter(&stripped) {
                let (segment, matched) = match (capture.get(1), capture.get(0)) {
                    (Some(segment), Some(matched)) => (segment, matched),
                    _ => continue,
                };
                if self.banned.iter().any(|name| name == segment.as_str()) {
                    lines.push(line_of(&stripped, matched.start()));
                }
            }
        }
        lines.sort_unstable();
        offenders.extend(lines.into_iter().map(|line| Offender { file: file.to_path_buf(), line }));
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    1 + text[..offset].bytes().filter(|byte| *byte == b'\n').count()
}

/// Replace comments and string/char literals with blanks, keeping newlines so
/// byte offsets still map to the original line numbers.
fn strip_comments_and_strings(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let mut depth = 1;
                blank(&mut out, '/');
                blank(&mut out, '*');
                i += 2;
                while i < chars.len() && depth > 0 {
                    if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                        depth += 1;
                        blank(&mut out, '/');
                        blank(&mut out, '*');
                        i += 2;
                    } else if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        depth -= 1;
                        blank(&mut out, '*');
                        blank(&mut out, '/');
                        i += 2;
                    } else {
                        blank(&mut out, chars[i]);
                        i += 1;
                    }
                }
            }
            '"' => i = skip_string(&chars, i, &mut out),
            'r' | 'b' if !prev_is_ident(&chars, i) => {
                if let Some((prefix, hashes)) = raw_prefix_len(&chars, i) {
                    if prefix == 0 {
                        // b"..." byte string without a raw marker
                        blank(&mut out, chars[i]);
                        i = skip_string(&chars, i + 1, &mut out);
                    } else {
                        i = skip_raw_string(&chars, i, prefix, hashes, &mut out);
                    }
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            '\'' => {
                if chars.get(i + 1) == Some(&'\\')
                    || (chars.get(i + 2) == Some(&'\'') && chars.get(i + 1) != Some(&'\''))
                {
                    i = skip_char_literal(&chars, i, &mut out);
                } else {
                    // a lifetime, not a literal
                    out.push('\'');
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn prev_is_ident(chars: &[char], i: usize) -> bool {
    i > 0 && (chars[i - 1].is_alphanumeric() || chars[i - 1] == '_')
}

/// For `r`, `rb`, `br`, `b` starting a raw string at `i`, the length of the
/// marker before any `#`s, plus the hash count. `None` when no raw string or
/// byte string starts here.
fn raw_prefix_len(chars: &[char], i: usize) -> Option<(usize, usize)> {
    let mut j = i;
    let mut saw_r = false;
    while j < chars.len() && (chars[j] == 'r' || chars[j] == 'b') && j - i < 2 {
        saw_r |= chars[j] == 'r';
        j += 1;
    }
    if !saw_r {
        // plain byte string b"..."
        return if j > i && chars.get(j) == Some(&'"') { Some((0, 0)) } else { None };
    }
    let mut hashes = 0;
    while chars.get(j + hashes) == Some(&'#') {
        hashes += 1;
    }
    if chars.get(j + hashes) == Some(&'"') { Some((j - i, hashes)) } else { None }
}

fn skip_raw_string(
    chars: &[char],
    start: usize,
    prefix: usize,
    hashes: usize,
    out: &mut String,
) -> usize {
    let mut i = start;
    for _ in 0..prefix + hashes + 1 {
        blank(out, chars[i]);
        i += 1;
    }
    while i < chars.len() {
        if chars[i] == '"' && (1..=hashes).all(|k| chars.get(i + k) == Some(&'#')) {
            for _ in 0..hashes + 1 {
                blank(out, chars[i]);
                i += 1;
            }
            break;
        }
        blank(out, chars[i]);
        i += 1;
    }
    i
}

/// Skip a quoted string starting at the `"` at index `i`, handling escapes.
fn skip_string(chars: &[char], i: usize, out: &mut String) -> usize {
    let mut i = i;
    blank(out, chars[i]);
    i += 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                blank(out, chars[i]);
                if let Some(next) = chars.get(i + 1) {
                    blank(out, *next);
                }
                i += 2;
            }
            '"' => {
                blank(out, chars[i]);
                i += 1;
                break;
            }
            c => {
                blank(out, c);
                i += 1;
            }
        }
    }
    i
}

fn skip_char_literal(chars: &[char], i: usize, out: &mut String) -> usize {
    let mut i = i;
    blank(out, chars[i]);
    i += 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                blank(out, chars[i]);
                if let Some(next) = chars.get(i + 1) {
                    blank(out, *next);
                }
                i += 2;
            }
            '\'' => {
                blank(out, chars[i]);
                i += 1;
                break;
            }
            c => {
                blank(out, c);
                i += 1;
            }
        }
    }
    i
}

/// Write a blank in place of a stripped char, preserving newlines.
fn blank(out: &mut String, c: char) {
    out.push(if c == '\n' { '\n' } else { ' ' });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offenders(source: &str, banned: &[&str]) -> Vec<usize> {
        let rule = ForbiddenImports::new(banned.iter().copied());
        let use_re = Regex::new(r"\buse\s+(?:::)?([A-Za-z_][A-Za-z0-9_]*)").unwrap();
        let extern_re = Regex::new(r"\bextern\s+crate\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
        let mut found = Vec::new();
        rule.scan_source(source, Path::new("test.rs"), &[&use_re, &extern_re], &mut found);
        found.into_iter().map(|offender| offender.line).collect()
    }

    #[test]
    fn test_plain_use_is_flagged() {
        let lines = offenders("mod a;\nuse legacy_registry::Config;\n", &["legacy_registry"]);
        assert_eq!(lines, vec![2]);
    }

    #[test]
    fn test_submodule_path_is_flagged() {
        let lines = offenders("use legacy_registry::probe::Library;\n", &["legacy_registry"]);
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn test_extern_crate_is_flagged() {
        let lines = offenders("//! docs\n\nextern crate legacy_registry;\n", &["legacy_registry"]);
        assert_eq!(lines, vec![3]);
    }

    #[test]
    fn test_pub_use_and_grouped_imports_are_flagged() {
        let source = "pub use legacy_registry::Config;\nuse legacy_registry::{\n    probe,\n    Error,\n};\n";
        let lines = offenders(source, &["legacy_registry"]);
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_other_crates_are_not_flagged() {
        let lines = offenders("use serde::Deserialize;\nuse std::fs;\n", &["legacy_registry"]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_comments_and_strings_are_not_offenders() {
        let source = concat!(
            "// use legacy_registry::Config;\n",
            "/* use legacy_registry; */\n",
            "fn f() -> &'static str {\n",
            "    \"use legacy_registry::Config;\"\n",
            "}\n",
        );
        let lines = offenders(source, &["legacy_registry"]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_raw_strings_are_not_offenders() {
        let source = "fn f() -> &'static str {\n    r#\"use legacy_registry;\"#\n}\n";
        let lines = offenders(source, &["legacy_registry"]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_char_literals_and_lifetimes_do_not_confuse_stripping() {
        let source = "fn f<'a>(c: char) -> bool {\n    c == '\"'\n}\nuse legacy_registry;\n";
        let lines = offenders(source, &["legacy_registry"]);
        assert_eq!(lines, vec![4]);
    }

    #[test]
    fn test_banned_name_must_match_whole_segment() {
        let source = "use legacy_registry_ext::Config;\nuse my_legacy_registry::X;\n";
        let lines = offenders(source, &["legacy_registry"]);
        assert!(lines.is_empty());
    }

    #[test]
    fn test_stripping_preserves_line_numbers() {
        let source = "/* multi\nline\ncomment */\nuse legacy_registry;\n";
        let lines = offenders(source, &["legacy_registry"]);
        assert_eq!(lines, vec![4]);
    }
}
