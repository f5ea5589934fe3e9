//! Minimal INI reader for `.dotfilesrc` files.
use std::path::Path;

use crate::error::ConfigError;

/// A `[header]` section and its `key = value` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvSection {
    /// The section header without brackets.
    pub header: String,
    /// Key-value entries in file order.
    pub entries: Vec<(String, String)>,
}

/// Parse an INI file into key-value sections.
///
/// A missing file yields no sections.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn parse_kv_sections(path: &Path) -> Result<Vec<KvSection>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&content, &path.display().to_string())
}

/// Parse key-value INI content from a string.
///
/// Lines starting with `#` or `;` are comments, and inline comments
/// (` #` or `\t#`) are stripped from values. Both `=` and `:` separate keys
/// from values.
///
/// # Examples
///
/// ```
/// use dotfiles::config::ini::parse_kv_sections_from_str;
///
/// let sections = parse_kv_sections_from_str(
///     "[dotfiles]\nrepository = ~/src/dotfiles # mine\ndot: false\n"
/// ).unwrap();
/// assert_eq!(sections[0].header, "dotfiles");
/// assert_eq!(
///     sections[0].entries,
///     vec![
///         ("repository".to_string(), "~/src/dotfiles".to_string()),
///         ("dot".to_string(), "false".to_string()),
///     ]
/// );
/// ```
///
/// # Errors
///
/// Returns an error if a line is neither a header nor a `key = value` pair,
/// or if an entry appears before the first header.
pub fn parse_kv_sections_from_str(content: &str) -> Result<Vec<KvSection>, ConfigError> {
    parse(content, "<string>")
}

fn parse(content: &str, file: &str) -> Result<Vec<KvSection>, ConfigError> {
    let mut sections = Vec::new();
    let mut current: Option<KvSection> = None;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let syntax_error = |what: &str| ConfigError::InvalidSyntax {
            file: file.to_string(),
            message: format!("{what} at line {}: {trimmed}", line_num + 1),
        };

        if let Some(header) = parse_header(trimmed) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(KvSection {
                header,
                entries: Vec::new(),
            });
        } else if let Some(ref mut section) = current {
            let (key, value) = parse_kv_line(trimmed).ok_or_else(|| syntax_error("invalid entry"))?;
            section.entries.push((key, value));
        } else {
            return Err(syntax_error("entry outside of section"));
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }

    Ok(sections)
}

fn parse_header(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

/// Split on the first `=` or `:`, whichever comes first.
fn parse_kv_line(line: &str) -> Option<(String, String)> {
    let idx = line.find(['=', ':'])?;
    let key = line.get(..idx)?.trim();
    let value = line.get(idx + 1..)?.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_inline_comment(value).to_string()))
}

fn strip_inline_comment(value: &str) -> &str {
    value
        .find(" #")
        .or_else(|| value.find("\t#"))
        .and_then(|idx| value.get(..idx))
        .map_or(value, str::trim_end)
}
