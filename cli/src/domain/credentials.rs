//! Storage credentials and the shell-profile line format they persist in.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::fmt;

/// Access key id for the object-storage bucket.
pub const ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
/// Secret key paired with `ACCESS_KEY_ID`.
pub const SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
/// Bucket the workers write to.
pub const BUCKET_NAME: &str = "R2_BUCKET_NAME";

/// Every credential a run needs, in prompt order.
pub const REQUIRED_CREDENTIALS: &[&str] = &[ACCESS_KEY_ID, SECRET_ACCESS_KEY, BUCKET_NAME];

/// Whether a credential should be collected with hidden input.
#[must_use]
pub fn is_secret(name: &str) -> bool {
    name != BUCKET_NAME
}

/// Render one profile line: `export NAME="value"`.
///
/// Characters with meaning inside a double-quoted shell string are escaped.
#[must_use]
pub fn format_export(name: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("export {name}=\"{escaped}\"")
}

/// Parse a single `export NAME="value"` (or `export NAME=value`) line.
///
/// A trailing `;` and an unquoted `# comment` after the value are accepted,
/// as a shell would. Anything else after the value rejects the line.
#[must_use]
pub fn parse_export(line: &str) -> Option<(String, String)> {
    let (name, raw) = export_target(line)?;
    let (value, rest) = if let Some(quoted) = raw.strip_prefix('"') {
        let end = closing_double_quote(quoted)?;
        (unescape_double_quoted(&quoted[..end]), &quoted[end + 1..])
    } else if let Some(quoted) = raw.strip_prefix('\'') {
        let end = quoted.find('\'')?;
        (quoted[..end].to_string(), &quoted[end + 1..])
    } else {
        let end = raw
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(raw.len());
        (raw[..end].to_string(), &raw[end..])
    };
    if !is_line_tail(rest) {
        return None;
    }
    Some((name.to_string(), value))
}

/// Split `export NAME=rest` into its name and the raw text after `=`.
fn export_target(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix("export ")?.trim_start();
    let (name, raw) = rest.split_once('=')?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, raw))
}

/// Byte offset of the first unescaped `"` in `s`.
fn closing_double_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// What may follow a value on the same line: nothing, a comment, or `;`.
fn is_line_tail(rest: &str) -> bool {
    if rest.starts_with(|c: char| !c.is_whitespace() && c != ';') {
        return false;
    }
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(';').map_or(rest, str::trim_start);
    rest.is_empty() || rest.starts_with('#')
}

fn unescape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                if !matches!(next, '\\' | '"' | '$' | '`') {
                    out.push('\\');
                }
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Exported variables of a profile, plus the `export` lines naming a
/// variable that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileScan {
    /// Later lines win, as in a shell.
    pub entries: BTreeMap<String, String>,
    /// `(name, line)` for every unreadable `export NAME=...` line.
    pub unreadable: Vec<(String, String)>,
}

impl ProfileScan {
    /// First unreadable line that assigns one of `names`.
    #[must_use]
    pub fn unreadable_for(&self, names: &[&str]) -> Option<&(String, String)> {
        self.unreadable
            .iter()
            .find(|(name, _)| names.contains(&name.as_str()))
    }
}

/// Scan every line of a profile.
#[must_use]
pub fn parse_profile(content: &str) -> ProfileScan {
    let mut scan = ProfileScan::default();
    for line in content.lines() {
        if let Some((name, value)) = parse_export(line) {
            scan.entries.insert(name, value);
        } else if let Some((name, _)) = export_target(line) {
            scan.unreadable.push((name.to_string(), line.trim().to_string()));
        }
    }
    scan
}

// ── Resolved credentials ──────────────────────────────────────────────────────

/// Resolved credential values keyed by name. `Debug` never prints values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Names from `required` with no value yet, in `required` order.
    /// An empty value counts as unset.
    #[must_use]
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.get(name).is_none_or(|v| v.trim().is_empty()))
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Name/value pairs in the shape `CommandRunner::run_with_env` expects.
    #[must_use]
    pub fn env_pairs(&self) -> Vec<(&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "<redacted>")))
            .finish()
    }
}
