//! I choose the base IRI of the generated rules.
//!
//! Candidates are, by decreasing priority,
//! an explicitly requested base, the `base` declared in the document,
//! and a configured default.
use crate::logger::Logger;
use lazy_static::lazy_static;
use oxiri::Iri;
use regex::Regex;
use thiserror::Error;

/// The base IRI used when no other (valid) base is available.
pub const DEFAULT_BASE: &str = "http://mapping.example.com/";

lazy_static! {
    /// A top-level `base:` key, with its value unquoted, single- or double-quoted.
    ///
    /// # Captures
    ///
    /// Exactly one of the groups `dq`, `sq` and `plain` matches.
    static ref BASE_LINE: Regex = Regex::new(r#"(?xm)
      ^base:[\ \t]*
      (?:
          "(?P<dq>[^"]*)"
      |
          '(?P<sq>[^']*)'
      |
          (?P<plain>[^\s\#"']+)
      )
    "#).unwrap();
}

/// Raised when a string is not usable as a base IRI.
#[derive(Debug, Error)]
#[error("invalid base IRI <{iri}>: {reason}")]
pub struct InvalidBase {
    /// The offending text
    pub iri: String,
    /// Why it was rejected
    pub reason: String,
}

/// Look for a top-level `base:` declaration in `text`,
/// without parsing it as YAML.
///
/// This works even on documents that are not valid YAML.
pub fn sniff_base(text: &str) -> Option<String> {
    let caps = BASE_LINE.captures(text)?;
    ["dq", "sq", "plain"]
        .iter()
        .find_map(|g| caps.name(g))
        .map(|m| m.as_str().to_string())
        .filter(|b| !b.is_empty())
}

/// Check that `iri` (trimmed) is an absolute IRI.
pub fn check_base(iri: &str) -> Result<String, InvalidBase> {
    let iri = iri.trim();
    Iri::parse(iri).map_err(|err| InvalidBase {
        iri: iri.to_string(),
        reason: err.to_string(),
    })?;
    Ok(iri.to_string())
}

/// Check that `iri` is an absolute IRI, and make it end with `/` or `#`.
pub fn normalize_base(iri: &str) -> Result<String, InvalidBase> {
    let iri = check_base(iri)?;
    if iri.ends_with('/') || iri.ends_with('#') {
        Ok(iri)
    } else {
        Ok(format!("{iri}/"))
    }
}

/// Pick the first valid base among `explicit`, `document` and `default`.
///
/// Invalid candidates are reported to `logger`.
/// If none is valid, [`DEFAULT_BASE`] is returned.
pub fn derive_base(
    explicit: Option<&str>,
    document: Option<&str>,
    default: &str,
    logger: &mut Logger,
) -> String {
    let candidates = [
        ("requested", explicit),
        ("document", document),
        ("default", Some(default)),
    ];
    for (origin, candidate) in candidates {
        let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        match normalize_base(candidate) {
            Ok(base) => return base,
            Err(err) => logger.warn(format!("ignoring {origin} base: {err}")),
        }
    }
    DEFAULT_BASE.to_string()
}
