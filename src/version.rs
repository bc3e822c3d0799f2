//! Version-string helpers shared by the detector and the resolvers.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// Pattern that locates a version token inside arbitrary command output,
/// e.g. `95.0` inside `95.0.4638.54` or `Version=95.0.4638.54`.
pub const VERSION_PATTERN: &str = r"\d{1,2}[,.]\d{1,2}";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VERSION_PATTERN).expect("version pattern compiles"));

/// Extracts the first version token from command or response output.
pub fn find_token(output: &str) -> Result<String, Error> {
    VERSION_RE
        .find(output)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::VersionParse {
            pattern: VERSION_PATTERN,
            output: output.trim().to_string(),
        })
}

/// Extracts the integer major version from command output.
///
/// The major version is the integer before the first separator of the first
/// matched version token. A pattern miss is an error, never a sentinel value.
pub fn extract_major(output: &str) -> Result<u32, Error> {
    let miss = || Error::VersionParse {
        pattern: VERSION_PATTERN,
        output: output.trim().to_string(),
    };

    let token = find_token(output)?;
    token
        .split(['.', ','])
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|_| miss())
}

/// Orders two dotted version strings by their numeric components.
///
/// Components missing on one side count as zero, so `3.14` == `3.14.0`.
/// Non-numeric components also count as zero.
pub fn compare(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);

    for i in 0..left.len().max(right.len()) {
        let x = left.get(i).copied().unwrap_or(0);
        let y = right.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}
