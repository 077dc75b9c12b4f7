//! Version extraction and normalization.
//!
//! Installed copies report their version in free-form text (an uninstall log,
//! a file name). [`extract_version`] pulls a dotted numeric version out of
//! that text and [`normalize`] turns it into a [`VersionTuple`] that orders
//! correctly. Neither ever fails: bad data becomes [`UNKNOWN_VERSION`] and
//! [`VersionTuple::UNKNOWN`], which sorts below every real version.

use crate::error::VersionParseError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Display value used when no version could be found.
pub const UNKNOWN_VERSION: &str = "Unknown";

const COMPONENTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct VersionTuple {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl VersionTuple {
    pub const UNKNOWN: VersionTuple = VersionTuple::new(0, 0, 0, 0);

    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for VersionTuple {
    type Err = VersionParseError;

    /// Strict parse of 1 to 4 dot-separated integers, zero-padded on the right.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| VersionParseError {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() > COMPONENTS {
            return Err(err("more than four components"));
        }

        let mut values = [0u32; COMPONENTS];
        for (slot, part) in values.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err("component is not a non-negative integer"));
            }
            *slot = part.parse().map_err(|_| err("component out of range"))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

/// Lenient conversion of a display version into a comparable tuple.
///
/// `"15.5.3"` becomes `(15, 5, 3, 0)`. The `"Unknown"` sentinel and anything
/// malformed become [`VersionTuple::UNKNOWN`].
pub fn normalize(display: &str) -> VersionTuple {
    if display == UNKNOWN_VERSION {
        return VersionTuple::UNKNOWN;
    }
    match display.parse() {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!("{}; treating as unknown", e);
            VersionTuple::UNKNOWN
        }
    }
}

// 2 to 4 groups of ASCII digits, not part of a longer digit/dot run. A single
// trailing dot (end of a sentence) is tolerated.
const VERSION_BODY: &str = r"([0-9]+(?:\.[0-9]+){1,3})\.?(?:[^0-9.]|$)";

fn anchored_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)loxone\s*config[\s:]*v?{}", VERSION_BODY))
            .expect("anchored version pattern is valid")
    })
}

fn bare_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?:^|[^0-9.]){}", VERSION_BODY))
            .expect("bare version pattern is valid")
    })
}

/// Find a version string in raw artifact text.
///
/// The match right after the product marker wins; otherwise the first
/// version-shaped substring anywhere. Returns [`UNKNOWN_VERSION`] when the
/// text is absent or holds no version.
pub fn extract_version(raw: Option<&str>) -> String {
    let Some(text) = raw else {
        return UNKNOWN_VERSION.to_string();
    };

    if let Some(caps) = anchored_pattern().captures(text) {
        tracing::trace!("Version found after product marker: {}", &caps[1]);
        return caps[1].to_string();
    }

    if let Some(caps) = bare_pattern().captures(text) {
        tracing::trace!("Version found by bare pattern: {}", &caps[1]);
        return caps[1].to_string();
    }

    UNKNOWN_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_to_four_components() {
        assert_eq!(normalize("15.5.3"), VersionTuple::new(15, 5, 3, 0));
        assert_eq!(normalize("16.0.6.10"), VersionTuple::new(16, 0, 6, 10));
        assert_eq!(normalize("12"), VersionTuple::new(12, 0, 0, 0));
        assert_eq!(normalize("9.1"), VersionTuple::new(9, 1, 0, 0));
    }

    #[test]
    fn test_normalize_unknown_and_garbage() {
        assert_eq!(normalize("Unknown"), VersionTuple::UNKNOWN);
        assert_eq!(normalize("not-a-version"), VersionTuple::UNKNOWN);
        assert_eq!(normalize(""), VersionTuple::UNKNOWN);
        assert_eq!(normalize("1..2"), VersionTuple::UNKNOWN);
        assert_eq!(normalize("1.2.3.4.5"), VersionTuple::UNKNOWN);
        assert_eq!(normalize("-1.2"), VersionTuple::UNKNOWN);
        assert_eq!(normalize("99999999999.1"), VersionTuple::UNKNOWN);
    }

    #[test]
    fn test_strict_parse_reports_reason() {
        let err = "1.x".parse::<VersionTuple>().unwrap_err();
        assert_eq!(err.input, "1.x");
        assert!(err.to_string().contains("1.x"));
    }

    #[test]
    fn test_descending_order() {
        let mut versions = vec![
            VersionTuple::new(15, 5, 3, 4),
            VersionTuple::new(16, 0, 6, 10),
            VersionTuple::new(15, 3, 12, 13),
        ];
        versions.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            versions,
            vec![
                VersionTuple::new(16, 0, 6, 10),
                VersionTuple::new(15, 5, 3, 4),
                VersionTuple::new(15, 3, 12, 13),
            ]
        );
    }

    #[test]
    fn test_unknown_sorts_below_everything() {
        assert!(VersionTuple::UNKNOWN < VersionTuple::new(0, 0, 0, 1));
        assert!(VersionTuple::UNKNOWN.is_unknown());
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionTuple::new(16, 0, 6, 10).to_string(), "16.0.6.10");
    }

    #[test]
    fn test_extract_anchored() {
        assert_eq!(
            extract_version(Some("Inno Setup\0Loxone Config 16.0.6.10\0more")),
            "16.0.6.10"
        );
    }

    #[test]
    fn test_extract_prefers_anchored_over_earlier_bare() {
        let text = "Inno Setup 5.5.9 log ... LoxoneConfig 15.5.3.4";
        assert_eq!(extract_version(Some(text)), "15.5.3.4");
    }

    #[test]
    fn test_extract_bare_fallback() {
        assert_eq!(extract_version(Some("setup version 14.2.6 x")), "14.2.6");
        assert_eq!(extract_version(Some("15.5")), "15.5");
    }

    #[test]
    fn test_extract_rejects_overlong_runs() {
        assert_eq!(extract_version(Some("ip 10.0.0.1.5 here")), UNKNOWN_VERSION);
    }

    #[test]
    fn test_extract_tolerates_trailing_dot() {
        assert_eq!(
            extract_version(Some("Installed Loxone Config 13.1.11.17.")),
            "13.1.11.17"
        );
    }

    #[test]
    fn test_extract_ignores_non_ascii_digits() {
        assert_eq!(
            extract_version(Some("build \u{661}\u{662}.\u{663} then 15.5.3")),
            "15.5.3"
        );
        assert_eq!(
            extract_version(Some("Loxone Config \u{661}\u{666}.\u{660}")),
            UNKNOWN_VERSION
        );
    }

    #[test]
    fn test_extract_unknown() {
        assert_eq!(extract_version(Some("no version here")), UNKNOWN_VERSION);
        assert_eq!(extract_version(Some("just 7")), UNKNOWN_VERSION);
        assert_eq!(extract_version(None), UNKNOWN_VERSION);
    }
}
