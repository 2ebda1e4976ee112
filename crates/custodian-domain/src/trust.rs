//! Trust level module - the three-valued trust state for content

/// Trust level assigned to a piece of content
///
/// Every provenance record carries exactly one trust level at a time:
/// - Trusted: content may be acted upon
/// - Untrusted: content must not be acted upon
/// - Unknown: no determination has been made (the default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrustLevel {
    /// Content from a vetted origin
    Trusted,

    /// Content from a rejected origin
    Untrusted,

    /// No determination made yet
    #[default]
    Unknown,
}

impl TrustLevel {
    /// Get the trust level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::Trusted => "trusted",
            TrustLevel::Untrusted => "untrusted",
            TrustLevel::Unknown => "unknown",
        }
    }

    /// Parse a trust level from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trusted" => Some(TrustLevel::Trusted),
            "untrusted" => Some(TrustLevel::Untrusted),
            "unknown" => Some(TrustLevel::Unknown),
            _ => None,
        }
    }
}

impl std::str::FromStr for TrustLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("Invalid trust level: {} (expected trusted, untrusted, or unknown)", s)
        })
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
