use crate::GongmoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The upstream sites records are extracted from
///
/// Serialized as the site's fixed source tag, which is also the key the
/// persistence layer stores records under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// allforyoung.com, card-style listing with a prose detail page
    #[serde(rename = "요즘것들")]
    AllForYoung,

    /// wevity.com, table and definition-list based templates
    #[serde(rename = "위비티")]
    Wevity,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::AllForYoung, Source::Wevity];

    /// Fixed tag identifying the site on every record it produces
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AllForYoung => "요즘것들",
            Self::Wevity => "위비티",
        }
    }

    /// ASCII name used on the command line and in logs
    pub fn slug(&self) -> &'static str {
        match self {
            Self::AllForYoung => "allforyoung",
            Self::Wevity => "wevity",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|source| source.tag() == s || source.slug().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Source {
    type Err = GongmoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| GongmoError::UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_and_slug() {
        assert_eq!(Source::from_tag("요즘것들"), Some(Source::AllForYoung));
        assert_eq!(Source::from_tag("위비티"), Some(Source::Wevity));
        assert_eq!(Source::from_tag("Wevity"), Some(Source::Wevity));
        assert_eq!(Source::from_tag(" allforyoung "), Some(Source::AllForYoung));
        assert_eq!(Source::from_tag("linkareer"), None);
    }

    #[test]
    fn test_from_str_unknown() {
        let err = "nope".parse::<Source>().unwrap_err();
        assert!(matches!(err, GongmoError::UnknownSource(s) if s == "nope"));
    }

    #[test]
    fn test_serializes_as_tag() {
        let json = serde_json::to_string(&Source::Wevity).unwrap();
        assert_eq!(json, "\"위비티\"");
        let back: Source = serde_json::from_str("\"요즘것들\"").unwrap();
        assert_eq!(back, Source::AllForYoung);
    }
}
