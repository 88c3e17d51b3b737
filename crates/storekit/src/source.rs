use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A third-party store that can describe an Android package.
///
/// The set is closed: every variant has exactly one adapter implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "GOOGLE_PLAY")]
    GooglePlay,
    #[serde(rename = "APTOIDE")]
    Aptoide,
    #[serde(rename = "FDROID")]
    FDroid,
    #[serde(rename = "APKPURE")]
    ApkPure,
    #[serde(rename = "APKCOMBO")]
    ApkCombo,
}

impl Source {
    /// Every known source, in declaration order.
    pub const ALL: [Source; 5] = [
        Self::GooglePlay,
        Self::Aptoide,
        Self::FDroid,
        Self::ApkPure,
        Self::ApkCombo,
    ];

    /// Canonical upper-case name, as used in resolved links and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::GooglePlay => "GOOGLE_PLAY",
            Self::Aptoide => "APTOIDE",
            Self::FDroid => "FDROID",
            Self::ApkPure => "APKPURE",
            Self::ApkCombo => "APKCOMBO",
        }
    }

    /// Human-readable store name for display.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::GooglePlay => "Google Play",
            Self::Aptoide => "Aptoide",
            Self::FDroid => "F-Droid",
            Self::ApkPure => "APKPure",
            Self::ApkCombo => "APKCombo",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "googleplay" | "gplay" | "play" => Ok(Self::GooglePlay),
            "aptoide" => Ok(Self::Aptoide),
            "fdroid" => Ok(Self::FDroid),
            "apkpure" => Ok(Self::ApkPure),
            "apkcombo" => Ok(Self::ApkCombo),
            _ => Err(UnknownSource(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_upper_case() {
        assert_eq!(Source::FDroid.to_string(), "FDROID");
        assert_eq!(Source::GooglePlay.to_string(), "GOOGLE_PLAY");
        assert_eq!(Source::ApkCombo.name(), "APKCOMBO");
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("f-droid".parse::<Source>().unwrap(), Source::FDroid);
        assert_eq!("FDROID".parse::<Source>().unwrap(), Source::FDroid);
        assert_eq!("apk_pure".parse::<Source>().unwrap(), Source::ApkPure);
        assert_eq!("Google Play".parse::<Source>().unwrap(), Source::GooglePlay);
        assert_eq!("gplay".parse::<Source>().unwrap(), Source::GooglePlay);
        assert_eq!("ApkCombo".parse::<Source>().unwrap(), Source::ApkCombo);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "uptodown".parse::<Source>().unwrap_err();
        assert_eq!(err.to_string(), "unknown source: uptodown");
    }

    #[test]
    fn name_round_trips_through_parse() {
        for source in Source::ALL {
            assert_eq!(source.name().parse::<Source>().unwrap(), source);
        }
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&Source::ApkPure).unwrap();
        assert_eq!(json, "\"APKPURE\"");
        let back: Source = serde_json::from_str("\"GOOGLE_PLAY\"").unwrap();
        assert_eq!(back, Source::GooglePlay);
    }
}
