//! Estimation methods and their display colors.

use ibs_math::SmoothingScheme;
use serde::{Serialize, Serializer};

use crate::error::Error;

/// An estimation method: IBS or a fixed-sample smoothing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Ibs,
    Smoothed(SmoothingScheme),
}

impl Method {
    /// Every method, IBS first.
    pub const ALL: [Method; 6] = [
        Method::Ibs,
        Method::Smoothed(SmoothingScheme::Naive),
        Method::Smoothed(SmoothingScheme::Fixed),
        Method::Smoothed(SmoothingScheme::Laplace),
        Method::Smoothed(SmoothingScheme::Jeffreys),
        Method::Smoothed(SmoothingScheme::Clipped),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::Ibs => "ibs",
            Method::Smoothed(scheme) => scheme.name(),
        }
    }

    /// Hex display color used by plotting consumers.
    pub fn color(self) -> &'static str {
        match self {
            Method::Ibs => "#4D8CFF",
            Method::Smoothed(SmoothingScheme::Naive) => "#FF6B6B",
            Method::Smoothed(SmoothingScheme::Fixed) => "#FFA45B",
            Method::Smoothed(SmoothingScheme::Laplace) => "#FFEB3B",
            Method::Smoothed(SmoothingScheme::Jeffreys) => "#75FF63",
            Method::Smoothed(SmoothingScheme::Clipped) => "#B07CFF",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| Error::UnknownKey {
                kind: "method",
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl From<SmoothingScheme> for Method {
    fn from(scheme: SmoothingScheme) -> Self {
        Method::Smoothed(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors() {
        assert_eq!(Method::Ibs.color(), "#4D8CFF");
        assert_eq!(Method::from(SmoothingScheme::Laplace).color(), "#FFEB3B");
        let colors: std::collections::HashSet<_> = Method::ALL.iter().map(|m| m.color()).collect();
        assert_eq!(colors.len(), Method::ALL.len());
    }

    #[test]
    fn test_parse_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn test_unknown_method() {
        for name in ["fixed_2", "IBS", "", "bayes"] {
            let err = name.parse::<Method>().unwrap_err();
            assert!(matches!(err, Error::UnknownKey { kind: "method", .. }));
        }
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&Method::Smoothed(SmoothingScheme::Jeffreys)).unwrap();
        assert_eq!(json, "\"jeffreys\"");
    }
}
