use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the six privacy risk categories every input is analyzed against.
///
/// Declaration order is the display order used by the terminal renderer and
/// the PDF report; `Ord` follows it so `BTreeMap<Dimension, _>` iterates in
/// report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Exposure,
    Inference,
    Audience,
    Platforms,
    Amplification,
    Manipulability,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Exposure,
        Dimension::Inference,
        Dimension::Audience,
        Dimension::Platforms,
        Dimension::Amplification,
        Dimension::Manipulability,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Exposure => "exposure",
            Dimension::Inference => "inference",
            Dimension::Audience => "audience",
            Dimension::Platforms => "platforms",
            Dimension::Amplification => "amplification",
            Dimension::Manipulability => "manipulability",
        }
    }

    /// Heading used for this dimension in rendered reports.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Exposure => "01 EXPOSURE",
            Dimension::Inference => "02 INFERENCE",
            Dimension::Audience => "03 AUDIENCE & CONSEQUENCES",
            Dimension::Platforms => "04 PLATFORMS & RULES",
            Dimension::Amplification => "05 AMPLIFICATION",
            Dimension::Manipulability => "06 MANIPULABILITY",
        }
    }

    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Dimension::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dimension: {0}")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}
