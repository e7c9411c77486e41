use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a tracked application.
///
/// Variants are declared in priority order so the derived `Ord` matches
/// [`StatusLabel::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum StatusLabel {
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl StatusLabel {
    pub const ALL: [StatusLabel; 4] = [
        StatusLabel::Applied,
        StatusLabel::Interview,
        StatusLabel::Offer,
        StatusLabel::Rejected,
    ];

    /// Order in which classification rule groups are evaluated: the most
    /// advanced signal wins when a message carries several.
    pub const EVALUATION_ORDER: [StatusLabel; 4] = [
        StatusLabel::Offer,
        StatusLabel::Interview,
        StatusLabel::Rejected,
        StatusLabel::Applied,
    ];

    pub fn priority(self) -> u8 {
        match self {
            StatusLabel::Applied => 0,
            StatusLabel::Interview => 1,
            StatusLabel::Offer => 2,
            StatusLabel::Rejected => 3,
        }
    }

    /// Offer and Rejected absorb all later evidence.
    pub fn is_terminal(self) -> bool {
        matches!(self, StatusLabel::Offer | StatusLabel::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusLabel::Applied => "Applied",
            StatusLabel::Interview => "Interview",
            StatusLabel::Offer => "Offer",
            StatusLabel::Rejected => "Rejected",
        }
    }

    pub fn row_color(self) -> RowColor {
        match self {
            StatusLabel::Applied => RowColor::White,
            StatusLabel::Interview => RowColor::LightBlue,
            StatusLabel::Offer => RowColor::LightGreen,
            StatusLabel::Rejected => RowColor::LightRed,
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(StatusLabel::Applied),
            "interview" => Ok(StatusLabel::Interview),
            "offer" => Ok(StatusLabel::Offer),
            "rejected" => Ok(StatusLabel::Rejected),
            _ => Err(anyhow::anyhow!("Unknown status label: {}", s)),
        }
    }
}

/// True iff `candidate` may replace `current` on an existing record.
pub fn is_advance(candidate: StatusLabel, current: StatusLabel) -> bool {
    !current.is_terminal() && candidate.priority() > current.priority()
}

/// Background colour applied to a whole row in the tabular store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowColor {
    White,
    LightBlue,
    LightGreen,
    LightRed,
}

impl RowColor {
    pub fn hex(self) -> &'static str {
        match self {
            RowColor::White => "#ffffff",
            RowColor::LightBlue => "#cfe2f3",
            RowColor::LightGreen => "#d9ead3",
            RowColor::LightRed => "#f4cccc",
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        match hex.to_lowercase().as_str() {
            "#ffffff" => Some(RowColor::White),
            "#cfe2f3" => Some(RowColor::LightBlue),
            "#d9ead3" => Some(RowColor::LightGreen),
            "#f4cccc" => Some(RowColor::LightRed),
            _ => None,
        }
    }
}
