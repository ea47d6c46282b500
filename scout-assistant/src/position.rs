// Canonical position keys and the free-text position resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical football roles used for weight lookup and bucket accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKey {
    Goalkeeper,
    CentreBack,
    LeftBack,
    RightBack,
    DefensiveMid,
    CentralMid,
    AttackingMid,
    Winger,
    Forward,
}

/// Broad parent category a position key also feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    Goalkeeping,
    Defence,
    Midfield,
    Attack,
}

impl PositionKey {
    pub const ALL: [PositionKey; 9] = [
        PositionKey::Goalkeeper,
        PositionKey::CentreBack,
        PositionKey::LeftBack,
        PositionKey::RightBack,
        PositionKey::DefensiveMid,
        PositionKey::CentralMid,
        PositionKey::AttackingMid,
        PositionKey::Winger,
        PositionKey::Forward,
    ];

    /// Canonical abbreviation. Resolving it yields the same key.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            PositionKey::Goalkeeper => "GK",
            PositionKey::CentreBack => "CB",
            PositionKey::LeftBack => "LB",
            PositionKey::RightBack => "RB",
            PositionKey::DefensiveMid => "DM",
            PositionKey::CentralMid => "CM",
            PositionKey::AttackingMid => "AM",
            PositionKey::Winger => "W",
            PositionKey::Forward => "F",
        }
    }

    /// Snake-case name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            PositionKey::Goalkeeper => "goalkeeper",
            PositionKey::CentreBack => "centre_back",
            PositionKey::LeftBack => "left_back",
            PositionKey::RightBack => "right_back",
            PositionKey::DefensiveMid => "defensive_mid",
            PositionKey::CentralMid => "central_mid",
            PositionKey::AttackingMid => "attacking_mid",
            PositionKey::Winger => "winger",
            PositionKey::Forward => "forward",
        }
    }

    /// The broad line this key belongs to.
    pub fn line(&self) -> Line {
        match self {
            PositionKey::Goalkeeper => Line::Goalkeeping,
            PositionKey::CentreBack | PositionKey::LeftBack | PositionKey::RightBack => {
                Line::Defence
            }
            PositionKey::DefensiveMid | PositionKey::CentralMid | PositionKey::AttackingMid => {
                Line::Midfield
            }
            PositionKey::Winger | PositionKey::Forward => Line::Attack,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Strict parse: accepts only canonical abbreviations and snake_case names.
///
/// Used where a typo should be reported (config files) rather than silently
/// resolved to the default.
impl FromStr for PositionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        PositionKey::ALL
            .iter()
            .copied()
            .find(|k| {
                k.abbreviation().eq_ignore_ascii_case(trimmed)
                    || k.name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| format!("unknown position key '{trimmed}'"))
    }
}

impl Line {
    pub const ALL: [Line; 4] = [Line::Goalkeeping, Line::Defence, Line::Midfield, Line::Attack];

    pub fn display_str(&self) -> &'static str {
        match self {
            Line::Goalkeeping => "Goalkeeping",
            Line::Defence => "Defence",
            Line::Midfield => "Midfield",
            Line::Attack => "Attack",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Key returned for empty, absent, or unrecognized position strings.
pub const DEFAULT_POSITION_KEY: PositionKey = PositionKey::CentralMid;

/// Resolve a free-text position abbreviation into exactly one `PositionKey`.
///
/// The input is trimmed and upper-cased, then looked up in a fixed table of
/// known abbreviations. Every abbreviation appears in exactly one arm, so the
/// result never depends on evaluation order. Anything not in the table
/// (including `None` and the empty string) resolves to
/// [`DEFAULT_POSITION_KEY`].
pub fn resolve_position(position: Option<&str>) -> PositionKey {
    let Some(raw) = position else {
        return DEFAULT_POSITION_KEY;
    };
    lookup(&raw.trim().to_uppercase()).unwrap_or(DEFAULT_POSITION_KEY)
}

fn lookup(code: &str) -> Option<PositionKey> {
    let key = match code {
        "GK" | "G" | "GKP" | "GOALKEEPER" => PositionKey::Goalkeeper,

        "CB" | "LCB" | "RCB" | "DC" | "CD" | "SW" | "D" | "DEF" | "CENTRE-BACK"
        | "CENTER-BACK" => PositionKey::CentreBack,

        "LB" | "LWB" | "DL" | "WBL" | "LEFT-BACK" => PositionKey::LeftBack,
        "RB" | "RWB" | "DR" | "WBR" | "RIGHT-BACK" => PositionKey::RightBack,

        "DM" | "CDM" | "DMC" | "LDM" | "RDM" => PositionKey::DefensiveMid,

        "CM" | "MC" | "LCM" | "RCM" | "M" | "MF" | "MID" => PositionKey::CentralMid,

        "AM" | "CAM" | "AMC" | "LAM" | "RAM" | "OM" => PositionKey::AttackingMid,

        "W" | "LW" | "RW" | "LM" | "RM" | "ML" | "MR" | "AML" | "AMR" | "WF"
        | "WINGER" => PositionKey::Winger,

        "F" | "FW" | "FWD" | "ST" | "CF" | "LS" | "RS" | "SS" | "LF" | "RF" | "ATT"
        | "STRIKER" => PositionKey::Forward,

        _ => return None,
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
