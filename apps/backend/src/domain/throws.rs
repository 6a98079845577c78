//! Dart throw primitives: rings, validated throws and the legal-throw universe.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::domain::DomainError;

/// Segment value recorded for a dart that missed the scoring area.
pub const MISS_SEGMENT: u8 = 0;
/// Segment value of the bullseye (25 outer, 50 inner).
pub const BULL_SEGMENT: u8 = 25;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ring {
    Single,
    Double,
    Triple,
}

impl Ring {
    pub const fn multiplier(self) -> u16 {
        match self {
            Ring::Single => 1,
            Ring::Double => 2,
            Ring::Triple => 3,
        }
    }
}

/// Score of a single dart.
///
/// Segment 0 is a miss and only exists on the single ring. Segment 25 is the
/// bull: single scores 25, double scores 50, and there is no triple bull.
pub fn compute_score(segment: u8, ring: Ring) -> Result<u16, DomainError> {
    match (segment, ring) {
        (MISS_SEGMENT, Ring::Single) => Ok(0),
        (MISS_SEGMENT, _) => Err(DomainError::invalid_throw(format!(
            "A miss cannot land on the {ring:?} ring"
        ))),
        (1..=20, _) => Ok(u16::from(segment) * ring.multiplier()),
        (BULL_SEGMENT, Ring::Triple) => {
            Err(DomainError::invalid_throw("There is no triple bull"))
        }
        (BULL_SEGMENT, _) => Ok(u16::from(segment) * ring.multiplier()),
        _ => Err(DomainError::invalid_throw(format!(
            "Segment {segment} does not exist on a dartboard"
        ))),
    }
}

/// A validated dart. Once built the score always matches segment and ring.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawThrow", into = "RawThrow")]
pub struct DartThrow {
    segment: u8,
    ring: Ring,
    score: u16,
}

/// Wire shape of a dart. `score` is optional on input and checked when present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawThrow {
    segment: u8,
    ring: Ring,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<u16>,
}

impl TryFrom<RawThrow> for DartThrow {
    type Error = DomainError;

    fn try_from(raw: RawThrow) -> Result<Self, Self::Error> {
        let dart = DartThrow::new(raw.segment, raw.ring)?;
        match raw.score {
            Some(claimed) if claimed != dart.score => Err(DomainError::invalid_throw(format!(
                "Claimed score {claimed} does not match {} ({})",
                dart.label(),
                dart.score
            ))),
            _ => Ok(dart),
        }
    }
}

impl From<DartThrow> for RawThrow {
    fn from(dart: DartThrow) -> Self {
        RawThrow {
            segment: dart.segment,
            ring: dart.ring,
            score: Some(dart.score),
        }
    }
}

impl DartThrow {
    pub fn new(segment: u8, ring: Ring) -> Result<Self, DomainError> {
        let score = compute_score(segment, ring)?;
        Ok(Self {
            segment,
            ring,
            score,
        })
    }

    pub const fn miss() -> Self {
        Self {
            segment: MISS_SEGMENT,
            ring: Ring::Single,
            score: 0,
        }
    }

    pub fn segment(&self) -> u8 {
        self.segment
    }

    pub fn ring(&self) -> Ring {
        self.ring
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    pub fn is_miss(&self) -> bool {
        self.segment == MISS_SEGMENT
    }

    pub fn is_bull(&self) -> bool {
        self.segment == BULL_SEGMENT
    }

    pub fn is_double(&self) -> bool {
        self.ring == Ring::Double
    }

    /// Short board label: `S5`, `D16`, `T20`, `25`, `Bull`, `Miss`.
    pub fn label(&self) -> String {
        match (self.segment, self.ring) {
            (MISS_SEGMENT, _) => "Miss".to_string(),
            (BULL_SEGMENT, Ring::Double) => "Bull".to_string(),
            (BULL_SEGMENT, _) => "25".to_string(),
            (n, Ring::Single) => format!("S{n}"),
            (n, Ring::Double) => format!("D{n}"),
            (n, Ring::Triple) => format!("T{n}"),
        }
    }
}

impl fmt::Display for DartThrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Every dart a board can produce: 62 scoring combinations plus the miss.
pub fn enumerate_legal_throws() -> Vec<DartThrow> {
    let mut all = Vec::with_capacity(63);
    for ring in [Ring::Single, Ring::Double, Ring::Triple] {
        for segment in (1..=20).chain(std::iter::once(BULL_SEGMENT)) {
            if let Ok(dart) = DartThrow::new(segment, ring) {
                all.push(dart);
            }
        }
    }
    all.push(DartThrow::miss());
    all
}
