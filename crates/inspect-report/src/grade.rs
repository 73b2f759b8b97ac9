//! Letter grades from inspection scores

use inspect_core::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

/// Lower bound of each band, best first. Anything under the last is D.
const BANDS: [(i64, Grade); 3] = [(90, Grade::A), (80, Grade::B), (70, Grade::C)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::A => "优秀",
            Grade::B => "良好",
            Grade::C => "一般",
            Grade::D => "较差",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(letter)
    }
}

/// Map a score in `[0, 100]` to its grade band
pub fn derive_grade(score: i64) -> InspectResult<Grade> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(InspectError::out_of_range(score, MIN_SCORE, MAX_SCORE));
    }
    Ok(BANDS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::D))
}
