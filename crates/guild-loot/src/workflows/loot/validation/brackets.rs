use serde::{Deserialize, Serialize};

use super::super::domain::{DomainError, Rank};

const BRACKET_COUNT: u8 = 4;
const BRACKET_WIDTH: u8 = 3;
const BRACKET_BUDGET: u32 = 3;
const MAIN_SPEC_FLOOR: u8 = 25;

/// A budgeted span of three consecutive ranks, identified by its 1-based position from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Bracket {
    number: u8,
}

impl Bracket {
    pub const fn from_number(number: u8) -> Option<Self> {
        if number >= 1 && number <= BRACKET_COUNT {
            Some(Self { number })
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.number
    }

    pub const fn budgeted() -> [Self; BRACKET_COUNT as usize] {
        [
            Self { number: 1 },
            Self { number: 2 },
            Self { number: 3 },
            Self { number: 4 },
        ]
    }

    pub const fn top_rank(self) -> u8 {
        Rank::MAX - (self.number - 1) * BRACKET_WIDTH
    }

    pub const fn bottom_rank(self) -> u8 {
        self.top_rank() + 1 - BRACKET_WIDTH
    }

    pub const fn allocation_budget(self) -> u32 {
        BRACKET_BUDGET
    }

    pub fn contains(self, rank: Rank) -> bool {
        (self.bottom_rank()..=self.top_rank()).contains(&rank.value())
    }

    /// Ranks in the bracket, most desirable first.
    pub fn ranks(self) -> impl Iterator<Item = Rank> {
        (self.bottom_rank()..=self.top_rank())
            .rev()
            .filter_map(|value| Rank::new(value).ok())
    }

    pub fn label(self) -> String {
        format!("Bracket {}", self.number)
    }
}

impl TryFrom<u8> for Bracket {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(DomainError::InvalidBracket(value))
    }
}

impl From<Bracket> for u8 {
    fn from(bracket: Bracket) -> Self {
        bracket.number
    }
}

/// Where a rank sits in the submission grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTier {
    Bracket(Bracket),
    MainSpec,
    OffSpec,
}

impl RankTier {
    pub fn for_rank(rank: Rank) -> Self {
        if let Some(bracket) = Bracket::budgeted()
            .into_iter()
            .find(|bracket| bracket.contains(rank))
        {
            return Self::Bracket(bracket);
        }

        if rank.value() >= MAIN_SPEC_FLOOR {
            Self::MainSpec
        } else {
            Self::OffSpec
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Bracket(bracket) => bracket.label(),
            Self::MainSpec => "No bracket (main spec)".to_string(),
            Self::OffSpec => "Off spec".to_string(),
        }
    }

    pub const fn is_budgeted(self) -> bool {
        matches!(self, Self::Bracket(_))
    }
}
