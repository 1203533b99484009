//! Opinion Types
//!
//! The binary opinion derived from a continuous belief value, and tallies
//! of opinions across a population.
//!
//! # Example
//!
//! ```
//! use opinion_events::Opinion;
//!
//! assert_eq!(Opinion::from_belief(-0.2), Opinion::Red);
//! assert_eq!(Opinion::from_belief(0.0), Opinion::Blue);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign-derived opinion of a belief value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Opinion {
    /// Negative belief
    Red,
    /// Non-negative belief
    Blue,
}

impl Opinion {
    /// Derives the opinion from a belief value. Zero counts as blue.
    pub fn from_belief(belief: f64) -> Self {
        if belief < 0.0 {
            Opinion::Red
        } else {
            Opinion::Blue
        }
    }

    /// Returns the other opinion.
    pub fn opposite(self) -> Self {
        match self {
            Opinion::Red => Opinion::Blue,
            Opinion::Blue => Opinion::Red,
        }
    }

    /// Extreme belief value held by a zealot of this opinion.
    pub fn extreme(self) -> f64 {
        match self {
            Opinion::Red => -1.0,
            Opinion::Blue => 1.0,
        }
    }
}

impl fmt::Display for Opinion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opinion::Red => write!(f, "red"),
            Opinion::Blue => write!(f, "blue"),
        }
    }
}

/// Number of agents holding each opinion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpinionCounts {
    pub red: usize,
    pub blue: usize,
}

impl OpinionCounts {
    /// Tallies opinions from an iterator.
    pub fn tally(opinions: impl IntoIterator<Item = Opinion>) -> Self {
        let mut counts = Self::default();
        for opinion in opinions {
            match opinion {
                Opinion::Red => counts.red += 1,
                Opinion::Blue => counts.blue += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.red + self.blue
    }

    pub fn get(&self, opinion: Opinion) -> usize {
        match opinion {
            Opinion::Red => self.red,
            Opinion::Blue => self.blue,
        }
    }

    /// Fraction of the population holding `opinion`, 0.0 for an empty tally.
    pub fn proportion(&self, opinion: Opinion) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(opinion) as f64 / total as f64
    }

    /// The opinion held by everyone, if the other count has reached zero.
    pub fn dominant(&self) -> Option<Opinion> {
        if self.total() == 0 {
            None
        } else if self.blue == 0 {
            Some(Opinion::Red)
        } else if self.red == 0 {
            Some(Opinion::Blue)
        } else {
            None
        }
    }
}

/// Number of zealots on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZealotCounts {
    pub red: usize,
    pub blue: usize,
}

impl ZealotCounts {
    pub fn total(&self) -> usize {
        self.red + self.blue
    }
}
