//! Character tiers and the score-gated unlock policy.
//!
//! A tier is unlocked iff the high score has reached its threshold. Yellow
//! costs nothing and is always available.

use crate::core::constants::{BLUE_UNLOCK_SCORE, GREEN_UNLOCK_SCORE, RED_UNLOCK_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unlockable runner colors, ordered by threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Yellow,
    Green,
    Blue,
    Red,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Yellow, Tier::Green, Tier::Blue, Tier::Red];

    /// The tier every player owns without scoring anything.
    pub const DEFAULT: Tier = Tier::Yellow;

    pub fn threshold(&self) -> u64 {
        match self {
            Self::Yellow => 0,
            Self::Green => GREEN_UNLOCK_SCORE,
            Self::Blue => BLUE_UNLOCK_SCORE,
            Self::Red => RED_UNLOCK_SCORE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Yellow => "Yellow",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Red => "Red",
        }
    }

    /// Lowercase key used on the wire and in save files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }

    /// Body color as 0xRRGGBB.
    pub fn hex_color(&self) -> u32 {
        match self {
            Self::Yellow => 0xffff00,
            Self::Green => 0x00ff00,
            Self::Blue => 0x0088ff,
            Self::Red => 0xff0000,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = self.hex_color();
        ((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(Self::DEFAULT)
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Tier {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|t| t.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SelectionError::InvalidCharacter(s.to_string()))
    }
}

/// Rejections from the selection and unlock checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Invalid character color: {0}")]
    InvalidCharacter(String),
    #[error("You need a score of at least {required} to unlock the {tier} character")]
    Locked { tier: Tier, required: u64 },
}

/// All tiers whose threshold is at or below `high_score`.
pub fn unlocked_tiers(high_score: u64) -> BTreeSet<Tier> {
    Tier::ALL
        .iter()
        .copied()
        .filter(|t| high_score >= t.threshold())
        .collect()
}

/// Gate a selection against a high score. No state is touched either way.
pub fn check_selection(high_score: u64, tier: Tier) -> Result<Tier, SelectionError> {
    if tier == Tier::DEFAULT || unlocked_tiers(high_score).contains(&tier) {
        Ok(tier)
    } else {
        Err(SelectionError::Locked {
            tier,
            required: tier.threshold(),
        })
    }
}

/// Persisted unlock flags. Flags only ever go from false to true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockState {
    #[serde(default)]
    pub green: bool,
    #[serde(default)]
    pub blue: bool,
    #[serde(default)]
    pub red: bool,
}

impl UnlockState {
    pub fn for_high_score(high_score: u64) -> Self {
        let mut state = Self::default();
        state.absorb_high_score(high_score);
        state
    }

    pub fn is_unlocked(&self, tier: Tier) -> bool {
        match tier {
            Tier::Yellow => true,
            Tier::Green => self.green,
            Tier::Blue => self.blue,
            Tier::Red => self.red,
        }
    }

    /// Set the flag for `tier`. Returns true if it was previously locked.
    pub fn unlock(&mut self, tier: Tier) -> bool {
        let flag = match tier {
            Tier::Yellow => return false,
            Tier::Green => &mut self.green,
            Tier::Blue => &mut self.blue,
            Tier::Red => &mut self.red,
        };
        let newly = !*flag;
        *flag = true;
        newly
    }

    /// Unlock everything `high_score` qualifies for, returning the tiers
    /// that flipped in ascending order.
    pub fn absorb_high_score(&mut self, high_score: u64) -> Vec<Tier> {
        unlocked_tiers(high_score)
            .into_iter()
            .filter(|&tier| self.unlock(tier))
            .collect()
    }

    /// Union of two unlock sets.
    pub fn merge(&mut self, other: &UnlockState) {
        self.green |= other.green;
        self.blue |= other.blue;
        self.red |= other.red;
    }

    pub fn tiers(&self) -> BTreeSet<Tier> {
        Tier::ALL
            .iter()
            .copied()
            .filter(|&t| self.is_unlocked(t))
            .collect()
    }
}

/// One row of the character picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterOption {
    pub tier: Tier,
    pub unlocked: bool,
    pub score_required: u64,
}

pub fn available_characters(unlocks: &UnlockState) -> Vec<CharacterOption> {
    Tier::ALL
        .iter()
        .map(|&tier| CharacterOption {
            tier,
            unlocked: unlocks.is_unlocked(tier),
            score_required: tier.threshold(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_ascending() {
        let thresholds: Vec<u64> = Tier::ALL.iter().map(|t| t.threshold()).collect();
        assert_eq!(thresholds, vec![0, 50, 100, 150]);
    }

    #[test]
    fn test_unlocked_tiers_boundaries() {
        assert_eq!(unlocked_tiers(0), BTreeSet::from([Tier::Yellow]));
        assert_eq!(unlocked_tiers(49), BTreeSet::from([Tier::Yellow]));
        assert_eq!(unlocked_tiers(50), BTreeSet::from([Tier::Yellow, Tier::Green]));
        assert_eq!(
            unlocked_tiers(100),
            BTreeSet::from([Tier::Yellow, Tier::Green, Tier::Blue])
        );
        assert_eq!(unlocked_tiers(10_000).len(), 4);
    }

    #[test]
    fn test_unlocked_tiers_monotonic() {
        let mut previous = unlocked_tiers(0);
        for score in 1..400 {
            let current = unlocked_tiers(score);
            assert!(previous.is_subset(&current), "lost a tier at {}", score);
            previous = current;
        }
    }

    #[test]
    fn test_check_selection_default_always_allowed() {
        assert_eq!(check_selection(0, Tier::Yellow), Ok(Tier::Yellow));
    }

    #[test]
    fn test_check_selection_locked_names_threshold() {
        let err = check_selection(99, Tier::Blue).unwrap_err();
        assert_eq!(
            err,
            SelectionError::Locked {
                tier: Tier::Blue,
                required: 100
            }
        );
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_check_selection_unlocked() {
        assert_eq!(check_selection(150, Tier::Red), Ok(Tier::Red));
    }

    #[test]
    fn test_absorb_reports_only_new_tiers() {
        let mut state = UnlockState::default();
        assert_eq!(state.absorb_high_score(60), vec![Tier::Green]);
        assert!(state.absorb_high_score(70).is_empty());
        assert_eq!(state.absorb_high_score(200), vec![Tier::Blue, Tier::Red]);
    }

    #[test]
    fn test_absorb_never_relocks() {
        let mut state = UnlockState::for_high_score(120);
        state.absorb_high_score(0);
        assert!(state.green);
        assert!(state.blue);
        assert!(!state.red);
    }

    #[test]
    fn test_yellow_cannot_be_unlocked_flag() {
        let mut state = UnlockState::default();
        assert!(!state.unlock(Tier::Yellow));
        assert!(state.is_unlocked(Tier::Yellow));
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("green".parse::<Tier>(), Ok(Tier::Green));
        assert_eq!(" RED ".parse::<Tier>(), Ok(Tier::Red));
        assert!(matches!(
            "purple".parse::<Tier>(),
            Err(SelectionError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_unlock_state_wire_format() {
        let state = UnlockState::for_high_score(55);
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"green":true,"blue":false,"red":false}"#);

        let parsed: UnlockState = serde_json::from_str(r#"{"blue":true}"#).unwrap();
        assert!(parsed.blue);
        assert!(!parsed.green);
    }

    #[test]
    fn test_available_characters_lists_all() {
        let options = available_characters(&UnlockState::for_high_score(50));
        assert_eq!(options.len(), 4);
        assert!(options[0].unlocked);
        assert!(options[1].unlocked);
        assert!(!options[2].unlocked);
        assert_eq!(options[3].score_required, 150);
    }

    #[test]
    fn test_rgb_split() {
        assert_eq!(Tier::Blue.rgb(), (0x00, 0x88, 0xff));
    }
}
