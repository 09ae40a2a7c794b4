//! Dice expressions and the pluggable `Dice` source.
//!
//! Combat code takes `&mut dyn Dice` so tests can script exact rolls while
//! engines pass their seeded [`GameRng`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::rng::GameRng;

/// A source of die rolls.
pub trait Dice {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32;
}

impl Dice for GameRng {
    fn roll(&mut self, sides: u32) -> u32 {
        GameRng::roll(self, sides)
    }
}

/// Dice that replay a fixed script, cycling when exhausted.
///
/// Values are clamped into `1..=sides` for the die being rolled.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    script: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: rolls.into_iter().collect(),
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let value = self.script.pop_front().unwrap_or(1);
        self.script.push_back(value);
        value.clamp(1, sides.max(1))
    }
}

/// `count`d`sides` + `bonus`, e.g. `2d4+2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    pub bonus: i64,
}

impl DiceRoll {
    #[must_use]
    pub const fn new(count: u32, sides: u32, bonus: i64) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Roll the expression. The result may be negative only through `bonus`.
    pub fn roll(&self, dice: &mut dyn Dice) -> i64 {
        let total: i64 = (0..self.count).map(|_| i64::from(dice.roll(self.sides))).sum();
        total + self.bonus
    }

    #[must_use]
    pub fn max(&self) -> i64 {
        i64::from(self.count * self.sides) + self.bonus
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

/// Ability modifier: `floor((stat - 10) / 2)`.
///
/// ```
/// use tabletop_rules::core::dice::modifier;
///
/// assert_eq!(modifier(16), 3);
/// assert_eq!(modifier(10), 0);
/// assert_eq!(modifier(9), -1);
/// assert_eq!(modifier(8), -1);
/// ```
#[must_use]
pub const fn modifier(stat: i64) -> i64 {
    (stat - 10).div_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_dice_cycle() {
        let mut dice = ScriptedDice::new([3, 5]);
        assert_eq!(dice.roll(6), 3);
        assert_eq!(dice.roll(6), 5);
        assert_eq!(dice.roll(6), 3);
    }

    #[test]
    fn test_scripted_dice_clamps_to_die() {
        let mut dice = ScriptedDice::new([20]);
        assert_eq!(dice.roll(8), 8);
    }

    #[test]
    fn test_dice_roll_total() {
        let mut dice = ScriptedDice::new([1, 2, 3]);
        let expr = DiceRoll::new(3, 4, 3);
        assert_eq!(expr.roll(&mut dice), 1 + 2 + 3 + 3);
        assert_eq!(expr.max(), 15);
    }

    #[test]
    fn test_dice_roll_display() {
        assert_eq!(DiceRoll::new(2, 4, 2).to_string(), "2d4+2");
        assert_eq!(DiceRoll::new(1, 8, 0).to_string(), "1d8");
        assert_eq!(DiceRoll::new(1, 6, -1).to_string(), "1d6-1");
    }

    #[test]
    fn test_modifier_floors_negative() {
        assert_eq!(modifier(7), -2);
        assert_eq!(modifier(3), -4);
        assert_eq!(modifier(18), 4);
    }

    #[test]
    fn test_rng_rolls_stay_on_die() {
        let mut rng = GameRng::new(3);
        let dice: &mut dyn Dice = &mut rng;
        for _ in 0..100 {
            assert!((1..=20).contains(&dice.roll(20)));
        }
    }
}
