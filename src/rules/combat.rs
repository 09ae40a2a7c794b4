//! d20 attack resolution and hit point bookkeeping.
//!
//! ## Attack
//!
//! 1. Roll d20 (twice, keeping the lower, with disadvantage)
//! 2. Add the ability modifier and any flat bonuses
//! 3. Hit when the total meets the target's armor class
//! 4. Damage is `max(0, damage dice + modifier)`
//!
//! All rolls go through `&mut dyn Dice` so tests can script them.

use serde::{Deserialize, Serialize};

use crate::core::dice::{Dice, DiceRoll};

/// Current and maximum hit points. Never drops below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i64,
    pub max: i64,
}

impl HitPoints {
    #[must_use]
    pub const fn full(max: i64) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, returning the amount actually lost.
    pub fn damage(&mut self, amount: i64) -> i64 {
        let lost = amount.max(0).min(self.current);
        self.current -= lost;
        lost
    }

    /// Heal up to max, returning the amount actually restored.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let gained = amount.max(0).min(self.max - self.current);
        self.current += gained;
        gained
    }

    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

/// Everything needed to resolve one attack roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attack {
    /// Ability modifier, added to both the hit roll and damage.
    pub modifier: i64,
    /// Flat to-hit bonuses (proficiency, bless).
    pub to_hit_bonus: i64,
    pub damage: DiceRoll,
    pub disadvantage: bool,
    /// Skip the hit roll entirely.
    pub auto_hit: bool,
}

impl Attack {
    #[must_use]
    pub const fn new(modifier: i64, damage: DiceRoll) -> Self {
        Self {
            modifier,
            to_hit_bonus: 0,
            damage,
            disadvantage: false,
            auto_hit: false,
        }
    }

    #[must_use]
    pub const fn bonus(mut self, bonus: i64) -> Self {
        self.to_hit_bonus += bonus;
        self
    }

    #[must_use]
    pub const fn with_disadvantage(mut self, disadvantage: bool) -> Self {
        self.disadvantage = disadvantage;
        self
    }

    #[must_use]
    pub const fn auto_hit(mut self) -> Self {
        self.auto_hit = true;
        self
    }
}

/// How an attack roll went.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRoll {
    /// The kept d20, 0 for automatic hits.
    pub natural: i64,
    pub total: i64,
    pub hit: bool,
    pub damage: i64,
}

/// Roll one attack against `armor_class`. Does not touch hit points.
pub fn resolve_attack(attack: &Attack, armor_class: i64, dice: &mut dyn Dice) -> AttackRoll {
    let (natural, total, hit) = if attack.auto_hit {
        (0, 0, true)
    } else {
        let first = i64::from(dice.roll(20));
        let natural = if attack.disadvantage {
            first.min(i64::from(dice.roll(20)))
        } else {
            first
        };
        let total = natural + attack.modifier + attack.to_hit_bonus;
        (natural, total, total >= armor_class)
    };

    let damage = if hit {
        (attack.damage.roll(dice) + attack.modifier).max(0)
    } else {
        0
    };

    AttackRoll {
        natural,
        total,
        hit,
        damage,
    }
}

/// Resolve an attack and apply its damage.
pub fn strike(
    attack: &Attack,
    armor_class: i64,
    target: &mut HitPoints,
    dice: &mut dyn Dice,
) -> AttackRoll {
    let mut roll = resolve_attack(attack, armor_class, dice);
    roll.damage = target.damage(roll.damage);
    roll
}
