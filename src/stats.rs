use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{BaseStats, CombatStats};

/// Level every fighter starts a tower run at.
pub const START_LEVEL: u32 = 5;
/// Level-up growth, in percent of the current value.
pub const GROWTH_PERCENT: u32 = 105;
/// Share of the previous max HP restored after a won floor, in percent.
pub const VICTORY_HEAL_PERCENT: u32 = 40;
pub const BOSS_LEVEL_BONUS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DerivedStats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl DerivedStats {
    pub fn combat(&self) -> CombatStats {
        CombatStats {
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
        }
    }
}

/// Effective stats at `level`: `floor(base * 2 * level / 100) + level + 10` for HP,
/// `floor(base * 2 * level / 100) + 5` for everything else.
pub fn calc_stats(base: &BaseStats, level: u32) -> DerivedStats {
    let scaled = |value: u32| value * 2 * level / 100;
    DerivedStats {
        max_hp: scaled(base.hp) + level + 10,
        attack: scaled(base.attack) + 5,
        defense: scaled(base.defense) + 5,
        speed: scaled(base.speed) + 5,
    }
}

/// `floor(5 + (floor - 1) * 1.2)`, plus the boss bonus on boss floors.
pub fn enemy_level(floor: u32, boss: bool) -> u32 {
    let floor = floor.max(1);
    let level = 5 + (floor - 1) * 6 / 5;
    if boss {
        level + BOSS_LEVEL_BONUS
    } else {
        level
    }
}

pub fn grow(value: u32) -> u32 {
    value * GROWTH_PERCENT / 100
}

pub fn victory_heal(old_max_hp: u32) -> u32 {
    old_max_hp * VICTORY_HEAL_PERCENT / 100
}
