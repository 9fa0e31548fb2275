//! Combat math: one damage formula for both sides, faint bookkeeping and
//! the end-of-floor level-up.

use crate::rng::Rng;
use crate::state::{Enemy, Fighter, Move};
use crate::stats::{grow, victory_heal};

pub const VARIANCE_MIN_PCT: u32 = 85;
pub const VARIANCE_MAX_PCT: u32 = 100;

/// Anything that can trade hits on a tower floor.
pub trait Combatant {
    fn level(&self) -> u32;
    fn attack(&self) -> u32;
    fn defense(&self) -> u32;
    fn hp(&self) -> u32;
    fn set_hp(&mut self, hp: u32);
}

impl Combatant for Fighter {
    fn level(&self) -> u32 {
        self.level
    }

    fn attack(&self) -> u32 {
        self.stats.attack
    }

    fn defense(&self) -> u32 {
        self.stats.defense
    }

    fn hp(&self) -> u32 {
        self.current_hp
    }

    fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
        self.fainted = self.current_hp == 0;
    }
}

impl Combatant for Enemy {
    fn level(&self) -> u32 {
        self.level
    }

    fn attack(&self) -> u32 {
        self.stats.attack
    }

    fn defense(&self) -> u32 {
        self.stats.defense
    }

    fn hp(&self) -> u32 {
        self.current_hp
    }

    fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub damage: u32,
    pub remaining_hp: u32,
    pub knocked_out: bool,
}

/// `floor((2L/5 + 2) * power * (A/D) / 50 + 2)`, then scaled by the variance
/// percentage and floored again.
///
/// `variance_pct` is a whole percentage. [`roll_variance`] draws it from the
/// 16 values 85..=100, so an unscaled hit comes up one roll in sixteen rather
/// than never, as a continuous multiplier in `[0.85, 1.0)` would have it.
pub fn damage(attacker_level: u32, attack: u32, defense: u32, power: u32, variance_pct: u32) -> u32 {
    let level_factor = 2.0 * attacker_level as f64 / 5.0 + 2.0;
    let stat_ratio = attack as f64 / defense.max(1) as f64;
    let base = (level_factor * power as f64 * stat_ratio / 50.0 + 2.0).floor() as u32;
    base * variance_pct / 100
}

/// Uniform over the integers 85..=100, both ends included.
pub fn roll_variance(rng: &mut Rng) -> u32 {
    rng.range_inclusive(VARIANCE_MIN_PCT, VARIANCE_MAX_PCT)
}

pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}

pub fn strike<A, D>(attacker: &A, defender: &mut D, mv: &Move, variance_pct: u32) -> Hit
where
    A: Combatant + ?Sized,
    D: Combatant + ?Sized,
{
    let damage = damage(
        attacker.level(),
        attacker.attack(),
        defender.defense(),
        mv.power,
        variance_pct,
    );
    let remaining_hp = apply_damage(defender.hp(), damage);
    defender.set_hp(remaining_hp);
    Hit {
        damage,
        remaining_hp,
        knocked_out: remaining_hp == 0,
    }
}

pub fn pick_enemy_move(moves: &[Move], rng: &mut Rng) -> usize {
    rng.range_usize(moves.len())
}

pub fn all_fainted(team: &[Fighter]) -> bool {
    team.iter().all(|fighter| fighter.fainted)
}

/// First fighter still standing, in team order.
pub fn next_active(team: &[Fighter]) -> Option<usize> {
    team.iter().position(|fighter| !fighter.fainted)
}

pub fn level_up(fighter: &mut Fighter) {
    let old_max_hp = fighter.max_hp;
    let new_max_hp = grow(old_max_hp);
    fighter.level += 1;
    fighter.stats.attack = grow(fighter.stats.attack);
    fighter.stats.defense = grow(fighter.stats.defense);
    fighter.stats.speed = grow(fighter.stats.speed);
    fighter.max_hp = new_max_hp;
    fighter.current_hp = new_max_hp.min(fighter.current_hp + victory_heal(old_max_hp));
}

/// Fainted fighters sit out; they stay fainted for the rest of the run.
pub fn level_up_survivors(team: &mut [Fighter]) {
    for fighter in team.iter_mut().filter(|fighter| !fighter.fainted) {
        level_up(fighter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CombatStats;

    fn fighter(level: u32, hp: u32, max_hp: u32) -> Fighter {
        Fighter {
            original_id: 25,
            base_id: 25,
            name: "pikachu".to_string(),
            level,
            stats: CombatStats {
                attack: 11,
                defense: 10,
                speed: 14,
            },
            max_hp,
            current_hp: hp,
            moves: vec![Move::new("thunder-shock", 40, "electric", 100)],
            fainted: hp == 0,
        }
    }

    fn enemy(hp: u32) -> Enemy {
        Enemy {
            id: 19,
            name: "rattata".to_string(),
            level: 5,
            stats: CombatStats {
                attack: 10,
                defense: 10,
                speed: 12,
            },
            max_hp: hp,
            current_hp: hp,
            moves: vec![Move::new("tackle", 40, "normal", 100)],
        }
    }

    #[test]
    fn reference_damage_roll() {
        // level factor 4, stat ratio 1.1: floor(4 * 40 * 1.1 / 50 + 2) = 5
        assert_eq!(damage(5, 11, 10, 40, 100), 5);
    }

    #[test]
    fn variance_scales_and_floors() {
        assert_eq!(damage(5, 11, 10, 40, 85), 4);
        // level factor 22, stat ratio 2: floor(22 * 90 * 2 / 50 + 2) = 81
        assert_eq!(damage(50, 120, 60, 90, 100), 81);
        assert_eq!(damage(50, 120, 60, 90, 85), 68);
    }

    #[test]
    fn zero_defense_does_not_divide_by_zero() {
        assert!(damage(5, 10, 0, 40, 100) > 0);
    }

    #[test]
    fn hp_never_goes_negative() {
        assert_eq!(apply_damage(3, 10), 0);
        assert_eq!(apply_damage(10, 3), 7);

        let attacker = fighter(100, 50, 50);
        let mut defender = enemy(4);
        let hit = strike(&attacker, &mut defender, &attacker.moves[0], 100);
        assert!(hit.knocked_out);
        assert_eq!(hit.remaining_hp, 0);
        assert_eq!(defender.current_hp, 0);
    }

    #[test]
    fn knocked_out_fighter_is_fainted() {
        let attacker = enemy(30);
        let mut defender = fighter(5, 1, 18);
        let hit = strike(&attacker, &mut defender, &attacker.moves[0], 100);
        assert!(hit.knocked_out);
        assert!(defender.fainted);
    }

    #[test]
    fn variance_roll_within_bounds() {
        let mut rng = Rng::new(99);
        for _ in 0..200 {
            let pct = roll_variance(&mut rng);
            assert!((VARIANCE_MIN_PCT..=VARIANCE_MAX_PCT).contains(&pct));
        }
    }

    #[test]
    fn variance_covers_sixteen_whole_percentages() {
        let mut rng = Rng::new(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..4000 {
            seen.insert(roll_variance(&mut rng));
        }
        assert_eq!(seen.len(), 16);
        assert_eq!(seen.first(), Some(&85));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn level_up_heals_forty_percent_capped() {
        let mut hurt = fighter(5, 5, 20);
        level_up(&mut hurt);
        assert_eq!(hurt.level, 6);
        assert_eq!(hurt.max_hp, 21);
        assert_eq!(hurt.current_hp, 13);
        assert_eq!(hurt.stats.attack, 11);

        let mut healthy = fighter(5, 19, 20);
        level_up(&mut healthy);
        assert_eq!(healthy.current_hp, 21);
    }

    #[test]
    fn survivors_level_fainted_stay_down() {
        let mut team = vec![fighter(5, 10, 18), fighter(5, 0, 18), fighter(7, 18, 22)];
        level_up_survivors(&mut team);
        assert_eq!(team[0].level, 6);
        assert_eq!(team[1].level, 5);
        assert!(team[1].fainted);
        assert_eq!(team[1].current_hp, 0);
        assert_eq!(team[2].level, 8);
        assert!(team.iter().all(|f| f.max_hp >= 18));
    }

    #[test]
    fn next_active_skips_fainted() {
        let team = vec![fighter(5, 0, 18), fighter(5, 0, 18), fighter(5, 3, 18)];
        assert_eq!(next_active(&team), Some(2));
        assert!(!all_fainted(&team));

        let wiped = vec![fighter(5, 0, 18), fighter(5, 0, 18)];
        assert_eq!(next_active(&wiped), None);
        assert!(all_fainted(&wiped));
    }
}
