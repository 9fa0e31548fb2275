use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::bosses::Boss;
use crate::error::TowerError;
use crate::provider::{moveset_or_fallback, MoveProvider, RosterProvider};
use crate::rng::Rng;
use crate::state::Enemy;
use crate::stats::{calc_stats, enemy_level};

/// Highest catalog id a regular floor can draw.
pub const CATALOG_MAX: u32 = 649;
pub const BOSS_FLOOR_INTERVAL: u32 = 5;

pub fn is_boss_floor(floor: u32) -> bool {
    floor > 0 && floor % BOSS_FLOOR_INTERVAL == 0
}

/// Roster slot fought on `floor`; the roster wraps once it runs out.
pub fn boss_index(floor: u32, boss_count: usize) -> Option<usize> {
    if !is_boss_floor(floor) || boss_count == 0 {
        return None;
    }
    Some((floor / BOSS_FLOOR_INTERVAL - 1) as usize % boss_count)
}

/// Everything random about a floor, decided before any fetch so a failed
/// fetch can be retried against the same opponent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncounterPlan {
    pub floor: u32,
    pub level: u32,
    pub creature_id: u32,
    pub boss: Option<Boss>,
}

pub fn plan_encounter(floor: u32, bosses: &[Boss], rng: &mut Rng) -> EncounterPlan {
    let boss = boss_index(floor, bosses.len()).map(|index| bosses[index].clone());
    let creature_id = match &boss {
        Some(boss) if !boss.pokemon_ids.is_empty() => {
            boss.pokemon_ids[rng.range_usize(boss.pokemon_ids.len())]
        }
        _ => rng.range_inclusive(1, CATALOG_MAX),
    };
    EncounterPlan {
        floor,
        level: enemy_level(floor, boss.is_some()),
        creature_id,
        boss,
    }
}

/// Materialises the planned opponent at full HP.
pub async fn generate_enemy<P>(
    provider: &P,
    plan: &EncounterPlan,
    seed: u64,
) -> Result<Enemy, TowerError>
where
    P: RosterProvider + MoveProvider + ?Sized,
{
    let creature = provider.creature(plan.creature_id).await?;
    let stats = calc_stats(&creature.base_stats, plan.level);
    let moves = moveset_or_fallback(provider.moves(creature.id, seed).await);

    Ok(Enemy {
        id: creature.id,
        name: creature.name,
        level: plan.level,
        stats: stats.combat(),
        max_hp: stats.max_hp,
        current_hp: stats.max_hp,
        moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bosses::default_bosses;

    #[test]
    fn boss_floors_are_multiples_of_five() {
        let boss_floors: Vec<u32> = (1..=20).filter(|floor| is_boss_floor(*floor)).collect();
        assert_eq!(boss_floors, vec![5, 10, 15, 20]);
        assert!(!is_boss_floor(0));
    }

    #[test]
    fn boss_index_wraps() {
        assert_eq!(boss_index(5, 7), Some(0));
        assert_eq!(boss_index(10, 7), Some(1));
        assert_eq!(boss_index(35, 7), Some(6));
        assert_eq!(boss_index(40, 7), Some(0));
        assert_eq!(boss_index(4, 7), None);
        assert_eq!(boss_index(5, 0), None);
    }

    #[test]
    fn fifth_floor_draws_from_the_boss_pool() {
        let giovanni = default_bosses()
            .into_iter()
            .find(|boss| boss.id == "giovanni")
            .expect("giovanni in roster");
        for seed in 0..50 {
            let mut rng = Rng::new(seed);
            let plan = plan_encounter(5, std::slice::from_ref(&giovanni), &mut rng);
            assert!([150, 112, 34].contains(&plan.creature_id));
            assert_eq!(plan.level, 11);
            assert_eq!(plan.boss.as_ref().map(|b| b.id.as_str()), Some("giovanni"));
        }
    }

    #[test]
    fn regular_floor_stays_in_catalog() {
        let bosses = default_bosses();
        for seed in 0..100 {
            let mut rng = Rng::new(seed);
            let plan = plan_encounter(3, &bosses, &mut rng);
            assert!((1..=CATALOG_MAX).contains(&plan.creature_id));
            assert_eq!(plan.level, 7);
            assert!(plan.boss.is_none());
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let bosses = default_bosses();
        let a = plan_encounter(10, &bosses, &mut Rng::new(3));
        let b = plan_encounter(10, &bosses, &mut Rng::new(3));
        assert_eq!(a, b);
        assert_eq!(a.boss.map(|b| b.id), Some("misty".to_string()));
    }
}
