//! Narrow seams to the creature catalog, plus team preparation on top of them.

use async_trait::async_trait;

use crate::error::TowerError;
use crate::state::{format_name, BaseStats, Fighter, Move};
use crate::stats::{calc_stats, START_LEVEL};
use crate::team::TeamMember;

/// Moves kept per fighter or enemy.
pub const MOVESET_SIZE: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatureData {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub base_stats: BaseStats,
    /// Handle for [`RosterProvider::base_form`].
    pub species_url: String,
}

#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn creature(&self, id: u32) -> Result<CreatureData, TowerError>;

    /// Walks the evolution chain back to its earliest form.
    async fn base_form(&self, species_url: &str) -> Result<u32, TowerError>;
}

#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Up to four damaging moves; `seed` drives which ones are drawn.
    async fn moves(&self, id: u32, seed: u64) -> Result<Vec<Move>, TowerError>;
}

pub fn fallback_move() -> Move {
    Move::new("tackle", 40, "normal", 100)
}

pub fn struggle() -> Move {
    Move::new("struggle", 50, "normal", 100)
}

/// Never empty: a failed fetch fights with Tackle, a creature without a
/// damaging move fights with Struggle.
pub fn moveset_or_fallback(result: Result<Vec<Move>, TowerError>) -> Vec<Move> {
    match result {
        Ok(moves) => {
            let mut moves: Vec<Move> = moves.into_iter().filter(|mv| mv.power > 0).collect();
            moves.truncate(MOVESET_SIZE);
            if moves.is_empty() {
                vec![struggle()]
            } else {
                moves
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "move fetch failed, using fallback move");
            vec![fallback_move()]
        }
    }
}

/// Fighters that made it, and a message per team member that did not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeamPreparation {
    pub fighters: Vec<Fighter>,
    pub failures: Vec<String>,
}

pub async fn prepare_fighter<P>(
    provider: &P,
    member: &TeamMember,
    seed: u64,
) -> Result<Fighter, TowerError>
where
    P: RosterProvider + MoveProvider + ?Sized,
{
    let creature = provider.creature(member.id).await?;
    let base_id = provider.base_form(&creature.species_url).await?;
    let base = if base_id == creature.id {
        creature
    } else {
        provider.creature(base_id).await?
    };

    let stats = calc_stats(&base.base_stats, START_LEVEL);
    let moves = moveset_or_fallback(provider.moves(base_id, seed).await);

    Ok(Fighter {
        original_id: member.id,
        base_id,
        name: base.name,
        level: START_LEVEL,
        stats: stats.combat(),
        max_hp: stats.max_hp,
        current_hp: stats.max_hp,
        moves,
        fainted: false,
    })
}

/// Prepares members one after another, keeping team order. A member that
/// cannot be resolved is reported in `failures` instead of aborting.
pub async fn prepare_team<P>(provider: &P, members: &[TeamMember], seed: u64) -> TeamPreparation
where
    P: RosterProvider + MoveProvider + ?Sized,
{
    let mut preparation = TeamPreparation::default();
    for (index, member) in members.iter().enumerate() {
        let member_seed = seed.wrapping_add(index as u64);
        match prepare_fighter(provider, member, member_seed).await {
            Ok(fighter) => preparation.fighters.push(fighter),
            Err(err) => {
                tracing::warn!(id = member.id, error = %err, "could not prepare fighter");
                preparation
                    .failures
                    .push(format!("{}: {}", format_name(&member.name), err));
            }
        }
    }
    preparation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_fetch_falls_back_to_tackle() {
        let moves = moveset_or_fallback(Err(TowerError::network("timeout")));
        assert_eq!(moves, vec![fallback_move()]);
        assert_eq!(moves[0].power, 40);
    }

    #[test]
    fn no_damaging_moves_means_struggle() {
        let moves = moveset_or_fallback(Ok(vec![Move::new("growl", 0, "normal", 100)]));
        assert_eq!(moves, vec![struggle()]);
    }

    #[test]
    fn keeps_at_most_four_damaging_moves() {
        let moves = (1..=6)
            .map(|power| Move::new(&format!("move-{power}"), power * 10, "normal", 100))
            .collect();
        let moves = moveset_or_fallback(Ok(moves));
        assert_eq!(moves.len(), MOVESET_SIZE);
        assert_eq!(moves[0].name, "move-1");
    }
}
