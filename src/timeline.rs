//! Pacing for the battle: every delayed step of a floor is a cue queued
//! here and released by the tick clock, in due order.

use std::collections::VecDeque;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Clock advance per `Tick` action.
pub const TICK_MS: u64 = 100;

pub const PLAYER_HIT_DELAY_MS: u64 = 1000;
pub const ENEMY_TURN_DELAY_MS: u64 = 1500;
pub const VICTORY_DELAY_MS: u64 = 1000;
pub const ENEMY_HIT_DELAY_MS: u64 = 1000;
pub const SWITCH_IN_DELAY_MS: u64 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleCue {
    TrainerEnters,
    BallThrown,
    Reveal,
    BattleStart,
    PlayerHit { move_index: usize },
    EnemyTurn,
    EnemyHit { move_index: usize },
    SwitchIn { index: usize },
    Victory,
}

/// Floor intro, as offsets from the moment the enemy is ready.
pub const INTRO_SEQUENCE: [(u64, BattleCue); 4] = [
    (500, BattleCue::TrainerEnters),
    (2500, BattleCue::BallThrown),
    (3300, BattleCue::Reveal),
    (4000, BattleCue::BattleStart),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
struct Scheduled {
    due_ms: u64,
    cue: BattleCue,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Timeline {
    now_ms: u64,
    queue: VecDeque<Scheduled>,
}

impl Timeline {
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `cue` to fire `delay_ms` after the current clock. Cues due at
    /// the same instant keep their scheduling order.
    pub fn schedule(&mut self, delay_ms: u64, cue: BattleCue) {
        let due_ms = self.now_ms + delay_ms;
        let index = self
            .queue
            .iter()
            .position(|entry| entry.due_ms > due_ms)
            .unwrap_or(self.queue.len());
        self.queue.insert(index, Scheduled { due_ms, cue });
    }

    pub fn schedule_all(&mut self, entries: &[(u64, BattleCue)]) {
        for (delay_ms, cue) in entries {
            self.schedule(*delay_ms, *cue);
        }
    }

    /// Releases the next cue due at or before `until_ms`, moving the clock
    /// to its due time so follow-up cues are scheduled relative to it.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<BattleCue> {
        let due_ms = self.queue.front()?.due_ms;
        if due_ms > until_ms {
            return None;
        }
        self.now_ms = due_ms;
        self.queue.pop_front().map(|entry| entry.cue)
    }

    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
