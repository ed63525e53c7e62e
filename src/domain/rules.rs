/// Campaign rules - boss checkpoints and the boss selection table.
///
/// Pure functions over progression snapshots. No side effects; the
/// state machine owns the mutations.
///
/// ## Boss Selection Table
/// ┌───────────────────────────┬─────────────────────┐
/// │ Just-completed level       │ Boss to spawn       │
/// ├───────────────────────────┼─────────────────────┤
/// │ 3                          │ boss1               │
/// │ 6, boss1 defeated          │ boss2               │
/// │ 6, boss1 not defeated      │ boss1 (no skipping) │
/// │ other checkpoint, boss1 ✓  │ boss2               │
/// │ other checkpoint, boss1 ✗  │ boss1               │
/// └───────────────────────────┴─────────────────────┘

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Boss roster. Keys of the defeated map are fixed to these at
/// record creation and never added or removed afterwards.
pub const BOSS_ROSTER: [&str; 4] = [BOSS_1, BOSS_2, BOSS_3, FINAL_BOSS];

pub const BOSS_1: &str = "boss1";
pub const BOSS_2: &str = "boss2";
pub const BOSS_3: &str = "boss3";
pub const FINAL_BOSS: &str = "final_boss";

/// A level index is a boss checkpoint when it is divisible by 3.
pub fn is_boss_checkpoint(level: u32) -> bool {
    level > 0 && level % 3 == 0
}

/// Pick the boss for the arena entered after clearing `just_completed`.
///
/// Total and side-effect-free; works on a value snapshot of the
/// defeated map, never a live reference.
pub fn select_boss(just_completed: u32, defeated: &BTreeMap<String, bool>) -> &'static str {
    let boss1_down = defeated.get(BOSS_1).copied().unwrap_or(false);
    match just_completed {
        3 => BOSS_1,
        // The campaign cannot skip ahead: boss2 only appears once
        // boss1 is down, no matter how far the player has progressed.
        _ if boss1_down => BOSS_2,
        _ => BOSS_1,
    }
}

/// The two branching-ending paths a player can choose at level end.
/// Serializes as "good"/"bad" in the progression record.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Good,
    Bad,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Good => "good",
            Decision::Bad => "bad",
        }
    }
}
