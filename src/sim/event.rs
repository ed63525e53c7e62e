/// Events emitted by progression transitions.
/// The presentation layer consumes these for messages/screens;
/// the core never depends on who is listening.

use crate::domain::rules::Decision;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    LevelFinished { index: u32 },
    BossPending { checkpoint: u32 },
    DecisionMade { path: Decision, level: u32 },
    BossDefeated { boss_id: String, level: u32 },
    UpgradeApplied { what: &'static str },
}
