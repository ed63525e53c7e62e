/// Level-transition flow.
///
/// The original build sequenced fades and the ending choice with
/// coroutines; here the same behavior is an explicit ordered list of
/// suspension points, consumed strictly front to back by the shell's
/// tick loop. There is no cancellation: once a transition starts it
/// runs to completion.
///
/// ## Sequences
///   Level entry:  fade in -> illustration hold -> fade out
///                 (only when an intro illustration exists)
///   Level finish: fade in -> await ending choice -> fade out
///                 (the choice point only exists when at least one
///                 ending illustration exists; otherwise the level
///                 just advances)
///
/// ## Illustration lookup
///   <cinematics_dir>/intro<N>.png, good<N>.png, bad<N>.png for the
///   current level N. Absence is not an error - the step is skipped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::config::{FlowConfig, GameConfig};
use crate::domain::rules::Decision;

/// Ending illustrations available for the current level.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct EndingArt {
    pub good: Option<PathBuf>,
    pub bad: Option<PathBuf>,
}

impl EndingArt {
    pub fn any(&self) -> bool {
        self.good.is_some() || self.bad.is_some()
    }
}

/// One suspension point. Either a fixed-duration wait or a
/// wait-until-predicate (one of the two ending keys).
#[derive(Clone, PartialEq, Debug)]
pub enum FlowPoint {
    Wait { ticks: u32 },
    AwaitDecision { art: EndingArt },
}

/// What the shell should do after a tick.
#[derive(Clone, PartialEq, Debug)]
pub enum FlowStatus {
    /// Timed wait in progress; keep ticking.
    Waiting,
    /// Blocked on the ending choice; feed player input.
    AwaitingDecision,
    /// The player chose a path; the caller persists it, then the
    /// sequence continues with the exit fade.
    Decided(Decision),
    /// All suspension points consumed.
    Complete,
}

/// A strictly ordered, run-to-completion transition sequence.
pub struct FlowSequence {
    points: VecDeque<FlowPoint>,
}

impl FlowSequence {
    /// Entry sequence for a level. Empty (instantly complete) when no
    /// intro illustration exists.
    pub fn level_entry(flow: &FlowConfig, intro: Option<&Path>) -> FlowSequence {
        let mut points = VecDeque::new();
        if intro.is_some() {
            points.push_back(FlowPoint::Wait { ticks: flow.fade_ticks });
            points.push_back(FlowPoint::Wait { ticks: flow.intro_hold_ticks });
            points.push_back(FlowPoint::Wait { ticks: flow.fade_ticks });
        }
        FlowSequence { points }
    }

    /// Finish sequence for a level: fade, optional ending choice, fade.
    pub fn level_finish(flow: &FlowConfig, art: EndingArt) -> FlowSequence {
        let mut points = VecDeque::new();
        points.push_back(FlowPoint::Wait { ticks: flow.fade_ticks });
        if art.any() {
            points.push_back(FlowPoint::AwaitDecision { art });
        }
        points.push_back(FlowPoint::Wait { ticks: flow.fade_ticks });
        FlowSequence { points }
    }

    /// Advance one tick. `choice` is consumed only while the front
    /// point is the decision wait; at a timed wait it is ignored.
    /// The decision wait blocks indefinitely - there is no timeout.
    pub fn tick(&mut self, choice: Option<Decision>) -> FlowStatus {
        let front = match self.points.front_mut() {
            Some(p) => p,
            None => return FlowStatus::Complete,
        };

        match front {
            FlowPoint::Wait { ticks } => {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    self.points.pop_front();
                }
                if self.points.is_empty() {
                    FlowStatus::Complete
                } else {
                    FlowStatus::Waiting
                }
            }
            FlowPoint::AwaitDecision { .. } => match choice {
                Some(path) => {
                    self.points.pop_front();
                    FlowStatus::Decided(path)
                }
                None => FlowStatus::AwaitingDecision,
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.points.is_empty()
    }

    /// The pending decision art, if the sequence is blocked on it.
    pub fn pending_art(&self) -> Option<&EndingArt> {
        match self.points.front() {
            Some(FlowPoint::AwaitDecision { art }) => Some(art),
            _ => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Illustration lookup
// ══════════════════════════════════════════════════════════════

fn asset_if_present(dir: &Path, stem: &str, level: u32) -> Option<PathBuf> {
    let path = dir.join(format!("{stem}{level}.png"));
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// Intro illustration for the current level, if one ships.
pub fn intro_asset(config: &GameConfig, level: u32) -> Option<PathBuf> {
    asset_if_present(&config.cinematics_dir, "intro", level)
}

/// Good/bad ending illustrations for the current level.
pub fn ending_art(config: &GameConfig, level: u32) -> EndingArt {
    EndingArt {
        good: asset_if_present(&config.cinematics_dir, "good", level),
        bad: asset_if_present(&config.cinematics_dir, "bad", level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: FlowConfig = FlowConfig {
        tick_rate_ms: 75,
        fade_ticks: 2,
        intro_hold_ticks: 3,
    };

    fn art_with_good() -> EndingArt {
        EndingArt {
            good: Some(PathBuf::from("good1.png")),
            bad: None,
        }
    }

    #[test]
    fn entry_without_intro_art_is_instantly_complete() {
        let mut seq = FlowSequence::level_entry(&FLOW, None);
        assert!(seq.is_complete());
        assert_eq!(seq.tick(None), FlowStatus::Complete);
    }

    #[test]
    fn entry_with_intro_art_runs_fade_hold_fade() {
        let intro = PathBuf::from("intro1.png");
        let mut seq = FlowSequence::level_entry(&FLOW, Some(&intro));
        // fade(2) + hold(3) + fade(2) = 7 ticks total
        for _ in 0..6 {
            assert_eq!(seq.tick(None), FlowStatus::Waiting);
        }
        assert_eq!(seq.tick(None), FlowStatus::Complete);
    }

    #[test]
    fn finish_blocks_on_decision_until_a_valid_choice_arrives() {
        let mut seq = FlowSequence::level_finish(&FLOW, art_with_good());
        assert_eq!(seq.tick(None), FlowStatus::Waiting);
        assert_eq!(seq.tick(None), FlowStatus::Waiting); // fade done

        // Blocks indefinitely; timed ticks do not advance it.
        for _ in 0..10 {
            assert_eq!(seq.tick(None), FlowStatus::AwaitingDecision);
        }
        assert!(seq.pending_art().is_some());

        assert_eq!(seq.tick(Some(Decision::Bad)), FlowStatus::Decided(Decision::Bad));
        assert_eq!(seq.tick(None), FlowStatus::Waiting);
        assert_eq!(seq.tick(None), FlowStatus::Complete);
        assert!(seq.is_complete());
    }

    #[test]
    fn finish_without_ending_art_skips_the_decision_wait() {
        let mut seq = FlowSequence::level_finish(&FLOW, EndingArt::default());
        let mut statuses = vec![];
        for _ in 0..4 {
            statuses.push(seq.tick(Some(Decision::Good)));
        }
        // The stray choice input is ignored; no Decided ever surfaces.
        assert!(!statuses.iter().any(|s| matches!(s, FlowStatus::Decided(_))));
        assert_eq!(statuses.last(), Some(&FlowStatus::Complete));
    }

    #[test]
    fn choice_is_ignored_during_timed_waits() {
        let mut seq = FlowSequence::level_finish(&FLOW, art_with_good());
        assert_eq!(seq.tick(Some(Decision::Good)), FlowStatus::Waiting);
        assert_eq!(seq.pending_art(), None);
    }

    #[test]
    fn asset_lookup_skips_missing_files() {
        let dir = std::env::temp_dir().join(format!("gridspire_cine_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("good2.png"), b"png").unwrap();

        let mut config = GameConfig::default();
        config.cinematics_dir = dir.clone();

        assert_eq!(intro_asset(&config, 2), None);
        let art = ending_art(&config, 2);
        assert_eq!(art.good, Some(dir.join("good2.png")));
        assert_eq!(art.bad, None);
        assert!(art.any());
        assert!(!ending_art(&config, 3).any());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
