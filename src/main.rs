/// Entry point and campaign shell.
///
/// The shell is deliberately headless: rendering, physics and combat
/// belong to the host engine. What lives here is the campaign loop -
/// load progression, ask the machine whether the next map is a normal
/// level or the boss arena, build the placement plan, walk the
/// transition flow, and feed outcomes back into the state machine.

mod config;
mod domain;
mod sim;

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use config::GameConfig;
use domain::rules::Decision;
use sim::build::{build_placement_plan, PlacementPlan, SpawnKind};
use sim::event::GameEvent;
use sim::flow::{self, FlowSequence, FlowStatus};
use sim::level::LevelCatalog;
use sim::progress::{LoadDecision, ProgressionMachine};
use sim::save::ProgressionStore;

fn main() {
    let config = GameConfig::load();
    let catalog = LevelCatalog::scan(&config);
    let store = ProgressionStore::new(config.save_file.clone());
    let resuming = store.has_save();
    println!("save file: {}", store.path().display());
    let mut machine = ProgressionMachine::new(store);

    if let Err(e) = terminal::enable_raw_mode() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = shell_loop(&mut machine, &catalog, &config, resuming);

    if let Err(e) = terminal::disable_raw_mode() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Shell error: {e}");
    }

    println!(
        "Campaign at level {} | endings: {} good / {} bad",
        machine.record().current_level,
        machine.record().good_endings,
        machine.record().bad_endings,
    );
}

// ── Shell phases ──

enum Phase {
    Title,
    /// Intro transition before the plan is handed to the world builder.
    Entry { seq: FlowSequence },
    Playing,
    /// Finish transition: fades plus the optional ending choice.
    Finish { seq: FlowSequence, prompted: bool },
}

fn shell_loop(
    machine: &mut ProgressionMachine,
    catalog: &LevelCatalog,
    config: &GameConfig,
    resuming: bool,
) -> std::io::Result<()> {
    let tick_rate = Duration::from_millis(config.flow.tick_rate_ms);
    let mut phase = Phase::Title;
    // The load decision active for the current cycle, set on entry.
    let mut active: Option<LoadDecision> = None;

    say("GRIDSPIRE");
    say(&format!("{} levels in rotation", catalog.len()));
    if resuming {
        say(&format!(
            "[Enter] continue (level {})   [R] new game   [X] delete save   [Q] quit",
            machine.record().current_level
        ));
    } else {
        say("[Enter] start   [R] new game   [Q] quit");
    }

    loop {
        let key = poll_key(tick_rate)?;

        if matches!(key, Some(KeyCode::Char('q')) | Some(KeyCode::Esc)) {
            return Ok(());
        }

        match &mut phase {
            Phase::Title => match key {
                Some(KeyCode::Enter) => {
                    phase = begin_cycle(machine, config, &mut active);
                }
                Some(KeyCode::Char('r')) => {
                    machine.new_game();
                    say("Progression reset.");
                    phase = begin_cycle(machine, config, &mut active);
                }
                Some(KeyCode::Char('x')) => {
                    machine.delete_save();
                    say("Save file deleted.");
                }
                _ => {}
            },

            Phase::Entry { seq } => {
                seq.tick(None);
                if seq.is_complete() {
                    let decision = match active {
                        Some(d) => d,
                        None => return Ok(()),
                    };
                    match build_placement_plan(catalog, decision, &config.grid) {
                        Ok(plan) => {
                            announce_plan(&plan, decision);
                            phase = Phase::Playing;
                        }
                        Err(e) => {
                            // The one fatal case: halt progression,
                            // do not crash the process.
                            say(&format!("Cannot build level: {e}"));
                            return Ok(());
                        }
                    }
                }
            }

            Phase::Playing => match (key, active) {
                (Some(KeyCode::Char('f')), Some(LoadDecision::Normal { index })) => {
                    let events = machine.complete_level(index);
                    announce_events(&events);
                    phase = Phase::Finish {
                        seq: FlowSequence::level_finish(&config.flow, flow::ending_art(config, index)),
                        prompted: false,
                    };
                }
                (Some(KeyCode::Char('k')), Some(LoadDecision::BossArena { boss_id, .. })) => {
                    let events = machine.defeat_boss(boss_id);
                    announce_events(&events);
                    // No ending choice after a boss, just the fade out.
                    phase = Phase::Finish {
                        seq: FlowSequence::level_finish(&config.flow, flow::EndingArt::default()),
                        prompted: false,
                    };
                }
                (Some(KeyCode::Char('h')), _) => {
                    announce_events(&machine.add_health_upgrade(&config.player));
                }
                (Some(KeyCode::Char('u')), _) => {
                    announce_events(&machine.add_weapon_upgrade());
                }
                (Some(KeyCode::Char('a')), _) => {
                    announce_events(&machine.add_special_ability("double_jump"));
                }
                (Some(KeyCode::Char('d')), _) => {
                    // Debug hook: take one hit, clamped at zero.
                    let hp = machine.record().current_health - 1;
                    machine.set_current_health(hp, &config.player);
                    say(&format!("health: {}", machine.record().current_health));
                }
                _ => {}
            },

            Phase::Finish { seq, prompted } => {
                let choice = match key {
                    Some(KeyCode::Char('g')) => Some(Decision::Good),
                    Some(KeyCode::Char('b')) => Some(Decision::Bad),
                    _ => None,
                };
                match seq.tick(choice) {
                    FlowStatus::AwaitingDecision => {
                        if !*prompted {
                            *prompted = true;
                            if let Some(art) = seq.pending_art() {
                                if let Some(p) = &art.good {
                                    say(&format!("  good ending: {}", p.display()));
                                }
                                if let Some(p) = &art.bad {
                                    say(&format!("  bad ending:  {}", p.display()));
                                }
                            }
                            say("Choose the ending: [G]ood / [B]ad");
                        }
                    }
                    FlowStatus::Decided(path) => {
                        announce_events(&machine.record_decision(path));
                    }
                    FlowStatus::Complete => {
                        phase = begin_cycle(machine, config, &mut active);
                    }
                    FlowStatus::Waiting => {}
                }
            }
        }
    }
}

/// Start the next level cycle: ask the machine what to build and set
/// up the entry transition for it.
fn begin_cycle(
    machine: &mut ProgressionMachine,
    config: &GameConfig,
    active: &mut Option<LoadDecision>,
) -> Phase {
    let decision = machine.request_next_level_load();
    *active = Some(decision);

    let level = match decision {
        LoadDecision::Normal { index } => index,
        LoadDecision::BossArena { return_index, .. } => return_index,
    };
    let intro = flow::intro_asset(config, level);
    if let Some(path) = &intro {
        say(&format!("Intro: {}", path.display()));
    }
    Phase::Entry {
        seq: FlowSequence::level_entry(&config.flow, intro.as_deref()),
    }
}

// ── Output helpers (raw mode needs explicit carriage returns) ──

fn say(msg: &str) {
    print!("{msg}\r\n");
}

fn announce_plan(plan: &PlacementPlan, decision: LoadDecision) {
    match decision {
        LoadDecision::Normal { index } => say(&format!("── Level {index} ──")),
        LoadDecision::BossArena { boss_id, .. } => say(&format!("── Boss arena: {boss_id} ──")),
    }

    let walls = plan
        .spawns
        .iter()
        .filter(|s| matches!(s.kind, SpawnKind::Cell(k) if k.is_solid()))
        .count();
    let enemies = plan
        .spawns
        .iter()
        .filter(|s| matches!(s.kind, SpawnKind::Cell(k) if k.is_enemy()))
        .count();
    let hazards = plan
        .spawns
        .iter()
        .filter(|s| matches!(s.kind, SpawnKind::Cell(k) if k.is_hazard()))
        .count();
    say(&format!(
        "{} spawns ({walls} walls, {enemies} enemies, {hazards} hazards)",
        plan.spawns.len()
    ));

    if let Some((x, y)) = plan.player_spawn() {
        say(&format!("player enters at ({x:.1}, {y:.1})"));
    }
    if let Some((id, (x, y))) = plan.boss_spawn() {
        say(&format!("{id} waits at ({x:.1}, {y:.1})"));
    }
    for diag in &plan.diagnostics {
        say(&format!("warning: {diag}"));
    }

    match decision {
        LoadDecision::Normal { .. } => say("[F] finish level   [H] vitality   [U] weapon   [Q] quit"),
        LoadDecision::BossArena { .. } => say("[K] defeat boss   [Q] quit"),
    }
}

fn announce_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::LevelFinished { index } => say(&format!("Level {index} finished")),
            GameEvent::BossPending { checkpoint } => {
                say(&format!("Checkpoint {checkpoint}: a boss blocks the way"))
            }
            GameEvent::DecisionMade { path, level } => {
                say(&format!("Ending chosen: {} (level {level})", path.as_str()))
            }
            GameEvent::BossDefeated { boss_id, .. } => say(&format!("{boss_id} defeated")),
            GameEvent::UpgradeApplied { what } => say(&format!("Upgrade applied: {what}")),
        }
    }
}

/// Wait up to `timeout` for a key press. Ctrl-C maps to Esc so the
/// shell always has an exit path in raw mode.
fn poll_key(timeout: Duration) -> std::io::Result<Option<KeyCode>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(Some(KeyCode::Esc));
            }
            // Normalize letters so shifted input still matches.
            Ok(Some(match k.code {
                KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
                other => other,
            }))
        }
        _ => Ok(None),
    }
}
