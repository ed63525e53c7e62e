/// Level instantiator.
///
/// Turns a parsed grid plus the machine's load decision into a
/// placement plan: the ordered (spawn kind, world position) pairs the
/// external world builder consumes. This module never spawns anything
/// itself and never touches live progression state.
///
/// World mapping: grid cell (x, y) lands at (x * cell_size,
/// y * cell_size); row 0 is ground level.

use thiserror::Error;

use crate::config::GridConfig;
use crate::domain::cell::CellKind;
use crate::domain::grid::LevelGrid;
use crate::sim::level::LevelCatalog;
use crate::sim::progress::LoadDecision;

/// One entry of the placement plan.
#[derive(Clone, PartialEq, Debug)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub position: (f32, f32),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SpawnKind {
    /// A grid cell entity (wall, enemy, spike, start/end markers).
    Cell(CellKind),
    /// Boss spawn directive; the id comes from the selection policy.
    Boss(&'static str),
    /// Where the world builder should place the player.
    PlayerSpawn,
}

/// Output of one build. Diagnostics are recoverable findings
/// (unknown symbols, missing start); the fatal case is `BuildError`.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PlacementPlan {
    pub spawns: Vec<Spawn>,
    pub diagnostics: Vec<String>,
}

impl PlacementPlan {
    pub fn player_spawn(&self) -> Option<(f32, f32)> {
        self.spawns
            .iter()
            .find(|s| s.kind == SpawnKind::PlayerSpawn)
            .map(|s| s.position)
    }

    pub fn boss_spawn(&self) -> Option<(&'static str, (f32, f32))> {
        self.spawns.iter().find_map(|s| match s.kind {
            SpawnKind::Boss(id) => Some((id, s.position)),
            _ => None,
        })
    }
}

/// The one fatal condition: nothing to build. Everything else in this
/// module degrades to a diagnostic plus a fallback.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no level source for index {index} and no boss arena configured")]
    NoLevelSource { index: u32 },
}

/// Build the placement plan for the machine's load decision.
///
/// A requested boss arena that is not configured falls back to the
/// normal level at the return index (with a logged warning); only a
/// completely empty catalog fails.
pub fn build_placement_plan(
    catalog: &LevelCatalog,
    decision: LoadDecision,
    grid_cfg: &GridConfig,
) -> Result<PlacementPlan, BuildError> {
    match decision {
        LoadDecision::Normal { index } => {
            let source = catalog
                .normal(index)
                .ok_or(BuildError::NoLevelSource { index })?;
            Ok(build_normal(&LevelGrid::parse(&source.text), grid_cfg))
        }
        LoadDecision::BossArena {
            boss_id,
            return_index,
        } => match catalog.boss_arena() {
            Some(source) => Ok(build_boss_arena(
                &LevelGrid::parse(&source.text),
                boss_id,
                grid_cfg,
            )),
            None => {
                eprintln!("Warning: no boss arena configured, loading normal level instead");
                let source = catalog
                    .normal(return_index)
                    .ok_or(BuildError::NoLevelSource {
                        index: return_index,
                    })?;
                Ok(build_normal(&LevelGrid::parse(&source.text), grid_cfg))
            }
        },
    }
}

/// Normal mode: every placeable cell becomes a spawn; the player
/// starts at the Start cell.
pub fn build_normal(grid: &LevelGrid, grid_cfg: &GridConfig) -> PlacementPlan {
    let mut plan = PlacementPlan::default();
    place_static_geometry(grid, grid_cfg, &mut plan);

    match grid.start_position() {
        Some((x, y)) => plan.spawns.push(Spawn {
            kind: SpawnKind::PlayerSpawn,
            position: world_pos(x, y, grid_cfg),
        }),
        None => plan.diagnostics.push(
            "no start cell 'S' in level; world builder must place the player".to_string(),
        ),
    }

    plan
}

/// Boss mode: same static geometry, but the grid's start marker does
/// not place the player. The boss holds the bottom-right traversable
/// cell and the player enters two cells to its left.
pub fn build_boss_arena(
    grid: &LevelGrid,
    boss_id: &'static str,
    grid_cfg: &GridConfig,
) -> PlacementPlan {
    let mut plan = PlacementPlan::default();
    place_static_geometry(grid, grid_cfg, &mut plan);

    if grid.width() == 0 || grid.height() == 0 {
        plan.diagnostics
            .push("boss arena grid is empty; no boss placed".to_string());
        return plan;
    }

    let right = grid.width() - 1;
    plan.spawns.push(Spawn {
        kind: SpawnKind::Boss(boss_id),
        position: world_pos(right, 0, grid_cfg),
    });
    plan.spawns.push(Spawn {
        kind: SpawnKind::PlayerSpawn,
        position: world_pos(grid.width().saturating_sub(3), 0, grid_cfg),
    });

    plan
}

fn place_static_geometry(grid: &LevelGrid, grid_cfg: &GridConfig, plan: &mut PlacementPlan) {
    for token in grid.unknown_tokens() {
        plan.diagnostics.push(format!(
            "unknown symbol '{}' at ({}, {})",
            token.token, token.x, token.y
        ));
    }

    for (x, y, kind) in grid.iter_cells() {
        if kind.is_placeable() {
            plan.spawns.push(Spawn {
                kind: SpawnKind::Cell(kind),
                position: world_pos(x, y, grid_cfg),
            });
        }
    }
}

fn world_pos(x: usize, y: usize, grid_cfg: &GridConfig) -> (f32, f32) {
    (x as f32 * grid_cfg.cell_size, y as f32 * grid_cfg.cell_size)
}
