/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub levels_dir: PathBuf,
    /// Filename of the single canonical boss arena inside `levels_dir`.
    pub boss_file: String,
    /// Directory holding intro/ending illustrations (intro<N>.png, ...).
    pub cinematics_dir: PathBuf,
    pub save_file: PathBuf,
    pub grid: GridConfig,
    pub player: PlayerTuning,
    pub flow: FlowConfig,
}

#[derive(Clone, Copy, Debug)]
pub struct GridConfig {
    /// World units per grid cell; cell (x, y) lands at (x * size, y * size).
    pub cell_size: f32,
}

/// Base stats plus the per-upgrade increments used to derive
/// max health and weapon damage from the progression record.
#[derive(Clone, Copy, Debug)]
pub struct PlayerTuning {
    pub base_health: i32,
    pub health_step: i32,
    pub base_weapon_damage: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct FlowConfig {
    pub tick_rate_ms: u64,
    /// Ticks for each fade step of a level transition.
    pub fade_ticks: u32,
    /// Ticks an intro illustration stays on screen before fading out.
    pub intro_hold_ticks: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    flow: TomlFlow,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_boss_file")]
    boss_file: String,
    #[serde(default = "default_cinematics_dir")]
    cinematics_dir: String,
    #[serde(default = "default_save_file")]
    save_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_cell_size")]
    cell_size: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_base_health")]
    base_health: i32,
    #[serde(default = "default_health_step")]
    health_step: i32,
    #[serde(default = "default_base_weapon_damage")]
    base_weapon_damage: i32,
}

#[derive(Deserialize, Debug)]
struct TomlFlow {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_fade_ticks")]
    fade_ticks: u32,
    #[serde(default = "default_intro_hold")]
    intro_hold_ticks: u32,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_boss_file() -> String { "boss_arena.csv".into() }
fn default_cinematics_dir() -> String { "cinematics".into() }
fn default_save_file() -> String { "progression.json".into() }
fn default_cell_size() -> f32 { 1.0 }
fn default_base_health() -> i32 { 3 }
fn default_health_step() -> i32 { 2 }
fn default_base_weapon_damage() -> i32 { 1 }
fn default_tick_rate() -> u64 { 75 }
fn default_fade_ticks() -> u32 { 8 }     // ~0.5s fade at 75ms tick
fn default_intro_hold() -> u32 { 66 }    // ~5s illustration hold

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            boss_file: default_boss_file(),
            cinematics_dir: default_cinematics_dir(),
            save_file: default_save_file(),
        }
    }
}

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { cell_size: default_cell_size() }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            base_health: default_base_health(),
            health_step: default_health_step(),
            base_weapon_damage: default_base_weapon_damage(),
        }
    }
}

impl Default for TomlFlow {
    fn default() -> Self {
        TomlFlow {
            tick_rate_ms: default_tick_rate(),
            fade_ticks: default_fade_ticks(),
            intro_hold_ticks: default_intro_hold(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        GameConfig {
            levels_dir: resolve_dir(&cfg.general.levels_dir, search_dirs),
            boss_file: cfg.general.boss_file,
            cinematics_dir: resolve_dir(&cfg.general.cinematics_dir, search_dirs),
            save_file: PathBuf::from(cfg.general.save_file),
            grid: GridConfig { cell_size: cfg.grid.cell_size },
            player: PlayerTuning {
                base_health: cfg.player.base_health,
                health_step: cfg.player.health_step,
                base_weapon_damage: cfg.player.base_weapon_damage,
            },
            flow: FlowConfig {
                tick_rate_ms: cfg.flow.tick_rate_ms,
                fade_ticks: cfg.flow.fade_ticks,
                intro_hold_ticks: cfg.flow.intro_hold_ticks,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

/// Resolve a possibly-relative directory against the search dirs.
/// Falls back to CWD-relative if none of the candidates has it.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return path;
    }
    search_dirs
        .iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // Resolve symlinks so an installed binary still finds its data.
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
