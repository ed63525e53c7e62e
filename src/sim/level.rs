/// Level catalog.
///
/// ## Sources (priority order):
///   1. Configured levels directory (individual `.csv` / `.txt` files)
///   2. Built-in embedded levels
///
/// Directory rules:
///   - Any filename containing "boss" (case-insensitive) is excluded
///     from the normal rotation.
///   - Normal levels are ordered lexicographically by filename; that
///     order IS the 1-based campaign level sequence.
///   - The boss arena is one fixed, separately named file (config
///     `boss_file`), the same map for every boss encounter.

use std::path::Path;

use crate::config::GameConfig;

/// Raw level source text plus where it came from.
#[derive(Clone, Debug)]
pub struct LevelSource {
    pub name: String,
    pub text: String,
}

/// All level sources for one campaign, scanned once at startup.
pub struct LevelCatalog {
    normals: Vec<LevelSource>,
    boss_arena: Option<LevelSource>,
}

impl LevelCatalog {
    /// Scan the configured directory; fall back to the embedded set
    /// when it is missing or holds no usable level files.
    pub fn scan(config: &GameConfig) -> LevelCatalog {
        let mut normals = load_from_directory(&config.levels_dir);
        normals.sort_by(|a, b| a.name.cmp(&b.name));

        let boss_arena = load_boss_arena(&config.levels_dir, &config.boss_file);

        if normals.is_empty() {
            let (embedded, embedded_boss) = embedded_levels();
            return LevelCatalog {
                normals: embedded,
                boss_arena: boss_arena.or(Some(embedded_boss)),
            };
        }

        LevelCatalog { normals, boss_arena }
    }

    /// Build a catalog directly from sources (tests, tools).
    #[allow(dead_code)]
    pub fn from_sources(normals: Vec<LevelSource>, boss_arena: Option<LevelSource>) -> Self {
        LevelCatalog { normals, boss_arena }
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    /// Source text for a 1-based campaign level index.
    ///
    /// Indices past the end clamp to the last level, so a finished
    /// campaign replays its final map instead of dying.
    pub fn normal(&self, index: u32) -> Option<&LevelSource> {
        if self.normals.is_empty() {
            return None;
        }
        let zero_based = (index.max(1) as usize - 1).min(self.normals.len() - 1);
        self.normals.get(zero_based)
    }

    pub fn boss_arena(&self) -> Option<&LevelSource> {
        self.boss_arena.as_ref()
    }
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn is_level_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |e| e == "csv" || e == "txt")
}

fn load_from_directory(dir: &Path) -> Vec<LevelSource> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return results,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_level_file(&path) {
            continue;
        }
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        // Boss maps never join the normal rotation.
        if name.to_lowercase().contains("boss") {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => results.push(LevelSource { name, text }),
            Err(e) => eprintln!("Warning: could not read level {}: {e}", path.display()),
        }
    }

    results
}

fn load_boss_arena(dir: &Path, boss_file: &str) -> Option<LevelSource> {
    let path = dir.join(boss_file);
    match std::fs::read_to_string(&path) {
        Ok(text) => Some(LevelSource {
            name: boss_file.to_string(),
            text,
        }),
        Err(_) => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> (Vec<LevelSource>, LevelSource) {
    let normals = vec![
        make_embedded("level01 - First Steps", &[
            "0,0,0,0,0,0,0,0,0,0",
            "0,0,0,0,0,0,0,0,0,0",
            "0,0,0,1,1,0,0,X,0,0",
            "S,0,0,0,0,0,1,1,1,E",
            "1,1,1,1,P,1,1,1,1,1",
        ]),
        make_embedded("level02 - Spike Run", &[
            "0,0,0,0,0,0,0,0,0,0,0,0",
            "0,0,1,1,0,0,0,Y,0,0,0,0",
            "S,0,0,0,0,1,1,1,1,0,0,E",
            "1,1,1,P,P,1,1,1,1,P,1,1",
        ]),
        make_embedded("level03 - The Climb", &[
            "0,0,0,0,0,0,0,0,0,E",
            "0,0,0,0,0,0,1,1,1,1",
            "0,0,0,V,0,0,0,0,0,0",
            "0,0,1,1,1,0,0,Z,0,0",
            "S,0,0,0,0,0,1,1,1,0",
            "1,1,1,1,P,P,1,1,1,1",
        ]),
    ];

    let boss = make_embedded("boss_arena (embedded)", &[
        "1,0,0,0,0,0,0,0,0,0,0,1",
        "1,0,0,0,0,0,0,0,0,0,0,1",
        "1,0,0,0,0,0,0,0,0,0,0,1",
        "1,1,1,1,1,1,1,1,1,1,1,1",
    ]);

    (normals, boss)
}

fn make_embedded(name: &str, rows: &[&str]) -> LevelSource {
    LevelSource {
        name: name.to_string(),
        text: rows.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::LevelGrid;
    use std::path::PathBuf;

    fn temp_levels_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gridspire_levels_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_for(dir: &Path) -> GameConfig {
        let mut config = GameConfig::default();
        config.levels_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn directory_scan_orders_lexicographically_and_skips_boss_files() {
        let dir = temp_levels_dir("scan");
        std::fs::write(dir.join("level02.csv"), "S,E").unwrap();
        std::fs::write(dir.join("level01.csv"), "S,0,E").unwrap();
        std::fs::write(dir.join("level10_BOSS_rush.csv"), "1,1").unwrap();
        std::fs::write(dir.join("boss_arena.csv"), "1,0,0,0\n1,1,1,1").unwrap();
        std::fs::write(dir.join("notes.md"), "not a level").unwrap();

        let catalog = LevelCatalog::scan(&config_for(&dir));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.normal(1).unwrap().name, "level01.csv");
        assert_eq!(catalog.normal(2).unwrap().name, "level02.csv");
        assert!(catalog.boss_arena().is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn out_of_range_index_clamps_to_last_level() {
        let dir = temp_levels_dir("clamp");
        std::fs::write(dir.join("a.csv"), "S,E").unwrap();
        std::fs::write(dir.join("b.csv"), "S,0,E").unwrap();

        let catalog = LevelCatalog::scan(&config_for(&dir));
        assert_eq!(catalog.normal(99).unwrap().name, "b.csv");
        assert_eq!(catalog.normal(0).unwrap().name, "a.csv");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_falls_back_to_embedded_set() {
        let mut config = GameConfig::default();
        config.levels_dir = PathBuf::from("/nonexistent/gridspire_levels");

        let catalog = LevelCatalog::scan(&config);
        assert!(!catalog.is_empty());
        assert!(catalog.boss_arena().is_some());

        // Embedded maps must actually parse with a start and an end.
        for index in 1..=catalog.len() as u32 {
            let grid = LevelGrid::parse(&catalog.normal(index).unwrap().text);
            assert!(grid.start_position().is_some(), "level {index} has no start");
            assert!(grid.unknown_tokens().is_empty());
        }
    }
}
