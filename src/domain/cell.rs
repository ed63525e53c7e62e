/// Cell kinds and the level symbol table.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Wall,        // "1" - static geometry
    Start,       // "S" - player start marker
    End,         // "E" - level exit trigger
    EnemyBasic,  // "X"
    EnemyFast,   // "Y"
    EnemyStrong, // "Z"
    EnemyFlying, // "V"
    Spike,       // "P" - contact hazard
    Unknown,     // anything else; kept so diagnostics can report it
}

impl CellKind {
    /// Map one trimmed cell token to its kind.
    /// Empty string and "0" are background; unrecognized tokens
    /// become `Unknown` instead of being silently dropped.
    pub fn from_token(token: &str) -> CellKind {
        match token {
            "" | "0" => CellKind::Empty,
            "1" => CellKind::Wall,
            "S" => CellKind::Start,
            "E" => CellKind::End,
            "X" => CellKind::EnemyBasic,
            "Y" => CellKind::EnemyFast,
            "Z" => CellKind::EnemyStrong,
            "V" => CellKind::EnemyFlying,
            "P" => CellKind::Spike,
            _ => CellKind::Unknown,
        }
    }

    /// Does this cell produce a spawned entity in the placement plan?
    pub fn is_placeable(self) -> bool {
        !matches!(self, CellKind::Empty | CellKind::Unknown)
    }

    /// Is this one of the four enemy variants?
    pub fn is_enemy(self) -> bool {
        matches!(
            self,
            CellKind::EnemyBasic
                | CellKind::EnemyFast
                | CellKind::EnemyStrong
                | CellKind::EnemyFlying
        )
    }

    /// Static geometry (walls only; spikes are hazards, not floors).
    pub fn is_solid(self) -> bool {
        matches!(self, CellKind::Wall)
    }

    /// Kills or damages the player on contact.
    pub fn is_hazard(self) -> bool {
        matches!(self, CellKind::Spike)
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_table_maps_all_known_tokens() {
        assert_eq!(CellKind::from_token("1"), CellKind::Wall);
        assert_eq!(CellKind::from_token("S"), CellKind::Start);
        assert_eq!(CellKind::from_token("E"), CellKind::End);
        assert_eq!(CellKind::from_token("X"), CellKind::EnemyBasic);
        assert_eq!(CellKind::from_token("Y"), CellKind::EnemyFast);
        assert_eq!(CellKind::from_token("Z"), CellKind::EnemyStrong);
        assert_eq!(CellKind::from_token("V"), CellKind::EnemyFlying);
        assert_eq!(CellKind::from_token("P"), CellKind::Spike);
    }

    #[test]
    fn background_tokens_are_empty() {
        assert_eq!(CellKind::from_token("0"), CellKind::Empty);
        assert_eq!(CellKind::from_token(""), CellKind::Empty);
    }

    #[test]
    fn unrecognized_token_is_unknown_not_empty() {
        assert_eq!(CellKind::from_token("Q"), CellKind::Unknown);
        assert_eq!(CellKind::from_token("boss"), CellKind::Unknown);
    }

    #[test]
    fn placeable_excludes_empty_and_unknown() {
        assert!(CellKind::Wall.is_placeable());
        assert!(CellKind::Spike.is_placeable());
        assert!(!CellKind::Empty.is_placeable());
        assert!(!CellKind::Unknown.is_placeable());
    }
}
