/// Level grid parser.
///
/// ## Source format (one file per level):
///   Rows separated by newlines, columns separated by `,`.
///   Tokens are trimmed before lookup in the symbol table (see cell.rs).
///
/// ## Orientation:
///   Row 0 of the grid is the LAST non-blank line of the source text.
///   Ground level sits at y = 0 and rows grow upward, so a map file
///   reads the same way the level looks in the world.
///
/// Blank lines (after trimming) are skipped entirely and do not
/// consume a row index. Rows shorter than the widest row are padded
/// with `Empty` on the right.

use super::cell::CellKind;

/// Immutable grid value, built once per level load and then discarded.
#[derive(Clone, PartialEq, Debug)]
pub struct LevelGrid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    start_position: Option<(usize, usize)>,
    unknown_tokens: Vec<UnknownToken>,
}

/// An unrecognized token, kept so the instantiator can report it
/// with its coordinates instead of silently dropping it.
#[derive(Clone, PartialEq, Debug)]
pub struct UnknownToken {
    pub x: usize,
    pub y: usize,
    pub token: String,
}

impl LevelGrid {
    /// Parse delimited level text into a grid.
    ///
    /// Never fails: unrecognized tokens become `Unknown` cells and the
    /// rest of the grid still parses. Re-parsing identical text yields
    /// a structurally identical grid.
    pub fn parse(text: &str) -> LevelGrid {
        // Bottom line of the file is row 0, so walk the non-blank
        // lines in reverse to get rows in ascending order.
        let lines: Vec<&str> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();

        let mut rows: Vec<Vec<CellKind>> = Vec::with_capacity(lines.len());
        let mut unknown_tokens = Vec::new();
        let mut start_position = None;

        for (y, line) in lines.iter().rev().enumerate() {
            let mut row = Vec::new();
            for (x, raw) in line.split(',').enumerate() {
                let token = raw.trim();
                let kind = CellKind::from_token(token);
                match kind {
                    CellKind::Start => {
                        // First Start in row-ascending, column-ascending
                        // order wins; extra markers are ambiguous input.
                        if start_position.is_none() {
                            start_position = Some((x, y));
                        }
                    }
                    CellKind::Unknown => {
                        unknown_tokens.push(UnknownToken {
                            x,
                            y,
                            token: token.to_string(),
                        });
                    }
                    _ => {}
                }
                row.push(kind);
            }
            rows.push(row);
        }

        let height = rows.len();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);

        let mut cells = vec![CellKind::Empty; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, kind) in row.iter().enumerate() {
                cells[y * width + x] = *kind;
            }
        }

        LevelGrid {
            width,
            height,
            cells,
            start_position,
            unknown_tokens,
        }
    }

    /// Max column count across all non-blank rows.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of non-blank rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y). Out of bounds reads as `Empty`.
    pub fn cell(&self, x: usize, y: usize) -> CellKind {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            CellKind::Empty
        }
    }

    /// Position of the Start cell, if the level has one.
    pub fn start_position(&self) -> Option<(usize, usize)> {
        self.start_position
    }

    /// Unrecognized tokens encountered during parsing.
    pub fn unknown_tokens(&self) -> &[UnknownToken] {
        &self.unknown_tokens
    }

    /// Iterate all cells in row-ascending, column-ascending order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, CellKind)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.cell(x, y)))
        })
    }
}
