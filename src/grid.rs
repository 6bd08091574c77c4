use crate::cell::Cell;
use signal_common::{SimError, SimResult, WallSide, Walls};
use std::path::Path;

/// Rectangular grid of cells stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

/// A grid as described by an input file: cell size plus walls.
#[derive(Debug, Clone)]
pub struct GridSpec {
    pub cell_size: f64,
    pub grid: Grid,
}

impl Grid {
    /// Builds a grid from row-major wall codes. `walls.len()` must equal `rows * cols`.
    pub fn from_walls(rows: usize, cols: usize, walls: Vec<Walls>) -> Self {
        assert_eq!(walls.len(), rows * cols, "wall count does not match grid dimensions");
        Self {
            rows,
            cols,
            cells: walls.into_iter().map(Cell::new).collect(),
        }
    }

    /// Grid where every cell has the same walls.
    pub fn uniform(rows: usize, cols: usize, walls: Walls) -> Self {
        Self::from_walls(rows, cols, vec![walls; rows * cols])
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline(always)]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline(always)]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(self.contains(row, col));
        row * self.cols + col
    }

    #[inline(always)]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[self.idx(row, col)]
    }

    #[inline(always)]
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        let idx = self.idx(row, col);
        &mut self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major iterator of `(row, col, cell)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (idx / cols, idx % cols, cell))
    }

    /// Position offset by (`d_row`, `d_col`), or `None` if that falls outside the grid.
    #[inline(always)]
    pub fn neighbor(&self, row: usize, col: usize, d_row: isize, d_col: isize) -> Option<(usize, usize)> {
        let n_row = row.checked_add_signed(d_row)?;
        let n_col = col.checked_add_signed(d_col)?;
        self.contains(n_row, n_col).then_some((n_row, n_col))
    }

    /// Checks that every pair of adjacent cells agrees on the wall between them.
    /// Reports the first mismatch in row-major order.
    pub fn validate(&self) -> SimResult<()> {
        for (row, col, cell) in self.iter() {
            if col + 1 < self.cols {
                let east = self.cell(row, col + 1);
                if cell.walls.east != east.walls.get(WallSide::East.opposite()) {
                    return Err(SimError::WallMismatch {
                        row,
                        col,
                        neighbor_row: row,
                        neighbor_col: col + 1,
                        side: WallSide::East,
                    });
                }
            }
            if row + 1 < self.rows {
                let south = self.cell(row + 1, col);
                if cell.walls.south != south.walls.get(WallSide::South.opposite()) {
                    return Err(SimError::WallMismatch {
                        row,
                        col,
                        neighbor_row: row + 1,
                        neighbor_col: col,
                        side: WallSide::South,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl GridSpec {
    /// Reads a grid description file.
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parses `<cell size> <rows> <cols>` followed by one NESW token per cell.
    /// Tokens are whitespace separated; line breaks carry no meaning.
    pub fn parse(text: &str) -> SimResult<Self> {
        let mut tokens = text
            .lines()
            .enumerate()
            .flat_map(|(line_idx, line)| line.split_whitespace().map(move |token| (line_idx + 1, token)));

        let cell_size: f64 = parse_header_field(tokens.next(), "cell size")?;
        let rows: usize = parse_header_field(tokens.next(), "row count")?;
        let cols: usize = parse_header_field(tokens.next(), "column count")?;

        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::MalformedGrid {
                line: 1,
                reason: format!("cell size must be positive, got {cell_size}"),
            });
        }
        if rows == 0 || cols == 0 {
            return Err(SimError::MalformedGrid {
                line: 1,
                reason: format!("grid dimensions must be positive, got {rows}x{cols}"),
            });
        }

        let mut walls = Vec::with_capacity(rows * cols);
        let mut last_line = 1;
        for idx in 0..rows * cols {
            let Some((line, token)) = tokens.next() else {
                return Err(SimError::MalformedGrid {
                    line: last_line,
                    reason: format!(
                        "expected {} wall tokens, found {} (missing cell ({}, {}))",
                        rows * cols,
                        idx,
                        idx / cols,
                        idx % cols
                    ),
                });
            };
            last_line = line;
            let cell_walls = Walls::from_token(token).ok_or_else(|| SimError::MalformedGrid {
                line,
                reason: format!("wall token '{token}' must be exactly 4 characters"),
            })?;
            walls.push(cell_walls);
        }

        let extra = tokens.count();
        if extra > 0 {
            log::warn!("Ignoring {} trailing tokens after {}x{} grid.", extra, rows, cols);
        }

        log::debug!("Parsed {}x{} grid with cell size {}.", rows, cols, cell_size);
        Ok(Self {
            cell_size,
            grid: Grid::from_walls(rows, cols, walls),
        })
    }
}

fn parse_header_field<T: std::str::FromStr>(token: Option<(usize, &str)>, what: &str) -> SimResult<T> {
    let (line, text) = token.ok_or_else(|| SimError::MalformedGrid {
        line: 1,
        reason: format!("missing {what}"),
    })?;
    text.parse().map_err(|_| SimError::MalformedGrid {
        line,
        reason: format!("invalid {what} '{text}'"),
    })
}
