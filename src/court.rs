//! The court: the grid that locked pieces stack up in.

use crate::piece::PieceKind;

/// Width of the court in cells.
pub const COURT_WIDTH: usize = 15;
/// Height of the court in cells.
pub const COURT_HEIGHT: usize = 15;

type Row = [Option<PieceKind>; COURT_WIDTH];

/// `COURT_WIDTH` × `COURT_HEIGHT` cells, row 0 at the top.
///
/// Coordinates are signed because pieces may hang off the grid while they
/// are being tested; reads outside the grid return `None` and writes outside
/// it are dropped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Court {
    rows: [Row; COURT_HEIGHT],
}

impl Default for Court {
    fn default() -> Self {
        Self::new()
    }
}

impl Court {
    pub const WIDTH: i32 = COURT_WIDTH as i32;
    pub const HEIGHT: i32 = COURT_HEIGHT as i32;

    pub const fn new() -> Self {
        Self {
            rows: [[None; COURT_WIDTH]; COURT_HEIGHT],
        }
    }

    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let col = usize::try_from(x).ok().filter(|&c| c < COURT_WIDTH)?;
        let row = usize::try_from(y).ok().filter(|&r| r < COURT_HEIGHT)?;
        Some((col, row))
    }

    pub fn get(&self, x: i32, y: i32) -> Option<PieceKind> {
        Self::index(x, y).and_then(|(col, row)| self.rows[row][col])
    }

    /// Store `kind` at `(x, y)`. Returns `false` if the cell is off the grid.
    pub fn set(&mut self, x: i32, y: i32, kind: Option<PieceKind>) -> bool {
        match Self::index(x, y) {
            Some((col, row)) => {
                self.rows[row][col] = kind;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rows = [[None; COURT_WIDTH]; COURT_HEIGHT];
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(Option::is_some))
    }

    /// Every filled cell as `(x, y, kind)`, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32, PieceKind)> + '_ {
        self.rows.iter().zip(0..).flat_map(|(row, y)| {
            row.iter()
                .zip(0..)
                .filter_map(move |(cell, x)| cell.map(|kind| (x, y, kind)))
        })
    }

    /// Collapse row `n`: every row above moves down by one and row 0 is
    /// emptied.
    pub fn remove_line(&mut self, n: usize) {
        if n >= COURT_HEIGHT {
            return;
        }
        for y in (1..=n).rev() {
            self.rows[y] = self.rows[y - 1];
        }
        self.rows[0] = [None; COURT_WIDTH];
    }

    /// Remove every complete row, scanning bottom to top, and return how many
    /// were removed.
    ///
    /// After a removal the same index is tested again since the row above
    /// has just moved into it, so stacked complete rows all go in one pass.
    pub fn remove_lines(&mut self) -> u8 {
        let mut removed = 0;
        let mut y = COURT_HEIGHT;
        while y > 0 {
            if self.is_row_complete(y - 1) {
                self.remove_line(y - 1);
                removed += 1;
            } else {
                y -= 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(court: &mut Court, y: i32, kind: PieceKind) {
        for x in 0..Court::WIDTH {
            court.set(x, y, Some(kind));
        }
    }

    #[test]
    fn out_of_bounds_reads_are_empty_and_writes_rejected() {
        let mut court = Court::new();
        assert!(!court.set(-1, 0, Some(PieceKind::T)));
        assert!(!court.set(0, -1, Some(PieceKind::T)));
        assert!(!court.set(Court::WIDTH, 0, Some(PieceKind::T)));
        assert!(!court.set(0, Court::HEIGHT, Some(PieceKind::T)));
        assert!(court.is_empty());
        assert_eq!(court.get(-1, -1), None);
        assert_eq!(court.get(Court::WIDTH, Court::HEIGHT), None);
    }

    #[test]
    fn set_then_get() {
        let mut court = Court::new();
        assert!(court.set(3, 4, Some(PieceKind::L)));
        assert_eq!(court.get(3, 4), Some(PieceKind::L));
        assert!(court.set(3, 4, None));
        assert!(court.is_empty());
    }

    #[test]
    fn single_line_removal_empties_top_row() {
        let mut court = Court::new();
        court.set(2, 0, Some(PieceKind::S));
        court.set(2, 13, Some(PieceKind::J));
        fill_row(&mut court, 14, PieceKind::I);

        assert_eq!(court.remove_lines(), 1);
        assert_eq!(court.get(2, 14), Some(PieceKind::J));
        assert_eq!(court.get(2, 1), Some(PieceKind::S));
        assert_eq!(court.get(2, 0), None);
        assert_eq!(court.occupied_cells().count(), 2);
    }

    #[test]
    fn four_stacked_rows_collapse_in_one_pass() {
        let mut court = Court::new();
        for y in 11..15 {
            fill_row(&mut court, y, PieceKind::O);
        }
        court.set(0, 10, Some(PieceKind::Z));
        assert_eq!(court.remove_lines(), 4);
        assert_eq!(court.get(0, 14), Some(PieceKind::Z));
        assert_eq!(court.occupied_cells().count(), 1);
    }

    #[test]
    fn incomplete_rows_are_kept() {
        let mut court = Court::new();
        fill_row(&mut court, 14, PieceKind::T);
        court.set(7, 14, None);
        assert_eq!(court.remove_lines(), 0);
        assert_eq!(court.occupied_cells().count(), COURT_WIDTH - 1);
    }
}
