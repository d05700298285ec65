//! The crossword grid: a matrix of cells holding letters, black separators
//! or void (non-playable) areas, together with the bookkeeping the solvers
//! rely on: per-cell candidate sets, black-cell densities, reference
//! counters for overlapping writes, and mask extraction.

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::letter_set::LetterSet;
use crate::{Letter, Word, MAX_GRID_SIZE, WILDCARD};

/// The three cell states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellKind {
    Letter,
    Black,
    Void,
}

/// Orientation of a word or mask on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Across,
    Down,
}

/// How densely the dynamic solver may pack black cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityMode {
    /// No new black cells at all.
    None,
    /// A new black cell may not touch another unlocked black cell.
    Single,
    /// Unlocked black neighbours allowed on the diagonals only.
    Diag,
    /// At most two unlocked black neighbours, each loosely packed itself.
    Two,
    /// No neighbourhood constraint.
    Any,
}

/// Distances to the nearest black/void cell or grid edge in the four
/// cardinal directions, not counting the probed cell itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// One cell of the grid.
///
/// `value` is the letter code when the cell is a letter (0 = unassigned)
/// and the local black density (number of black cells among the 8
/// neighbours) when the cell is black.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    kind: CellKind,
    value: u8,
    counter: u8,
    fail_counter: u32,
    locked: bool,
    candidates: LetterSet,
    tag: u32,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            kind: CellKind::Letter,
            value: 0,
            counter: 0,
            fail_counter: 0,
            locked: false,
            candidates: LetterSet::full(),
            tag: 0,
        }
    }
}

impl Cell {
    #[must_use]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    #[must_use]
    pub fn is_letter(&self) -> bool {
        self.kind == CellKind::Letter
    }

    #[must_use]
    pub fn is_black(&self) -> bool {
        self.kind == CellKind::Black
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.kind == CellKind::Void
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self, state: bool) {
        self.locked = state;
    }

    /// The letter held by the cell; 0 when empty or not a letter cell.
    #[must_use]
    pub fn letter(&self) -> Letter {
        if self.kind == CellKind::Letter {
            self.value
        } else {
            0
        }
    }

    pub fn make_letter(&mut self) {
        if self.locked {
            return;
        }
        self.kind = CellKind::Letter;
        self.value = 0;
        self.counter = 0;
    }

    pub fn make_black(&mut self) {
        if self.locked {
            return;
        }
        self.kind = CellKind::Black;
        self.value = 0;
        self.counter = 0;
    }

    pub fn make_void(&mut self) {
        if self.locked {
            return;
        }
        self.kind = CellKind::Void;
        self.value = 0;
        self.counter = 0;
    }

    /// Local black density: the number of black cells among the 8
    /// neighbours. Only meaningful for black cells.
    #[must_use]
    pub fn black_density(&self) -> u8 {
        if self.kind == CellKind::Black {
            self.value
        } else {
            0
        }
    }

    fn set_black_density(&mut self, density: u8) {
        if self.kind == CellKind::Black {
            self.value = density;
        }
    }

    /// Write a letter directly, without touching the reference counter.
    /// Locked and non-letter cells are left alone.
    pub fn set_letter(&mut self, letter: Letter) {
        if self.locked || self.kind != CellKind::Letter {
            return;
        }
        self.value = letter;
    }

    /// Write a letter, reference-counting identical re-writes so that
    /// overlapping words can be laid down and removed independently.
    fn write_letter(&mut self, letter: Letter) {
        if self.kind != CellKind::Letter {
            return;
        }
        if self.value == letter && letter != 0 {
            self.counter += 1;
        } else if !self.locked {
            self.value = letter;
            self.counter = 1;
        }
    }

    /// Undo one `write_letter`, erasing the letter once the last writer is
    /// gone.
    fn erase_letter(&mut self) {
        if self.kind != CellKind::Letter {
            return;
        }
        if self.counter > 1 {
            self.counter -= 1;
        } else {
            self.counter = 0;
            if !self.locked {
                self.value = 0;
            }
        }
    }

    #[must_use]
    pub fn candidates(&self) -> LetterSet {
        self.candidates
    }

    pub fn set_candidates(&mut self, candidates: LetterSet) {
        self.candidates = candidates;
    }

    pub fn reset_candidates(&mut self, state: bool) {
        self.candidates.reset(state);
    }

    /// Ordinal of this cell among the unlocked cells, assigned by
    /// [`Grid::lock_content`].
    #[must_use]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    #[must_use]
    pub fn fail_counter(&self) -> u32 {
        self.fail_counter
    }

    pub fn bump_fail_counter(&mut self) {
        self.fail_counter = self.fail_counter.saturating_add(1);
    }

    pub fn reset_fail_counter(&mut self) {
        self.fail_counter = 0;
    }
}

/// A crossword grid of up to 256x256 cells.
pub struct Grid {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
    density_mode: DensityMode,
    num_black: i32,
    num_void: i32,
}

impl Default for Grid {
    fn default() -> Grid {
        Grid {
            cells: Vec::new(),
            width: 0,
            height: 0,
            density_mode: DensityMode::Diag,
            num_black: 0,
            num_void: 0,
        }
    }
}

impl Grid {
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub fn num_black(&self) -> i32 {
        self.num_black
    }

    #[must_use]
    pub fn num_void(&self) -> i32 {
        self.num_void
    }

    #[must_use]
    pub fn density_mode(&self) -> DensityMode {
        self.density_mode
    }

    pub fn set_density_mode(&mut self, mode: DensityMode) {
        self.density_mode = mode;
    }

    /// Resize the grid. Existing content is discarded.
    pub fn grow(&mut self, width: u16, height: u16) {
        let width = (width as i32).min(MAX_GRID_SIZE as i32);
        let height = (height as i32).min(MAX_GRID_SIZE as i32);

        self.cells = vec![Cell::default(); (width * height) as usize];
        self.width = width;
        self.height = height;
        self.num_black = 0;
        self.num_void = 0;
    }

    /// Cell at (x, y); `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(&self.cells[(y * self.width + x) as usize])
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(&mut self.cells[(y * self.width + x) as usize])
    }

    /// Reset every unlocked cell to an empty letter cell with fresh
    /// candidates, and recount black/void cells (locked content stays).
    pub fn erase(&mut self) {
        self.num_black = 0;
        self.num_void = 0;

        for cell in &mut self.cells {
            cell.make_letter();
            if !cell.locked {
                cell.reset_candidates(true);
                cell.reset_fail_counter();
            }
            match cell.kind {
                CellKind::Black => self.num_black += 1,
                CellKind::Void => self.num_void += 1,
                CellKind::Letter => {}
            }
        }
    }

    /// Lock every non-empty cell and tag the remaining (unlocked) cells
    /// with their row-major ordinal, used by the dynamic solver's
    /// progressive black-cell budget.
    pub fn lock_content(&mut self) {
        let mut count = 0u32;
        self.num_black = 0;
        self.num_void = 0;

        for cell in &mut self.cells {
            if !cell.is_letter() || cell.letter() != 0 {
                cell.lock(true);
                match cell.kind {
                    CellKind::Black => self.num_black += 1,
                    CellKind::Void => self.num_void += 1,
                    CellKind::Letter => {}
                }
            } else {
                cell.lock(false);
                cell.tag = count;
                count += 1;
            }
        }
    }

    pub fn unlock(&mut self) {
        for cell in &mut self.cells {
            cell.lock(false);
        }
    }

    /// Turn (x, y) into a black cell, or bump its reference counter when it
    /// already is one. Each `add_bloc` must be matched by a `remove_bloc`
    /// before the cell actually reverts.
    pub fn add_bloc(&mut self, x: i32, y: i32) {
        let Some(cell) = self.cell(x, y) else {
            return;
        };
        if cell.locked {
            return;
        }

        if cell.is_black() {
            self.cells[(y * self.width + x) as usize].counter += 1;
            return;
        }

        {
            let cell = &mut self.cells[(y * self.width + x) as usize];
            cell.make_black();
            cell.counter = 1;
        }
        self.num_black += 1;

        let mut density = 0u8;
        for (dx, dy) in NEIGHBOURS {
            if let Some(neighbour) = self.cell_mut(x + dx, y + dy) {
                if neighbour.is_black() {
                    let bumped = neighbour.black_density() + 1;
                    neighbour.set_black_density(bumped);
                    density += 1;
                }
            }
        }
        self.cells[(y * self.width + x) as usize].set_black_density(density);
    }

    /// Undo one `add_bloc` at (x, y).
    pub fn remove_bloc(&mut self, x: i32, y: i32) {
        let Some(cell) = self.cell(x, y) else {
            return;
        };
        if cell.locked || !cell.is_black() {
            return;
        }

        if cell.counter > 1 {
            self.cells[(y * self.width + x) as usize].counter -= 1;
            return;
        }

        self.cells[(y * self.width + x) as usize].make_letter();
        self.num_black -= 1;

        for (dx, dy) in NEIGHBOURS {
            if let Some(neighbour) = self.cell_mut(x + dx, y + dy) {
                if neighbour.is_black() {
                    let dropped = neighbour.black_density().saturating_sub(1);
                    neighbour.set_black_density(dropped);
                }
            }
        }
    }

    /// Lay a word on the grid starting at (x, y), followed by a black cell
    /// at the trailing position when it is inside the grid.
    pub fn add_word(&mut self, x: i32, y: i32, direction: Direction, word: &[Letter]) {
        let (step_x, step_y) = match direction {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        };

        for (i, &letter) in word.iter().enumerate() {
            let (cx, cy) = (x + step_x * i as i32, y + step_y * i as i32);
            match self.cell_mut(cx, cy) {
                Some(cell) => cell.write_letter(letter),
                None => return,
            }
        }

        let end = word.len() as i32;
        self.add_bloc(x + step_x * end, y + step_y * end);
    }

    /// Reverse of `add_word`: walk from (x, y), releasing each letter and
    /// finally the trailing black cell.
    pub fn remove_word(&mut self, x: i32, y: i32, direction: Direction) {
        let (step_x, step_y) = match direction {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        };

        let (mut cx, mut cy) = (x, y);
        loop {
            let Some(cell) = self.cell_mut(cx, cy) else {
                return;
            };
            if cell.is_letter() {
                cell.erase_letter();
            } else {
                self.remove_bloc(cx, cy);
                return;
            }
            cx += step_x;
            cy += step_y;
        }
    }

    /// Extract the mask of the slot covering (x, y) in the given direction:
    /// each cell's letter, or [`WILDCARD`] when empty, bounded by
    /// black/void cells or the grid edge. With `go_back` the walk first
    /// retreats to the start of the slot; the number of cells walked back
    /// is returned alongside the mask.
    #[must_use]
    pub fn build_mask(&self, x: i32, y: i32, direction: Direction, go_back: bool) -> (Word, usize) {
        let (step_x, step_y) = match direction {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        };

        let (mut cx, mut cy) = (x, y);
        let mut offset = 0usize;

        if go_back {
            while cx - step_x >= 0 && cy - step_y >= 0 {
                let (px, py) = (cx - step_x, cy - step_y);
                match self.cell(px, py) {
                    Some(cell) if !cell.is_black() && !cell.is_void() => {
                        cx = px;
                        cy = py;
                        offset += 1;
                    }
                    _ => break,
                }
            }
        }

        let mut mask = Word::new();
        while let Some(cell) = self.cell(cx, cy) {
            if cell.is_black() || cell.is_void() {
                break;
            }
            let letter = cell.letter();
            mask.push(if letter == 0 { WILDCARD } else { letter });
            cx += step_x;
            cy += step_y;
        }

        (mask, offset)
    }

    /// Can a black cell be placed at (x, y) under the current density mode?
    ///
    /// Besides the per-mode neighbourhood rules, every mode rejects a
    /// placement that would complete a diamond of four black cells around a
    /// letter cell already enclosed on the two remaining sides, which would
    /// strand that cell in an unfillable hole.
    #[must_use]
    pub fn check_bloc_density(&self, x: i32, y: i32) -> bool {
        let Some(cell) = self.cell(x, y) else {
            return false;
        };
        if cell.is_black() {
            return true;
        }
        if cell.is_letter() && cell.letter() != 0 {
            return false;
        }

        let mut good = true;
        match self.density_mode {
            DensityMode::None => {
                good = cell.locked && cell.is_black();
            }

            DensityMode::Single => {
                for (dx, dy) in NEIGHBOURS {
                    if let Some(neighbour) = self.cell(x + dx, y + dy) {
                        if neighbour.is_black() && !neighbour.is_locked() {
                            good = false;
                            break;
                        }
                    }
                }
            }

            DensityMode::Diag => {
                for (dx, dy) in NEIGHBOURS {
                    if let Some(neighbour) = self.cell(x + dx, y + dy) {
                        if neighbour.is_black() && !neighbour.is_locked() && (dx == 0 || dy == 0) {
                            good = false;
                            break;
                        }
                    }
                }
            }

            DensityMode::Two => {
                let mut count = 0;
                for (dx, dy) in NEIGHBOURS {
                    if let Some(neighbour) = self.cell(x + dx, y + dy) {
                        if neighbour.is_black() && !neighbour.is_locked() {
                            count += 1;
                            if count > 2 || neighbour.black_density() >= 2 {
                                good = false;
                                break;
                            }
                        }
                    }
                }
            }

            DensityMode::Any => {}
        }

        if good {
            good = !self.closes_diamond(x, y);
        }
        good
    }

    /// Off-grid positions count as black when probing the diamond pattern.
    fn blackish(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(true, Cell::is_black)
    }

    /// Would a black cell at (x, y) complete the pattern
    /// ```text
    /// . * .
    /// * L *
    /// . * .
    /// ```
    /// where the centre letter cell has black cells (or edges) on the four
    /// diagonal corners and on the two remaining opposite sides?
    fn closes_diamond(&self, x: i32, y: i32) -> bool {
        let p1 = self.blackish(x - 1, y - 1);
        let p2 = self.blackish(x + 1, y - 1);
        let p3 = self.blackish(x + 1, y + 1);
        let p4 = self.blackish(x - 1, y + 1);

        // Closing from the bottom: centre is (x, y-1).
        if p1 && p2 && y >= 1 && !self.blackish(x, y - 1) && self.blackish(x, y - 2) {
            return true;
        }
        // Closing from the right: centre is (x-1, y).
        if p1 && p4 && x >= 1 && !self.blackish(x - 1, y) && self.blackish(x - 2, y) {
            return true;
        }
        // Closing from the left: centre is (x+1, y).
        if p2 && p3 && x < self.width - 1 && !self.blackish(x + 1, y) && self.blackish(x + 2, y) {
            return true;
        }
        // Closing from the top: centre is (x, y+1).
        if p3 && p4 && y < self.height - 1 && !self.blackish(x, y + 1) && self.blackish(x, y + 2) {
            return true;
        }
        false
    }

    /// Free room around (x, y) in the four cardinal directions. The probed
    /// position itself is not counted and may sit just outside the grid.
    #[must_use]
    pub fn get_space(&self, x: i32, y: i32) -> Space {
        let mut distances = [0i32; 4];
        let steps = [(0, 1), (1, 0), (0, -1), (-1, 0)];

        for (i, (dx, dy)) in steps.iter().enumerate() {
            let (mut px, mut py) = (x, y);
            loop {
                px += dx;
                py += dy;
                match self.cell(px, py) {
                    Some(cell) if !cell.is_black() && !cell.is_void() => distances[i] += 1,
                    _ => break,
                }
            }
        }

        Space {
            bottom: distances[0],
            right: distances[1],
            top: distances[2],
            left: distances[3],
        }
    }

    /// Percentage of non-void cells holding a letter or a black cell.
    #[must_use]
    pub fn fill_rate(&self) -> i32 {
        let mut filled = 0i32;
        let mut void = 0i32;

        for cell in &self.cells {
            match cell.kind {
                CellKind::Black => filled += 1,
                CellKind::Letter => {
                    if cell.value != 0 {
                        filled += 1;
                    }
                }
                CellKind::Void => void += 1,
            }
        }

        let total = self.width * self.height - void;
        if total <= 0 {
            return 100;
        }
        100 * filled / total
    }

    /// Render the content as one line per row: letters as uppercase ASCII
    /// (codes beyond 26 as `?`), empty cells `.`, black `#`, void `-`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[(y * self.width + x) as usize];
                let ch = match cell.kind {
                    CellKind::Black => '#',
                    CellKind::Void => '-',
                    CellKind::Letter => match cell.value {
                        0 => '.',
                        v if v <= 26 => (b'A' + v - 1) as char,
                        _ => '?',
                    },
                };
                out.push(ch);
            }
            if y < self.height - 1 {
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn letters(s: &str) -> Vec<Letter> {
        s.bytes().map(|b| b - b'a' + 1).collect()
    }

    fn grid(width: u16, height: u16) -> Grid {
        let mut grid = Grid::default();
        grid.grow(width, height);
        grid
    }

    #[test]
    fn test_grow_and_bounds() {
        let grid = grid(3, 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert!(grid.cell(0, 0).is_some());
        assert!(grid.cell(2, 1).is_some());
        assert!(grid.cell(3, 0).is_none());
        assert!(grid.cell(0, 2).is_none());
        assert!(grid.cell(-1, 0).is_none());
    }

    #[test]
    fn test_add_remove_bloc_is_reversible() {
        let mut grid = grid(3, 3);
        let before = grid.render();

        grid.add_bloc(1, 1);
        assert!(grid.cell(1, 1).unwrap().is_black());
        assert_eq!(grid.num_black(), 1);

        grid.remove_bloc(1, 1);
        assert_eq!(grid.render(), before);
        assert_eq!(grid.num_black(), 0);
        assert!(grid.cell(1, 1).unwrap().is_letter());
    }

    #[test]
    fn test_bloc_reference_counting() {
        let mut grid = grid(3, 3);

        grid.add_bloc(0, 0);
        grid.add_bloc(0, 0);
        grid.remove_bloc(0, 0);
        assert!(grid.cell(0, 0).unwrap().is_black());
        grid.remove_bloc(0, 0);
        assert!(grid.cell(0, 0).unwrap().is_letter());
    }

    #[test]
    fn test_bloc_density_tracking() {
        let mut grid = grid(3, 3);

        grid.add_bloc(0, 0);
        grid.add_bloc(1, 1);
        assert_eq!(grid.cell(0, 0).unwrap().black_density(), 1);
        assert_eq!(grid.cell(1, 1).unwrap().black_density(), 1);

        grid.add_bloc(2, 2);
        assert_eq!(grid.cell(1, 1).unwrap().black_density(), 2);

        grid.remove_bloc(0, 0);
        assert_eq!(grid.cell(1, 1).unwrap().black_density(), 1);
    }

    #[test]
    fn test_add_remove_word_is_reversible() {
        let mut grid = grid(4, 3);
        let before = grid.render();

        grid.add_word(0, 1, Direction::Across, &letters("cat"));
        assert_eq!(grid.render(), "....\nCAT#\n....");
        assert!(grid.cell(3, 1).unwrap().is_black());

        grid.remove_word(0, 1, Direction::Across);
        assert_eq!(grid.render(), before);
        assert_eq!(grid.num_black(), 0);
    }

    #[test]
    fn test_overlapping_identical_letters_are_refcounted() {
        let mut grid = grid(3, 3);

        grid.add_word(0, 0, Direction::Across, &letters("cat"));
        grid.add_word(0, 0, Direction::Down, &letters("cow"));

        // Removing the vertical word must leave the shared 'c'.
        grid.remove_word(0, 0, Direction::Down);
        assert_eq!(grid.cell(0, 0).unwrap().letter(), 3);

        grid.remove_word(0, 0, Direction::Across);
        assert_eq!(grid.cell(0, 0).unwrap().letter(), 0);
    }

    #[test]
    fn test_word_reaching_the_edge_has_no_terminator() {
        let mut grid = grid(3, 1);
        grid.add_word(0, 0, Direction::Across, &letters("cat"));
        assert_eq!(grid.render(), "CAT");
        assert_eq!(grid.num_black(), 0);
    }

    #[test]
    fn test_locked_cells_resist_mutation() {
        let mut grid = grid(3, 1);
        grid.add_word(0, 0, Direction::Across, &letters("cat"));
        grid.lock_content();

        grid.add_word(0, 0, Direction::Across, &letters("dog"));
        assert_eq!(grid.render(), "CAT");

        grid.add_bloc(1, 0);
        assert!(grid.cell(1, 0).unwrap().is_letter());

        grid.erase();
        assert_eq!(grid.render(), "CAT");

        grid.unlock();
        grid.erase();
        assert_eq!(grid.render(), "...");
    }

    #[test]
    fn test_lock_content_tags_unlocked_cells() {
        let mut grid = grid(3, 2);
        grid.cell_mut(1, 0).unwrap().make_black();
        grid.lock_content();

        assert_eq!(grid.cell(0, 0).unwrap().tag(), 0);
        assert_eq!(grid.cell(2, 0).unwrap().tag(), 1);
        assert_eq!(grid.cell(0, 1).unwrap().tag(), 2);
        assert_eq!(grid.cell(2, 1).unwrap().tag(), 4);
        assert_eq!(grid.num_black(), 1);
    }

    #[test]
    fn test_build_mask() {
        let mut grid = grid(5, 1);
        grid.cell_mut(3, 0).unwrap().make_black();
        grid.cell_mut(1, 0).unwrap().write_letter(1);

        let (mask, back) = grid.build_mask(0, 0, Direction::Across, false);
        assert_eq!(mask.as_slice(), &[WILDCARD, 1, WILDCARD]);
        assert_eq!(back, 0);

        let (mask, back) = grid.build_mask(2, 0, Direction::Across, true);
        assert_eq!(mask.as_slice(), &[WILDCARD, 1, WILDCARD]);
        assert_eq!(back, 2);

        let (mask, _) = grid.build_mask(4, 0, Direction::Across, true);
        assert_eq!(mask.as_slice(), &[WILDCARD]);
    }

    #[test]
    fn test_build_mask_vertical() {
        let mut grid = grid(1, 4);
        grid.add_word(0, 1, Direction::Down, &letters("ab"));

        let (mask, back) = grid.build_mask(0, 2, Direction::Down, true);
        assert_eq!(mask.as_slice(), &[WILDCARD, 1, 2]);
        assert_eq!(back, 2);
    }

    #[test]
    fn test_density_none() {
        let mut grid = grid(3, 3);
        grid.set_density_mode(DensityMode::None);
        assert!(!grid.check_bloc_density(1, 1));

        // A locked black cell stays acceptable.
        grid.cell_mut(0, 0).unwrap().make_black();
        grid.lock_content();
        assert!(grid.check_bloc_density(0, 0));
    }

    #[test]
    fn test_density_single() {
        let mut grid = grid(4, 4);
        grid.set_density_mode(DensityMode::Single);
        grid.add_bloc(0, 0);

        assert!(!grid.check_bloc_density(1, 1));
        assert!(!grid.check_bloc_density(1, 0));
        assert!(grid.check_bloc_density(2, 2));
    }

    #[test]
    fn test_density_diag() {
        let mut grid = grid(4, 4);
        grid.set_density_mode(DensityMode::Diag);
        grid.add_bloc(1, 1);

        assert!(grid.check_bloc_density(2, 2));
        assert!(grid.check_bloc_density(0, 0));
        assert!(!grid.check_bloc_density(1, 2));
        assert!(!grid.check_bloc_density(2, 1));
    }

    #[test]
    fn test_density_two() {
        let mut grid = grid(5, 5);
        grid.set_density_mode(DensityMode::Two);
        grid.add_bloc(0, 2);

        assert!(grid.check_bloc_density(1, 2));
        grid.add_bloc(1, 2);
        grid.add_bloc(2, 2);

        // (1,2) already packs two black neighbours.
        assert!(!grid.check_bloc_density(0, 3));
        // Three black neighbours at once is over the limit.
        assert!(!grid.check_bloc_density(1, 1));
        assert!(grid.check_bloc_density(4, 0));
    }

    #[test]
    fn test_density_locked_blacks_are_ignored() {
        let mut grid = grid(4, 4);
        grid.cell_mut(0, 0).unwrap().make_black();
        grid.lock_content();
        grid.set_density_mode(DensityMode::Single);

        assert!(grid.check_bloc_density(1, 1));
    }

    #[test]
    fn test_density_rejects_occupied_cells() {
        let mut grid = grid(3, 3);
        grid.set_density_mode(DensityMode::Any);
        grid.add_word(0, 0, Direction::Across, &letters("ca"));

        assert!(!grid.check_bloc_density(0, 0));
        assert!(grid.check_bloc_density(0, 1));
        assert!(!grid.check_bloc_density(-1, 0));
    }

    #[test]
    fn test_anti_diamond_rejected() {
        // Placing at (2,2) would strand the letter cell at (2,1):
        //   . . # . .
        //   . # . # .
        //   . . x . .
        let mut grid = grid(5, 5);
        grid.set_density_mode(DensityMode::Any);
        grid.add_bloc(1, 1);
        grid.add_bloc(3, 1);
        grid.add_bloc(2, 0);

        assert!(!grid.check_bloc_density(2, 2));

        grid.remove_bloc(2, 0);
        assert!(grid.check_bloc_density(2, 2));
    }

    #[test]
    fn test_anti_diamond_uses_grid_edge_as_black() {
        // Corners above row 0 count as black, so (0,1)+(2,1) blacks with an
        // empty (1,0) against the top edge... the pattern needs (1,-1)
        // black, which the edge provides.
        let mut grid = grid(5, 5);
        grid.set_density_mode(DensityMode::Any);
        grid.add_bloc(0, 0);
        grid.add_bloc(2, 0);

        assert!(!grid.check_bloc_density(1, 1));
    }

    #[test]
    fn test_density_mode_monotonicity() {
        // Acceptance grows from None through Single and Diag to Any, and
        // Two sits inside Any: a cell rejected by a looser mode must be
        // rejected by every stricter one.
        let mut grid = grid(6, 6);
        grid.add_bloc(1, 1);
        grid.add_bloc(2, 2);
        grid.add_bloc(4, 1);
        grid.cell_mut(5, 5).unwrap().make_void();
        grid.add_word(0, 4, Direction::Across, &letters("ab"));

        for y in -1..=6 {
            for x in -1..=6 {
                let mut accepted = [false; 5];
                let modes = [
                    DensityMode::None,
                    DensityMode::Single,
                    DensityMode::Diag,
                    DensityMode::Two,
                    DensityMode::Any,
                ];
                for (i, mode) in modes.into_iter().enumerate() {
                    grid.set_density_mode(mode);
                    accepted[i] = grid.check_bloc_density(x, y);
                }

                let [none, single, diag, two, any] = accepted;
                assert!(!none || single, "None <= Single violated at ({x},{y})");
                assert!(!single || diag, "Single <= Diag violated at ({x},{y})");
                assert!(!diag || any, "Diag <= Any violated at ({x},{y})");
                assert!(!two || any, "Two <= Any violated at ({x},{y})");
            }
        }
    }

    #[test]
    fn test_get_space() {
        let mut grid = grid(5, 5);
        grid.add_bloc(1, 2);
        grid.add_bloc(2, 4);

        let space = grid.get_space(2, 2);
        assert_eq!(
            space,
            Space {
                left: 0,
                right: 2,
                top: 2,
                bottom: 1,
            }
        );
    }

    #[test]
    fn test_get_space_outside_grid() {
        let grid = grid(3, 3);
        let space = grid.get_space(-1, 0);
        assert_eq!(space.right, 3);
        assert_eq!(space.left, 0);
    }

    #[test]
    fn test_fill_rate() {
        let mut grid = grid(2, 2);
        assert_eq!(grid.fill_rate(), 0);

        grid.cell_mut(0, 1).unwrap().make_void();
        grid.lock_content();
        assert_eq!(grid.fill_rate(), 0);

        grid.add_bloc(0, 0);
        assert_eq!(grid.fill_rate(), 33);

        grid.add_word(1, 0, Direction::Down, &letters("ab"));
        assert_eq!(grid.fill_rate(), 100);
    }

    #[test]
    fn test_render_kinds() {
        let mut grid = grid(3, 2);
        grid.cell_mut(0, 0).unwrap().make_black();
        grid.cell_mut(1, 0).unwrap().make_void();
        grid.cell_mut(0, 1).unwrap().write_letter(1);
        grid.cell_mut(1, 1).unwrap().write_letter(2);

        assert_eq!(
            grid.render(),
            indoc! {"
                #-.
                AB."}
        );
    }
}
