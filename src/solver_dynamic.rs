//! Backtracking solver that shapes the black-cell layout while it fills.
//!
//! The grid is consumed left-to-right, top-to-bottom: each step finds the
//! first empty cell, then runs a small state machine that picks a word
//! length, looks for a word of that length, and falls back to shorter
//! lengths (or finally to a lone black cell) when the current choice cannot
//! be completed. Every word ends with a black cell (or the grid edge), so the
//! layout emerges from the words themselves, constrained by the density
//! mode, a progressive black-cell budget, and a look-around check that a
//! new black cell never strands a neighbouring region.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dictionary::Dictionary;
use crate::grid::{DensityMode, Direction, Grid, Space};
use crate::letter_set::LetterSet;
use crate::solver::{change_item_word, Status};
use crate::{Word, WILDCARD};

/// A word (or a lone black cell) placed on the grid during the search.
#[derive(Default)]
struct DynamicItem {
    x: i32,
    y: i32,
    length: usize,
    /// First length tried for this slot; reaching it again means every
    /// length has been attempted.
    length_first_word: usize,
    word: Word,
    first_word: Word,
    best_pos: i32,
    is_block: bool,
    candidates: Vec<LetterSet>,
}

impl DynamicItem {
    fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.length = 0;
        self.length_first_word = 0;
        self.word.clear();
        self.first_word.clear();
        self.best_pos = -1;
        self.is_block = false;
        self.candidates.clear();
    }

    /// Candidate sets cover the row from the item's origin to the right
    /// edge of the grid, so they stay meaningful across length changes.
    fn load_candidates(&mut self, grid: &Grid) {
        self.candidates.clear();
        let mut x = self.x;
        while let Some(cell) = grid.cell(x, self.y) {
            self.candidates.push(cell.candidates());
            x += 1;
        }
    }

    fn save_candidates(&self, grid: &mut Grid) {
        for (i, &candidates) in self.candidates.iter().enumerate() {
            if let Some(cell) = grid.cell_mut(self.x + i as i32, self.y) {
                cell.set_candidates(candidates);
            }
        }
    }

    fn add_to_grid(&self, grid: &mut Grid) {
        #[cfg(feature = "check_invariants")]
        assert!(
            self.is_block || self.word.len() == self.length,
            "placing a word of the wrong length"
        );

        if self.is_block {
            grid.add_bloc(self.x, self.y);
        } else {
            grid.add_word(self.x, self.y, Direction::Across, &self.word);
        }
    }

    fn remove_from_grid(&self, grid: &mut Grid) {
        if self.is_block {
            grid.remove_bloc(self.x, self.y);
        } else {
            grid.remove_word(self.x, self.y, Direction::Across);
        }
    }

    /// Clear the candidate sets of every cell below the item (trailing
    /// black cell included): the letters that constrained them are about
    /// to change, so they must be re-derived.
    fn reset_candidates_below(&self, grid: &mut Grid) {
        for i in 0..=self.length {
            let x = self.x + i as i32;
            for y in (self.y + 1)..grid.height() {
                if let Some(cell) = grid.cell_mut(x, y) {
                    cell.reset_candidates(true);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FsmStep {
    ChooseLength,
    ChangeWord,
    ChangeLength,
    ChangeBlock,
    Done,
    Failed,
}

/// Dynamic-layout backtracking solver.
pub struct DynamicSolver {
    items_live: Vec<DynamicItem>,
    items_pool: Vec<DynamicItem>,
    steps: u64,
    seed: u64,
    rng: SmallRng,
    heuristic: bool,
    step_back: i32,
    max_black: i32,
    initial_black: i32,
    density_mode: DensityMode,
    running: bool,
}

impl Default for DynamicSolver {
    fn default() -> DynamicSolver {
        DynamicSolver {
            items_live: Vec::new(),
            items_pool: Vec::new(),
            steps: 0,
            seed: 0,
            rng: SmallRng::seed_from_u64(0),
            heuristic: true,
            step_back: 3,
            max_black: -1,
            initial_black: 0,
            density_mode: DensityMode::Diag,
            running: false,
        }
    }
}

impl DynamicSolver {
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn set_heuristic(&mut self, state: bool, step_back: i32) {
        self.heuristic = state;
        self.step_back = step_back;
    }

    /// Cap on the number of black cells the solver may add (-1 = none).
    pub fn set_max_black(&mut self, max_black: i32) {
        self.max_black = max_black;
    }

    pub fn set_density_mode(&mut self, mode: DensityMode) {
        self.density_mode = mode;
    }

    /// Begin a solve: lock the provided content and reset search state.
    pub fn start(&mut self, grid: &mut Grid) {
        self.items_live.clear();
        self.items_pool.clear();
        self.steps = 0;
        self.rng = SmallRng::seed_from_u64(self.seed);

        grid.set_density_mode(self.density_mode);
        grid.lock_content();
        self.initial_black = grid.num_black();
        self.running = true;
    }

    /// Release the grid and drop all search state. Idempotent.
    pub fn stop(&mut self, grid: &mut Grid) {
        grid.unlock();
        self.items_live.clear();
        self.items_pool.clear();
        self.steps = 0;
        self.running = false;
    }

    /// Run the search until it finishes, fails, or exceeds one of the
    /// budgets (-1 disables a budget). `counter` reports the attempts made
    /// during this call.
    pub fn step(
        &mut self,
        grid: &mut Grid,
        dictionary: &Dictionary,
        max_ms: i32,
        max_steps: i32,
    ) -> Status {
        let start_time = Instant::now();
        let initial_steps = self.steps;

        if !self.running {
            return Status {
                counter: 0,
                fill_rate: 0,
            };
        }

        loop {
            let Some((x, y)) = find_free_box(grid) else {
                self.items_live.clear();
                self.items_pool.clear();
                break;
            };

            let space = grid.get_space(x, y);

            let mut item = self.items_pool.pop().unwrap_or_default();
            item.reset();
            item.x = x - space.left;
            item.y = y;
            item.load_candidates(grid);

            let (found, validated_col) = self.change_item(&mut item, false, -1, grid, dictionary);
            item.save_candidates(grid);

            if found {
                item.add_to_grid(grid);
                item.reset_candidates_below(grid);
                self.items_live.push(item);
            } else {
                let validated_row = item.y;
                self.items_pool.push(item);

                if self.backtrack(validated_row, validated_col, grid, dictionary) {
                    let item = self.items_live.last().expect("backtrack kept an item");
                    item.add_to_grid(grid);
                    item.reset_candidates_below(grid);
                } else {
                    self.items_live.clear();
                    self.items_pool.clear();
                    grid.erase();
                    self.running = false;
                    return Status {
                        counter: self.steps - initial_steps,
                        fill_rate: 0,
                    };
                }
            }

            if max_ms >= 0 && start_time.elapsed().as_millis() as i64 >= max_ms as i64 {
                break;
            }
            if max_steps >= 0 && (self.steps - initial_steps) as i64 >= max_steps as i64 {
                break;
            }
        }

        Status {
            counter: self.steps - initial_steps,
            fill_rate: grid.fill_rate(),
        }
    }

    /// Walk the live trail backwards until an item is found whose change
    /// can influence the cell right of (`val_col`, `val_row`), and change
    /// it. Items that cannot interact are recycled through the pool. With
    /// the heuristic on, each failed change drags the target a few columns
    /// back to converge faster.
    fn backtrack(
        &mut self,
        mut val_row: i32,
        mut val_col: i32,
        grid: &mut Grid,
        dictionary: &Dictionary,
    ) -> bool {
        loop {
            let (change_length, target_col) = loop {
                let Some(last) = self.items_live.last() else {
                    return false;
                };
                last.remove_from_grid(grid);

                if val_row == -1 {
                    break (false, -1);
                }
                if last.y == val_row && !self.heuristic {
                    // Same row: only a different length can change anything.
                    break (true, -1);
                }
                if last.y < val_row && last.x <= val_col + 1 {
                    break (false, val_col + 1);
                }

                let item = self.items_live.pop().expect("checked non-empty");
                self.items_pool.push(item);
            };

            let mut item = self.items_live.pop().expect("checked non-empty");
            let (found, new_val_col) =
                self.change_item(&mut item, change_length, target_col, grid, dictionary);
            item.save_candidates(grid);

            if found {
                self.items_live.push(item);
                return true;
            }

            val_col = new_val_col;
            if item.y < val_row {
                if self.heuristic {
                    val_row = item.y;
                    val_col -= self.step_back;
                    if val_col < item.x {
                        val_col = item.x;
                    }
                    if val_col < 0 {
                        val_col = -1;
                    }
                } else {
                    val_row = -1;
                }
            }
            self.items_pool.push(item);
        }
    }

    /// Find something to put at the item's position: a word of some
    /// admissible length, or failing every length, a lone black cell.
    /// Returns the success flag and the rightmost validated column.
    fn change_item(
        &mut self,
        item: &mut DynamicItem,
        change_length: bool,
        col_to_change: i32,
        grid: &mut Grid,
        dictionary: &Dictionary,
    ) -> (bool, i32) {
        let space = grid.get_space(item.x, item.y);
        let span = space.left + 1 + space.right;

        let mut step = FsmStep::ChangeWord;
        if change_length {
            step = FsmStep::ChangeLength;
        }
        if item.length == 0 {
            step = FsmStep::ChooseLength;
        }
        // A black cell is the very last option; nothing comes after it.
        if item.is_block {
            step = FsmStep::Failed;
        }

        let mut unvalidated: i32 = -1;
        if col_to_change >= 0 && !item.word.is_empty() && step == FsmStep::ChangeWord {
            let idx = col_to_change - item.x;
            if idx == item.length as i32 {
                // The position to change is the trailing black cell.
                step = FsmStep::ChangeLength;
            } else if idx >= 0 && (idx as usize) < item.length {
                if let Some(&letter) = item.word.get(idx as usize) {
                    if item.candidates[idx as usize].contains(letter - 1) {
                        unvalidated = idx;
                    }
                }
            }
        }

        while step != FsmStep::Done && step != FsmStep::Failed {
            self.steps += 1;

            match step {
                FsmStep::ChooseLength => {
                    item.length_first_word = 0;
                    item.length = self.initial_length(item.y, span) + 1;
                    step = FsmStep::ChangeLength;
                }

                FsmStep::ChangeWord => {
                    let (mut mask, _) = grid.build_mask(item.x, item.y, Direction::Across, false);
                    mask.truncate(item.length);

                    let found = change_item_word(
                        dictionary,
                        &mut self.rng,
                        &mut item.word,
                        &mut item.first_word,
                        &mask,
                        &item.candidates,
                        unvalidated,
                        true,
                    );
                    unvalidated = -1;

                    if found {
                        if check_item_cross(item, grid, dictionary) {
                            step = FsmStep::Done;
                        }
                    } else {
                        step = FsmStep::ChangeLength;
                    }
                }

                FsmStep::ChangeLength => {
                    let changed = self.change_item_length(item, span, grid, dictionary);
                    item.word.clear();
                    item.first_word.clear();
                    step = if changed {
                        FsmStep::ChangeWord
                    } else {
                        FsmStep::ChangeBlock
                    };
                }

                FsmStep::ChangeBlock => {
                    item.length = 0;
                    if self.check_item_length(item, grid, dictionary) {
                        item.is_block = true;
                        item.length_first_word = 0;
                        step = FsmStep::Done;
                    } else {
                        step = FsmStep::Failed;
                    }
                }

                FsmStep::Done | FsmStep::Failed => {}
            }
        }

        (step == FsmStep::Done, item.x + item.best_pos)
    }

    /// Initial word length for a slot: random (capped at 8) in the first
    /// two rows to vary the layout, maximal afterwards.
    fn initial_length(&mut self, row: i32, max_length: i32) -> usize {
        if row < 2 {
            let cap = max_length.min(8).max(1);
            self.rng.gen_range(0..cap) as usize + 1
        } else {
            max_length.max(1) as usize
        }
    }

    /// Shrink the length until an admissible one is found, wrapping to the
    /// maximum span once; reaching the first length tried again means
    /// every length has been exhausted.
    fn change_item_length(
        &mut self,
        item: &mut DynamicItem,
        length_max: i32,
        grid: &Grid,
        dictionary: &Dictionary,
    ) -> bool {
        loop {
            item.length -= 1;

            if item.length == 0 {
                if length_max <= 0 {
                    return false;
                }
                item.length = length_max as usize;
            }

            if item.length == item.length_first_word {
                return false;
            }
            if item.length_first_word == 0 {
                item.length_first_word = item.length;
            }

            if self.check_item_length(item, grid, dictionary) {
                return true;
            }
        }
    }

    /// Is the item's current length admissible? The trailing cell must be
    /// able to host a black cell: free, within the local density rules,
    /// within the progressive global budget, and not stranding any
    /// neighbouring region without a possible word.
    fn check_item_length(&self, item: &DynamicItem, grid: &Grid, dictionary: &Dictionary) -> bool {
        let x = item.x + item.length as i32;
        let y = item.y;

        // The trailing black cell can always be pushed off the grid.
        if x >= grid.width() || y >= grid.height() {
            return true;
        }
        let Some(cell) = grid.cell(x, y) else {
            return true;
        };
        if cell.is_black() || cell.is_void() {
            return true;
        }

        if self.max_black == 0 {
            return false;
        }
        if !grid.check_bloc_density(x, y) {
            return false;
        }

        if self.max_black >= 0 {
            // Progressive budget: a quadratic curve through (0,0), (t,e)
            // and (1,1) gives the share of the budget available once
            // `tag` of `total` fillable cells have been processed.
            let (t, e) = (0.5f32, 0.5f32);
            let b = (e + t * t) / (t * t + t);
            let a = 1.0 - b;

            let total = grid.width() * grid.height() - 1 - self.initial_black - grid.num_void();
            if total > 0 {
                let u = cell.tag() as f32 / total as f32;
                let progression = a * u * u + b * u;

                let allowance = 1.0 + (self.max_black - 1) as f32 * progression;
                let mut limit = allowance as i32;
                if allowance - limit as f32 >= 0.5 {
                    limit += 1;
                }

                if grid.num_black() - self.initial_black + 1 > limit {
                    return false;
                }
            }
        }

        let space = check_grid_block(grid, dictionary, x, y);
        if space.left == 0 || space.right == 0 || space.top == 0 || space.bottom == 0 {
            return false;
        }
        if space.left > 0 && space.left != item.length as i32 {
            return false;
        }

        true
    }
}

/// First empty letter cell in row-major order.
fn find_free_box(grid: &Grid) -> Option<(i32, i32)> {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if let Some(cell) = grid.cell(x, y) {
                if cell.is_letter() && cell.letter() == 0 {
                    return Some((x, y));
                }
            }
        }
    }
    None
}

/// For a hypothetical black cell at (x, y), probe each side for the
/// longest word the dictionary could still provide there:
/// * `> 0`: a word of that length fits on that side;
/// * `0`: the side has room but no word can fill it (fatal);
/// * `-1`: no room on that side (fine against a border).
fn check_grid_block(grid: &Grid, dictionary: &Dictionary, x: i32, y: i32) -> Space {
    let mut space = Space {
        left: -1,
        right: -1,
        top: -1,
        bottom: -1,
    };

    if x > grid.width() || x < -1 || y > grid.height() || y < -1 {
        return space;
    }
    let Some(cell) = grid.cell(x, y) else {
        return space;
    };
    if cell.is_black() || cell.is_void() {
        return space;
    }
    if cell.letter() != 0 {
        return Space {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        };
    }

    for direction in [Direction::Across, Direction::Down] {
        match direction {
            Direction::Across if y >= grid.height() || y <= -1 => continue,
            Direction::Down if x >= grid.width() || x <= -1 => continue,
            _ => {}
        }

        let (mask, back) = match direction {
            Direction::Across => {
                if x >= 0 {
                    let (mask, back) = grid.build_mask(x, y, direction, true);
                    (mask, back as i32)
                } else {
                    let (mask, _) = grid.build_mask(0, y, direction, true);
                    (mask, -1)
                }
            }
            Direction::Down => {
                if y >= 0 {
                    let (mask, back) = grid.build_mask(x, y, direction, true);
                    (mask, back as i32)
                } else {
                    let (mask, _) = grid.build_mask(x, 0, direction, true);
                    (mask, -1)
                }
            }
        };
        let len = mask.len() as i32;

        // Words ending just before the block: try every start position,
        // longest first. A start is only possible right after a free cell.
        let mut i = 0i32;
        while i < back {
            let possible_start = i == 0 || mask[(i - 1) as usize] == WILDCARD;
            if possible_start {
                if back - i <= 1 {
                    break;
                }
                if dictionary
                    .find_entry(&mask[i as usize..back as usize], &[], None)
                    .is_some()
                {
                    break;
                }
            }
            i += 1;
        }
        let before = if back == 0 { -1 } else { back - i };

        // Words starting just after the block, longest first; the end
        // position must itself be able to take a black cell or be the end
        // of the slot.
        let mut j = len;
        while j > back + 1 {
            let possible_end = j == len || mask[j as usize] == WILDCARD;
            if possible_end {
                if j - back - 1 <= 1 {
                    break;
                }
                if dictionary
                    .find_entry(&mask[(back + 1) as usize..j as usize], &[], None)
                    .is_some()
                {
                    break;
                }
            }
            j -= 1;
        }
        let after = if back >= len - 1 { -1 } else { j - back - 1 };

        match direction {
            Direction::Across => {
                space.left = before;
                space.right = after;
            }
            Direction::Down => {
                space.top = before;
                space.bottom = after;
            }
        }
    }

    space
}

/// Verify that every letter of the item's word can still be crossed by a
/// vertical word of some length, counting the possibility of closing the
/// crossing early with a black cell wherever the density rules allow one.
fn check_item_cross(item: &mut DynamicItem, grid: &Grid, dictionary: &Dictionary) -> bool {
    // A slot longer than the dictionary's maximum word length yields a
    // clamped word; only the covered positions can be checked.
    for i in 0..item.length.min(item.word.len()) {
        let x = item.x + i as i32;
        let y = item.y;

        let (mut mask, back) = grid.build_mask(x, y, Direction::Down, true);
        let origin_y = y - back as i32;

        // Fully determined crossings need no probing.
        if !mask.iter().any(|&c| c == WILDCARD) {
            continue;
        }

        // The item is not on the grid yet; patch in the letter under test.
        mask[back] = item.word[i];
        let length = mask.len() as i32;
        let back = back as i32;

        let mut j = length - 1;
        while j >= back {
            let end_free = j + 1 >= length || mask[(j + 1) as usize] == WILDCARD;
            if end_free {
                if j + 1 <= 1 {
                    break;
                }
                let needs_block = j + 1 < length;
                if !needs_block || grid.check_bloc_density(x, origin_y + j + 1) {
                    if dictionary
                        .find_entry(&mask[..(j + 1) as usize], &[], None)
                        .is_some()
                    {
                        break;
                    }
                }
            }
            j -= 1;
        }

        if j < back {
            item.candidates[i].set(item.word[i] - 1, false);
            if item.best_pos < i as i32 - 1 {
                item.best_pos = i as i32 - 1;
            }
            return false;
        }
    }

    true
}
