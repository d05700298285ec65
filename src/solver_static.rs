//! Backtracking solver for grids whose black-cell layout is fixed.
//!
//! The solver extracts every horizontal slot up front, orders the slots so
//! that each one is as connected as possible to the slots before it, and
//! then walks the ordered list, asking the dictionary for a word per slot.
//! Vertical words are never placed explicitly: each candidate is validated
//! by probing the crossing masks, and per-cell candidate sets remember
//! letters that have already been proven impossible. On a dead end the
//! solver backjumps to the most recent slot that can actually influence
//! the failure point.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::dictionary::Dictionary;
use crate::grid::{DensityMode, Direction, Grid};
use crate::letter_set::LetterSet;
use crate::solver::{change_item_word, Status};
use crate::{Word, WILDCARD};

/// Vertical mask crossing one position of the current slot.
#[derive(Default)]
struct CrossMask {
    mask: Word,
    back_offset: usize,
    /// False when the crossing is already fully determined and needs no
    /// further checking.
    active: bool,
}

/// One horizontal slot in the solver's ordered work list.
struct StaticItem {
    x: i32,
    y: i32,
    length: usize,

    word: Word,
    /// Last word successfully placed for this slot, used to only reset
    /// candidate sets under columns whose letter actually changed.
    prev_word: Word,
    /// First word returned this round; finding it again means the whole
    /// dictionary has been cycled through.
    first_word: Word,

    candidates: Vec<LetterSet>,
    /// Letters already proven to have at least one crossing word, per
    /// position, so they are not re-probed on every attempt.
    cross_tested: Vec<LetterSet>,

    best_pos: i32,
    visibility: bool,
    connection_strength: i32,
    process_order: i32,
}

impl StaticItem {
    fn new(x: i32, y: i32, length: usize) -> StaticItem {
        StaticItem {
            x,
            y,
            length,
            word: Word::new(),
            prev_word: Word::new(),
            first_word: Word::new(),
            candidates: vec![LetterSet::full(); length],
            cross_tested: vec![LetterSet::empty(); length],
            best_pos: -1,
            visibility: false,
            connection_strength: 0,
            process_order: -1,
        }
    }
}

/// Do two horizontal slots see each other through at least one column?
/// A column is shared when both slots cover it and no black cell sits
/// between their rows. Returns the number of shared columns and a flag per
/// position of `item1`.
fn are_dependant(grid: &Grid, item1: &StaticItem, item2: &StaticItem) -> (i32, Vec<bool>) {
    let mut dependency = vec![false; item1.length];
    let mut connect = 0;

    let a_start = item1.x;
    let a_end = item1.x + item1.length as i32 - 1;
    let b_start = item2.x;
    let b_end = item2.x + item2.length as i32 - 1;

    if a_end >= b_start && a_start <= b_end && item1.y != item2.y {
        let from = a_start.max(b_start);
        let to = a_end.min(b_end);
        let step = if item1.y < item2.y { 1 } else { -1 };

        for column in from..=to {
            let mut row = item1.y + step;
            let mut blocked = false;
            while row != item2.y {
                if grid
                    .cell(column, row)
                    .map_or(true, |cell| cell.is_black())
                {
                    blocked = true;
                    break;
                }
                row += step;
            }
            if !blocked {
                dependency[(column - a_start) as usize] = true;
                connect += 1;
            }
        }
    }

    (connect, dependency)
}

/// Fixed-layout backtracking solver.
pub struct StaticSolver {
    items: Vec<StaticItem>,
    cross_masks: Vec<CrossMask>,
    idx_current: i32,
    steps: u64,
    seed: u64,
    rng: SmallRng,
    heuristic: bool,
    step_back: i32,
    running: bool,
}

impl Default for StaticSolver {
    fn default() -> StaticSolver {
        StaticSolver {
            items: Vec::new(),
            cross_masks: Vec::new(),
            idx_current: -1,
            steps: 0,
            seed: 0,
            rng: SmallRng::seed_from_u64(0),
            heuristic: true,
            step_back: 0,
            running: false,
        }
    }
}

impl StaticSolver {
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn set_heuristic(&mut self, state: bool, step_back: i32) {
        self.heuristic = state;
        self.step_back = step_back;
    }

    /// Begin a solve: lock the provided content, extract and order the
    /// slots, and reset all search state.
    pub fn start(&mut self, grid: &mut Grid) {
        self.items.clear();
        self.cross_masks.clear();
        self.steps = 0;
        self.rng = SmallRng::seed_from_u64(self.seed);

        // This solver never adds a black cell.
        grid.set_density_mode(DensityMode::None);
        grid.lock_content();
        grid.erase();

        self.build_items(grid);
        self.order_items(grid);

        self.idx_current = 0;
        self.running = true;
    }

    /// Release the grid and drop all internal state. Idempotent.
    pub fn stop(&mut self, grid: &mut Grid) {
        grid.unlock();
        self.items.clear();
        self.cross_masks.clear();
        self.idx_current = -1;
        self.steps = 0;
        self.running = false;
    }

    /// Run the search until it finishes, fails, or exceeds one of the
    /// budgets (-1 disables a budget). `counter` reports the word attempts
    /// made during this call.
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

        while (self.idx_current as usize) < self.items.len() {
            let idx = self.idx_current as usize;

            {
                let item = &mut self.items[idx];
                item.word.clear();
                item.prev_word.clear();
                item.first_word.clear();
                item.best_pos = -1;
                for set in &mut item.cross_tested {
                    set.reset(false);
                }
            }
            self.load_candidates(idx, grid);

            let found = self.change_item(idx, -1, grid, dictionary);
            self.save_candidates(idx, grid);

            if !found {
                self.backtrack(grid, dictionary);
            }

            if self.idx_current < 0 {
                grid.erase();
                self.running = false;
                return Status {
                    counter: self.steps - initial_steps,
                    fill_rate: 0,
                };
            }

            self.add_current_item(grid);

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

    /// Collect every maximal horizontal run of letter cells as a slot.
    fn build_items(&mut self, grid: &Grid) {
        for y in 0..grid.height() {
            let mut start: Option<i32> = None;
            for x in 0..grid.width() {
                let playable = grid.cell(x, y).map_or(false, |cell| cell.is_letter());
                match (start, playable) {
                    (None, true) => start = Some(x),
                    (Some(s), false) => {
                        self.items.push(StaticItem::new(s, y, (x - s) as usize));
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                self.items
                    .push(StaticItem::new(s, y, (grid.width() - s) as usize));
            }
        }
    }

    /// Order the slots: longest first, then repeatedly the unordered slot
    /// most connected to the ordered set, falling back to the longest
    /// remaining slot when a region is fully disconnected.
    fn order_items(&mut self, grid: &Grid) {
        let mut order = 0;
        loop {
            let next = self.find_strongest_unordered().or_else(|| self.find_longest_unordered());
            let Some(idx) = next else {
                break;
            };

            self.items[idx].process_order = order;
            order += 1;

            for i in 0..self.items.len() {
                if self.items[i].process_order >= 0 {
                    continue;
                }
                let (count, _) = are_dependant(grid, &self.items[idx], &self.items[i]);
                self.items[i].connection_strength += count;
            }
        }

        self.items.sort_by_key(|item| item.process_order);
    }

    fn find_strongest_unordered(&self) -> Option<usize> {
        let mut best = None;
        let mut best_strength = 0;
        for (i, item) in self.items.iter().enumerate() {
            if item.process_order < 0 && item.connection_strength > best_strength {
                best_strength = item.connection_strength;
                best = Some(i);
            }
        }
        best
    }

    fn find_longest_unordered(&self) -> Option<usize> {
        let mut best = None;
        let mut best_length = 0;
        for (i, item) in self.items.iter().enumerate() {
            if item.process_order < 0 && item.length > best_length {
                best_length = item.length;
                best = Some(i);
            }
        }
        best
    }

    fn load_candidates(&mut self, idx: usize, grid: &Grid) {
        let item = &mut self.items[idx];
        for i in 0..item.length {
            item.candidates[i] = grid
                .cell(item.x + i as i32, item.y)
                .map_or_else(LetterSet::full, |cell| cell.candidates());
        }
    }

    fn save_candidates(&mut self, idx: usize, grid: &mut Grid) {
        let item = &self.items[idx];
        for i in 0..item.length {
            if let Some(cell) = grid.cell_mut(item.x + i as i32, item.y) {
                cell.set_candidates(item.candidates[i]);
            }
        }
    }

    /// Find a word for the slot that matches the grid mask, the candidate
    /// sets, and has a possible crossing word at every position.
    /// `col_to_change >= 0` requires the letter in that grid column to move
    /// past its current value.
    fn change_item(
        &mut self,
        idx: usize,
        col_to_change: i32,
        grid: &mut Grid,
        dictionary: &Dictionary,
    ) -> bool {
        let (mask, _) =
            grid.build_mask(self.items[idx].x, self.items[idx].y, Direction::Across, false);
        self.build_cross_masks(idx, grid);

        let mut unvalidated = if col_to_change >= 0 && !self.items[idx].word.is_empty() {
            col_to_change - self.items[idx].x
        } else {
            -1
        };
        if unvalidated >= self.items[idx].length as i32 {
            unvalidated = -1;
        }

        loop {
            self.steps += 1;

            let StaticSolver { items, rng, .. } = self;
            let item = &mut items[idx];
            let found = change_item_word(
                dictionary,
                rng,
                &mut item.word,
                &mut item.first_word,
                &mask,
                &item.candidates,
                unvalidated,
                false,
            );
            unvalidated = -1;

            if !found {
                return false;
            }
            if self.check_item_cross(idx, grid, dictionary) {
                return true;
            }
        }
    }

    fn build_cross_masks(&mut self, idx: usize, grid: &Grid) {
        let item = &self.items[idx];
        self.cross_masks.clear();
        for i in 0..item.length {
            let (mask, back_offset) =
                grid.build_mask(item.x + i as i32, item.y, Direction::Down, true);
            let active = mask.iter().any(|&c| c == WILDCARD);
            self.cross_masks.push(CrossMask {
                mask,
                back_offset,
                active,
            });
        }
    }

    /// Verify that every letter of the candidate word still admits a
    /// crossing word. The first failing position has its letter removed
    /// from the slot candidates, pushes `best_pos` forward, and charges the
    /// cells up its column for later heuristic targeting.
    fn check_item_cross(&mut self, idx: usize, grid: &mut Grid, dictionary: &Dictionary) -> bool {
        let StaticSolver {
            items, cross_masks, ..
        } = self;
        let item = &mut items[idx];

        // A slot longer than the dictionary's maximum word length yields a
        // clamped word; only the covered positions can be checked.
        for i in 0..item.length.min(item.word.len()) {
            let letter = item.word[i];
            if item.cross_tested[i].contains(letter - 1) {
                continue;
            }

            let cross = &mut cross_masks[i];
            if !cross.active || cross.mask.len() <= 1 {
                continue;
            }

            cross.mask[cross.back_offset] = letter;
            if dictionary.find_entry(&cross.mask, &[], None).is_some() {
                item.cross_tested[i].set(letter - 1, true);
                continue;
            }

            item.candidates[i].set(letter - 1, false);
            if item.best_pos < i as i32 - 1 {
                item.best_pos = i as i32 - 1;
            }

            let column = item.x + i as i32;
            let mut row = item.y;
            while let Some(cell) = grid.cell_mut(column, row) {
                if cell.is_black() || cell.is_void() {
                    break;
                }
                cell.bump_fail_counter();
                row -= 1;
            }

            return false;
        }

        true
    }

    /// Commit the current slot's word to the grid, refresh candidate sets
    /// in the columns whose letter changed, and move to the next slot.
    fn add_current_item(&mut self, grid: &mut Grid) {
        let idx = self.idx_current as usize;
        let item = &mut self.items[idx];

        #[cfg(feature = "check_invariants")]
        assert_eq!(item.word.len(), item.length, "placing a word of the wrong length");

        grid.add_word(item.x, item.y, Direction::Across, &item.word);

        for i in 0..item.length.min(item.word.len()) {
            if item.prev_word.get(i) == Some(&item.word[i]) {
                continue;
            }
            let column = item.x + i as i32;

            let mut row = item.y - 1;
            while let Some(cell) = grid.cell_mut(column, row) {
                if cell.is_black() {
                    break;
                }
                if cell.letter() == 0 {
                    cell.reset_candidates(true);
                }
                row -= 1;
            }

            let mut row = item.y + 1;
            while let Some(cell) = grid.cell_mut(column, row) {
                if cell.is_black() {
                    break;
                }
                if cell.letter() == 0 {
                    cell.reset_candidates(true);
                }
                row += 1;
            }
        }

        item.prev_word = item.word.clone();
        item.best_pos = -1;
        self.idx_current += 1;
    }

    /// Undo accepted words until one is found whose change can plausibly
    /// affect the failure point, then retry it. Interaction is judged
    /// through column dependencies: strongly (the item reaches the target
    /// column) while a target column is known, weakly (the item shares a
    /// column with any still-visible item) afterwards.
    fn backtrack(&mut self, grid: &mut Grid, dictionary: &Dictionary) {
        let failed = self.idx_current as usize;
        for i in 0..failed {
            self.items[i].visibility = false;
        }
        self.items[failed].visibility = true;

        let mut target = failed;
        let mut target_col = self.items[failed].x + self.items[failed].best_pos + 1;

        loop {
            let accepted = loop {
                self.idx_current -= 1;
                if self.idx_current < 0 {
                    return;
                }
                let i = self.idx_current as usize;
                grid.remove_word(self.items[i].x, self.items[i].y, Direction::Across);

                if target_col >= 0 {
                    let (count, dependency) =
                        are_dependant(grid, &self.items[i], &self.items[target]);
                    if count > 0 {
                        let item = &self.items[i];
                        let mut column = target_col.min(item.x + item.length as i32 - 1);
                        let mut strong = false;
                        while column >= item.x {
                            if dependency[(column - item.x) as usize] {
                                target_col = column;
                                strong = true;
                                break;
                            }
                            column -= 1;
                        }
                        if strong {
                            break i;
                        }
                    }
                } else {
                    let mut interacts = false;
                    for j in (i + 1)..self.items.len() {
                        if self.items[j].visibility
                            && are_dependant(grid, &self.items[i], &self.items[j]).0 > 0
                        {
                            interacts = true;
                            break;
                        }
                    }
                    if interacts {
                        break i;
                    }
                }
            };

            self.items[accepted].visibility = true;

            let mut column = target_col;
            if self.heuristic {
                if let Some(biased) = self.heuristic_column(accepted, grid) {
                    column = biased;
                }
            }

            let found = self.change_item(accepted, column, grid, dictionary);
            self.save_candidates(accepted, grid);
            if found {
                return;
            }

            target = accepted;
            target_col = -1;
        }
    }

    /// Pick the column of the slot with the highest accumulated failure
    /// count, biased `step_back` columns to the left, and clear the slot's
    /// counters. `None` when no failure has been recorded on the slot.
    fn heuristic_column(&self, idx: usize, grid: &mut Grid) -> Option<i32> {
        let item = &self.items[idx];

        let mut best_col = None;
        let mut best = 0u32;
        for i in 0..item.length {
            let column = item.x + i as i32;
            let count = grid
                .cell(column, item.y)
                .map_or(0, |cell| cell.fail_counter());
            if count > best {
                best = count;
                best_col = Some(column);
            }
        }
        let best_col = best_col?;

        for i in 0..item.length {
            if let Some(cell) = grid.cell_mut(item.x + i as i32, item.y) {
                cell.reset_fail_counter();
            }
        }

        Some((best_col - self.step_back).clamp(item.x, item.x + item.length as i32 - 1))
    }
}
