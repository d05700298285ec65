//! Handle-based facade for host applications and language bindings.
//!
//! A [`Module`] bundles one dictionary, one grid and both solvers; a
//! [`Library`] owns any number of independent modules and hands out
//! generation-checked handles to them. There is deliberately no global
//! registry: the host owns the `Library` and passes it around explicitly.
//!
//! Following the overall error model, operations on a stale handle or with
//! out-of-range arguments are silent no-ops; failures surface through the
//! regular return values (`None`, `0`, or a `fill_rate` of 0).

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::dictionary::Dictionary;
use crate::grid::{CellKind, DensityMode, Direction, Grid};
use crate::solver::{BlackMode, SolverConfig, Status};
use crate::solver_dynamic::DynamicSolver;
use crate::solver_static::StaticSolver;
use crate::Word;

/// Version of the engine, as a `(major, minor, release)` triple.
#[must_use]
pub fn version() -> (u32, u32, u32) {
    let parse = |s: &str| s.parse().unwrap_or(0);
    (
        parse(env!("CARGO_PKG_VERSION_MAJOR")),
        parse(env!("CARGO_PKG_VERSION_MINOR")),
        parse(env!("CARGO_PKG_VERSION_PATCH")),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveSolver {
    Static,
    Dynamic,
}

/// One independent generation instance: a dictionary, a grid and the two
/// solvers, plus the RNG backing the facade-level random lookups.
pub struct Module {
    dictionary: Dictionary,
    grid: Grid,
    solver_static: StaticSolver,
    solver_dynamic: DynamicSolver,
    active: ActiveSolver,
    rng: SmallRng,
}

impl Module {
    #[must_use]
    pub fn new(alphabet_size: i32, max_word_length: i32) -> Module {
        Module {
            dictionary: Dictionary::new(alphabet_size, max_word_length),
            grid: Grid::default(),
            solver_static: StaticSolver::default(),
            solver_dynamic: DynamicSolver::default(),
            active: ActiveSolver::Dynamic,
            rng: SmallRng::seed_from_u64(0),
        }
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn clear_dictionary(&mut self) {
        self.dictionary.clear();
    }

    #[must_use]
    pub fn word_count(&self) -> u32 {
        self.dictionary.word_count()
    }

    /// Add words from a fixed-width stream: each entry occupies
    /// `max_word_length` bytes, zero-padded. A zero byte in place of a
    /// word ends the stream. Returns the number of words added.
    pub fn add_entries(&mut self, bytes: &[u8], count: i32) -> u32 {
        let entry_size = self.dictionary.max_word_length() as i32;
        self.dictionary.add_entries(bytes, entry_size, count)
    }

    /// Sorted masked lookup; see [`Dictionary::find_entry`]. With the
    /// standard 26-letter alphabet the result is returned as uppercase
    /// ASCII.
    #[must_use]
    pub fn find_entry(&self, mask: &[u8], start: &[u8]) -> Option<Word> {
        self.dictionary
            .find_entry(mask, start, None)
            .map(|word| self.to_output(word))
    }

    /// Randomized masked lookup; see [`Dictionary::find_random_entry`].
    pub fn find_random_entry(&mut self, mask: &[u8]) -> Option<Word> {
        self.dictionary
            .find_random_entry(&mut self.rng, mask, None)
            .map(|word| self.to_output(word))
    }

    fn to_output(&self, mut word: Word) -> Word {
        if self.dictionary.alphabet_size() == 26 {
            for letter in &mut word {
                *letter += b'A' - 1;
            }
        }
        word
    }

    pub fn set_grid_size(&mut self, width: u16, height: u16) {
        self.grid.grow(width, height);
    }

    pub fn set_grid_box(&mut self, x: i32, y: i32, kind: CellKind) {
        let Some(cell) = self.grid.cell_mut(x, y) else {
            return;
        };
        match kind {
            CellKind::Letter => cell.make_letter(),
            CellKind::Black => cell.make_black(),
            CellKind::Void => cell.make_void(),
        }
    }

    /// Write a word on the grid, folding ASCII with the standard alphabet
    /// and stopping at the first invalid byte or the grid edge. With
    /// `terminator`, a black cell is placed after the last letter written.
    pub fn write_grid(&mut self, x: i32, y: i32, bytes: &[u8], direction: Direction, terminator: bool) {
        let (step_x, step_y) = match direction {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        };
        let limit = match direction {
            Direction::Across => self.grid.width() - x,
            Direction::Down => self.grid.height() - y,
        };

        let alphabet_size = self.dictionary.alphabet_size();
        let (mut cx, mut cy) = (x, y);
        let mut idx = 0i32;

        while idx < limit && bytes.get(idx as usize).map_or(0, |&b| b) != 0 {
            let byte = bytes[idx as usize];
            let mut value = byte;
            if alphabet_size == 26 {
                if byte.is_ascii_uppercase() {
                    value = byte - b'A' + 1;
                } else if byte.is_ascii_lowercase() {
                    value = byte - b'a' + 1;
                }
            }
            if value as usize > alphabet_size {
                break;
            }

            if let Some(cell) = self.grid.cell_mut(cx, cy) {
                cell.make_letter();
                cell.set_letter(value);
            }
            cx += step_x;
            cy += step_y;
            idx += 1;
        }

        if terminator && idx < limit {
            if let Some(cell) = self.grid.cell_mut(cx, cy) {
                cell.make_black();
            }
        }
    }

    /// Dump the grid as one byte per cell in row-major order.
    ///
    /// With the standard alphabet: letters as uppercase ASCII, `.` for an
    /// empty cell. Otherwise: the raw letter code, 0 for an empty cell.
    /// Black cells are `#` and void cells `-` in both encodings.
    #[must_use]
    pub fn read_grid(&self) -> Vec<u8> {
        let ascii = self.dictionary.alphabet_size() == 26;
        let mut out = Vec::with_capacity((self.grid.width() * self.grid.height()) as usize);

        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                let cell = self.grid.cell(x, y).expect("in-bounds scan");
                let byte = match cell.kind() {
                    CellKind::Black => b'#',
                    CellKind::Void => b'-',
                    CellKind::Letter => {
                        let letter = cell.letter();
                        if ascii {
                            if letter == 0 {
                                b'.'
                            } else {
                                letter + b'A' - 1
                            }
                        } else {
                            letter
                        }
                    }
                };
                out.push(byte);
            }
        }

        out
    }

    pub fn erase_grid(&mut self) {
        self.grid.erase();
    }

    /// Configure and start a generation run. A `max_black_boxes` of zero
    /// selects the static solver; anything else selects the dynamic solver
    /// with that budget (-1 = unlimited) and the requested black mode.
    pub fn solver_start(&mut self, config: SolverConfig) {
        if config.max_black_boxes == 0 {
            self.solver_static.set_seed(config.seed as u64);
            self.solver_static
                .set_heuristic(config.heuristic_level >= 0, config.heuristic_level.max(0));
            self.solver_static.start(&mut self.grid);
            self.active = ActiveSolver::Static;
        } else {
            self.solver_dynamic.set_seed(config.seed as u64);
            self.solver_dynamic
                .set_heuristic(config.heuristic_level >= 0, config.heuristic_level.max(0));
            self.solver_dynamic.set_max_black(config.max_black_boxes);
            self.solver_dynamic.set_density_mode(match config.black_mode {
                BlackMode::Any => DensityMode::Any,
                BlackMode::Single => DensityMode::Single,
                BlackMode::Two => DensityMode::Two,
                BlackMode::Diagonal => DensityMode::Diag,
            });
            self.solver_dynamic.start(&mut self.grid);
            self.active = ActiveSolver::Dynamic;
        }
    }

    pub fn solver_step(&mut self, max_ms: i32, max_steps: i32) -> Status {
        match self.active {
            ActiveSolver::Static => {
                self.solver_static
                    .step(&mut self.grid, &self.dictionary, max_ms, max_steps)
            }
            ActiveSolver::Dynamic => {
                self.solver_dynamic
                    .step(&mut self.grid, &self.dictionary, max_ms, max_steps)
            }
        }
    }

    pub fn solver_stop(&mut self) {
        match self.active {
            ActiveSolver::Static => self.solver_static.stop(&mut self.grid),
            ActiveSolver::Dynamic => self.solver_dynamic.stop(&mut self.grid),
        }
    }
}

/// Generation-checked reference to a module owned by a [`Library`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    index: usize,
    generation: u32,
}

struct Slot {
    generation: u32,
    module: Option<Module>,
}

/// Explicit owner of every module in the host. Handles stay cheap and
/// copyable; a destroyed module invalidates its handles through the slot
/// generation, so a stale handle can never reach a recycled module.
#[derive(Default)]
pub struct Library {
    slots: Vec<Slot>,
}

impl Library {
    #[must_use]
    pub fn new() -> Library {
        Library::default()
    }

    /// Number of live modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.module.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create(&mut self, alphabet_size: i32, max_word_length: i32) -> ModuleHandle {
        let module = Module::new(alphabet_size, max_word_length);

        if let Some(index) = self.slots.iter().position(|slot| slot.module.is_none()) {
            let slot = &mut self.slots[index];
            slot.generation += 1;
            slot.module = Some(module);
            return ModuleHandle {
                index,
                generation: slot.generation,
            };
        }

        self.slots.push(Slot {
            generation: 0,
            module: Some(module),
        });
        ModuleHandle {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    pub fn destroy(&mut self, handle: ModuleHandle) {
        if let Some(slot) = self.slots.get_mut(handle.index) {
            if slot.generation == handle.generation {
                slot.module = None;
            }
        }
    }

    #[must_use]
    pub fn module(&self, handle: ModuleHandle) -> Option<&Module> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.module.as_ref())
    }

    pub fn module_mut(&mut self, handle: ModuleHandle) -> Option<&mut Module> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.module.as_mut())
    }

    pub fn clear_dictionary(&mut self, handle: ModuleHandle) {
        if let Some(module) = self.module_mut(handle) {
            module.clear_dictionary();
        }
    }

    #[must_use]
    pub fn word_count(&self, handle: ModuleHandle) -> u32 {
        self.module(handle).map_or(0, Module::word_count)
    }

    pub fn add_entries(&mut self, handle: ModuleHandle, bytes: &[u8], count: i32) -> u32 {
        self.module_mut(handle)
            .map_or(0, |module| module.add_entries(bytes, count))
    }

    #[must_use]
    pub fn find_entry(&self, handle: ModuleHandle, mask: &[u8], start: &[u8]) -> Option<Word> {
        self.module(handle)?.find_entry(mask, start)
    }

    pub fn find_random_entry(&mut self, handle: ModuleHandle, mask: &[u8]) -> Option<Word> {
        self.module_mut(handle)?.find_random_entry(mask)
    }

    pub fn set_grid_size(&mut self, handle: ModuleHandle, width: u16, height: u16) {
        if let Some(module) = self.module_mut(handle) {
            module.set_grid_size(width, height);
        }
    }

    pub fn set_grid_box(&mut self, handle: ModuleHandle, x: i32, y: i32, kind: CellKind) {
        if let Some(module) = self.module_mut(handle) {
            module.set_grid_box(x, y, kind);
        }
    }

    pub fn write_grid(
        &mut self,
        handle: ModuleHandle,
        x: i32,
        y: i32,
        bytes: &[u8],
        direction: Direction,
        terminator: bool,
    ) {
        if let Some(module) = self.module_mut(handle) {
            module.write_grid(x, y, bytes, direction, terminator);
        }
    }

    #[must_use]
    pub fn read_grid(&self, handle: ModuleHandle) -> Option<Vec<u8>> {
        self.module(handle).map(Module::read_grid)
    }

    pub fn erase_grid(&mut self, handle: ModuleHandle) {
        if let Some(module) = self.module_mut(handle) {
            module.erase_grid();
        }
    }

    pub fn solver_start(&mut self, handle: ModuleHandle, config: SolverConfig) {
        if let Some(module) = self.module_mut(handle) {
            module.solver_start(config);
        }
    }

    pub fn solver_step(&mut self, handle: ModuleHandle, max_ms: i32, max_steps: i32) -> Status {
        self.module_mut(handle)
            .map_or(Status::default(), |module| {
                module.solver_step(max_ms, max_steps)
            })
    }

    pub fn solver_stop(&mut self, handle: ModuleHandle) {
        if let Some(module) = self.module_mut(handle) {
            module.solver_stop();
        }
    }
}
