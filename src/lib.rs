//! Crossword grid generation engine.
//!
//! The crate is built from three layers: a length-partitioned compressed
//! trie over an arbitrary alphabet ([`dictionary::Dictionary`]), a mutable
//! cell matrix with candidate tracking and black-cell densities
//! ([`grid::Grid`]), and two backtracking solvers layered on top of them:
//! one for fixed black layouts ([`solver_static::StaticSolver`]) and one
//! that places black cells on the fly ([`solver_dynamic::DynamicSolver`]).
//! [`module::Library`] wraps everything behind handle-based instances for
//! host applications and language bindings.

pub mod dictionary;
pub mod grid;
pub mod letter_set;
pub mod module;
pub mod solver;
pub mod solver_dynamic;
pub mod solver_static;

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The longest word a dictionary can hold.
pub const MAX_WORD_LENGTH: usize = 40;

/// The maximum width or height of a grid.
pub const MAX_GRID_SIZE: usize = 256;

/// The maximum number of letters in an alphabet (bounded by `LetterSet`).
pub const MAX_ALPHABET: usize = 64;

/// A letter code: 1..=alphabet_size, with 0 meaning "empty/unset".
pub type Letter = u8;

/// Mask sentinel standing for "any letter" at a free position.
pub const WILDCARD: Letter = 255;

/// A word or mask buffer. Letters are codes, not characters; buffers carry
/// their length explicitly rather than using a terminator.
pub type Word = smallvec::SmallVec<[Letter; MAX_WORD_LENGTH]>;
