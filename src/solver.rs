//! Plumbing shared by the two solvers: the public configuration and status
//! types, and the masked dictionary cursor both solvers drive when looking
//! for the next word to try in a slot.

use std::cmp::Ordering;

use rand::rngs::SmallRng;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::letter_set::LetterSet;
use crate::{Letter, Word};

/// Progress report returned by every solver step.
///
/// `counter` is the number of word attempts made during the call;
/// `fill_rate` is the grid completion percentage, with 0 meaning the search
/// has failed (and the grid was erased) and 100 meaning success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Status {
    pub counter: u64,
    pub fill_rate: i32,
}

/// Black-cell placement rule selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlackMode {
    Any,
    Single,
    Two,
    Diagonal,
}

/// Configuration for one generation run.
///
/// `max_black_boxes == 0` selects the static solver (the black layout is
/// final); any other value selects the dynamic solver, with -1 meaning no
/// budget. A negative `heuristic_level` disables the backtrack heuristic,
/// zero or more enables it with that strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    pub seed: u32,
    pub max_black_boxes: i32,
    pub heuristic_level: i32,
    pub black_mode: BlackMode,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            seed: 0,
            max_black_boxes: 0,
            heuristic_level: -1,
            black_mode: BlackMode::Diagonal,
        }
    }
}

/// Find the next word for a slot, walking the dictionary as a cursor.
///
/// The first call on an empty `word` draws a random starting point; later
/// calls resume strictly after the current `word`. When the dictionary is
/// exhausted the search wraps to the beginning once. `first_word`, the
/// first word ever returned for this slot state, marks the point where the
/// whole dictionary has been cycled through, which is reported as failure.
///
/// `unvalidated_idx >= 0` forces the letter at that index to change: every
/// later position is pre-filled with the highest letter code so the cursor
/// lands strictly after all words sharing the prefix. With `strict` the
/// change is re-verified on the result and the cursor keeps moving until
/// the letter actually differs.
pub(crate) fn change_item_word(
    dictionary: &Dictionary,
    rng: &mut SmallRng,
    word: &mut Word,
    first_word: &mut Word,
    mask: &[Letter],
    candidates: &[LetterSet],
    unvalidated_idx: i32,
    strict: bool,
) -> bool {
    let mut wrapped = !word.is_empty()
        && !first_word.is_empty()
        && dictionary.compare(word, first_word) == Ordering::Less;

    let mut letter_to_change: Letter = 0;
    if unvalidated_idx >= 0 && !word.is_empty() {
        let idx = unvalidated_idx as usize;
        letter_to_change = word.get(idx).copied().unwrap_or(0);
        for slot in word.iter_mut().skip(idx + 1) {
            *slot = dictionary.alphabet_size() as Letter;
        }
    }

    loop {
        let mut found = if word.is_empty() {
            dictionary.find_random_entry(rng, mask, Some(candidates))
        } else {
            dictionary.find_entry(mask, word, Some(candidates))
        };

        if found.is_none() {
            if wrapped {
                return false;
            }
            wrapped = true;
            word.clear();
            found = dictionary.find_entry(mask, &[], Some(candidates));
        }

        let Some(next) = found else {
            return false;
        };
        *word = next;

        if wrapped
            && !first_word.is_empty()
            && dictionary.compare(word, first_word) != Ordering::Less
        {
            word.clear();
            return false;
        }

        if strict
            && unvalidated_idx >= 0
            && word.get(unvalidated_idx as usize) == Some(&letter_to_change)
        {
            continue;
        }

        break;
    }

    if first_word.is_empty() {
        *first_word = word.clone();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tests::codes;
    use rand::SeedableRng;

    fn full_candidates(length: usize) -> Vec<LetterSet> {
        vec![LetterSet::full(); length]
    }

    fn dictionary_with(words: &[&str]) -> Dictionary {
        let mut dictionary = Dictionary::new(26, 8);
        for word in words {
            assert!(dictionary.add_entry(&codes(word)));
        }
        dictionary
    }

    #[test]
    fn test_cursor_enumerates_whole_dictionary_once() {
        let dictionary = dictionary_with(&["bat", "cat", "dot"]);
        let mut rng = SmallRng::seed_from_u64(3);
        let candidates = full_candidates(3);
        let mask = [crate::WILDCARD; 3];

        let mut word = Word::new();
        let mut first_word = Word::new();
        let mut seen = vec![];

        while change_item_word(
            &dictionary,
            &mut rng,
            &mut word,
            &mut first_word,
            &mask,
            &candidates,
            -1,
            false,
        ) {
            seen.push(word.clone());
            assert!(seen.len() <= 3, "cursor failed to detect its cycle");
        }

        // Each dictionary word shows up exactly once before the cycle ends.
        assert_eq!(seen.len(), 3);
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(sorted, vec![codes("bat"), codes("cat"), codes("dot")]);
    }

    #[test]
    fn test_cursor_forces_letter_change() {
        let dictionary = dictionary_with(&["sable", "table"]);
        let mut rng = SmallRng::seed_from_u64(0);
        let candidates = full_candidates(5);
        let mask = [crate::WILDCARD; 5];

        let mut word = codes("sable");
        let mut first_word = codes("sable");

        // Forcing index 0 to change must skip every other "s" word and land
        // on "table".
        assert!(change_item_word(
            &dictionary,
            &mut rng,
            &mut word,
            &mut first_word,
            &mask,
            &candidates,
            0,
            true,
        ));
        assert_eq!(word, codes("table"));
    }

    #[test]
    fn test_cursor_strict_rejects_unchanged_letter() {
        // Forcing index 1 of "sable" to change cannot succeed: the only
        // other word keeps 'a' at that position.
        let dictionary = dictionary_with(&["sable", "table"]);
        let mut rng = SmallRng::seed_from_u64(0);
        let candidates = full_candidates(5);
        let mask = [crate::WILDCARD; 5];

        let mut word = codes("sable");
        let mut first_word = codes("sable");

        assert!(!change_item_word(
            &dictionary,
            &mut rng,
            &mut word,
            &mut first_word,
            &mask,
            &candidates,
            1,
            true,
        ));
    }

    #[test]
    fn test_cursor_respects_mask_and_candidates() {
        let dictionary = dictionary_with(&["bat", "cat", "cot"]);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut candidates = full_candidates(3);
        candidates[1].set(0, false); // no 'a' in second position

        let mut word = Word::new();
        let mut first_word = Word::new();

        assert!(change_item_word(
            &dictionary,
            &mut rng,
            &mut word,
            &mut first_word,
            b"c**",
            &candidates,
            -1,
            false,
        ));
        assert_eq!(word, codes("cot"));
    }
}
