//! Length-partitioned compressed trie over a configurable alphabet.
//!
//! Words of each length live in their own trie so that a lookup always
//! terminates at a known depth. Trie nodes are allocated from a flat arena
//! of signed child indices; leaves from a second arena. Identity is the
//! integer index into the arena, which stays valid across growth, so no
//! references need fixing up when the pools are reallocated.

use std::cmp::Ordering;

use rand::rngs::SmallRng;
use rand::Rng;
use smallvec::smallvec;

use crate::letter_set::LetterSet;
use crate::{Letter, Word, MAX_ALPHABET, MAX_WORD_LENGTH, WILDCARD};

/// First arena allocation, in nodes or leaves.
const ARENA_INITIAL_CAPACITY: usize = 10_000;

/// Geometric growth factor applied when an arena is full.
const ARENA_GROWTH_FACTOR: f32 = 1.4;

/// Sentinel for an unset "first letter tried" slot during randomized
/// traversal; larger than any valid letter index.
const UNSET: u8 = 255;

/// Terminal trie entry. The definition index points at external word
/// metadata and is not interpreted by the engine itself.
#[derive(Debug, Clone, Copy)]
struct Leaf {
    #[allow(dead_code)]
    definition: i32,
}

/// A dictionary of words, indexed by exact length.
///
/// Letters are codes in `1..=alphabet_size`. Masks passed to the lookup
/// functions use the same codes plus [`WILDCARD`] for free positions; when
/// the alphabet size is 26, ASCII letters are also accepted and case-folded.
pub struct Dictionary {
    /// Flat node arena: node `i` owns the `alphabet_size` child slots at
    /// `i * alphabet_size ..`. A child slot is -1 when absent, otherwise a
    /// node index (below the last depth) or a leaf index (at the last
    /// depth). Nodes `0..max_word_length` are the per-length roots.
    nodes: Vec<i32>,

    /// Leaf arena, indexed by the child slots at the final depth.
    leaves: Vec<Leaf>,

    /// Arena capacities, in nodes/leaves. Kept explicitly so growth follows
    /// the geometric policy rather than `Vec`'s own.
    node_capacity: usize,
    leaf_capacity: usize,

    alphabet_size: usize,
    max_word_length: usize,
}

impl Dictionary {
    /// Create a dictionary for the given alphabet size and maximum word
    /// length. Out-of-range values are clamped: an alphabet of 0 selects
    /// the standard 26-letter alphabet, anything above 64 is capped, and
    /// the word length is capped at [`MAX_WORD_LENGTH`].
    #[must_use]
    pub fn new(alphabet_size: i32, max_word_length: i32) -> Dictionary {
        let alphabet_size = if alphabet_size <= 0 {
            26
        } else {
            (alphabet_size as usize).min(MAX_ALPHABET)
        };
        let max_word_length = if max_word_length <= 0 {
            MAX_WORD_LENGTH
        } else {
            (max_word_length as usize).min(MAX_WORD_LENGTH)
        };

        let mut dictionary = Dictionary {
            nodes: Vec::new(),
            leaves: Vec::new(),
            node_capacity: 0,
            leaf_capacity: 0,
            alphabet_size,
            max_word_length,
        };
        dictionary.clear();
        dictionary
    }

    #[must_use]
    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    #[must_use]
    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    /// Number of words in the dictionary, not counting the implicit
    /// single-letter seed words.
    #[must_use]
    pub fn word_count(&self) -> u32 {
        (self.leaves.len() - self.alphabet_size) as u32
    }

    /// Drop all content and reinitialise: one empty root per word length,
    /// followed by the implicit single-letter words.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.leaves = Vec::new();
        self.node_capacity = 0;
        self.leaf_capacity = 0;

        // Roots first, so they sit contiguously at the front of the arena
        // and a length maps to a fixed node index forever.
        for _ in 0..self.max_word_length {
            self.alloc_node();
        }
        for letter in 1..=self.alphabet_size as Letter {
            self.add_entry(&[letter]);
        }
    }

    /// Root node index for words of the given length.
    fn root(&self, length: usize) -> usize {
        length - 1
    }

    fn child(&self, node: usize, letter_index: usize) -> i32 {
        self.nodes[node * self.alphabet_size + letter_index]
    }

    fn set_child(&mut self, node: usize, letter_index: usize, value: i32) {
        self.nodes[node * self.alphabet_size + letter_index] = value;
    }

    /// Allocate a node with all children absent. Returns `None` when the
    /// arena cannot grow; the caller turns that into a failed insertion.
    fn alloc_node(&mut self) -> Option<usize> {
        let used = self.nodes.len() / self.alphabet_size;
        if used == self.node_capacity {
            let new_capacity = if self.node_capacity == 0 {
                ARENA_INITIAL_CAPACITY
            } else {
                (self.node_capacity as f32 * ARENA_GROWTH_FACTOR) as usize
            };
            let extra = (new_capacity - used) * self.alphabet_size;
            if self.nodes.try_reserve(extra).is_err() {
                return None;
            }
            self.node_capacity = new_capacity;
        }

        self.nodes.resize(self.nodes.len() + self.alphabet_size, -1);
        Some(used)
    }

    fn alloc_leaf(&mut self) -> Option<usize> {
        if self.leaves.len() == self.leaf_capacity {
            let new_capacity = if self.leaf_capacity == 0 {
                ARENA_INITIAL_CAPACITY
            } else {
                (self.leaf_capacity as f32 * ARENA_GROWTH_FACTOR) as usize
            };
            if self
                .leaves
                .try_reserve(new_capacity - self.leaves.len())
                .is_err()
            {
                return None;
            }
            self.leaf_capacity = new_capacity;
        }

        self.leaves.push(Leaf { definition: -1 });
        Some(self.leaves.len() - 1)
    }

    /// Translate one raw byte into a letter code, case-folding ASCII when
    /// the alphabet is the standard 26 letters.
    fn fold(&self, byte: u8) -> u8 {
        if self.alphabet_size == 26 {
            if byte.is_ascii_uppercase() {
                return byte - b'A' + 1;
            }
            if byte.is_ascii_lowercase() {
                return byte - b'a' + 1;
            }
        }
        byte
    }

    /// Sanitize a user-supplied mask or start word: stop at the first zero
    /// byte, clamp to the maximum word length, case-fold, and map anything
    /// outside the alphabet to [`WILDCARD`].
    fn process_entry(&self, entry: &[u8]) -> Word {
        let mut out = Word::new();
        for &byte in entry.iter().take(self.max_word_length) {
            if byte == 0 {
                break;
            }
            let mut code = self.fold(byte);
            if code as usize > self.alphabet_size {
                code = WILDCARD;
            }
            out.push(code);
        }
        out
    }

    /// Lexicographic comparison of two letter-code buffers, stopping at a
    /// zero terminator or at the maximum word length.
    #[must_use]
    pub fn compare(&self, w1: &[Letter], w2: &[Letter]) -> Ordering {
        for i in 0..self.max_word_length {
            let a = w1.get(i).copied().unwrap_or(0);
            let b = w2.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {
                    if a == 0 {
                        return Ordering::Equal;
                    }
                }
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Add a single word, given as letter codes. Duplicates are accepted
    /// and change nothing. Returns false (leaving the trie untouched) for
    /// an empty or over-long word, a letter outside the alphabet, or a
    /// failed arena growth.
    pub fn add_entry(&mut self, word: &[Letter]) -> bool {
        let length = word.iter().position(|&c| c == 0).unwrap_or(word.len());
        if length == 0 || length > self.max_word_length {
            return false;
        }
        if word[..length]
            .iter()
            .any(|&c| c == 0 || c as usize > self.alphabet_size)
        {
            return false;
        }

        let mut node = self.root(length);
        for &code in &word[..length - 1] {
            let letter_index = (code - 1) as usize;
            let sub = self.child(node, letter_index);
            if sub >= 0 {
                node = sub as usize;
            } else {
                let Some(new_node) = self.alloc_node() else {
                    return false;
                };
                self.set_child(node, letter_index, new_node as i32);
                node = new_node;
            }
        }

        let letter_index = (word[length - 1] - 1) as usize;
        if self.child(node, letter_index) < 0 {
            let Some(leaf) = self.alloc_leaf() else {
                return false;
            };
            self.set_child(node, letter_index, leaf as i32);
        }
        true
    }

    /// Parse and add a stream of words.
    ///
    /// When `entry_size > 0` every word occupies exactly that many bytes,
    /// zero-padded; otherwise words are zero-terminated. A zero byte in
    /// place of a word (in particular a second zero after a terminator)
    /// ends the stream, as does reaching `count` words (-1 = unlimited) or
    /// a byte that is neither a valid letter nor a terminator. Returns the
    /// number of words added.
    pub fn add_entries(&mut self, bytes: &[u8], entry_size: i32, count: i32) -> u32 {
        let mut cursor = 0usize;
        let mut added = 0u32;

        loop {
            if bytes.get(cursor).copied().unwrap_or(0) == 0 {
                break;
            }

            let mut word = Word::new();
            let mut malformed = false;
            loop {
                let byte = bytes.get(cursor + word.len()).copied().unwrap_or(0);
                let code = self.fold(byte);

                if code >= 1 && code as usize <= self.alphabet_size && word.len() < MAX_WORD_LENGTH
                {
                    word.push(code);
                } else if code == 0 {
                    break;
                } else {
                    malformed = true;
                    break;
                }

                if entry_size > 0 && word.len() >= entry_size as usize {
                    break;
                }
            }
            if malformed || word.is_empty() {
                break;
            }

            if !self.add_entry(&word) {
                break;
            }

            if entry_size > 0 {
                cursor += entry_size as usize;
            } else {
                // Skip the terminator along with the word.
                cursor += word.len() + 1;
            }

            added += 1;
            if count >= 0 && added >= count as u32 {
                break;
            }
        }

        added
    }

    /// Find the lexicographically smallest word strictly after `start`
    /// (from the beginning when `start` is empty) that matches the mask
    /// and, at free positions, the per-position candidate sets.
    ///
    /// Feeding each result back as the next `start` enumerates every
    /// matching word exactly once, in increasing order.
    pub fn find_entry(
        &self,
        mask: &[u8],
        start: &[u8],
        candidates: Option<&[LetterSet]>,
    ) -> Option<Word> {
        let mask = self.process_entry(mask);
        let length = mask.len();
        if length == 0 {
            return None;
        }

        let mut start_entry: Word = smallvec![0; length];
        let processed_start = self.process_entry(start);
        let start_length = processed_start.len().min(length);
        start_entry[..start_length].copy_from_slice(&processed_start[..start_length]);

        let mut result = start_entry.clone();
        let mut hot_start = start_length > 0;

        let mut parents = [0usize; MAX_WORD_LENGTH];
        let mut node = self.root(length);
        let mut depth = 0usize;

        while depth < length {
            // The start word only constrains the search until its last
            // letter: from there on we must move strictly past it.
            if depth == length - 1 {
                hot_start = false;
            }

            let mut sub: i32 = -1;
            let mut letter_index = 0usize;

            if mask[depth] == WILDCARD {
                let mut from = result[depth] as usize;
                if from != 0 {
                    from -= 1;
                    if !hot_start {
                        from += 1;
                    }
                }

                for li in from..self.alphabet_size {
                    if self.child(node, li) >= 0
                        && candidates
                            .and_then(|sets| sets.get(depth))
                            .map_or(true, |set| set.contains(li as u8))
                    {
                        sub = self.child(node, li);
                        letter_index = li;
                        break;
                    }
                }
            } else if result[depth] != 0 && !hot_start {
                // A forced letter that already holds a value has no
                // alternative left: everything below it is exhausted.
                sub = -1;
            } else {
                letter_index = (mask[depth] - 1) as usize;
                sub = self.child(node, letter_index);
            }

            let mut valid = sub >= 0;
            result[depth] = if valid { (letter_index + 1) as Letter } else { 0 };

            if hot_start {
                let fail_follow = sub < 0 || result[depth] != start_entry[depth];
                if fail_follow {
                    hot_start = false;
                    for slot in result.iter_mut().take(length).skip(depth + 1) {
                        *slot = 0;
                    }

                    // The mask forced us below the start word; back up so
                    // the result stays strictly greater.
                    if result[depth] > 0
                        && start_entry[depth] > 0
                        && result[depth] < start_entry[depth]
                    {
                        valid = false;
                    }
                }
            }

            if valid {
                if depth < length - 1 {
                    parents[depth] = node;
                    node = sub as usize;
                }
                depth += 1;
            } else {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                node = parents[depth];
            }
        }

        Some(result)
    }

    /// Find a word matching the mask and candidates, starting the alphabet
    /// scan at each free position from a uniformly random letter and
    /// wrapping around. Deterministic for a given RNG state.
    pub fn find_random_entry(
        &self,
        rng: &mut SmallRng,
        mask: &[u8],
        candidates: Option<&[LetterSet]>,
    ) -> Option<Word> {
        let mask = self.process_entry(mask);
        let length = mask.len();
        if length == 0 {
            return None;
        }

        let mut result: Word = smallvec![0; length];
        let mut first = [UNSET; MAX_WORD_LENGTH];
        let mut parents = [0usize; MAX_WORD_LENGTH];
        let mut node = self.root(length);
        let mut depth = 0usize;

        while depth < length {
            let mut sub: i32 = -1;
            let mut letter_index = 0usize;

            if mask[depth] == WILDCARD {
                // First visit draws a random starting letter; subsequent
                // visits resume just after the current solution. The first
                // letter tried is remembered to detect a full cycle.
                let mut li = if first[depth] == UNSET {
                    rng.gen_range(0..self.alphabet_size)
                } else {
                    result[depth] as usize
                };

                for _ in 0..self.alphabet_size {
                    if li >= self.alphabet_size {
                        li = 0;
                    }
                    if first[depth] == li as u8 {
                        break;
                    }
                    if first[depth] == UNSET {
                        first[depth] = li as u8;
                    }

                    if self.child(node, li) >= 0
                        && candidates
                            .and_then(|sets| sets.get(depth))
                            .map_or(true, |set| set.contains(li as u8))
                    {
                        sub = self.child(node, li);
                        letter_index = li;
                        break;
                    }

                    li += 1;
                }
            } else {
                letter_index = (mask[depth] - 1) as usize;
                sub = self.child(node, letter_index);
            }

            let valid = sub >= 0;
            if valid {
                result[depth] = (letter_index + 1) as Letter;
                if depth < length - 1 {
                    parents[depth] = node;
                    node = sub as usize;
                }
                depth += 1;
            } else {
                result[depth] = 0;
                first[depth] = UNSET;

                // Forced positions have no alternative; pop until a free
                // position can advance.
                loop {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    if mask[depth] == WILDCARD {
                        break;
                    }
                }
                node = parents[depth];
            }
        }

        Some(result)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Letter codes for a lowercase ASCII string.
    pub fn codes(s: &str) -> Word {
        s.bytes().map(|b| b - b'a' + 1).collect()
    }

    fn dictionary_with(words: &[&str]) -> Dictionary {
        let mut dictionary = Dictionary::new(26, 8);
        for word in words {
            assert!(dictionary.add_entry(&codes(word)));
        }
        dictionary
    }

    #[test]
    fn test_new_clamps_configuration() {
        let dictionary = Dictionary::new(0, 0);
        assert_eq!(dictionary.alphabet_size(), 26);
        assert_eq!(dictionary.max_word_length(), MAX_WORD_LENGTH);

        let dictionary = Dictionary::new(100, 99);
        assert_eq!(dictionary.alphabet_size(), 64);
        assert_eq!(dictionary.max_word_length(), MAX_WORD_LENGTH);

        let dictionary = Dictionary::new(1, 1);
        assert_eq!(dictionary.alphabet_size(), 1);
        assert_eq!(dictionary.max_word_length(), 1);
    }

    #[test]
    fn test_single_letter_words_are_seeded() {
        let dictionary = Dictionary::new(26, 5);
        assert_eq!(dictionary.word_count(), 0);

        for letter in 1..=26u8 {
            let found = dictionary
                .find_entry(&[letter], &[], None)
                .expect("seeded single-letter word");
            assert_eq!(found.as_slice(), &[letter]);
        }
    }

    #[test]
    fn test_closure_exact_mask() {
        let dictionary = dictionary_with(&["cat", "dog", "ace"]);
        assert_eq!(dictionary.word_count(), 3);

        for word in ["cat", "dog", "ace"] {
            let found = dictionary
                .find_entry(word.as_bytes(), &[], None)
                .unwrap_or_else(|| panic!("{word} should be found"));
            assert_eq!(found, codes(word));
        }
    }

    #[test]
    fn test_add_entry_rejects_bad_words() {
        let mut dictionary = Dictionary::new(26, 3);
        assert!(!dictionary.add_entry(&[]));
        assert!(!dictionary.add_entry(&codes("long")));
        assert!(!dictionary.add_entry(&[1, 27, 2]));
        assert_eq!(dictionary.word_count(), 0);
    }

    #[test]
    fn test_duplicate_insertion_is_idempotent() {
        let mut dictionary = dictionary_with(&["cat"]);
        assert!(dictionary.add_entry(&codes("cat")));
        assert_eq!(dictionary.word_count(), 1);
    }

    #[test]
    fn test_enumeration_is_strictly_monotonic_and_complete() {
        let words = ["bat", "cab", "cat", "cot", "dot"];
        let dictionary = dictionary_with(&words);

        let mut seen: Vec<Word> = vec![];
        let mut start = Word::new();
        while let Some(found) = dictionary.find_entry(b"***", &start, None) {
            if let Some(previous) = seen.last() {
                assert_eq!(dictionary.compare(previous, &found), Ordering::Less);
            }
            start = found.clone();
            seen.push(found);
        }

        let expected: Vec<Word> = words.iter().map(|w| codes(w)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_find_entry_with_forced_letters() {
        let dictionary = dictionary_with(&["bat", "cab", "cat", "cot", "dot"]);

        // Mask c*t matches cat and cot only.
        let first = dictionary.find_entry(b"c*t", &[], None).unwrap();
        assert_eq!(first, codes("cat"));
        let second = dictionary.find_entry(b"c*t", &first, None).unwrap();
        assert_eq!(second, codes("cot"));
        assert!(dictionary.find_entry(b"c*t", &second, None).is_none());
    }

    #[test]
    fn test_find_entry_with_start_before_any_match() {
        let dictionary = dictionary_with(&["cot", "dot"]);

        // Start "cab" is below the first match of mask **t.
        let found = dictionary.find_entry(b"**t", b"cab", None).unwrap();
        assert_eq!(found, codes("cot"));
    }

    #[test]
    fn test_find_entry_respects_candidates() {
        let dictionary = dictionary_with(&["cat", "cot"]);

        let mut sets = [LetterSet::full(); 3];
        sets[1].set(0, false); // exclude 'a' at position 1

        let found = dictionary.find_entry(b"***", &[], Some(&sets)).unwrap();
        assert_eq!(found, codes("cot"));

        sets[1].reset(false);
        assert!(dictionary.find_entry(b"***", &[], Some(&sets)).is_none());
    }

    #[test]
    fn test_find_entry_impossible_mask() {
        let dictionary = dictionary_with(&["cat"]);
        assert!(dictionary.find_entry(b"z**", &[], None).is_none());
        assert!(dictionary.find_entry(&[], &[], None).is_none());
    }

    #[test]
    fn test_find_random_entry_matches_mask() {
        let dictionary = dictionary_with(&["bat", "cab", "cat", "cot", "dot"]);
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..50 {
            let found = dictionary
                .find_random_entry(&mut rng, b"c**", None)
                .expect("mask c** has matches");
            assert!(found == codes("cab") || found == codes("cat") || found == codes("cot"));
        }
    }

    #[test]
    fn test_find_random_entry_is_deterministic_for_a_seed() {
        let dictionary = dictionary_with(&["bat", "cab", "cat", "cot", "dot"]);

        let mut first_run = vec![];
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..10 {
            first_run.push(dictionary.find_random_entry(&mut rng, b"***", None));
        }

        let mut rng = SmallRng::seed_from_u64(42);
        for expected in first_run {
            assert_eq!(
                dictionary.find_random_entry(&mut rng, b"***", None),
                expected
            );
        }
    }

    #[test]
    fn test_find_random_entry_failure() {
        let dictionary = dictionary_with(&["cat"]);
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(dictionary
            .find_random_entry(&mut rng, b"z**", None)
            .is_none());
    }

    #[test]
    fn test_arena_stability_under_growth() {
        let mut dictionary = Dictionary::new(26, 4);

        // Enough distinct words to force several arena growths.
        let mut words = vec![];
        for a in 1..=26u8 {
            for b in 1..=26u8 {
                for c in 1..=13u8 {
                    words.push([a, b, c]);
                }
            }
        }
        for word in &words {
            assert!(dictionary.add_entry(word));
        }
        assert_eq!(dictionary.word_count(), words.len() as u32);

        // Early insertions must still resolve after all the growth.
        for word in &words {
            let found = dictionary.find_entry(word, &[], None).unwrap();
            assert_eq!(found.as_slice(), word);
        }
    }

    #[test]
    fn test_clear_resets_to_seed_state() {
        let mut dictionary = dictionary_with(&["cat", "dog"]);
        dictionary.clear();
        assert_eq!(dictionary.word_count(), 0);
        assert!(dictionary.find_entry(b"cat", &[], None).is_none());
        assert!(dictionary.find_entry(&[3], &[], None).is_some());
    }

    #[test]
    fn test_add_entries_zero_terminated() {
        let mut dictionary = Dictionary::new(26, 8);
        let stream = b"cat\0dog\0\0";
        assert_eq!(dictionary.add_entries(stream, 0, -1), 2);
        assert!(dictionary.find_entry(b"cat", &[], None).is_some());
        assert!(dictionary.find_entry(b"dog", &[], None).is_some());
    }

    #[test]
    fn test_add_entries_fixed_width() {
        let mut dictionary = Dictionary::new(26, 8);
        let stream = b"cat\0dog\0ace\0";
        assert_eq!(dictionary.add_entries(stream, 4, -1), 3);
        assert_eq!(dictionary.word_count(), 3);
    }

    #[test]
    fn test_add_entries_respects_count() {
        let mut dictionary = Dictionary::new(26, 8);
        let stream = b"cat\0dog\0ace\0";
        assert_eq!(dictionary.add_entries(stream, 4, 2), 2);
        assert!(dictionary.find_entry(b"ace", &[], None).is_none());
    }

    #[test]
    fn test_add_entries_stops_on_malformed_byte() {
        let mut dictionary = Dictionary::new(26, 8);
        let stream = b"cat\0d!g\0ace\0";
        assert_eq!(dictionary.add_entries(stream, 4, -1), 1);
    }

    #[test]
    fn test_add_entries_numeric_alphabet() {
        let mut dictionary = Dictionary::new(4, 3);
        let stream = &[1u8, 2, 3, 0, 4, 4, 0, 0];
        assert_eq!(dictionary.add_entries(stream, 0, -1), 2);
        assert!(dictionary.find_entry(&[1, 2, 3], &[], None).is_some());
        assert!(dictionary.find_entry(&[4, 4], &[], None).is_some());
    }

    #[test]
    fn test_compare_honours_termination() {
        let dictionary = Dictionary::new(26, 8);
        assert_eq!(
            dictionary.compare(&codes("cat"), &codes("cat")),
            Ordering::Equal
        );
        assert_eq!(
            dictionary.compare(&codes("cat"), &codes("cot")),
            Ordering::Less
        );
        assert_eq!(
            dictionary.compare(&codes("cot"), &codes("cat")),
            Ordering::Greater
        );
        // A shorter buffer reads as zero-padded.
        assert_eq!(
            dictionary.compare(&codes("ca"), &codes("cat")),
            Ordering::Less
        );
    }

    #[test]
    fn test_single_letter_alphabet() {
        let mut dictionary = Dictionary::new(1, 3);
        assert!(dictionary.add_entry(&[1, 1, 1]));
        let found = dictionary.find_entry(&[WILDCARD; 3], &[], None).unwrap();
        assert_eq!(found.as_slice(), &[1, 1, 1]);
    }

    #[test]
    fn test_max_alphabet() {
        let mut dictionary = Dictionary::new(64, 2);
        assert!(dictionary.add_entry(&[64, 64]));
        let found = dictionary.find_entry(&[WILDCARD, WILDCARD], &[], None).unwrap();
        assert_eq!(found.as_slice(), &[64, 64]);
    }

    #[test]
    fn test_mask_longer_than_max_length_is_clamped() {
        let mut dictionary = Dictionary::new(26, 3);
        assert!(dictionary.add_entry(&codes("cat")));
        // A 4-byte mask is truncated to the 3-letter trie.
        let found = dictionary.find_entry(b"cat*", &[], None).unwrap();
        assert_eq!(found, codes("cat"));
    }
}
