use std::cmp::Ordering;

/// Natural-order string comparator.
///
/// Embedded digit runs compare as integers rather than character by
/// character, so `"img2"` sorts before `"img10"`. An optional alphabet
/// override remaps a fixed character sequence into the band directly
/// above the digits, letting callers impose a custom letter ordering.
#[derive(Debug, Clone, Default)]
pub struct NaturalOrder {
    alphabet: Option<Vec<char>>,
}

// Ordering bands produced by `code_at`. Characters outside 45..=127 keep
// their raw code; everything in between is remapped:
//   45 ('-')            -> 65
//   46..=47 ('.' '/')   -> 45..=46
//   48..=57 ('0'..'9')  -> 66..=75   (the digit band)
//   58..=64             -> 47..=53
//   65..=90 ('A'..'Z')  -> 76..=101
//   91..=96             -> 54..=59
//   97..=122 ('a'..'z') -> 102..=127
//   123..=127           -> 60..=64
// Alphabet-override characters land at 76 + position, above the digits.
const DIGIT_BAND_LO: u32 = 66; // '0'
const DIGIT_BAND_HI: u32 = 75; // '9'
const ALPHABET_BASE: u32 = 76;

impl NaturalOrder {
    /// The default ordering with no alphabet override.
    pub fn new() -> Self {
        Self::default()
    }

    /// An ordering where each character of `alphabet` sorts by its
    /// position in the sequence instead of its default band.
    pub fn with_alphabet(alphabet: &str) -> Self {
        Self {
            alphabet: Some(alphabet.chars().collect()),
        }
    }

    /// Three-way comparison over the two strings.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }

        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut pos_a = 0;
        let mut pos_b = 0;

        loop {
            let code_a = self.code_at(&a, pos_a);
            let code_b = self.code_at(&b, pos_b);
            pos_a += 1;
            pos_b += 1;

            // Both cursors sit on a nonzero digit: compare the full runs
            // as integers and continue past them when equal.
            if is_run_start(code_a) && is_run_start(code_b) {
                let end_a = self.digit_run_end(&a, pos_a - 1);
                let end_b = self.digit_run_end(&b, pos_b - 1);
                match compare_digit_runs(&a[pos_a - 1..end_a], &b[pos_b - 1..end_b]) {
                    Ordering::Equal => {
                        pos_a = end_a;
                        pos_b = end_b;
                        continue;
                    }
                    unequal => return unequal,
                }
            }

            if code_a != code_b {
                return code_a.cmp(&code_b);
            }
            if code_b == 0 {
                // Both strings exhausted with no difference.
                return Ordering::Equal;
            }
        }
    }

    /// The ordering code for the character at `pos`, or 0 past the end.
    fn code_at(&self, s: &[char], pos: usize) -> u32 {
        let c = match s.get(pos) {
            Some(&c) => c,
            None => return 0,
        };

        if let Some(alphabet) = &self.alphabet {
            if let Some(idx) = alphabet.iter().position(|&a| a == c) {
                return ALPHABET_BASE + idx as u32;
            }
        }

        let code = c as u32;
        match code {
            0..=44 => code,
            45 => 65,
            46..=47 => code - 1,
            48..=57 => code + 18,
            58..=64 => code - 11,
            65..=90 => code + 11,
            91..=96 => code - 37,
            97..=122 => code + 5,
            123..=127 => code - 63,
            _ => code,
        }
    }

    /// First index at or after `start` whose code leaves the digit band.
    fn digit_run_end(&self, s: &[char], start: usize) -> usize {
        let mut end = start;
        while (DIGIT_BAND_LO..=DIGIT_BAND_HI).contains(&self.code_at(s, end)) {
            end += 1;
        }
        end
    }
}

/// Digit runs are only entered on `1`..`9`; a leading `0` compares in its
/// plain band, which keeps runs free of leading zeros.
fn is_run_start(code: u32) -> bool {
    code > DIGIT_BAND_LO && code <= DIGIT_BAND_HI
}

/// Integer comparison of two leading-zero-free digit runs: by length,
/// then digit-wise. Exact for runs of any length.
fn compare_digit_runs(a: &[char], b: &[char]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two strings with the default natural ordering.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalOrder::new().compare(a, b)
}
