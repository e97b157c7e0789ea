//! Locale-aware sentence boundary extraction (C6, second half).
//!
//! Pull-based: each call extracts the first complete sentence and leaves
//! the remainder for the next call. Returns `None` when no complete
//! sentence boundary is present yet — the caller must wait for more text.

/// Characters that can terminate a sentence, by locale family. We don't
/// attempt full Unicode sentence-break rules (UAX #29); full-width
/// punctuation used by CJK locales is treated the same way a terminal ASCII
/// punctuation mark is.
const TERMINATORS: &[char] = &['.', '!', '?', '\u{3002}', '\u{FF01}', '\u{FF1F}'];

/// Extracts the first complete sentence from `buf`, if one is present.
///
/// A sentence is complete once a terminator is found that is not part of a
/// recognized abbreviation (a single uppercase letter followed by `.`, e.g.
/// "Mr.", or a decimal point between digits) and is followed by whitespace,
/// another terminator, a closing quote/paren, or end of input alongside a
/// trailing terminator run (e.g. "Really?!").
///
/// Returns `Some((sentence, consumed))` where `consumed` is the byte count
/// to drop from the front of `buf`, including any trailing whitespace
/// swallowed after the terminator; or `None` if no boundary is found yet.
pub fn extract_sentence(buf: &str) -> Option<(String, usize)> {
    let chars: Vec<(usize, char)> = buf.char_indices().collect();

    for i in 0..chars.len() {
        let (_byte_idx, ch) = chars[i];
        if !TERMINATORS.contains(&ch) {
            continue;
        }
        if is_decimal_point(&chars, i) {
            continue;
        }
        if is_abbreviation(&chars, i) {
            continue;
        }

        // Consume any immediately following terminators ("?!", "...").
        let mut end = i;
        while end + 1 < chars.len() && TERMINATORS.contains(&chars[end + 1].1) {
            end += 1;
        }
        // Consume one trailing closing quote/paren, if present.
        if end + 1 < chars.len() && matches!(chars[end + 1].1, '"' | '\'' | '\u{201D}' | ')') {
            end += 1;
        }

        let terminator_end_byte = if end + 1 < chars.len() {
            chars[end + 1].0
        } else {
            buf.len()
        };

        // Require whitespace or end-of-input after the terminator run to
        // call the sentence complete; otherwise this looks like a decimal
        // or abbreviation we didn't recognize, and we keep scanning.
        let is_end_of_input = terminator_end_byte == buf.len();
        let followed_by_space = buf[terminator_end_byte..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace());
        if !is_end_of_input && !followed_by_space {
            continue;
        }

        let consumed_end = skip_following_whitespace(buf, terminator_end_byte);
        let sentence = buf[..terminator_end_byte].to_string();
        return Some((sentence, consumed_end));
    }

    None
}

fn skip_following_whitespace(buf: &str, from: usize) -> usize {
    let mut end = from;
    for ch in buf[from..].chars() {
        if ch.is_whitespace() {
            end += ch.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn is_decimal_point(chars: &[(usize, char)], i: usize) -> bool {
    if chars[i].1 != '.' {
        return false;
    }
    let prev_is_digit = i > 0 && chars[i - 1].1.is_ascii_digit();
    let next_is_digit = i + 1 < chars.len() && chars[i + 1].1.is_ascii_digit();
    prev_is_digit && next_is_digit
}

/// Single capitalized letter immediately before the period, e.g. "Mr." or
/// "U.S." — a coarse heuristic, not a dictionary of abbreviations.
fn is_abbreviation(chars: &[(usize, char)], i: usize) -> bool {
    if chars[i].1 != '.' || i == 0 {
        return false;
    }
    let prev = chars[i - 1].1;
    if !prev.is_alphabetic() {
        return false;
    }
    let word_start = {
        let mut j = i - 1;
        while j > 0 && chars[j - 1].1.is_alphabetic() {
            j -= 1;
        }
        j
    };
    let word_len = i - word_start;
    word_len <= 2 && chars[word_start].1.is_uppercase()
}
