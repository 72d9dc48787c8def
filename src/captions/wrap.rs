/// Phrases at or under this many characters always render on one line
pub const MIN_WRAP_CHARS: usize = 18;

/// Phrases with fewer words than this always render on one line
const MIN_WRAP_WORDS: usize = 4;

fn joined_len(words: &[&str]) -> usize {
    let chars: usize = words.iter().map(|w| w.chars().count()).sum();
    chars + words.len().saturating_sub(1)
}

/// Choose where to break a phrase into two balanced lines.
///
/// Returns `Some(i)` meaning `words[..i]` go on the first line and
/// `words[i..]` on the second, or `None` when the phrase stays on one line.
/// The split minimizes the difference in character length between the two
/// lines; the earliest index wins ties.
pub fn choose_split(words: &[&str], min_wrap_chars: usize) -> Option<usize> {
    if words.len() < MIN_WRAP_WORDS {
        return None;
    }

    if joined_len(words) <= min_wrap_chars {
        return None;
    }

    (1..words.len()).min_by_key(|&i| joined_len(&words[..i]).abs_diff(joined_len(&words[i..])))
}
