//! Word-initial title casing.

/// Title-cases `input`: every letter that starts the string or follows a
/// non-letter is upper-cased, every other letter is lower-cased.
///
/// Unlike English title-case rules, short words are not special-cased, so
/// `"PABEAN CANTIAN"` becomes `"Pabean Cantian"` and `"O'BRIEN"` becomes
/// `"O'Brien"`.
///
/// Letters whose case mapping expands to several characters keep only the
/// leading one in upper case: `"ßAWAHAN"` becomes `"Ssawahan"` and a
/// mid-word `'İ'` becomes `'i'`. Every letter therefore maps to letters
/// alone and the function is idempotent.
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_is_letter = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.push(lower(c));
            } else {
                let mut upper = c.to_uppercase();
                out.push(upper.next().unwrap_or(c));
                out.extend(upper.map(lower));
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
