use std::cmp::Ordering;

/// Numeric-aware version comparison.
///
/// Both strings are split into alternating runs of ASCII digits and
/// non-digits. Digit runs compare by numeric value (so `10 > 9`), other runs
/// compare as text ignoring case (so `alpha < Beta`). Strings that tie this way
/// (`1.01` vs `1.1`, `RC` vs `rc`) fall back to a byte comparison so the
/// ordering stays total.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = Segments::new(a);
    let mut right = Segments::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_segment(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let a_digits = a.starts_with(|c: char| c.is_ascii_digit());
    let b_digits = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_digits, b_digits) {
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        // digits sort before text, as in "1.0.0" < "1.0.beta"
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(self.rest.len());
        let (seg, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(seg)
    }
}
