//! Natural ordering of file names: digit runs compare by value, so `page2`
//! sorts before `page10`, and text ignores case, so `Page3` sorts after
//! `page2`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> impl Iterator<Item = Chunk<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest.find(|c: char| c.is_ascii_digit() != digit).unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(if digit { Chunk::Digits(chunk) } else { Chunk::Text(chunk) })
    })
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Equal-length digit strings compare lexicographically as numbers.
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

/// Natural comparison, with a plain lexicographic comparison as tie-break so
/// that `p01` and `p1` (or `P1` and `p1`) still have a stable order.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Digits(x)), Some(Chunk::Digits(y))) => compare_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => compare_text(x, y),
            (Some(Chunk::Digits(_)), Some(Chunk::Text(_))) => Ordering::Less,
            (Some(Chunk::Text(_)), Some(Chunk::Digits(_))) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("page2", "page10", Ordering::Less)]
    #[case("page10", "page9", Ordering::Greater)]
    #[case("a.jpg", "b.jpeg", Ordering::Less)]
    #[case("p01", "p1", Ordering::Less)]
    #[case("p1", "p1", Ordering::Equal)]
    #[case("10", "a", Ordering::Less)]
    #[case("scan_2_b", "scan_2_a", Ordering::Greater)]
    #[case("img", "img1", Ordering::Less)]
    #[case("Page3", "page10", Ordering::Less)]
    #[case("SCAN_b", "scan_A", Ordering::Greater)]
    #[case("P1", "p1", Ordering::Less)]
    fn test_compare(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(a, b), expected);
    }

    #[test]
    fn test_sorts_pages() {
        let mut pages = vec!["page10.jpg", "page1.jpg", "page2.jpg", "Page3.jpg", "PAGE1.jpg"];
        pages.sort_by(|a, b| compare(a, b));
        assert_eq!(pages, ["PAGE1.jpg", "page1.jpg", "page2.jpg", "Page3.jpg", "page10.jpg"]);
    }
}
