//! Common utilities shared across domain models

use std::cmp::Ordering;
use std::time::Duration;

/// Formats a duration as `HH:MM:SS.mmm`
///
/// Hours are always shown and are not capped at 99.
pub fn format_timestamp(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Formats `elapsed/duration` as shown in the player status line
pub fn format_progress(elapsed: Duration, duration: Duration) -> String {
    format!("{}/{}", format_timestamp(elapsed), format_timestamp(duration))
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(if prev {
                    Chunk::Digits(&s[start..i])
                } else {
                    Chunk::Text(&s[start..i])
                });
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(digits) = in_digits {
        out.push(if digits {
            Chunk::Digits(&s[start..])
        } else {
            Chunk::Text(&s[start..])
        });
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Natural, case-insensitive, numeric-aware comparison.
///
/// `"Book 2"` sorts before `"book 10"`. Ties on the case-folded form fall
/// back to a plain comparison so the ordering stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let a_chunks = chunks(&a_lower);
    let b_chunks = chunks(&b_lower);

    for (ca, cb) in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = match (ca, cb) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_chunks
        .len()
        .cmp(&b_chunks.len())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_zero() {
        assert_eq!(format_timestamp(Duration::ZERO), "00:00:00.000");
    }

    #[test]
    fn test_format_timestamp_with_hours() {
        let d = Duration::from_millis(3_665_250); // 1h 1m 5.25s
        assert_eq!(format_timestamp(d), "01:01:05.250");
    }

    #[test]
    fn test_format_timestamp_long_book() {
        let d = Duration::from_secs(100 * 3600);
        assert_eq!(format_timestamp(d), "100:00:00.000");
    }

    #[test]
    fn test_format_progress() {
        let s = format_progress(Duration::from_secs(90), Duration::from_secs(600));
        assert_eq!(s, "00:01:30.000/00:10:00.000");
    }

    #[test]
    fn test_natural_cmp_numbers() {
        assert_eq!(natural_cmp("Book 2", "Book 10"), Ordering::Less);
        assert_eq!(natural_cmp("Book 10", "Book 2"), Ordering::Greater);
    }

    #[test]
    fn test_natural_cmp_case_insensitive() {
        assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(natural_cmp("Zeta", "alpha"), Ordering::Greater);
    }

    #[test]
    fn test_natural_cmp_leading_zeros() {
        assert_eq!(natural_cmp("Part 02", "Part 3"), Ordering::Less);
        assert_ne!(natural_cmp("Part 02", "Part 2"), Ordering::Equal);
    }

    #[test]
    fn test_natural_sort() {
        let mut titles = vec!["Vol 10", "vol 1", "Vol 2", "Appendix"];
        titles.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(titles, vec!["Appendix", "vol 1", "Vol 2", "Vol 10"]);
    }
}
