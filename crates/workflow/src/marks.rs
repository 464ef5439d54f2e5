//! Post-processing gate over drafted text.

use std::sync::LazyLock;

use regex::Regex;

pub const CITE_MARK: &str = "[CITE]";
pub const VERIFY_MARK: &str = "[VERIFY]";

static BARE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());

static PAREN_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]+,\s*\d{4}\)").unwrap());

/// Flag every line carrying a bare year claim with no parenthetical
/// `(<text>, <year>)` citation.
///
/// Line-local, deterministic and idempotent: a line that already ends in
/// `[CITE]` is left alone, so re-running the pass cannot stack markers.
/// This guarantees presence of marking, not citation correctness.
pub fn enforce_marks(text: &str) -> String {
    text.lines()
        .map(|line| {
            if BARE_YEAR.is_match(line)
                && !PAREN_CITATION.is_match(line)
                && !line.trim_end().ends_with(CITE_MARK)
            {
                format!("{line} {CITE_MARK}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_year_line_is_marked() {
        assert_eq!(
            enforce_marks("Emissions fell in 2019."),
            "Emissions fell in 2019. [CITE]"
        );
    }

    #[test]
    fn cited_line_is_left_unchanged() {
        let line = "Emissions fell (Smith, 2019).";
        assert_eq!(enforce_marks(line), line);
    }

    #[test]
    fn marking_is_idempotent() {
        let text = "Emissions fell in 2019.\nPrices rose (OECD, 2021).\nNo year here.";
        let once = enforce_marks(text);
        let twice = enforce_marks(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn marking_is_line_local() {
        let text = "Report of 2020 findings.\nAlready settled (Lee, 2020).";
        let marked = enforce_marks(text);
        let lines: Vec<&str> = marked.lines().collect();
        assert!(lines[0].ends_with("[CITE]"));
        assert!(!lines[1].contains("[CITE]"));
    }

    #[test]
    fn lines_without_years_pass_through() {
        let text = "No numbers at all.\nShort ones like 42 or 123 do not count.";
        assert_eq!(enforce_marks(text), text);
    }

    #[test]
    fn five_digit_numbers_do_not_trigger() {
        let text = "The budget was 20199 units.";
        assert_eq!(enforce_marks(text), text);
    }
}
