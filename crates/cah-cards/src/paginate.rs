use crate::geometry::CardGeometry;
use crate::types::{CardColor, Page};

/// Split card lines into pages of `geometry.capacity()` cards.
///
/// Line endings and tabs are trimmed from both ends and lines left empty are
/// dropped. Lines of spaces survive and print as blank cards.
pub fn paginate<S: AsRef<str>>(
    lines: &[S],
    geometry: &CardGeometry,
    color: CardColor,
) -> Vec<Page> {
    let cards: Vec<String> = lines
        .iter()
        .map(|line| line.as_ref().trim_matches(['\t', '\r', '\n']))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    cards
        .chunks(geometry.capacity().max(1))
        .map(|chunk| Page {
            color,
            cards: chunk.to_vec(),
        })
        .collect()
}

/// Split a whole file's contents into card lines
pub fn split_lines(contents: &str) -> Vec<String> {
    contents.lines().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CardGeometry {
        CardGeometry::compute(2.0, 2.0, false, false)
    }

    #[test]
    fn test_empty_input_has_no_pages() {
        let lines: Vec<String> = Vec::new();
        assert!(paginate(&lines, &small(), CardColor::White).is_empty());
        assert!(paginate(&["", "\t", "\r\n"], &small(), CardColor::White).is_empty());
    }

    #[test]
    fn test_page_count_and_order() {
        let g = small();
        let lines: Vec<String> = (0..45).map(|i| format!("card {i}")).collect();
        let pages = paginate(&lines, &g, CardColor::Black);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 20);
        assert_eq!(pages[1].len(), 20);
        assert_eq!(pages[2].len(), 5);
        assert!(pages.iter().all(Page::is_black));

        let rebuilt: Vec<String> = pages.into_iter().flat_map(|p| p.cards).collect();
        assert_eq!(rebuilt, lines);
    }

    #[test]
    fn test_exact_multiple_of_capacity() {
        let lines: Vec<String> = (0..40).map(|i| i.to_string()).collect();
        let pages = paginate(&lines, &small(), CardColor::White);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.len() == 20));
    }

    #[test]
    fn test_blank_lines_dropped_space_lines_kept() {
        let pages = paginate(&["one", "", "\t\t", "   ", "two\r"], &small(), CardColor::White);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].cards, vec!["one", "   ", "two"]);
    }

    #[test]
    fn test_pick_field_survives_trim() {
        let pages = paginate(&["\tPick these.\t2\r"], &small(), CardColor::Black);
        assert_eq!(pages[0].cards, vec!["Pick these.\t2"]);
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\n\nc"), vec!["a", "b", "", "c"]);
    }
}
