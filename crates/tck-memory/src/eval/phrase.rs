//! Sloppy phrase distance.
//!
//! Term `j` of the phrase found at position `p_j` is displaced by
//! `p_j - j`. The slop a match needs is the spread between the largest and
//! the smallest displacement, minimized over every choice of distinct
//! positions.

/// Smallest slop at which `phrase` matches `terms`, `None` when a phrase
/// term is absent or the phrase is empty.
#[must_use]
pub fn phrase_slop(terms: &[String], phrase: &[String]) -> Option<u32> {
    if phrase.is_empty() {
        return None;
    }

    let positions = phrase
        .iter()
        .map(|term| {
            terms
                .iter()
                .enumerate()
                .filter(|(_, t)| *t == term)
                .map(|(p, _)| p as i64)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    if positions.iter().any(Vec::is_empty) {
        return None;
    }

    let mut search = Search {
        positions: &positions,
        chosen: Vec::with_capacity(phrase.len()),
        best: None,
    };
    search.descend(0, i64::MAX, i64::MIN);

    search.best.map(|spread| spread as u32)
}

#[must_use]
pub fn phrase_matches(terms: &[String], phrase: &[String], slop: u32) -> bool {
    phrase_slop(terms, phrase).is_some_and(|needed| needed <= slop)
}

struct Search<'p> {
    positions: &'p [Vec<i64>],
    chosen: Vec<i64>,
    best: Option<i64>,
}

impl Search<'_> {
    fn descend(&mut self, term: usize, low: i64, high: i64) {
        if term == self.positions.len() {
            let spread = high - low;
            if self.best.is_none_or(|best| spread < best) {
                self.best = Some(spread);
            }
            return;
        }

        let offset = term as i64;
        for &position in &self.positions[term] {
            if self.chosen.contains(&position) {
                continue;
            }
            let displacement = position - offset;
            let (low, high) = (low.min(displacement), high.max(displacement));
            if self.best.is_some_and(|best| high - low >= best) {
                continue;
            }

            self.chosen.push(position);
            self.descend(term + 1, low, high);
            self.chosen.pop();
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn exact_phrase_needs_no_slop() {
        assert_eq!(phrase_slop(&words("the quick fox"), &words("quick fox")), Some(0));
    }

    #[test]
    fn gaps_and_transpositions() {
        let phrase = words("quick fox");

        assert_eq!(phrase_slop(&words("quick brown fox"), &phrase), Some(1));
        assert_eq!(phrase_slop(&words("quick a b c fox"), &phrase), Some(3));
        assert_eq!(phrase_slop(&words("fox quick"), &phrase), Some(2));
        assert_eq!(phrase_slop(&words("quick dog"), &phrase), None);
    }

    #[test]
    fn repeated_terms_take_distinct_positions() {
        assert_eq!(phrase_slop(&words("la la"), &words("la la")), Some(0));
        assert_eq!(phrase_slop(&words("la"), &words("la la")), None);
    }

    #[test]
    fn best_occurrence_wins() {
        let terms = words("quick x x x fox quick fox");

        assert_eq!(phrase_slop(&terms, &words("quick fox")), Some(0));
    }

    proptest! {
        #[test]
        fn filler_between_two_terms_is_the_slop(gap in 0usize..12, lead in 0usize..5) {
            let mut terms = vec!["pad".to_string(); lead];
            terms.push("quick".into());
            terms.extend(std::iter::repeat_n("filler".to_string(), gap));
            terms.push("fox".into());

            let phrase = words("quick fox");
            prop_assert_eq!(phrase_slop(&terms, &phrase), Some(gap as u32));
            prop_assert!(phrase_matches(&terms, &phrase, gap as u32));
            let tighter = gap.saturating_sub(1) as u32;
            prop_assert_eq!(phrase_matches(&terms, &phrase, tighter), gap == 0);
        }

        #[test]
        fn contiguous_phrase_anywhere_matches_exactly(
            phrase in prop::collection::vec("[a-e]{1,3}", 1..5),
            lead in 0usize..4,
        ) {
            let mut terms = vec!["zz".to_string(); lead];
            terms.extend(phrase.iter().cloned());

            prop_assert_eq!(phrase_slop(&terms, &phrase), Some(0));
        }
    }
}
