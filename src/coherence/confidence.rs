//! Baseline confidence of the linker's own decision.
//!
//! The margin between the best and second-best raw candidate scores says how
//! decisively the linker picked its label. Coherence has to beat this margin
//! to overturn the pick.

use coherent_core::{CandidateMap, Error, Result};

/// Confidence margin of a candidate map.
///
/// With a single candidate this is that candidate's raw score. Otherwise it
/// is `top1 - top2` over the scores in descending order, which is `0.0` when
/// the top two tie.
///
/// # Errors
///
/// [`Error::InvalidInput`] for an empty map. Callers holding a whole
/// mention should check [`coherent_core::Mention::ensure_candidates`] first
/// to get an error that names the span.
///
/// # Example
///
/// ```
/// use coherent::coherence::confidence_margin;
/// use coherent_core::CandidateMap;
///
/// let map = CandidateMap::new().with_candidate("Paris", 0.9).with_candidate("Berlin", 0.1);
/// assert!((confidence_margin(&map).unwrap() - 0.8).abs() < 1e-12);
/// ```
pub fn confidence_margin(candidates: &CandidateMap) -> Result<f64> {
    if let Some((_, score)) = candidates.sole() {
        return Ok(score);
    }
    let (top1, top2) = top_two(candidates.scores()).ok_or_else(|| {
        Error::invalid_input("cannot compute confidence of an empty candidate map")
    })?;
    Ok(top1 - top2)
}

/// Largest and second-largest values, by `f64::total_cmp`.
fn top_two(scores: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut first: Option<f64> = None;
    let mut second: Option<f64> = None;
    for s in scores {
        match first {
            Some(f) if s.total_cmp(&f).is_le() => {
                if second.map_or(true, |t| s.total_cmp(&t).is_gt()) {
                    second = Some(s);
                }
            }
            _ => {
                second = first;
                first = Some(s);
            }
        }
    }
    Some((first?, second?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> CandidateMap {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn single_candidate_returns_raw_score() {
        assert_eq!(confidence_margin(&map(&[("Unknown_X", 0.5)])).unwrap(), 0.5);
        assert_eq!(confidence_margin(&map(&[("Neg", -3.25)])).unwrap(), -3.25);
    }

    #[test]
    fn margin_between_top_two() {
        let m = map(&[("A", 0.1), ("B", 0.7), ("C", 0.4)]);
        assert!((confidence_margin(&m).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn margin_ignores_insertion_order() {
        let a = map(&[("A", 0.2), ("B", 0.9), ("C", 0.5)]);
        let b = map(&[("C", 0.5), ("A", 0.2), ("B", 0.9)]);
        assert_eq!(confidence_margin(&a).unwrap(), confidence_margin(&b).unwrap());
    }

    #[test]
    fn tied_top_scores_give_zero() {
        let m = map(&[("A", 0.6), ("B", 0.6), ("C", 0.1)]);
        assert_eq!(confidence_margin(&m).unwrap(), 0.0);
    }

    #[test]
    fn unbounded_scores_allowed() {
        let m = map(&[("A", 12.0), ("B", -4.0)]);
        assert_eq!(confidence_margin(&m).unwrap(), 16.0);
    }

    #[test]
    fn empty_map_is_an_error() {
        assert!(confidence_margin(&CandidateMap::new()).is_err());
    }

    #[test]
    fn top_two_tracks_second_best() {
        assert_eq!(top_two([1.0, 5.0, 3.0, 4.0].into_iter()), Some((5.0, 4.0)));
        assert_eq!(top_two([2.0].into_iter()), None);
    }
}
