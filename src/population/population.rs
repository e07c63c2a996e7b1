//! Population ranking
//!
//! A population is a plain slice of [`EvaluatedCandidate`]s. Before any consumer sees
//! it, it is sorted best-first: descending scores for natural fitness, ascending for
//! inverted fitness.

use std::cmp::Ordering;

use crate::population::individual::EvaluatedCandidate;

/// Order two candidates best-first under the given fitness convention
///
/// Numerically equal scores (including `0.0` and `-0.0`) compare equal. The
/// evaluation barrier rejects NaN scores; should one get here it ties with everything.
pub fn compare_fitness<T>(
    a: &EvaluatedCandidate<T>,
    b: &EvaluatedCandidate<T>,
    natural_fitness: bool,
) -> Ordering {
    let (better, worse) = if natural_fitness { (b, a) } else { (a, b) };
    better
        .fitness()
        .partial_cmp(&worse.fitness())
        .unwrap_or(Ordering::Equal)
}

/// Sort a population best-first
///
/// The sort is stable: candidates with equal scores keep their relative order, so
/// repeated ranking of the same population always yields the same elite.
pub fn sort_evaluated_population<T>(population: &mut [EvaluatedCandidate<T>], natural_fitness: bool) {
    population.sort_by(|a, b| compare_fitness(a, b, natural_fitness));
}

/// Check that a population is ranked best-first
pub fn is_ranked<T>(population: &[EvaluatedCandidate<T>], natural_fitness: bool) -> bool {
    population
        .windows(2)
        .all(|pair| compare_fitness(&pair[0], &pair[1], natural_fitness) != Ordering::Greater)
}

/// Clone the candidates of the `count` best entries of a ranked population
pub fn elite<T: Clone>(ranked: &[EvaluatedCandidate<T>], count: usize) -> Vec<T> {
    ranked
        .iter()
        .take(count)
        .map(|evaluated| evaluated.candidate().clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_population() -> Vec<EvaluatedCandidate<&'static str>> {
        vec![
            EvaluatedCandidate::new("b", 20.0),
            EvaluatedCandidate::new("e", 50.0),
            EvaluatedCandidate::new("a", 10.0),
            EvaluatedCandidate::new("d", 40.0),
            EvaluatedCandidate::new("c", 30.0),
        ]
    }

    fn names(population: &[EvaluatedCandidate<&'static str>]) -> Vec<&'static str> {
        population.iter().map(|e| *e.candidate()).collect()
    }

    #[test]
    fn test_sort_natural_descending() {
        let mut pop = create_test_population();
        sort_evaluated_population(&mut pop, true);
        assert_eq!(names(&pop), vec!["e", "d", "c", "b", "a"]);
        assert!(is_ranked(&pop, true));
    }

    #[test]
    fn test_sort_inverted_ascending() {
        let mut pop = create_test_population();
        sort_evaluated_population(&mut pop, false);
        assert_eq!(names(&pop), vec!["a", "b", "c", "d", "e"]);
        assert!(is_ranked(&pop, false));
        assert!(!is_ranked(&pop, true));
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut pop = vec![
            EvaluatedCandidate::new("first", 1.0),
            EvaluatedCandidate::new("top", 2.0),
            EvaluatedCandidate::new("second", 1.0),
            EvaluatedCandidate::new("third", 1.0),
        ];
        sort_evaluated_population(&mut pop, true);
        assert_eq!(names(&pop), vec!["top", "first", "second", "third"]);

        sort_evaluated_population(&mut pop, true);
        assert_eq!(names(&pop), vec!["top", "first", "second", "third"]);

        sort_evaluated_population(&mut pop, false);
        assert_eq!(names(&pop), vec!["first", "second", "third", "top"]);
    }

    #[test]
    fn test_signed_zeros_are_ties() {
        let mut pop = vec![
            EvaluatedCandidate::new("positive", 0.0),
            EvaluatedCandidate::new("negative", -0.0),
        ];
        sort_evaluated_population(&mut pop, true);
        assert_eq!(names(&pop), vec!["positive", "negative"]);
        sort_evaluated_population(&mut pop, false);
        assert_eq!(names(&pop), vec!["positive", "negative"]);
        assert_eq!(compare_fitness(&pop[0], &pop[1], true), Ordering::Equal);
    }

    #[test]
    fn test_elite_takes_best() {
        let mut pop = create_test_population();
        sort_evaluated_population(&mut pop, true);
        assert_eq!(elite(&pop, 2), vec!["e", "d"]);
        assert!(elite(&pop, 0).is_empty());
    }

    #[test]
    fn test_empty_and_single_are_ranked() {
        let empty: Vec<EvaluatedCandidate<u8>> = Vec::new();
        assert!(is_ranked(&empty, true));
        assert!(is_ranked(&[EvaluatedCandidate::new(1u8, 0.0)], false));
    }
}
