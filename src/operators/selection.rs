//! Selection strategies
//!
//! This module provides the built-in fitness-based selection strategies. They form a
//! closed set, so they are variants of one enum; user-defined strategies (such as
//! interactive selection) implement [`SelectionStrategy`] directly.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, WeightedIndex};

use crate::error::SelectionError;
use crate::operators::traits::SelectionStrategy;
use crate::population::individual::EvaluatedCandidate;

/// Built-in fitness-based selection strategy
#[derive(Clone, Debug, PartialEq)]
pub enum FitnessSelection {
    /// Pairwise tournament
    ///
    /// Two candidates are drawn at random; the fitter one wins with the given
    /// probability, otherwise the weaker one does.
    Tournament {
        /// Probability that the fitter candidate wins, in (0.5, 1.0]
        probability: f64,
    },

    /// Truncation selection
    ///
    /// Only the top fraction of the ranked population is eligible; eligible
    /// candidates are taken best-first and reused in turn until enough are selected.
    Truncation {
        /// Fraction of the population that is eligible, in (0.0, 1.0]
        ratio: f64,
    },

    /// Fitness-proportionate (roulette wheel) selection
    ///
    /// With inverted fitness the weight of a candidate is the reciprocal of its
    /// score; candidates scoring exactly zero are then always preferred.
    RouletteWheel,
}

impl FitnessSelection {
    /// Create a tournament selection
    pub fn tournament(probability: f64) -> Result<Self, SelectionError> {
        if !(probability > 0.5 && probability <= 1.0) {
            return Err(SelectionError::InvalidArgument(format!(
                "Tournament probability must be in (0.5, 1.0], got {}",
                probability
            )));
        }
        Ok(Self::Tournament { probability })
    }

    /// Create a truncation selection
    pub fn truncation(ratio: f64) -> Result<Self, SelectionError> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(SelectionError::InvalidArgument(format!(
                "Truncation ratio must be in (0.0, 1.0], got {}",
                ratio
            )));
        }
        Ok(Self::Truncation { ratio })
    }

    fn select_tournament<T: Clone>(
        population: &[EvaluatedCandidate<T>],
        natural_fitness: bool,
        probability: f64,
        selection_size: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<T> {
        (0..selection_size)
            .map(|_| {
                let a = &population[rng.gen_range(0..population.len())];
                let b = &population[rng.gen_range(0..population.len())];
                let (fitter, weaker) = if b.is_better_than(a, natural_fitness) {
                    (b, a)
                } else {
                    (a, b)
                };
                let winner = if rng.gen::<f64>() < probability {
                    fitter
                } else {
                    weaker
                };
                winner.candidate().clone()
            })
            .collect()
    }

    fn select_truncation<T: Clone>(
        population: &[EvaluatedCandidate<T>],
        ratio: f64,
        selection_size: usize,
    ) -> Vec<T> {
        let eligible = ((population.len() as f64) * ratio).ceil() as usize;
        let eligible = eligible.clamp(1, population.len());

        (0..selection_size)
            .map(|i| population[i % eligible].candidate().clone())
            .collect()
    }

    fn select_roulette<T: Clone>(
        population: &[EvaluatedCandidate<T>],
        natural_fitness: bool,
        selection_size: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<T> {
        let weights: Vec<f64> = if natural_fitness {
            let min_fitness = population
                .iter()
                .map(|e| e.fitness())
                .fold(f64::INFINITY, f64::min);
            let offset = if min_fitness < 0.0 { -min_fitness } else { 0.0 };
            population.iter().map(|e| e.fitness() + offset).collect()
        } else {
            // Zero cost is infinitely fit: only the perfect candidates get any weight
            let perfect = population.iter().any(|e| e.fitness() == 0.0);
            population
                .iter()
                .map(|e| match (perfect, e.fitness()) {
                    (true, f) if f == 0.0 => 1.0,
                    (true, _) => 0.0,
                    (false, f) => 1.0 / f.abs(),
                })
                .collect()
        };

        match WeightedIndex::new(&weights) {
            Ok(dist) => (0..selection_size)
                .map(|_| population[dist.sample(rng)].candidate().clone())
                .collect(),
            // All weights zero: every candidate is equally (un)fit
            Err(_) => (0..selection_size)
                .map(|_| population[rng.gen_range(0..population.len())].candidate().clone())
                .collect(),
        }
    }
}

impl<T: Clone> SelectionStrategy<T> for FitnessSelection {
    fn select(
        &self,
        population: &[EvaluatedCandidate<T>],
        natural_fitness: bool,
        selection_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, SelectionError> {
        if selection_size == 0 {
            return Ok(Vec::new());
        }
        if population.is_empty() {
            return Err(SelectionError::InvalidArgument(
                "Cannot select from an empty population".to_string(),
            ));
        }

        let selected = match *self {
            Self::Tournament { probability } => Self::select_tournament(
                population,
                natural_fitness,
                probability,
                selection_size,
                rng,
            ),
            Self::Truncation { ratio } => Self::select_truncation(population, ratio, selection_size),
            Self::RouletteWheel => {
                Self::select_roulette(population, natural_fitness, selection_size, rng)
            }
        };
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_population() -> Vec<EvaluatedCandidate<u32>> {
        // Ranked best-first for natural fitness
        vec![
            EvaluatedCandidate::new(4, 40.0),
            EvaluatedCandidate::new(3, 30.0),
            EvaluatedCandidate::new(2, 20.0),
            EvaluatedCandidate::new(1, 10.0),
        ]
    }

    #[test]
    fn test_constructors_validate() {
        assert!(FitnessSelection::tournament(0.7).is_ok());
        assert!(FitnessSelection::tournament(1.0).is_ok());
        assert!(FitnessSelection::tournament(0.5).is_err());
        assert!(FitnessSelection::tournament(1.5).is_err());

        assert!(FitnessSelection::truncation(0.5).is_ok());
        assert!(FitnessSelection::truncation(0.0).is_err());
        assert!(FitnessSelection::truncation(f64::NAN).is_err());
    }

    #[test]
    fn test_selection_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let population = create_test_population();
        for strategy in [
            FitnessSelection::tournament(0.8).unwrap(),
            FitnessSelection::truncation(0.5).unwrap(),
            FitnessSelection::RouletteWheel,
        ] {
            let selected = strategy.select(&population, true, 7, &mut rng).unwrap();
            assert_eq!(selected.len(), 7);
            assert!(selected.iter().all(|c| (1..=4).contains(c)));
        }
    }

    #[test]
    fn test_truncation_takes_top_round_robin() {
        let mut rng = StdRng::seed_from_u64(3);
        let population = create_test_population();
        let strategy = FitnessSelection::truncation(0.5).unwrap();
        let selected = strategy.select(&population, true, 5, &mut rng).unwrap();
        assert_eq!(selected, vec![4, 3, 4, 3, 4]);
    }

    #[test]
    fn test_deterministic_tournament_never_picks_worst() {
        let mut rng = StdRng::seed_from_u64(11);
        let population = create_test_population();
        let strategy = FitnessSelection::tournament(1.0).unwrap();
        let selected = strategy.select(&population, true, 200, &mut rng).unwrap();
        // The worst candidate can only win a tournament against itself
        let worst_wins = selected.iter().filter(|c| **c == 1).count();
        assert!(worst_wins < 40, "worst candidate won {} times", worst_wins);
    }

    #[test]
    fn test_roulette_inverted_prefers_zero_cost() {
        let mut rng = StdRng::seed_from_u64(5);
        let population = vec![
            EvaluatedCandidate::new(10, 0.0),
            EvaluatedCandidate::new(20, 3.0),
            EvaluatedCandidate::new(30, 9.0),
        ];
        let selected = FitnessSelection::RouletteWheel
            .select(&population, false, 20, &mut rng)
            .unwrap();
        assert!(selected.iter().all(|c| *c == 10));
    }

    #[test]
    fn test_roulette_all_zero_weights_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(5);
        let population = vec![EvaluatedCandidate::new(1, 0.0), EvaluatedCandidate::new(2, 0.0)];
        let selected = FitnessSelection::RouletteWheel
            .select(&population, true, 10, &mut rng)
            .unwrap();
        assert_eq!(selected.len(), 10);
    }

    #[test]
    fn test_empty_population() {
        let mut rng = StdRng::seed_from_u64(5);
        let population: Vec<EvaluatedCandidate<u32>> = Vec::new();
        let result = FitnessSelection::RouletteWheel.select(&population, true, 1, &mut rng);
        assert!(matches!(result, Err(SelectionError::InvalidArgument(_))));
        assert!(FitnessSelection::RouletteWheel
            .select(&population, true, 0, &mut rng)
            .unwrap()
            .is_empty());
    }
}
