//! Candidate factories
//!
//! A [`CandidateFactory`] builds generation zero. The engine never looks inside the
//! candidates it produces.

use rand::RngCore;

use crate::error::{EvoResult, EvolutionError};

/// Creates the initial population of a run
pub trait CandidateFactory<T>: Send + Sync {
    /// Create a single random candidate
    fn generate_random_candidate(&self, rng: &mut dyn RngCore) -> T;

    /// Create a population of `size` candidates
    ///
    /// Seed candidates come first, in the order given; the remainder is filled with
    /// random candidates. Supplying more seeds than `size` is an error.
    fn generate_initial_population(
        &self,
        size: usize,
        seeds: Vec<T>,
        rng: &mut dyn RngCore,
    ) -> EvoResult<Vec<T>> {
        if seeds.len() > size {
            return Err(EvolutionError::InvalidArgument(format!(
                "Too many seed candidates for population size: {} seeds, size {}",
                seeds.len(),
                size
            )));
        }

        let mut population = Vec::with_capacity(size);
        population.extend(seeds);
        while population.len() < size {
            population.push(self.generate_random_candidate(rng));
        }
        Ok(population)
    }
}

impl<T, F> CandidateFactory<T> for F
where
    F: Fn(&mut dyn RngCore) -> T + Send + Sync,
{
    fn generate_random_candidate(&self, rng: &mut dyn RngCore) -> T {
        self(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn digit_factory() -> impl CandidateFactory<u32> {
        |rng: &mut dyn RngCore| rng.gen_range(0..10u32)
    }

    #[test]
    fn test_random_population_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let population = digit_factory()
            .generate_initial_population(25, Vec::new(), &mut rng)
            .unwrap();
        assert_eq!(population.len(), 25);
        assert!(population.iter().all(|c| *c < 10));
    }

    #[test]
    fn test_seeds_come_first() {
        let mut rng = StdRng::seed_from_u64(7);
        let population = digit_factory()
            .generate_initial_population(5, vec![100, 200], &mut rng)
            .unwrap();
        assert_eq!(population.len(), 5);
        assert_eq!(&population[..2], &[100, 200]);
        assert!(population[2..].iter().all(|c| *c < 10));
    }

    #[test]
    fn test_too_many_seeds() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = digit_factory().generate_initial_population(1, vec![1, 2], &mut rng);
        assert!(matches!(result, Err(EvolutionError::InvalidArgument(_))));
    }
}
