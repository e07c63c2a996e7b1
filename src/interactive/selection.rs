//! Interactive selection strategy
//!
//! Groups of candidates are drawn at random from the population and shown to a
//! [`Console`]; the chosen member of each group is selected. Fitness scores are
//! ignored entirely.

use std::marker::PhantomData;

use rand::seq::index;
use rand::RngCore;
use tracing::debug;

use crate::error::SelectionError;
use crate::interactive::traits::Console;
use crate::operators::traits::SelectionStrategy;
use crate::population::individual::EvaluatedCandidate;

/// Selection strategy that defers every choice to an external decision-maker
///
/// At most `max_selections_per_generation` decisions are requested per call to
/// [`select`](SelectionStrategy::select). When more candidates are needed than
/// decisions were made, the chosen candidates are reused in turn; each reuse is an
/// independent clone.
pub struct InteractiveSelection<T, C> {
    console: C,
    group_size: usize,
    max_selections_per_generation: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C> InteractiveSelection<T, C>
where
    C: Console<T>,
{
    /// Create a new interactive selection
    ///
    /// `group_size` is the number of candidates shown per decision and must be at
    /// least 2. `max_selections_per_generation` must be at least 1.
    pub fn new(
        console: C,
        group_size: usize,
        max_selections_per_generation: usize,
    ) -> Result<Self, SelectionError> {
        if group_size < 2 {
            return Err(SelectionError::InvalidArgument(format!(
                "Group size must be at least 2, got {}",
                group_size
            )));
        }
        if max_selections_per_generation < 1 {
            return Err(SelectionError::InvalidArgument(
                "Max selections per generation must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            console,
            group_size,
            max_selections_per_generation,
            _marker: PhantomData,
        })
    }

    /// The decision surface
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Number of candidates shown per decision
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Upper bound on decisions requested per generation
    pub fn max_selections_per_generation(&self) -> usize {
        self.max_selections_per_generation
    }
}

impl<T, C> SelectionStrategy<T> for InteractiveSelection<T, C>
where
    T: Clone,
    C: Console<T>,
{
    fn select(
        &self,
        population: &[EvaluatedCandidate<T>],
        _natural_fitness: bool,
        selection_size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<T>, SelectionError> {
        if population.len() < self.group_size {
            return Err(SelectionError::InvalidArgument(format!(
                "Population of {} is smaller than the group size {}",
                population.len(),
                self.group_size
            )));
        }
        if selection_size == 0 {
            return Ok(Vec::new());
        }

        let decisions = self.max_selections_per_generation.min(selection_size);
        let mut chosen = Vec::with_capacity(decisions);

        for _ in 0..decisions {
            let mut group: Vec<T> = index::sample(rng, population.len(), self.group_size)
                .into_iter()
                .map(|i| population[i].candidate().clone())
                .collect();

            let choice = self.console.select(&group)?;
            if choice >= group.len() {
                return Err(SelectionError::ContractViolation(format!(
                    "Console chose index {} from a group of {}",
                    choice,
                    group.len()
                )));
            }
            chosen.push(group.swap_remove(choice));
        }

        debug!(
            decisions = chosen.len(),
            selection_size, "interactive selection complete"
        );

        Ok((0..selection_size)
            .map(|i| chosen[i % chosen.len()].clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecisionError;
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Picks the first member and records every group it was shown
    #[derive(Default)]
    struct RecordingConsole {
        groups: Mutex<Vec<Vec<u32>>>,
    }

    impl Console<u32> for RecordingConsole {
        fn select(&self, group: &[u32]) -> Result<usize, DecisionError> {
            self.groups.lock().push(group.to_vec());
            Ok(0)
        }
    }

    struct FixedConsole(Result<usize, DecisionError>);

    impl Console<u32> for FixedConsole {
        fn select(&self, _group: &[u32]) -> Result<usize, DecisionError> {
            self.0.clone()
        }
    }

    fn create_test_population(size: u32) -> Vec<EvaluatedCandidate<u32>> {
        (0..size).map(|i| EvaluatedCandidate::new(i, 0.0)).collect()
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 1, 1),
            Err(SelectionError::InvalidArgument(_))
        ));
        assert!(matches!(
            InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 2, 0),
            Err(SelectionError::InvalidArgument(_))
        ));
        assert!(InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 2, 1).is_ok());
    }

    #[test]
    fn test_single_decision_is_reused() {
        let mut rng = StdRng::seed_from_u64(1);
        let selection = InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 5, 1).unwrap();
        let population = create_test_population(5);

        let selected = selection.select(&population, true, 3, &mut rng).unwrap();

        let groups = selection.console().groups.lock();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 5);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|c| *c == groups[0][0]));
    }

    #[test]
    fn test_one_decision_per_selected_candidate() {
        let mut rng = StdRng::seed_from_u64(2);
        let selection = InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 5, 3).unwrap();
        let population = create_test_population(5);

        let selected = selection.select(&population, true, 3, &mut rng).unwrap();

        let groups = selection.console().groups.lock();
        assert_eq!(groups.len(), 3);
        let firsts: Vec<u32> = groups.iter().map(|g| g[0]).collect();
        assert_eq!(selected, firsts);
    }

    #[test]
    fn test_groups_have_distinct_members() {
        let mut rng = StdRng::seed_from_u64(3);
        let selection = InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 4, 10).unwrap();
        let population = create_test_population(20);

        selection.select(&population, false, 10, &mut rng).unwrap();

        for group in selection.console().groups.lock().iter() {
            let mut sorted = group.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 4);
        }
    }

    #[test]
    fn test_group_larger_than_population() {
        let mut rng = StdRng::seed_from_u64(4);
        let selection = InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 6, 1).unwrap();
        let result = selection.select(&create_test_population(5), true, 2, &mut rng);
        assert!(matches!(result, Err(SelectionError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_selection_size() {
        let mut rng = StdRng::seed_from_u64(4);
        let selection = InteractiveSelection::<u32, _>::new(RecordingConsole::default(), 2, 1).unwrap();
        let selected = selection
            .select(&create_test_population(5), true, 0, &mut rng)
            .unwrap();
        assert!(selected.is_empty());
        assert!(selection.console().groups.lock().is_empty());
    }

    #[test]
    fn test_out_of_range_choice_is_contract_violation() {
        let mut rng = StdRng::seed_from_u64(5);
        let selection = InteractiveSelection::<u32, _>::new(FixedConsole(Ok(2)), 2, 1).unwrap();
        let result = selection.select(&create_test_population(4), true, 1, &mut rng);
        assert!(matches!(result, Err(SelectionError::ContractViolation(_))));
    }

    #[test]
    fn test_decision_error_propagates() {
        let mut rng = StdRng::seed_from_u64(5);
        let selection =
            InteractiveSelection::<u32, _>::new(FixedConsole(Err(DecisionError::Interrupted)), 2, 1).unwrap();
        let result = selection.select(&create_test_population(4), true, 1, &mut rng);
        assert_eq!(
            result,
            Err(SelectionError::Decision(DecisionError::Interrupted))
        );
    }
}
