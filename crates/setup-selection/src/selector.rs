use ranking::{CompiledFormula, RankedResult, Ranker};
use setup_types::{Resource, Tolerance};
use tracing::{debug, info, instrument};

use crate::clamping_features::{clamping_feature_set, HasClamping};
use crate::config::SelectionConfig;
use crate::error::SelectionError;
use crate::feasibility::{fits_with, Workpiece};

/// Outcome of one selection run. All indices refer to the input slice.
#[derive(Debug)]
pub struct Selection<'a, T> {
    pub ranking: RankedResult<'a, T>,
    /// Dropped as equivalent to an earlier candidate.
    pub duplicates: Vec<usize>,
    /// Dropped because some resource could not take them.
    pub infeasible: Vec<usize>,
}

impl<'a, T> Selection<'a, T> {
    pub fn best(&self) -> Option<&'a T> {
        self.ranking.best().map(|b| b.candidate)
    }
}

/// Deduplicates, filters and ranks clamping candidates.
pub struct SetupSelector<T> {
    formula: CompiledFormula<T>,
    config: SelectionConfig,
    tolerance: Tolerance,
}

impl<T: HasClamping + Workpiece + 'static> SetupSelector<T> {
    /// Compile the configured formula and resolve its tie-breakers.
    pub fn new(config: SelectionConfig) -> Result<Self, SelectionError> {
        config.validate()?;
        let tolerance = config.tolerance();
        let formula = CompiledFormula::compile(clamping_feature_set(), &config.formula)?
            .with_tolerance(tolerance);
        let selector = Self {
            formula,
            config,
            tolerance,
        };
        selector.ranker()?;
        Ok(selector)
    }

    pub fn from_json(json: &str) -> Result<Self, SelectionError> {
        Self::new(SelectionConfig::from_json(json)?)
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn formula(&self) -> &CompiledFormula<T> {
        &self.formula
    }

    fn ranker(&self) -> Result<Ranker<'_, T>, SelectionError> {
        let mut ranker = Ranker::new(&self.formula)
            .with_normalization(self.config.normalize)
            .with_tolerance(self.tolerance);
        for name in &self.config.tie_breakers {
            ranker = ranker.with_feature_tie_breaker(name)?;
        }
        Ok(ranker)
    }

    /// Keep the first of each group of equivalent candidates, drop those that
    /// do not fit every resource in `resources`, and rank the rest.
    #[instrument(skip(self, candidates, resources), fields(candidates = candidates.len(), resources = resources.len()))]
    pub fn select<'a>(
        &self,
        candidates: &'a [T],
        resources: &[Resource],
    ) -> Result<Selection<'a, T>, SelectionError> {
        let configs: Vec<_> = candidates.iter().map(HasClamping::clamping).collect();
        let unique = clamping::dedup_equivalent(&configs, self.tolerance);
        let duplicates: Vec<usize> = (0..candidates.len())
            .filter(|i| unique.binary_search(i).is_err())
            .collect();

        let mut feasible = Vec::with_capacity(unique.len());
        let mut infeasible = Vec::new();
        for index in unique {
            if resources
                .iter()
                .all(|r| fits_with(&candidates[index], r, self.tolerance))
            {
                feasible.push(index);
            } else {
                debug!(index, "candidate dropped: infeasible");
                infeasible.push(index);
            }
        }

        let ranking = self.ranker()?.rank_subset(candidates, &feasible)?;
        info!(
            duplicates = duplicates.len(),
            infeasible = infeasible.len(),
            ranked = ranking.len(),
            excluded = ranking.excluded.len(),
            "selection complete"
        );
        Ok(Selection {
            ranking,
            duplicates,
            infeasible,
        })
    }
}
