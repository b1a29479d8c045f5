use tracing::{info, warn};

use super::{Decomposer, DecompositionResult, RunReport, SkippedElement};
use crate::config::DecomposeConfig;
use crate::error::DecomposeError;
use crate::host::{ElementId, HostModel};
use crate::operations::type_cache::LayerTypeCache;

/// One user command: a configuration and the type cache scoped to it.
///
/// Dropping the run drops the cache, so handles never leak into the next
/// command. Create a new run after the host rolls back a transaction.
#[derive(Debug, Clone)]
pub struct DecompositionRun {
    config: DecomposeConfig,
    cache: LayerTypeCache,
}

impl Default for DecompositionRun {
    fn default() -> Self {
        Self::new(DecomposeConfig::default())
    }
}

impl DecompositionRun {
    #[must_use]
    pub fn new(config: DecomposeConfig) -> Self {
        let cache = LayerTypeCache::new(config.naming.clone(), config.width_key_precision);
        Self { config, cache }
    }

    #[must_use]
    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &LayerTypeCache {
        &self.cache
    }

    /// Decomposes a single element.
    ///
    /// # Errors
    ///
    /// See [`Decomposer::execute`].
    pub fn decompose<H: HostModel + ?Sized>(
        &mut self,
        host: &mut H,
        source: ElementId,
    ) -> Result<DecompositionResult, DecomposeError> {
        Decomposer::new(&self.config, &mut self.cache).execute(host, source)
    }

    /// Decomposes every element in `sources`, collecting skipped ones.
    ///
    /// Elements that fail without touching the model are recorded in
    /// [`RunReport::skipped`] and the run continues.
    ///
    /// # Errors
    ///
    /// Stops at the first error that [requires a
    /// rollback](DecomposeError::requires_rollback) and returns it; the caller
    /// must discard the whole transaction.
    pub fn decompose_all<H: HostModel + ?Sized>(
        &mut self,
        host: &mut H,
        sources: &[ElementId],
    ) -> Result<RunReport, DecomposeError> {
        let mut report = RunReport::default();
        for &element in sources {
            match self.decompose(host, element) {
                Ok(result) => report.results.push(result),
                Err(error) if error.requires_rollback() => return Err(error),
                Err(error) => {
                    warn!(element = ?element, %error, "element skipped");
                    report.skipped.push(SkippedElement { element, error });
                }
            }
        }
        info!(
            decomposed = report.results.len(),
            skipped = report.skipped.len(),
            created = report.total_created(),
            "run finished"
        );
        Ok(report)
    }
}
