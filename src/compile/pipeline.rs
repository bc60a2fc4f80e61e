//! Single-pass compilation of a `PortfolioInput`.

use super::{PortfolioInput, PortfolioOutput};
use crate::catalog::{SourceCatalog, StaticCatalog};
use crate::domain::ordered_project_ids;
use crate::engine::{ExposureError, PortfolioAggregator, SourceSetCompiler, ThresholdFilter};
use tracing::info;

/// Runs the full exposure data flow.
pub struct Compiler;

impl Compiler {
    /// Compile evidence and settings into the visible feed view.
    ///
    /// # Arguments
    /// * `input` - Sources, evidence, cutoff, overrides and display names
    /// * `catalog` - Project -> feed sources lookup, used unless the input carries
    ///   its own `project_sources`
    ///
    /// # Returns
    /// A freshly allocated output; the input is left untouched. Fails when the
    /// evidence sums to more than a USD amount can hold.
    pub fn compile<C>(input: &PortfolioInput, catalog: &C) -> Result<PortfolioOutput, ExposureError>
    where
        C: SourceCatalog + ?Sized,
    {
        let portfolio = PortfolioAggregator::new(&input.sources)
            .with_basis(input.percentage_basis)
            .aggregate(&input.evidence)?;

        let active = ThresholdFilter::new(input.cutoff).active_project_ids(&portfolio);

        let source_set = match &input.project_sources {
            Some(inline) => {
                let inline = StaticCatalog::new(inline.clone());
                SourceSetCompiler::new(&inline).compile(&active, &input.overrides)
            }
            None => SourceSetCompiler::new(catalog).compile(&active, &input.overrides),
        };

        let ordered = ordered_project_ids(&portfolio, &input.project_names);

        info!(
            sources = input.sources.len(),
            projects = portfolio.project_meta.len(),
            active = active.len(),
            effective_sources = source_set.effective_source_ids.len(),
            total_exposure_usd = %portfolio.total_exposure_usd,
            "Portfolio compiled"
        );

        Ok(PortfolioOutput {
            portfolio,
            active_project_ids: active.into_iter().collect(),
            default_active_source_ids: source_set.default_active_source_ids,
            effective_source_ids: source_set.effective_source_ids,
            overrides: source_set.overrides,
            ordered_project_ids: ordered,
        })
    }
}
