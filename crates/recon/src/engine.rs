use uuid::Uuid;

use crate::canonical::canonical_for;
use crate::compare::check_fields;
use crate::concordance::ConcordanceStore;
use crate::config::ReconConfig;
use crate::error::{FetchError, NotLoadedError};
use crate::evidence::compute_summary;
use crate::identifiers::check_identifiers;
use crate::model::{
    CombinedOrganisation, Discrepancy, DiscrepancyKind, RecordSource, ReconMeta, ReconReport,
};

/// Retrieves one organisation record by URL.
pub trait RecordFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<CombinedOrganisation, FetchError>;
}

impl<F> RecordFetcher for F
where
    F: Fn(&str) -> Result<CombinedOrganisation, FetchError> + Send + Sync,
{
    fn fetch(&self, url: &str) -> Result<CombinedOrganisation, FetchError> {
        self(url)
    }
}

/// One reconciliation pass over every organisation in the concordance.
pub struct Reconciler<'a> {
    store: &'a ConcordanceStore,
    fetcher: &'a dyn RecordFetcher,
    config: &'a ReconConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a ConcordanceStore,
        fetcher: &'a dyn RecordFetcher,
        config: &'a ReconConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            config,
        }
    }

    /// Run reconciliation. Returns every discrepancy found plus a summary.
    ///
    /// Per-entity failures are recorded and the pass moves on. An unloaded
    /// store has no key set to visit and fails the whole pass.
    pub fn reconcile(&self) -> Result<ReconReport, NotLoadedError> {
        let entities = self.store.all_alternate_uuids()?;
        log::info!("Comparing {} organisations", entities.len());

        let mut discrepancies = Vec::new();
        for entity in &entities {
            let found = self.reconcile_entity(*entity);
            for d in &found {
                log::debug!("{d}");
            }
            discrepancies.extend(found);
        }

        let summary = compute_summary(entities.len(), &discrepancies);
        log::info!(
            "Finished comparing: {} discrepancies across {} of {} organisations",
            summary.discrepancies,
            summary.entities_with_discrepancies,
            summary.entities,
        );

        Ok(ReconReport {
            meta: ReconMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                composite_base_url: self.config.composite_base_url.clone(),
                factset_base_url: self.config.factset_base_url.clone(),
                concordance_schema: self.store.schema(),
                array_mode: self.config.array_mode,
            },
            summary,
            discrepancies,
        })
    }

    /// All discrepancies for one alternate UUID.
    pub fn reconcile_entity(&self, entity: Uuid) -> Vec<Discrepancy> {
        let lookup = match self.store.lookup_legacy_uuids(&entity) {
            Ok(lookup) => lookup,
            Err(_) => return vec![Discrepancy::entity_level(entity, DiscrepancyKind::NotLoaded)],
        };

        let canonical_id = canonical_for(entity, &lookup.legacy);
        log::debug!("{entity}: canonical id {canonical_id}");

        let composite_url = self.config.composite_url(&canonical_id);
        let composite = match self.fetcher.fetch(&composite_url) {
            Ok(org) => org,
            Err(e) => return vec![fetch_failed(entity, RecordSource::Composite, e)],
        };

        let factset_url = self.config.factset_url(&entity);
        let factset = match self.fetcher.fetch(&factset_url) {
            Ok(org) => org,
            Err(e) => return vec![fetch_failed(entity, RecordSource::Factset, e)],
        };

        let mut out = check_fields(entity, &composite, &factset, self.config.array_mode);
        out.extend(check_identifiers(entity, &composite, &factset, self.store));
        out
    }
}

fn fetch_failed(entity: Uuid, source: RecordSource, err: FetchError) -> Discrepancy {
    Discrepancy::entity_level(
        entity,
        DiscrepancyKind::FetchFailed {
            source,
            url: err.url().to_string(),
            message: err.to_string(),
        },
    )
}
