//! Detail record with its enrichment still in flight

use anirelay_common::{DetailEnrichment, DetailRecord, LoadState};
use tokio::sync::watch;
use tracing::debug;

/// A detail record returned before its enrichment lookup finishes
///
/// The enrichment outcome is published once on a watch channel; until then
/// it reads as [`LoadState::Pending`].
#[derive(Debug)]
pub struct DetailView {
    record: DetailRecord,
    enrichment: watch::Receiver<LoadState<DetailEnrichment>>,
}

impl DetailView {
    pub fn new(
        record: DetailRecord,
        enrichment: watch::Receiver<LoadState<DetailEnrichment>>,
    ) -> Self {
        Self { record, enrichment }
    }

    /// The record as fetched from the aggregator, without enrichment
    pub fn record(&self) -> &DetailRecord {
        &self.record
    }

    /// Current enrichment state
    pub fn enrichment_state(&self) -> LoadState<DetailEnrichment> {
        self.enrichment.borrow().clone()
    }

    /// Receiver for observing the enrichment state change
    pub fn subscribe(&self) -> watch::Receiver<LoadState<DetailEnrichment>> {
        self.enrichment.clone()
    }

    /// Wait for the enrichment outcome and return the merged record
    ///
    /// When enrichment is absent, or its task went away without publishing,
    /// the record comes back unchanged.
    pub async fn merged(mut self) -> DetailRecord {
        let outcome = match self.enrichment.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            Err(_) => {
                debug!(id = %self.record.id(), "Enrichment task ended without a result");
                LoadState::Absent
            }
        };

        let mut record = self.record;
        if let LoadState::Ready(enrichment) = outcome {
            record.merge_enrichment(&enrichment);
        }
        record
    }
}
