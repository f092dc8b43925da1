//! The top-level pipeline.
//!
//! Records are processed strictly in source order:
//!
//! 1. Extraction failures are logged and counted, never fatal.
//! 2. Artworks without an image get one from the image waterfall.
//! 3. The record is assembled against the run's [`RunContext`].
//! 4. Newly minted agents of the configured kinds are reconciled, then new
//!    material and category terms when term reconciliation is on.
//! 5. The subgraph goes to the [`BatchWriter`].
//!
//! Only sink failures (and, for the knowledge-base source, a failure of the
//! source query itself) abort a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{ExtractResult, PipelineError, Result};
use crate::extract::{knowledge_base::KnowledgeBaseSource, lido};
use crate::images::normalize::normalize_image_url;
use crate::images::ImageResolver;
use crate::pipeline::assemble::GraphAssembler;
use crate::pipeline::batch::BatchWriter;
use crate::pipeline::identity::{IdentityMinter, RunContext};
use crate::reconcile::ReconciliationClient;
use crate::traits::sink::GraphSink;
use crate::traits::transport::{HttpTransport, StageOutcomes};
use crate::types::config::PipelineConfig;
use crate::types::record::ArtworkRecord;

/// Counters of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub records_seen: usize,
    pub records_written: usize,
    pub records_skipped: usize,
    pub batches_flushed: usize,

    /// Agents described for the first time
    pub agents_minted: usize,
    /// Agents that received authority links
    pub agents_reconciled: usize,
    /// Terms linked to a thesaurus concept
    pub terms_reconciled: usize,

    /// Waterfall stages that answered without a match
    pub lookups_not_found: usize,
    /// Waterfall stages whose call failed
    pub lookups_failed: usize,

    /// Artworks that got an image from the waterfall
    pub images_resolved: usize,
}

impl RunSummary {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            records_seen: 0,
            records_written: 0,
            records_skipped: 0,
            batches_flushed: 0,
            agents_minted: 0,
            agents_reconciled: 0,
            terms_reconciled: 0,
            lookups_not_found: 0,
            lookups_failed: 0,
            images_resolved: 0,
        }
    }

    fn absorb(&mut self, outcomes: StageOutcomes) {
        self.lookups_not_found += outcomes.not_found;
        self.lookups_failed += outcomes.failed;
    }

    /// Check that every record seen was written.
    pub fn is_complete(&self) -> bool {
        self.records_skipped == 0 && self.records_written == self.records_seen
    }
}

/// Record-to-graph pipeline writing to one sink.
///
/// # Example
///
/// ```rust,ignore
/// use heritage_graph::{Pipeline, PipelineConfig, ReqwestTransport, TransportExt, TurtleFileSink};
/// use std::sync::Arc;
///
/// let config = PipelineConfig::default();
/// let transport = ReqwestTransport::new(&config.http)?.rate_limited(config.http.requests_per_second);
/// let pipeline = Pipeline::new(config, Arc::new(transport), TurtleFileSink::new("out.ttl"))?;
/// let summary = pipeline.run_museum_export_file("export.xml").await?;
/// ```
pub struct Pipeline<S: GraphSink> {
    config: PipelineConfig,
    transport: Arc<dyn HttpTransport>,
    sink: S,
    assembler: GraphAssembler,
    reconciler: ReconciliationClient,
    images: ImageResolver,
}

impl<S: GraphSink> Pipeline<S> {
    /// Build a pipeline; fails on invalid configuration.
    pub fn new(config: PipelineConfig, transport: Arc<dyn HttpTransport>, sink: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            assembler: GraphAssembler::new(IdentityMinter::new(config.base_uri.clone())),
            reconciler: ReconciliationClient::new(transport.clone(), &config.endpoints),
            images: ImageResolver::new(transport.clone(), &config.endpoints),
            transport,
            sink,
            config,
        })
    }

    /// Replace the image waterfall.
    pub fn with_image_resolver(mut self, images: ImageResolver) -> Self {
        self.images = images;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run over a museum export document.
    pub async fn run_museum_export(&self, xml: &str) -> Result<RunSummary> {
        self.run_records(lido::LidoRecords::new(xml)).await
    }

    /// Read a museum export file and run over it.
    pub async fn run_museum_export_file(&self, path: impl AsRef<Path>) -> Result<RunSummary> {
        let path = path.as_ref();
        let xml = tokio::fs::read_to_string(path)
            .await
            .map_err(PipelineError::Input)?;
        info!(path = %path.display(), bytes = xml.len(), "Read museum export");
        self.run_museum_export(&xml).await
    }

    /// Fetch a block of popular knowledge-base records and run over them.
    pub async fn run_knowledge_base(&self, limit: usize, offset: usize) -> Result<RunSummary> {
        let source = KnowledgeBaseSource::new(
            self.transport.clone(),
            &self.config.endpoints.knowledge_base_sparql,
        );
        let ids = source.fetch_popular_ids(limit, offset).await?;
        let records = source.fetch_records(&ids).await?;
        self.run_records(records).await
    }

    /// Run over already extracted records.
    pub async fn run_records<I>(&self, records: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = ExtractResult<ArtworkRecord>>,
    {
        let mut summary = RunSummary::start();
        let span = info_span!("pipeline_run", run_id = %summary.run_id, sink = self.sink.name());

        async {
            info!(batch_size = self.config.batch_size, "Pipeline run starting");
            self.sink.begin(&self.config.schema_uri).await?;

            let mut ctx = RunContext::new();
            let mut writer = BatchWriter::new(&self.sink, self.config.batch_size);

            for result in records {
                summary.records_seen += 1;
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        warn!(position = e.position(), error = %e, "Skipping record");
                        summary.records_skipped += 1;
                        continue;
                    }
                };
                self.process(record, &mut ctx, &mut writer, &mut summary).await?;
            }

            summary.batches_flushed = writer.finish().await?;
            summary.finished_at = Some(Utc::now());

            info!(
                records_seen = summary.records_seen,
                records_written = summary.records_written,
                records_skipped = summary.records_skipped,
                batches_flushed = summary.batches_flushed,
                agents_minted = summary.agents_minted,
                agents_reconciled = summary.agents_reconciled,
                terms_reconciled = summary.terms_reconciled,
                lookups_failed = summary.lookups_failed,
                "Pipeline run complete"
            );
            Ok::<(), PipelineError>(())
        }
        .instrument(span)
        .await?;

        Ok(summary)
    }

    async fn process(
        &self,
        mut record: ArtworkRecord,
        ctx: &mut RunContext,
        writer: &mut BatchWriter<'_, S>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        if !record.image_link.trim().is_empty() {
            record.image_link = normalize_image_url(&record.image_link);
        } else if self.config.resolve_images {
            let image = self.images.resolve(record.image_query()).await;
            summary.absorb(image.outcomes);
            if !image.is_placeholder() {
                summary.images_resolved += 1;
            }
            record.image_link = image.url;
        }

        let mut assembled = self.assembler.assemble(&record, ctx);
        summary.agents_minted += assembled.new_agents.len();

        for agent in &mut assembled.new_agents {
            if !self.config.reconciles(agent.kind()) {
                continue;
            }
            let reconciliation = self.reconciler.reconcile(agent.kind(), &agent.name).await;
            summary.absorb(reconciliation.outcomes);
            if let Some(links) = reconciliation.links {
                agent.links = links;
                summary.agents_reconciled += 1;
            }
        }

        if self.config.reconcile_terms {
            for term in &mut assembled.new_terms {
                let reconciliation = self.reconciler.reconcile_term(term).await;
                summary.absorb(reconciliation.outcomes);
                if let Some(code) = reconciliation.code {
                    term.code = Some(code);
                    summary.terms_reconciled += 1;
                }
            }
        }

        debug!(
            id = %record.id,
            new_agents = assembled.new_agents.len(),
            new_terms = assembled.new_terms.len(),
            "Record assembled"
        );

        writer.push(assembled.into_subgraph()).await?;
        summary.records_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::graph::vocab;
    use crate::sinks::MemorySink;
    use crate::testing::{lido_export, lido_record, MockTransport};

    fn offline(batch_size: usize) -> PipelineConfig {
        PipelineConfig::default()
            .with_batch_size(batch_size)
            .offline()
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let result = Pipeline::new(
            PipelineConfig::default().with_batch_size(0),
            Arc::new(MockTransport::new()),
            MemorySink::new(),
        );
        assert!(matches!(result, Err(PipelineError::Config { .. })));
    }

    #[tokio::test]
    async fn test_skips_bad_records_and_counts() {
        let transport = Arc::new(MockTransport::new());
        let pipeline = Pipeline::new(offline(2), transport.clone(), MemorySink::new()).unwrap();

        let records = vec![
            Ok(ArtworkRecord::new("A").with_title("One")),
            Err(ExtractError::MissingIdentifier { position: 1 }),
            Ok(ArtworkRecord::new("B").with_title("Two")),
            Ok(ArtworkRecord::new("C").with_title("Three")),
        ];
        let summary = pipeline.run_records(records).await.unwrap();

        assert_eq!(summary.records_seen, 4);
        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.records_skipped, 1);
        assert_eq!(summary.batches_flushed, 2);
        assert!(!summary.is_complete());
        assert!(summary.finished_at.is_some());
        assert_eq!(pipeline.sink().flush_count(), 2);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reconciles_new_agents_once() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response(
                    "wikidata",
                    crate::testing::sparql_results(&[&[
                        ("item", "http://www.wikidata.org/entity/Q1"),
                        ("ulan", "500010879"),
                    ]]),
                ),
        );
        let config = PipelineConfig::default()
            .with_image_resolution(false)
            .with_reconcile_kinds([crate::types::agent::AgentKind::Artist]);
        let pipeline = Pipeline::new(config, transport.clone(), MemorySink::new()).unwrap();

        let xml = lido_export(&[
            lido_record("A-1", "Boi", "Grigorescu, Nicolae", "Muzeul X"),
            lido_record("A-2", "Car", "Grigorescu, Nicolae", "Muzeul X"),
        ]);
        let summary = pipeline.run_museum_export(&xml).await.unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.agents_minted, 2);
        assert_eq!(summary.agents_reconciled, 1);
        assert_eq!(transport.calls().len(), 1);

        let descriptions = pipeline.sink().descriptions();
        let artist = descriptions
            .iter()
            .find(|d| d.subject == "http://arp.ro/resource/agent/grigorescu_nicolae")
            .unwrap();
        assert_eq!(artist.objects(vocab::GETTY_ID).count(), 1);
    }

    #[tokio::test]
    async fn test_reconciles_new_terms_once() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response(
                    "P1014",
                    crate::testing::sparql_results(&[&[("aatID", "300015050")]]),
                ),
        );
        let config = PipelineConfig::default()
            .with_reconciliation(false)
            .with_image_resolution(false)
            .with_term_reconciliation(true);
        let pipeline = Pipeline::new(config, transport.clone(), MemorySink::new()).unwrap();

        let mut first = ArtworkRecord::new("A-1").with_title("Boi");
        first.techniques = vec!["ulei pe pânză".into()];
        let mut second = ArtworkRecord::new("A-2").with_title("Car");
        second.materials = vec!["Ulei".into()];
        let summary = pipeline.run_records(vec![Ok(first), Ok(second)]).await.unwrap();

        assert_eq!(summary.terms_reconciled, 1);
        assert_eq!(transport.calls_matching("P1014"), 1);

        let descriptions = pipeline.sink().descriptions();
        let concepts: Vec<_> = descriptions
            .iter()
            .filter(|d| d.subject == "http://arp.ro/resource/material/ulei")
            .collect();
        assert_eq!(concepts.len(), 1);
        assert_eq!(
            concepts[0].objects(vocab::EXACT_MATCH).next(),
            Some(&crate::graph::Object::iri("http://vocab.getty.edu/aat/300015050"))
        );
    }

    #[tokio::test]
    async fn test_terms_not_looked_up_by_default() {
        let transport = Arc::new(MockTransport::new());
        let config = PipelineConfig::default()
            .with_reconciliation(false)
            .with_image_resolution(false);
        let pipeline = Pipeline::new(config, transport.clone(), MemorySink::new()).unwrap();

        let mut record = ArtworkRecord::new("A-1");
        record.materials = vec!["bronz".into()];
        let summary = pipeline.run_records(vec![Ok(record)]).await.unwrap();

        assert_eq!(summary.terms_reconciled, 0);
        assert!(transport.calls().is_empty());
        assert_eq!(pipeline.sink().descriptions().len(), 3);
    }

    #[tokio::test]
    async fn test_image_waterfall_fills_missing_image() {
        let transport = Arc::new(MockTransport::new().with_response(
            "wikipedia",
            r#"{"query":{"pages":{"1":{"original":{"source":"https://upload.wikimedia.org/b.jpg"}}}}}"#,
        ));
        let config = PipelineConfig::default().with_reconciliation(false);
        let pipeline = Pipeline::new(config, transport, MemorySink::new()).unwrap();

        let summary = pipeline
            .run_records(vec![Ok(ArtworkRecord::new("A").with_title("Boi"))])
            .await
            .unwrap();

        assert_eq!(summary.images_resolved, 1);
        let artwork = &pipeline.sink().descriptions()[0];
        assert_eq!(
            artwork.objects(vocab::IMAGE_LINK).next(),
            Some(&crate::graph::Object::typed(
                "https://upload.wikimedia.org/b.jpg",
                crate::graph::Datatype::AnyUri
            ))
        );
    }

    #[tokio::test]
    async fn test_knowledge_base_source_failure_is_fatal() {
        let transport = Arc::new(MockTransport::new().with_failure("wikidata"));
        let pipeline = Pipeline::new(offline(10), transport, MemorySink::new()).unwrap();

        let result = pipeline.run_knowledge_base(10, 0).await;
        assert!(matches!(result, Err(PipelineError::Source(_))));
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let pipeline =
            Pipeline::new(offline(10), Arc::new(MockTransport::new()), MemorySink::new()).unwrap();
        let result = pipeline
            .run_museum_export_file("/nonexistent/export.xml")
            .await;
        assert!(matches!(result, Err(PipelineError::Input(_))));
    }
}
