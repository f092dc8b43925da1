//! Knowledge-base record source.
//!
//! The second source of records: paintings from the public knowledge base,
//! fetched in two steps. First the ids of the most linked paintings, then one
//! detail query for a block of ids. Each detail row maps onto the same flat
//! [`ArtworkRecord`] the museum export produces, so everything downstream is
//! shared.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ExtractError, ExtractResult, TransportResult};
use crate::extract::{dates, provenance};
use crate::images::normalize::normalize_image_url;
use crate::traits::transport::HttpTransport;
use crate::transports::sparql::{self, Row};
use crate::types::record::{ArtworkRecord, RecordSource};

/// License attached to every knowledge-base record.
pub const DEFAULT_LICENSE: &str = "http://www.europeana.eu/rights/rr-f/";

/// Inventory number when the source has none.
pub const UNKNOWN_INVENTORY: &str = "unknown";

/// Category when the source has no instance labels.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Museum name when neither location nor collection is known.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

const POPULAR_IDS_QUERY: &str = r#"PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX wikibase: <http://wikiba.se/ontology#>
SELECT ?title ?artwork ?sitelinks
WHERE {
  ?artwork wdt:P31 wd:Q3305213 .
  ?artwork rdfs:label ?title FILTER(LANG(?title) = "en")
  ?artwork wikibase:sitelinks ?sitelinks
}
ORDER BY DESC(?sitelinks)
LIMIT {{LIMIT}} OFFSET {{OFFSET}}"#;

const DETAIL_QUERY: &str = r#"PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX p: <http://www.wikidata.org/prop/>
PREFIX ps: <http://www.wikidata.org/prop/statement/>
PREFIX pq: <http://www.wikidata.org/prop/qualifier/>
PREFIX psv: <http://www.wikidata.org/prop/statement/value/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX schema: <http://schema.org/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?artwork
  (SAMPLE(?titleL) AS ?title)
  (SAMPLE(?descL) AS ?description)
  (SAMPLE(?img) AS ?image)
  (GROUP_CONCAT(DISTINCT ?inv; separator=",") AS ?inventoryNumbers)
  (SAMPLE(?h) AS ?heightValue)
  (SAMPLE(?w) AS ?widthValue)
  (SAMPLE(?unitL) AS ?heightUnitLabel)
  (GROUP_CONCAT(DISTINCT ?instL; separator="|") AS ?instanceLabels)
  (GROUP_CONCAT(DISTINCT ?locL; separator="|") AS ?locationNames)
  (GROUP_CONCAT(DISTINCT ?colL; separator="|") AS ?collectionsData)
  (GROUP_CONCAT(DISTINCT ?artistL; separator="|") AS ?artistNames)
  (GROUP_CONCAT(DISTINCT ?matL; separator="|") AS ?materialLabels)
  (SAMPLE(?inc) AS ?inception)
  (SAMPLE(?st) AS ?startTime)
  (SAMPLE(?pub) AS ?publicationDate)
  (SAMPLE(?pit) AS ?pointInTime)
  (GROUP_CONCAT(DISTINCT ?owner; separator=";;") AS ?ownersData)
  (GROUP_CONCAT(DISTINCT ?event; separator=";;") AS ?significantEvents)
WHERE {
  VALUES ?artwork { {{ARTWORK_IDS}} }
  OPTIONAL { ?artwork rdfs:label ?titleL FILTER(LANG(?titleL) = "en") }
  OPTIONAL { ?artwork schema:description ?descL FILTER(LANG(?descL) = "en") }
  OPTIONAL { ?artwork wdt:P18 ?img }
  OPTIONAL { ?artwork wdt:P217 ?inv }
  OPTIONAL {
    ?artwork p:P2048/psv:P2048 ?hNode .
    ?hNode wikibase:quantityAmount ?h ; wikibase:quantityUnit ?unit .
    ?unit rdfs:label ?unitL FILTER(LANG(?unitL) = "en")
  }
  OPTIONAL { ?artwork p:P2049/psv:P2049/wikibase:quantityAmount ?w }
  OPTIONAL { ?artwork wdt:P31 ?inst . ?inst rdfs:label ?instL FILTER(LANG(?instL) = "en") }
  OPTIONAL { ?artwork wdt:P276 ?loc . ?loc rdfs:label ?locL FILTER(LANG(?locL) = "en") }
  OPTIONAL { ?artwork wdt:P195 ?col . ?col rdfs:label ?colL FILTER(LANG(?colL) = "en") }
  OPTIONAL { ?artwork wdt:P170 ?artist . ?artist rdfs:label ?artistL FILTER(LANG(?artistL) = "en") }
  OPTIONAL { ?artwork wdt:P186 ?mat . ?mat rdfs:label ?matL FILTER(LANG(?matL) = "en") }
  OPTIONAL { ?artwork wdt:P571 ?inc }
  OPTIONAL { ?artwork wdt:P580 ?st }
  OPTIONAL { ?artwork wdt:P577 ?pub }
  OPTIONAL { ?artwork wdt:P585 ?pit }
  OPTIONAL {
    ?artwork p:P127 ?ownSt .
    ?ownSt ps:P127 ?ownerItem .
    ?ownerItem rdfs:label ?ownerL FILTER(LANG(?ownerL) = "en")
    OPTIONAL { ?ownSt pq:P580 ?ownStart }
    OPTIONAL { ?ownSt pq:P582 ?ownEnd }
    BIND(CONCAT(?ownerL, "||", COALESCE(STR(?ownStart), ""), "||", COALESCE(STR(?ownEnd), "")) AS ?owner)
  }
  OPTIONAL {
    ?artwork p:P793 ?evSt .
    ?evSt ps:P793 ?evItem .
    ?evItem rdfs:label ?evL FILTER(LANG(?evL) = "en")
    OPTIONAL { ?evSt pq:P585 ?evDate }
    OPTIONAL { ?evSt pq:P276 ?evLoc . ?evLoc rdfs:label ?evLocL FILTER(LANG(?evLocL) = "en") }
    BIND(CONCAT(?evL, "||", COALESCE(STR(?evDate), ""), "||||", COALESCE(?evLocL, "")) AS ?event)
  }
}
GROUP BY ?artwork"#;

/// Fetches records from the knowledge base.
///
/// # Example
///
/// ```rust,ignore
/// use heritage_graph::extract::knowledge_base::KnowledgeBaseSource;
///
/// let source = KnowledgeBaseSource::new(transport, "https://query.wikidata.org/sparql");
/// let ids = source.fetch_popular_ids(100, 0).await?;
/// for record in source.fetch_records(&ids).await? {
///     // ...
/// }
/// ```
pub struct KnowledgeBaseSource {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
}

impl KnowledgeBaseSource {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Ids of paintings ordered by how widely they are linked.
    pub async fn fetch_popular_ids(&self, limit: usize, offset: usize) -> TransportResult<Vec<String>> {
        let query = POPULAR_IDS_QUERY
            .replace("{{LIMIT}}", &limit.to_string())
            .replace("{{OFFSET}}", &offset.to_string());

        let rows = sparql::select(self.transport.as_ref(), &self.endpoint, &query).await?;
        let ids: Vec<String> = rows
            .iter()
            .filter_map(|row| row.uri("artwork"))
            .map(entity_id)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        info!(limit, offset, found = ids.len(), "Fetched popular knowledge-base ids");
        Ok(ids)
    }

    /// Fetch and map the detail rows for a block of ids.
    ///
    /// A transport failure fails the whole call; a bad row is one `Err` entry.
    pub async fn fetch_records(
        &self,
        ids: &[String],
    ) -> TransportResult<Vec<ExtractResult<ArtworkRecord>>> {
        let values: Vec<String> = ids
            .iter()
            .filter(|id| is_entity_id(id))
            .map(|id| format!("wd:{id}"))
            .collect();
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let query = DETAIL_QUERY.replace("{{ARTWORK_IDS}}", &values.join(" "));
        let rows = sparql::select(self.transport.as_ref(), &self.endpoint, &query).await?;
        debug!(requested = values.len(), rows = rows.len(), "Fetched knowledge-base details");

        Ok(rows
            .iter()
            .enumerate()
            .map(|(position, row)| record_from_row(row, position))
            .collect())
    }
}

/// Map one detail row onto a record.
pub fn record_from_row(row: &Row, position: usize) -> ExtractResult<ArtworkRecord> {
    let item = row.get("artwork").ok_or_else(|| ExtractError::MissingBinding {
        position,
        variable: "artwork".to_string(),
    })?;
    let id = entity_id(item);
    if id.is_empty() {
        return Err(ExtractError::MissingIdentifier { position });
    }

    let mut record = ArtworkRecord::new(id);
    record.source = RecordSource::KnowledgeBase;
    record.external_uri = item.to_string();
    record.title = row.text("title").to_string();
    record.description = row.text("description").to_string();
    record.license = DEFAULT_LICENSE.to_string();

    if let Some(image) = row.get("image") {
        record.image_link = normalize_image_url(image);
    }

    record.inventory_number = row
        .get("inventoryNumbers")
        .and_then(|v| v.split(',').map(str::trim).find(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN_INVENTORY)
        .to_string();

    if let (Some(h), Some(w)) = (row.get("heightValue"), row.get("widthValue")) {
        record.dimensions = format!("{h} x {w} {}", row.text("heightUnitLabel"))
            .trim()
            .to_string();
    }

    let instances = split_list(row.text("instanceLabels"));
    record.category = instances
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    record.classifications = instances;

    record.museum = split_list(row.text("locationNames"))
        .into_iter()
        .next()
        .or_else(|| split_list(row.text("collectionsData")).into_iter().next())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

    record.actors = split_list(row.text("artistNames"));
    record.materials = split_list(row.text("materialLabels"));

    record.date = dates::first_year(
        ["inception", "startTime", "publicationDate", "pointInTime"]
            .into_iter()
            .map(|var| row.text(var)),
    )
    .unwrap_or_default();

    record.ownership = provenance::decode_history(row.text("ownersData"));
    record.custody_events = provenance::decode_history(row.text("significantEvents"));

    Ok(record)
}

/// Last path segment of an entity URI.
fn entity_id(uri: &str) -> &str {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .trim()
}

fn is_entity_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next() == Some('Q') && id.len() > 1 && chars.all(|c| c.is_ascii_digit())
}

/// Split a `|`-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
