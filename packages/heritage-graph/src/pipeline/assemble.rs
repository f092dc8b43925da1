//! Record to subgraph assembly.
//!
//! One [`ArtworkRecord`] becomes an Artwork, exactly one Creation activity,
//! its custody events and any agents it introduces. Agents are minted for
//! every reference, but an agent's own description is produced only for the
//! first reference in a run; later references add the relation alone.
//!
//! Material and category terms are collected the same way, once per run.
//! A term is only described once reconciliation has found its concept code.
//!
//! Assembly is pure apart from the [`RunContext`] it is handed. New agents
//! and terms come back separately so the caller can enrich them before
//! [`Assembled::into_subgraph`] describes them.

use indexmap::IndexSet;

use crate::extract::dates::{classify_date, date_only, extract_year, DateShape};
use crate::extract::knowledge_base::UNKNOWN_CATEGORY;
use crate::extract::provenance::{sort_by_start, ProvenanceEntry};
use crate::graph::turtle::is_language_tag;
use crate::graph::{vocab, Datatype, Description, Object, Statement, Subgraph};
use crate::pipeline::identity::{IdentityMinter, RunContext};
use crate::reconcile::queries::CONCEPT_NAMESPACE;
use crate::reconcile::{terms, UNKNOWN_AGENT};
use crate::types::agent::{Agent, AgentVariant};
use crate::types::record::ArtworkRecord;
use crate::types::term::{Term, TermKind};

/// Role attached to the creating agent's qualified association.
pub const ARTIST_ROLE: &str = "Artist";

/// Output of assembling one record.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    /// Artwork, creation and event descriptions
    pub subgraph: Subgraph,

    /// Agents referenced for the first time in this run
    pub new_agents: Vec<Agent>,

    /// Terms seen for the first time in this run
    pub new_terms: Vec<Term>,
}

impl Assembled {
    /// Append the new agents' descriptions, and those of the new terms that
    /// were reconciled, and return the full subgraph.
    pub fn into_subgraph(self) -> Subgraph {
        let mut subgraph = self.subgraph;
        for agent in &self.new_agents {
            subgraph.push(describe_agent(agent));
        }
        for term in self.new_terms.iter().filter(|t| t.is_reconciled()) {
            subgraph.push(describe_term(term));
        }
        subgraph
    }
}

/// Builds subgraphs under one URI scheme.
#[derive(Debug, Clone)]
pub struct GraphAssembler {
    minter: IdentityMinter,
}

impl GraphAssembler {
    pub fn new(minter: IdentityMinter) -> Self {
        Self { minter }
    }

    pub fn minter(&self) -> &IdentityMinter {
        &self.minter
    }

    /// Assemble the subgraph of one record.
    pub fn assemble(&self, record: &ArtworkRecord, ctx: &mut RunContext) -> Assembled {
        let mut out = Assembled::default();
        let mut agents = AgentCollector {
            minter: &self.minter,
            ctx: &mut *ctx,
            new_agents: &mut out.new_agents,
        };

        let artwork_uri = self.minter.artwork_uri(&record.id);
        let creation_uri = self.minter.creation_uri(&record.id);

        let actors: Vec<&str> = {
            let named: Vec<&str> = record
                .actors
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect();
            if named.is_empty() {
                vec![UNKNOWN_AGENT]
            } else {
                named
            }
        };
        let artist_uris: Vec<String> = actors
            .iter()
            .map(|name| agents.reference(AgentVariant::Artist, name))
            .collect();

        let museum_uri = non_blank(&record.museum)
            .map(|name| agents.reference(AgentVariant::Museum, name));

        if let Some(org) = non_blank(&record.source_organization) {
            let variant = AgentVariant::Organization {
                homepage: non_blank(&record.source_homepage).map(str::to_string),
                acted_on_behalf_of: museum_uri.clone(),
            };
            agents.reference(variant, org);
        }

        // Artwork
        let mut artwork = Description::typed(&artwork_uri, vocab::ARTWORK);
        artwork
            .push_text(vocab::TITLE, &record.title)
            .push_text(vocab::DIMENSIONS, &record.dimensions);
        if let Some(uri) = &museum_uri {
            artwork.push_iri(vocab::CURRENT_LOCATION, uri.clone());
            artwork.push_text(vocab::LOCATION_NAME, &record.museum);
        }
        artwork
            .push_typed(vocab::IMAGE_LINK, &record.image_link, Datatype::AnyUri)
            .push_typed(vocab::CATALOG_LINK, &record.catalog_link, Datatype::AnyUri)
            .push_typed(vocab::EXTERNAL_LINK, &record.external_uri, Datatype::AnyUri);
        push_license(&mut artwork, &record.license);
        artwork
            .push_text(vocab::CATEGORY, &record.category)
            .push_text(vocab::CONDITION, &record.condition)
            .push_text(vocab::INVENTORY_NUMBER, &record.inventory_number)
            .push_text(vocab::DESCRIPTION, &record.description);
        for term in distinct(&record.classifications) {
            artwork.push(vocab::CLASSIFICATION, Object::plain(term));
        }
        for term in distinct(&record.cultures) {
            artwork.push(vocab::CULTURE, culture_object(term));
        }

        if let Some(name) = non_blank(&record.recorded.name) {
            let uri = agents.reference(AgentVariant::Registrar, name);
            artwork.push_iri(vocab::RECORDED_BY, uri);
        }
        if let Some(date) = date_only(&record.recorded.date) {
            artwork.push(vocab::RECORDED_AT, date.to_object());
        }
        if let Some(name) = non_blank(&record.validated.name) {
            let uri = agents.reference(AgentVariant::Validator, name);
            artwork.push_iri(vocab::VALIDATED_BY, uri);
        }
        if let Some(date) = date_only(&record.validated.date) {
            artwork.push(vocab::VALIDATED_AT, date.to_object());
        }

        for entry in sorted(&record.ownership) {
            let collector = agents.reference(AgentVariant::Collector, &entry.agent);
            artwork.push(vocab::HAS_OWNERSHIP, ownership_node(&entry, collector));
        }

        let mut events = Vec::new();
        for (n, entry) in sorted(&record.custody_events).into_iter().enumerate() {
            let event_uri = self.minter.event_uri(&record.id, n + 1);
            artwork.push_iri(vocab::HAD_CUSTODY_EVENT, event_uri.clone());
            events.push(custody_event(&event_uri, &artwork_uri, &entry, &mut agents));
        }

        for term in distinct(&record.techniques)
            .into_iter()
            .chain(distinct(&record.materials))
        {
            self.collect_term(TermKind::Material, term, ctx, &mut out.new_terms);
        }
        if let Some(category) =
            non_blank(&record.category).filter(|c| !c.eq_ignore_ascii_case(UNKNOWN_CATEGORY))
        {
            self.collect_term(TermKind::Category, category, ctx, &mut out.new_terms);
        }

        artwork.push_iri(vocab::WAS_GENERATED_BY, creation_uri.clone());
        for uri in &artist_uris {
            artwork.push_iri(vocab::WAS_ATTRIBUTED_TO, uri.clone());
        }

        // Creation
        let mut creation = Description::typed(&creation_uri, vocab::CREATION);
        let title = non_blank(&record.title).unwrap_or("Unknown");
        creation.push_text(vocab::LABEL, &format!("Creation of {title}"));
        if let Some(date) = classify_date(&record.date) {
            creation.push(vocab::STARTED_AT, date.to_object());
        }
        for term in distinct(&record.techniques) {
            creation.push(vocab::TECHNIQUE, Object::plain(term));
        }
        for term in distinct(&record.materials) {
            creation.push(vocab::MATERIALS_USED, Object::plain(term));
        }
        creation.push_iri(vocab::GENERATED, artwork_uri.clone());
        for uri in &artist_uris {
            creation.push_iri(vocab::WAS_ASSOCIATED_WITH, uri.clone());
            creation.push(
                vocab::QUALIFIED_ASSOCIATION,
                Object::Blank(vec![
                    Statement::new(vocab::A, Object::name(vocab::ASSOCIATION)),
                    Statement::new(vocab::AGENT_REF, Object::iri(uri.clone())),
                    Statement::new(vocab::HAD_ROLE, Object::plain(ARTIST_ROLE)),
                ]),
            );
        }

        out.subgraph.push(artwork);
        out.subgraph.push(creation);
        for event in events {
            out.subgraph.push(event);
        }
        out
    }

    fn collect_term(
        &self,
        kind: TermKind,
        source: &str,
        ctx: &mut RunContext,
        new_terms: &mut Vec<Term>,
    ) {
        let term = terms::concept(&self.minter, kind, source);
        if ctx.first_term(kind, &term.uri) {
            new_terms.push(term);
        }
    }
}

/// Mints agent URIs and collects first references.
struct AgentCollector<'a> {
    minter: &'a IdentityMinter,
    ctx: &'a mut RunContext,
    new_agents: &'a mut Vec<Agent>,
}

impl AgentCollector<'_> {
    /// URI of the agent; queued for description on its first reference.
    fn reference(&mut self, variant: AgentVariant, name: &str) -> String {
        let name = name.trim();
        let kind = variant.kind();
        let uri = self.minter.agent_uri(kind, name);
        if self.ctx.first_write(&uri) {
            self.new_agents.push(Agent {
                uri: uri.clone(),
                name: name.to_string(),
                variant,
                links: Default::default(),
            });
        }
        uri
    }
}

/// Description of an agent, links included.
pub fn describe_agent(agent: &Agent) -> Description {
    let mut d = Description::typed(&agent.uri, agent.kind().class());
    d.push_text(vocab::NAME, &agent.name);

    if let AgentVariant::Organization {
        homepage,
        acted_on_behalf_of,
    } = &agent.variant
    {
        if let Some(homepage) = homepage {
            d.push_typed(vocab::HOMEPAGE, homepage, Datatype::AnyUri);
        }
        if let Some(museum) = acted_on_behalf_of {
            d.push_iri(vocab::ACTED_ON_BEHALF_OF, museum.clone());
        }
    }

    let links = &agent.links;
    if let Some(uri) = &links.external_uri {
        d.push_iri(vocab::WIKIDATA_URI, uri.clone());
    }
    if let Some(label) = &links.external_label {
        d.push_text(vocab::WIKIDATA_NAME, label);
    }
    if let Some(image) = &links.image_url {
        d.push_typed(vocab::IMAGE_LINK, image, Datatype::AnyUri);
    }
    if let Some(code) = &links.authority_code {
        d.push_text(vocab::GETTY_ID, code);
    }
    if let Some(uri) = &links.authority_uri {
        d.push_iri(vocab::GETTY_URI, uri.clone());
    }
    d
}

/// Description of a term concept, linked to its thesaurus concept if known.
pub fn describe_term(term: &Term) -> Description {
    let mut d = Description::typed(&term.uri, vocab::CONCEPT);
    d.push_text(vocab::LABEL, &term.label);
    if let Some(english) = &term.english {
        d.push(vocab::LABEL, Object::lang(english.as_str(), Some("en")));
    }
    if let Some(code) = &term.code {
        d.push_iri(vocab::EXACT_MATCH, format!("{CONCEPT_NAMESPACE}{code}"));
    }
    d
}

/// An addressable custody event. The entry's first field is the event
/// label; the parties, when known, are the transfer endpoints.
fn custody_event(
    event_uri: &str,
    artwork_uri: &str,
    entry: &ProvenanceEntry,
    agents: &mut AgentCollector<'_>,
) -> Description {
    let mut event = Description::typed(event_uri, vocab::TRANSFER_OF_CUSTODY);
    event.push_text(vocab::LABEL, &entry.agent);
    if let Some(start) = entry.start.as_deref() {
        // Events carry the year only
        let shape = extract_year(start)
            .map(DateShape::Year)
            .or_else(|| classify_date(start));
        if let Some(shape) = shape {
            event.push(vocab::STARTED_AT, shape.to_object());
        }
    }
    if let Some(end) = entry.end.as_deref().and_then(date_only) {
        event.push(vocab::ENDED_AT, end.to_object());
    }
    if let Some(location) = entry.location.as_deref() {
        event.push_text(vocab::LOCATION_CITY, location);
    }
    if let Some(from) = entry.from.as_deref().and_then(non_blank) {
        let uri = agents.reference(AgentVariant::Agent, from);
        event.push_iri(vocab::TRANSFERRED_FROM, uri);
    }
    if let Some(to) = entry.to.as_deref().and_then(non_blank) {
        let uri = agents.reference(AgentVariant::Agent, to);
        event.push_iri(vocab::TRANSFERRED_TO, uri);
    }
    event.push_iri(vocab::USED, artwork_uri.to_string());
    event
}

fn ownership_node(entry: &ProvenanceEntry, collector: String) -> Object {
    let mut statements = vec![
        Statement::new(vocab::A, Object::name(vocab::TRANSFER_OF_CUSTODY)),
        Statement::new(vocab::WAS_ASSOCIATED_WITH, Object::iri(collector)),
    ];
    if let Some(start) = entry.start.as_deref().and_then(date_only) {
        statements.push(Statement::new(vocab::STARTED_AT, start.to_object()));
    }
    if let Some(end) = entry.end.as_deref().and_then(date_only) {
        statements.push(Statement::new(vocab::ENDED_AT, end.to_object()));
    }
    Object::Blank(statements)
}

/// `value@lang` becomes a language-tagged literal when `lang` is a valid tag.
fn culture_object(term: &str) -> Object {
    match term.rsplit_once('@') {
        Some((value, lang)) if !value.trim().is_empty() && is_language_tag(lang) => {
            Object::lang(value.trim(), Some(lang))
        }
        _ => Object::plain(term),
    }
}

fn push_license(artwork: &mut Description, license: &str) {
    let license = license.trim();
    if license.starts_with("http://") || license.starts_with("https://") {
        artwork.push_iri(vocab::LICENSE, license.to_string());
    } else {
        artwork.push_text(vocab::LICENSE, license);
    }
}

/// Trimmed, non-blank values in source order, exact duplicates collapsed.
fn distinct(values: &[String]) -> IndexSet<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

fn sorted(entries: &[ProvenanceEntry]) -> Vec<ProvenanceEntry> {
    let mut entries: Vec<ProvenanceEntry> = entries
        .iter()
        .filter(|e| !e.agent.trim().is_empty())
        .cloned()
        .collect();
    sort_by_start(&mut entries);
    entries
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}
