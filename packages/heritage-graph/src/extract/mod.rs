//! Record extraction.
//!
//! Both sources reduce to the same flat [`ArtworkRecord`](crate::types::record::ArtworkRecord):
//!
//! - [`lido`] - Museum collection export (one XML document, many records)
//! - [`knowledge_base`] - Knowledge-base SPARQL rows
//! - [`dates`] - Date shape classification and year extraction
//! - [`provenance`] - Delimited ownership/custody history codec

pub mod dates;
pub mod knowledge_base;
pub mod lido;
pub mod provenance;

pub use dates::{classify_date, extract_year, DateShape};
pub use knowledge_base::KnowledgeBaseSource;
pub use lido::{extract_all, extract_record, LidoRecords};
pub use provenance::{decode_history, encode_history, sort_by_start, ProvenanceEntry};
