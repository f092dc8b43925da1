//! Namespace prefixes, classes and predicates of the output graph.

/// Type predicate shorthand.
pub const A: &str = "a";

/// Fixed prefix set, minus the schema namespace which is configurable.
pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
    ("prov", "http://www.w3.org/ns/prov#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dct", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
];

/// Prefix bound to the schema namespace.
pub const SCHEMA_PREFIX: &str = "arp";

// Classes
pub const ARTWORK: &str = "arp:Artwork";
pub const CREATION: &str = "arp:Creation";
pub const TRANSFER_OF_CUSTODY: &str = "arp:TransferOfCustody";
pub const ARTIST: &str = "arp:Artist";
pub const MUSEUM: &str = "arp:Museum";
pub const ORGANIZATION: &str = "arp:Organization";
pub const REGISTRAR: &str = "arp:Registrar";
pub const VALIDATOR: &str = "arp:Validator";
pub const COLLECTOR: &str = "arp:Collector";
pub const AGENT: &str = "prov:Agent";
pub const ASSOCIATION: &str = "prov:Association";
pub const CONCEPT: &str = "skos:Concept";

// Artwork
pub const TITLE: &str = "arp:title";
pub const DIMENSIONS: &str = "arp:dimensions";
pub const DESCRIPTION: &str = "arp:description";
pub const INVENTORY_NUMBER: &str = "arp:inventoryNumber";
pub const CONDITION: &str = "arp:condition";
pub const CATEGORY: &str = "arp:category";
pub const CLASSIFICATION: &str = "arp:classification";
pub const CULTURE: &str = "arp:culture";
pub const CURRENT_LOCATION: &str = "arp:currentLocation";
pub const LOCATION_NAME: &str = "arp:locationName";
pub const IMAGE_LINK: &str = "arp:imageLink";
pub const CATALOG_LINK: &str = "arp:cimecLink";
pub const EXTERNAL_LINK: &str = "arp:wikidataLink";
pub const LICENSE: &str = "dct:license";
pub const RECORDED_BY: &str = "arp:recordedBy";
pub const RECORDED_AT: &str = "arp:recordedAt";
pub const VALIDATED_BY: &str = "arp:validatedBy";
pub const VALIDATED_AT: &str = "arp:validatedAt";
pub const HAS_OWNERSHIP: &str = "arp:hasOwnership";
pub const HAD_CUSTODY_EVENT: &str = "arp:hadCustodyEvent";
pub const WAS_GENERATED_BY: &str = "prov:wasGeneratedBy";
pub const WAS_ATTRIBUTED_TO: &str = "prov:wasAttributedTo";

// Activities
pub const LABEL: &str = "rdfs:label";
pub const STARTED_AT: &str = "arp:startedAtTime";
pub const ENDED_AT: &str = "arp:endedAtTime";
pub const TECHNIQUE: &str = "arp:technique";
pub const MATERIALS_USED: &str = "arp:materialsUsed";
pub const GENERATED: &str = "prov:generated";
pub const USED: &str = "prov:used";
pub const QUALIFIED_ASSOCIATION: &str = "prov:qualifiedAssociation";
pub const AGENT_REF: &str = "prov:agent";
pub const HAD_ROLE: &str = "prov:hadRole";
pub const WAS_ASSOCIATED_WITH: &str = "prov:wasAssociatedWith";
pub const LOCATION_CITY: &str = "arp:locationCity";
pub const TRANSFERRED_FROM: &str = "arp:transferredFrom";
pub const TRANSFERRED_TO: &str = "arp:transferredTo";

// Agents
pub const NAME: &str = "arp:name";
pub const HOMEPAGE: &str = "foaf:homepage";
pub const ACTED_ON_BEHALF_OF: &str = "prov:actedOnBehalfOf";
pub const WIKIDATA_URI: &str = "arp:wikidataUri";
pub const WIKIDATA_NAME: &str = "arp:wikidataName";
pub const GETTY_ID: &str = "arp:gettyId";
pub const GETTY_URI: &str = "arp:gettyUri";

// Terms
pub const EXACT_MATCH: &str = "skos:exactMatch";
