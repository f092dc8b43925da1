//! Museum-export (LIDO) record extraction.
//!
//! The export is one document holding many `lido:lido` records. The document
//! is first cut into per-record chunks, and each chunk is parsed on its own
//! with `quick-xml`, so a syntax error inside one record only costs that
//! record.
//!
//! Element names are matched by their qualified name as written
//! (`lido:titleSet`), without namespace resolution.
//!
//! # Example
//!
//! ```rust,ignore
//! use heritage_graph::extract::lido::LidoRecords;
//!
//! for result in LidoRecords::new(&xml) {
//!     match result {
//!         Ok(record) => println!("{} {}", record.id, record.title),
//!         Err(e) => eprintln!("skipped: {e}"),
//!     }
//! }
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::types::record::{ArtworkRecord, MetadataStamp, RecordSource};

const RECORD_OPEN: &str = "<lido:lido";
const RECORD_CLOSE: &str = "</lido:lido>";

/// Iterator over the records of a museum export.
pub struct LidoRecords<'a> {
    xml: &'a str,
    cursor: usize,
    position: usize,
}

impl<'a> LidoRecords<'a> {
    pub fn new(xml: &'a str) -> Self {
        Self {
            xml,
            cursor: 0,
            position: 0,
        }
    }
}

impl Iterator for LidoRecords<'_> {
    type Item = ExtractResult<ArtworkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = find_record_start(self.xml, self.cursor)?;
        let position = self.position;
        self.position += 1;

        let rest = &self.xml[start..];
        let self_closing = rest
            .find('>')
            .map(|gt| rest[..gt].trim_end().ends_with('/'))
            .unwrap_or(false);

        let end = if self_closing {
            rest.find('>').map(|gt| start + gt + 1)
        } else {
            rest.find(RECORD_CLOSE).map(|i| start + i + RECORD_CLOSE.len())
        };

        let Some(end) = end else {
            // Truncated export: the final record never closes.
            self.cursor = self.xml.len();
            return Some(Err(ExtractError::MalformedXml {
                position,
                detail: "record is not closed".to_string(),
            }));
        };

        self.cursor = end;
        Some(extract_record(&self.xml[start..end], position))
    }
}

/// Extract every record of an export, in document order.
pub fn extract_all(xml: &str) -> Vec<ExtractResult<ArtworkRecord>> {
    LidoRecords::new(xml).collect()
}

/// Find the next `<lido:lido` start tag, skipping longer names such as
/// `<lido:lidoRecID`.
fn find_record_start(xml: &str, from: usize) -> Option<usize> {
    let mut offset = from;
    while let Some(i) = xml.get(offset..)?.find(RECORD_OPEN) {
        let at = offset + i;
        let next = xml[at + RECORD_OPEN.len()..].chars().next();
        match next {
            Some(c) if c == '>' || c == '/' || c.is_whitespace() => return Some(at),
            _ => offset = at + RECORD_OPEN.len(),
        }
    }
    None
}

/// Parse one record chunk into a flat field set.
pub fn extract_record(chunk: &str, position: usize) -> ExtractResult<ArtworkRecord> {
    let root = parse_tree(chunk).map_err(|detail| ExtractError::MalformedXml { position, detail })?;

    let id = root.text_of("lido:lidoRecID");
    if id.is_empty() {
        return Err(ExtractError::MissingIdentifier { position });
    }

    let mut record = ArtworkRecord::new(id);
    record.source = RecordSource::MuseumExport;
    record.title = root.nested_text("lido:titleSet", "lido:appellationValue");
    let actor = root.nested_text("lido:eventActor", "lido:appellationValue");
    if !actor.is_empty() {
        record.actors.push(actor);
    }
    record.date = root.nested_text("lido:eventDate", "lido:displayDate");
    record.dimensions = root.text_of("lido:displayObjectMeasurements");
    record.image_link = root.nested_text("lido:resourceRepresentation", "lido:linkResource");

    let (materials, techniques) = materials_and_techniques(&root);
    record.materials = materials;
    record.techniques = techniques;
    record.classifications = classifications(&root);
    record.cultures = cultures(&root);

    record.category = root.nested_text("lido:objectWorkType", "lido:term");
    record.description = root.nested_text("lido:objectDescriptionSet", "lido:descriptiveNoteValue");
    record.condition = root.text_of("lido:displayState");
    record.inventory_number = root.nested_text("lido:repositorySet", "lido:workID");
    record.catalog_link = root.nested_text("lido:recordInfoSet", "lido:recordInfoLink");
    record.license = root
        .first("lido:rightsResource")
        .map(|r| r.nested_text("lido:rightsType", "lido:term"))
        .unwrap_or_default();

    record.recorded = metadata_stamp(&root, "creation date");
    record.validated = metadata_stamp(&root, "validation date");

    record.museum = root.nested_text("lido:repositoryName", "lido:appellationValue");
    if let Some(source) = root.first("lido:recordSource") {
        record.source_organization = source.nested_text("lido:legalBodyName", "lido:appellationValue");
        record.source_homepage = source.text_of("lido:legalBodyWeblink");
    }

    debug!(position, id = %record.id, "Extracted museum export record");
    Ok(record)
}

/// Split material/technique items by their `lido:label` attribute.
///
/// Items with an absent or unrecognized label go to techniques.
fn materials_and_techniques(root: &Element) -> (Vec<String>, Vec<String>) {
    let mut materials = Vec::new();
    let mut techniques = Vec::new();

    for container in root.descendants("lido:eventMaterialsTech") {
        for item in container.descendants("lido:displayMaterialsTech") {
            let value = item.text();
            if value.is_empty() {
                continue;
            }
            match item.attr("lido:label").map(str::trim) {
                Some(label) if label.eq_ignore_ascii_case("material") => materials.push(value),
                _ => techniques.push(value),
            }
        }
    }
    (materials, techniques)
}

/// Every term of every classification inside the first classification wrap.
fn classifications(root: &Element) -> Vec<String> {
    let Some(wrap) = root.first("lido:classificationWrap") else {
        return Vec::new();
    };
    wrap.descendants("lido:classification")
        .into_iter()
        .flat_map(|c| c.descendants("lido:term"))
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Culture terms of every event, `value@lang` when a language is given.
fn cultures(root: &Element) -> Vec<String> {
    root.descendants("lido:event")
        .into_iter()
        .flat_map(|e| e.descendants("lido:culture"))
        .flat_map(|c| c.descendants("lido:term"))
        .filter_map(|term| {
            let value = term.text();
            if value.is_empty() {
                return None;
            }
            match term.attr("xml:lang").map(str::trim).filter(|l| !l.is_empty()) {
                Some(lang) => Some(format!("{value}@{lang}")),
                None => Some(value),
            }
        })
        .collect()
}

fn metadata_stamp(root: &Element, kind: &str) -> MetadataStamp {
    root.descendants("lido:recordMetadataDate")
        .into_iter()
        .filter(|e| {
            e.attr("lido:type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(kind))
        })
        .map(|e| MetadataStamp::parse(&e.text()))
        .find(|stamp| !stamp.is_empty())
        .unwrap_or_default()
}

// --- Minimal element tree ---

#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("bad attribute on <{name}>: {e}"))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("bad attribute value on <{name}>: {e}"))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated, trimmed text of this element and its descendants.
    fn text(&self) -> String {
        fn collect(element: &Element, out: &mut String) {
            for child in &element.children {
                match child {
                    Node::Text(t) => out.push_str(t),
                    Node::Element(e) => collect(e, out),
                }
            }
        }
        let mut out = String::new();
        collect(self, &mut out);
        out.trim().to_string()
    }

    /// Descendants with the given name, in document order.
    fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        fn walk<'a>(element: &'a Element, name: &str, out: &mut Vec<&'a Element>) {
            for child in &element.children {
                if let Node::Element(e) = child {
                    if e.name == name {
                        out.push(e);
                    }
                    walk(e, name, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self, name, &mut out);
        out
    }

    fn first(&self, name: &str) -> Option<&Element> {
        self.descendants(name).into_iter().next()
    }

    /// Text of the first descendant named `name`, or empty.
    fn text_of(&self, name: &str) -> String {
        self.first(name).map(Element::text).unwrap_or_default()
    }

    /// Text of the first `child` inside the first `parent`, or empty.
    fn nested_text(&self, parent: &str, child: &str) -> String {
        self.first(parent)
            .map(|p| p.text_of(child))
            .unwrap_or_default()
    }
}

/// Parse a record chunk into a tree rooted at a synthetic element.
fn parse_tree(chunk: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(chunk);
    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        let before = reader.buffer_position();
        let event = reader.read_event().map_err(|e| {
            format!("at byte {}: {e}", reader.error_position())
        })?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                push_child(&mut stack, Node::Element(element))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .filter(|_| !stack.is_empty())
                    .ok_or_else(|| "unbalanced end tag".to_string())?;
                push_child(&mut stack, Node::Element(element))?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| format!("bad text: {e}"))?;
                push_child(&mut stack, Node::Text(text.into_owned()))?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_child(&mut stack, Node::Text(text))?;
            }
            Event::Eof => break,
            _ => {}
        }

        if reader.buffer_position() == before {
            return Err("parser made no progress".to_string());
        }
    }

    if stack.len() != 1 {
        return Err(format!("{} element(s) left open", stack.len() - 1));
    }
    stack.pop().ok_or_else(|| "empty record".to_string())
}

fn push_child(stack: &mut [Element], node: Node) -> Result<(), String> {
    stack
        .last_mut()
        .map(|parent| parent.children.push(node))
        .ok_or_else(|| "no open element".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"
<lido:lidoWrap xmlns:lido="http://www.lido-schema.org">
  <lido:lido>
    <lido:lidoRecID lido:type="local">RO-123/45</lido:lidoRecID>
    <lido:descriptiveMetadata>
      <lido:objectClassificationWrap>
        <lido:objectWorkTypeWrap>
          <lido:objectWorkType><lido:term>pictură</lido:term></lido:objectWorkType>
        </lido:objectWorkTypeWrap>
        <lido:classificationWrap>
          <lido:classification><lido:term>IMAGE</lido:term></lido:classification>
          <lido:classification>
            <lido:term>artă plastică</lido:term>
            <lido:term>fine arts</lido:term>
          </lido:classification>
        </lido:classificationWrap>
      </lido:objectClassificationWrap>
      <lido:objectIdentificationWrap>
        <lido:titleWrap>
          <lido:titleSet><lido:appellationValue>Car cu boi</lido:appellationValue></lido:titleSet>
        </lido:titleWrap>
        <lido:repositoryWrap>
          <lido:repositorySet>
            <lido:repositoryName>
              <lido:legalBodyName>
                <lido:appellationValue>Muzeul Național de Artă - B</lido:appellationValue>
              </lido:legalBodyName>
            </lido:repositoryName>
            <lido:workID>inv. 8021</lido:workID>
          </lido:repositorySet>
        </lido:repositoryWrap>
        <lido:displayStateEditionWrap><lido:displayState>bună</lido:displayState></lido:displayStateEditionWrap>
        <lido:objectDescriptionWrap>
          <lido:objectDescriptionSet>
            <lido:descriptiveNoteValue>Ulei pe pânză &amp; ramă</lido:descriptiveNoteValue>
          </lido:objectDescriptionSet>
        </lido:objectDescriptionWrap>
        <lido:objectMeasurementsWrap>
          <lido:objectMeasurementsSet>
            <lido:displayObjectMeasurements>h 45 cm; l 60 cm</lido:displayObjectMeasurements>
          </lido:objectMeasurementsSet>
        </lido:objectMeasurementsWrap>
      </lido:objectIdentificationWrap>
      <lido:eventWrap>
        <lido:eventSet>
          <lido:event>
            <lido:eventActor>
              <lido:actorInRole><lido:actor><lido:nameActorSet>
                <lido:appellationValue>Grigorescu, Nicolae</lido:appellationValue>
              </lido:nameActorSet></lido:actor></lido:actorInRole>
            </lido:eventActor>
            <lido:eventActor>
              <lido:actorInRole><lido:actor><lido:nameActorSet>
                <lido:appellationValue>Second Actor</lido:appellationValue>
              </lido:nameActorSet></lido:actor></lido:actorInRole>
            </lido:eventActor>
            <lido:culture><lido:term xml:lang="ro">românească</lido:term></lido:culture>
            <lido:culture><lido:term>european</lido:term></lido:culture>
            <lido:eventDate><lido:displayDate>1890</lido:displayDate></lido:eventDate>
            <lido:eventMaterialsTech>
              <lido:displayMaterialsTech lido:label="material">ulei</lido:displayMaterialsTech>
              <lido:displayMaterialsTech lido:label="Technique">pictură în ulei</lido:displayMaterialsTech>
              <lido:displayMaterialsTech>pânză</lido:displayMaterialsTech>
              <lido:displayMaterialsTech lido:label="support">carton</lido:displayMaterialsTech>
            </lido:eventMaterialsTech>
          </lido:event>
        </lido:eventSet>
      </lido:eventWrap>
    </lido:descriptiveMetadata>
    <lido:administrativeMetadata>
      <lido:rightsWorkWrap/>
      <lido:recordWrap>
        <lido:recordSource>
          <lido:legalBodyName><lido:appellationValue>INP</lido:appellationValue></lido:legalBodyName>
          <lido:legalBodyWeblink>http://www.cimec.ro</lido:legalBodyWeblink>
        </lido:recordSource>
        <lido:recordInfoSet>
          <lido:recordInfoLink>http://clasate.cimec.ro/detaliu.asp?k=123</lido:recordInfoLink>
          <lido:recordMetadataDate lido:type="creation date">2010-05-04/Ana Pop</lido:recordMetadataDate>
          <lido:recordMetadataDate lido:type="validation date">2011-01-02/Ion Vasile</lido:recordMetadataDate>
        </lido:recordInfoSet>
      </lido:recordWrap>
      <lido:resourceWrap>
        <lido:resourceSet>
          <lido:resourceRepresentation>
            <lido:linkResource>http://clasate.cimec.ro/img/123.jpg</lido:linkResource>
          </lido:resourceRepresentation>
          <lido:rightsResource>
            <lido:rightsType><lido:term>http://www.europeana.eu/rights/rr-f/</lido:term></lido:rightsType>
          </lido:rightsResource>
        </lido:resourceSet>
      </lido:resourceWrap>
    </lido:administrativeMetadata>
  </lido:lido>
</lido:lidoWrap>
"#;

    #[test]
    fn test_extracts_every_field() {
        let records = extract_all(RECORD);
        assert_eq!(records.len(), 1);
        let r = records.into_iter().next().unwrap().unwrap();

        assert_eq!(r.id, "RO-123/45");
        assert_eq!(r.title, "Car cu boi");
        assert_eq!(r.actors, vec!["Grigorescu, Nicolae"]);
        assert_eq!(r.date, "1890");
        assert_eq!(r.dimensions, "h 45 cm; l 60 cm");
        assert_eq!(r.category, "pictură");
        assert_eq!(r.classifications, vec!["IMAGE", "artă plastică", "fine arts"]);
        assert_eq!(r.cultures, vec!["românească@ro", "european"]);
        assert_eq!(r.description, "Ulei pe pânză & ramă");
        assert_eq!(r.condition, "bună");
        assert_eq!(r.inventory_number, "inv. 8021");
        assert_eq!(r.museum, "Muzeul Național de Artă - B");
        assert_eq!(r.source_organization, "INP");
        assert_eq!(r.source_homepage, "http://www.cimec.ro");
        assert_eq!(r.catalog_link, "http://clasate.cimec.ro/detaliu.asp?k=123");
        assert_eq!(r.image_link, "http://clasate.cimec.ro/img/123.jpg");
        assert_eq!(r.license, "http://www.europeana.eu/rights/rr-f/");
        assert_eq!(r.recorded.date, "2010-05-04");
        assert_eq!(r.recorded.name, "Ana Pop");
        assert_eq!(r.validated.name, "Ion Vasile");
    }

    #[test]
    fn test_material_technique_demux() {
        let r = extract_all(RECORD).remove(0).unwrap();

        assert_eq!(r.materials, vec!["ulei"]);
        // Unlabelled and unrecognized items default to techniques
        assert_eq!(r.techniques, vec!["pictură în ulei", "pânză", "carton"]);
    }

    #[test]
    fn test_missing_optional_fields_are_empty() {
        let xml = "<lido:lido><lido:lidoRecID>7</lido:lidoRecID></lido:lido>";
        let r = extract_all(xml).remove(0).unwrap();

        assert_eq!(r.title, "");
        assert!(r.actors.is_empty());
        assert_eq!(r.date, "");
        assert!(r.recorded.is_empty());
    }

    #[test]
    fn test_malformed_record_is_isolated() {
        let xml = "<root>\
            <lido:lido><lido:lidoRecID>1</lido:lidoRecID></lido:lido>\
            <lido:lido><lido:lidoRecID>2</lido:lidoRecID><lido:titleSet></lido:oops></lido:lido>\
            <lido:lido><lido:lidoRecID>3</lido:lidoRecID></lido:lido>\
            </root>";
        let results = extract_all(xml);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, "1");
        assert!(matches!(
            results[1],
            Err(ExtractError::MalformedXml { position: 1, .. })
        ));
        assert_eq!(results[2].as_ref().unwrap().id, "3");
    }

    #[test]
    fn test_missing_identifier() {
        let xml = "<lido:lido><lido:titleSet><lido:appellationValue>x</lido:appellationValue></lido:titleSet></lido:lido>";
        assert!(matches!(
            extract_all(xml).remove(0),
            Err(ExtractError::MissingIdentifier { position: 0 })
        ));
    }

    #[test]
    fn test_truncated_export() {
        let xml = "<lido:lido><lido:lidoRecID>1</lido:lidoRecID></lido:lido><lido:lido><lido:lidoRecID>2";
        let results = extract_all(xml);

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ExtractError::MalformedXml { .. })));
    }

    #[test]
    fn test_bad_entity_is_malformed() {
        let xml = "<lido:lido><lido:lidoRecID>1</lido:lidoRecID><lido:displayState>a &bogus; b</lido:displayState></lido:lido>";
        assert!(matches!(
            extract_all(xml).remove(0),
            Err(ExtractError::MalformedXml { .. })
        ));
    }

    #[test]
    fn test_record_start_skips_longer_names() {
        let xml = "<lido:lidoWrap><lido:lidoRecID>x</lido:lidoRecID></lido:lidoWrap>";
        assert!(extract_all(xml).is_empty());
    }
}
