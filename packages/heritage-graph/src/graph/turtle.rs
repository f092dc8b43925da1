//! Turtle serialization of graph fragments.
//!
//! Each description becomes one block: the subject, then its statements
//! joined with ` ;` line breaks, then a single ` .`. Blank nodes are written
//! inline as `[ ... ]`.

use super::{vocab, Datatype, Description, Object, Statement};

const INDENT: &str = "    ";

/// Build the `@prefix` header written once at the top of an output file.
pub fn prefix_header(schema_uri: &str) -> String {
    let mut out = format!(
        "@prefix {}: <{}> .\n",
        vocab::SCHEMA_PREFIX,
        escape_iri(schema_uri)
    );
    for (prefix, ns) in vocab::STANDARD_PREFIXES {
        out.push_str(&format!("@prefix {prefix}: <{ns}> .\n"));
    }
    out.push('\n');
    out
}

/// Serialize one description as a Turtle block (without trailing blank line).
pub fn write_description(description: &Description) -> String {
    let body = join_statements(&description.statements, 1);
    format!("<{}> {} .\n", escape_iri(&description.subject), body)
}

/// Serialize a batch of descriptions separated by blank lines.
pub fn write_batch(descriptions: &[Description]) -> String {
    descriptions
        .iter()
        .filter(|d| !d.statements.is_empty())
        .map(write_description)
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_statements(statements: &[Statement], depth: usize) -> String {
    let indent = INDENT.repeat(depth);
    statements
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let rendered = format!("{} {}", s.predicate, write_object(&s.object, depth));
            // The first statement follows the subject on the same line.
            if i == 0 {
                rendered
            } else {
                format!("{indent}{rendered}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ;\n")
}

fn write_object(object: &Object, depth: usize) -> String {
    match object {
        Object::Iri(iri) => format!("<{}>", escape_iri(iri)),
        Object::Name(name) => name.clone(),
        Object::Plain(value) => format!("\"{}\"", escape_literal(value)),
        Object::Lang { value, lang } if is_language_tag(lang) => {
            format!("\"{}\"@{}", escape_literal(value), lang)
        }
        Object::Lang { value, .. } => format!("\"{}\"", escape_literal(value)),
        Object::Typed { value, datatype } => write_typed(value, *datatype),
        Object::Blank(inner) => {
            let indent = INDENT.repeat(depth + 1);
            let closing = INDENT.repeat(depth);
            let lines = inner
                .iter()
                .map(|s| format!("{indent}{} {}", s.predicate, write_object(&s.object, depth + 1)))
                .collect::<Vec<_>>()
                .join(" ;\n");
            format!("[\n{lines}\n{closing}]")
        }
    }
}

fn write_typed(value: &str, datatype: Datatype) -> String {
    let value = match datatype {
        Datatype::AnyUri => escape_literal(&escape_iri(value)),
        Datatype::Date | Datatype::GYear => escape_literal(value),
    };
    format!("\"{}\"^^{}", value, datatype.prefixed())
}

/// Escape a string for use inside a double-quoted Turtle literal.
///
/// Line breaks are flattened to spaces.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode the characters Turtle forbids inside `<...>`.
pub fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.trim().chars() {
        match c {
            ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Whether `tag` is a valid Turtle language tag (`[a-zA-Z]+ ('-' [a-zA-Z0-9]+)*`).
pub fn is_language_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary = subtags.next().unwrap_or_default();
    !primary.is_empty()
        && primary.chars().all(|c| c.is_ascii_alphabetic())
        && subtags.all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()))
}
