//! Level document parser - reader, document model, and recursive descent
//!
//! Converts level text into a [`Group`] tree.
//!
//! The format is JSON-like but deliberately not JSON:
//! - keys are always double-quoted
//! - trailing commas are accepted after the last field or element
//! - numbers are `-?digits[.digits]`, no exponent, no leading `+`
//! - strings have no escape sequences and may span lines
//! - bare `true`/`false` are not values here; only a boolean schema reads them
//!   (see [`SchemaValue::load_value`](crate::schema::SchemaValue::load_value))
//!
//! Parsing is single-pass with no recovery: the first syntax error aborts the
//! whole document.

pub mod document;
pub mod reader;

use crate::diagnostic::DiagnosticKind;
use crate::error::ParseError;

use document::{Field, Group, List, Value, ValueKind};
use reader::{describe, Reader};

/// Parse level text into its root group
///
/// # Errors
/// Returns the first syntax error, located as `origin:line`.
pub fn parse(origin: &str, text: &str) -> Result<Group, ParseError> {
    let mut reader = Reader::new(origin, text);
    Group::load(&mut reader)
}

/// Parse a single value of any generic shape
pub fn parse_value(origin: &str, text: &str) -> Result<Value, ParseError> {
    let mut reader = Reader::new(origin, text);
    Value::load(&mut reader)
}

impl Value {
    /// Load whatever value comes next, dispatching on the lookahead:
    /// `"` string, digit or `-` number, `{` group, `[` list.
    pub fn load(reader: &mut Reader) -> Result<Value, ParseError> {
        reader.ensure_valid()?;

        let next = reader.peek_next_symbol();
        let source = reader.location();
        match next {
            Some('"') => {
                let text = reader.load_string()?;
                Ok(Value::new(ValueKind::String(text), source))
            }
            Some(c) if Reader::is_numeric_start(c) => {
                let number = reader.load_numeric()?;
                Ok(Value::new(ValueKind::Numeric(number), source))
            }
            Some('{') => {
                let group = Group::load(reader)?;
                Ok(Value::new(ValueKind::Group(group), source))
            }
            Some('[') => {
                let list = load_list(reader)?;
                Ok(Value::new(ValueKind::List(list), source))
            }
            other => Err(reader.error(format!(
                "Unexpected symbol {} expected Value",
                describe(other)
            ))),
        }
    }
}

impl Group {
    /// Load a `{ "name": value, ... }` group
    pub fn load(reader: &mut Reader) -> Result<Group, ParseError> {
        load_group_with(reader, |_, reader| Value::load(reader))
    }
}

impl Field {
    /// Load a single `"name": value` pair
    pub fn load(reader: &mut Reader) -> Result<Field, ParseError> {
        load_field_with(reader, &mut |_: &str, reader: &mut Reader| Value::load(reader))
    }
}

/// Load a `[ value, ... ]` list whose elements all share one tag
pub fn load_list(reader: &mut Reader) -> Result<List, ParseError> {
    load_list_with(reader, Value::load)
}

// ── Shared descent ────────────────────────────────────────
//
// The generic loaders above and the schema-directed loader differ only in how
// a field's value or a list element is read, so both go through these.

pub(crate) fn load_group_with<F>(reader: &mut Reader, mut load_value: F) -> Result<Group, ParseError>
where
    F: FnMut(&str, &mut Reader) -> Result<Value, ParseError>,
{
    reader.ensure_valid()?;

    let next = reader.peek_next_symbol();
    if next != Some('{') {
        return Err(reader.error(format!(
            "Unexpected symbol {} expected '{{'",
            describe(next)
        )));
    }
    let mut group = Group::with_source(reader.location());
    reader.skip_symbol();

    while reader.peek_next_symbol() == Some('"') {
        let field = load_field_with(reader, &mut load_value)?;
        let name = field.name().to_string();
        let location = field.source().clone();
        if group.add_field(field).is_some() {
            reader.warning(
                DiagnosticKind::DuplicateField,
                location,
                format!("Overwriting field \"{}\" in group", name),
            );
        }

        // trailing comma ok
        if reader.peek_next_symbol() == Some(',') {
            reader.skip_symbol();
        }
    }

    let next = reader.peek_next_symbol();
    if next != Some('}') {
        return Err(reader.error(format!("Expected '}}' got {}", describe(next))));
    }
    reader.skip_symbol();

    Ok(group)
}

pub(crate) fn load_field_with<F>(reader: &mut Reader, load_value: &mut F) -> Result<Field, ParseError>
where
    F: FnMut(&str, &mut Reader) -> Result<Value, ParseError>,
{
    reader.ensure_valid()?;

    let next = reader.peek_next_symbol();
    let source = reader.location();
    if next != Some('"') {
        return Err(reader.error(format!("Expected '\"' got {}", describe(next))));
    }
    let name = reader.load_string()?;

    let next = reader.peek_next_symbol();
    if next != Some(':') {
        return Err(reader.error(format!(
            "Expecting ':' after \"{}\" got {}",
            name,
            describe(next)
        )));
    }
    reader.skip_symbol();

    let value = load_value(&name, reader)?;
    Ok(Field::new(name, value, source))
}

pub(crate) fn load_list_with<F>(reader: &mut Reader, mut load_element: F) -> Result<List, ParseError>
where
    F: FnMut(&mut Reader) -> Result<Value, ParseError>,
{
    reader.ensure_valid()?;

    let next = reader.peek_next_symbol();
    if next != Some('[') {
        return Err(reader.error(format!("Expected '[' got {}", describe(next))));
    }
    reader.skip_symbol();

    let mut list = List::new();
    loop {
        match reader.peek_next_symbol() {
            Some(']') => break,
            None => return Err(reader.error("Unexpected end of file in list")),
            Some(_) => {}
        }

        let value = load_element(reader)?;
        if let Some(first) = list.first() {
            if first.value_type() != value.value_type() {
                return Err(reader.error(format!(
                    "Types in list must all be the same: expected {} got {}",
                    first.value_type(),
                    value.value_type()
                )));
            }
        }
        list.push(value);

        // trailing comma ok
        if reader.peek_next_symbol() == Some(',') {
            reader.skip_symbol();
        }
    }
    reader.skip_symbol();

    Ok(list)
}
