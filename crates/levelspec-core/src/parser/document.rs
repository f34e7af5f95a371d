//! Document model - the typed tree a level file parses into
//!
//! A document is a root [`Group`]: an ordered set of named [`Field`]s whose
//! values are strings, numbers, booleans, nested groups, or homogeneous lists.
//!
//! All node types are immutable once parsed and carry the [`SourceInfo`] of
//! the point where their parse began. Equality is structural: source
//! locations are ignored, so a re-parsed document compares equal to the
//! original.

use indexmap::IndexMap;

use super::reader::SourceInfo;

/// Tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Boolean,
    String,
    Numeric,
    Group,
    List,
    Unknown,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ValueType::Boolean => "Boolean",
            ValueType::String => "String",
            ValueType::Numeric => "Numeric",
            ValueType::Group => "Group",
            ValueType::List => "List",
            ValueType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Ordered sequence of values sharing one tag
pub type List = Vec<Value>;

/// Payload of a [`Value`]; exactly one shape is active
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueKind {
    Boolean(bool),
    String(String),
    Numeric(f64),
    Group(Group),
    List(List),
    #[default]
    Unknown,
}

/// A document node
#[derive(Debug, Clone, Default)]
pub struct Value {
    kind: ValueKind,
    source: SourceInfo,
}

impl Value {
    pub fn new(kind: ValueKind, source: SourceInfo) -> Self {
        Value { kind, source }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn value_type(&self) -> ValueType {
        match &self.kind {
            ValueKind::Boolean(_) => ValueType::Boolean,
            ValueKind::String(_) => ValueType::String,
            ValueKind::Numeric(_) => ValueType::Numeric,
            ValueKind::Group(_) => ValueType::Group,
            ValueKind::List(_) => ValueType::List,
            ValueKind::Unknown => ValueType::Unknown,
        }
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ValueKind::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match &self.kind {
            ValueKind::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            ValueKind::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Move the group out of a group value
    pub fn into_group(self) -> Option<Group> {
        match self.kind {
            ValueKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match &self.kind {
            ValueKind::List(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize) {
        match &self.kind {
            ValueKind::Boolean(b) => {
                out.push_str(&format!("{},\n", b));
            }
            ValueKind::String(s) => {
                out.push_str(&format!("\"{}\",\n", s));
            }
            ValueKind::Numeric(n) => {
                out.push_str(&format!("{},\n", n));
            }
            ValueKind::Group(g) => g.render(out, indent),
            ValueKind::List(l) => render_list(l, out, indent),
            // Unknown never comes out of a successful parse
            ValueKind::Unknown => out.push_str(",\n"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::new(ValueKind::Boolean(value), SourceInfo::default())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::new(ValueKind::Numeric(value), SourceInfo::default())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(ValueKind::String(value.to_string()), SourceInfo::default())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(ValueKind::String(value), SourceInfo::default())
    }
}

impl From<Group> for Value {
    fn from(value: Group) -> Self {
        let source = value.source.clone();
        Value::new(ValueKind::Group(value), source)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::new(ValueKind::List(value), SourceInfo::default())
    }
}

/// A named value
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: Value,
    source: SourceInfo,
}

impl Field {
    pub fn new(name: impl Into<String>, value: Value, source: SourceInfo) -> Self {
        Field {
            name: name.into(),
            value,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    fn render(&self, out: &mut String, indent: usize) {
        out.push_str(&format!("\"{}\": ", self.name));
        self.value.render(out, indent);
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

/// Ordered collection of uniquely named fields
#[derive(Debug, Clone, Default)]
pub struct Group {
    fields: IndexMap<String, Field>,
    source: SourceInfo,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: SourceInfo) -> Self {
        Group {
            fields: IndexMap::new(),
            source,
        }
    }

    /// Add a field, replacing any field with the same name.
    ///
    /// A replaced field keeps its original position and is returned.
    pub fn add_field(&mut self, field: Field) -> Option<Field> {
        self.fields.insert(field.name.clone(), field)
    }

    /// Builder-style insert for documents assembled in code
    pub fn insert(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        let source = value.source.clone();
        if self.add_field(Field::new(name.clone(), value, source)).is_some() {
            tracing::warn!("Overwriting field \"{}\" in group", name);
        }
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Shorthand for `get_field(name).map(Field::value)`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).map(Field::value)
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Serialize this group as the root of a document
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, 4);
        out
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize) {
        out.push('{');
        if self.fields.is_empty() {
            out.push_str("},\n");
            return;
        }
        out.push('\n');
        for field in self.fields.values() {
            push_indent(out, indent);
            field.render(out, indent + 4);
        }
        push_indent(out, indent.saturating_sub(4));
        out.push_str("},\n");
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .values()
                .zip(other.fields.values())
                .all(|(a, b)| a == b)
    }
}

fn render_list(list: &List, out: &mut String, indent: usize) {
    out.push('[');
    if list.is_empty() {
        out.push_str("],\n");
        return;
    }
    out.push('\n');
    for value in list {
        push_indent(out, indent);
        value.render(out, indent + 4);
    }
    push_indent(out, indent.saturating_sub(4));
    out.push_str("],\n");
}

fn push_indent(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}
