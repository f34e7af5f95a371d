//! Schema model - declarative shapes that level documents are checked against
//!
//! A schema is an immutable tree of [`SchemaValue`]s built once and reused for
//! every document it validates. Each node is reference counted, so a fragment
//! referenced from several parents (a shared "range" group, say) exists once.
//!
//! # Validation
//!
//! Validation walks a document alongside the schema and accumulates every
//! problem it finds instead of stopping at the first one. Only a tag mismatch
//! stops descent into that particular value. Each problem is logged and also
//! returned in the [`ValidationResult`].

mod group;

pub use group::{SchemaField, SchemaGroup, SchemaUnion};

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::ParseError;
use crate::parser::document::{Group, List, Value, ValueKind, ValueType};
use crate::parser::load_list_with;
use crate::parser::reader::{Reader, SourceInfo};

// ── Validation Result ─────────────────────────────────────

/// Outcome of a validation pass
#[derive(Debug, Clone)]
pub struct ValidationResult {
    valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            diagnostics: Vec::new(),
        }
    }

    /// The pass/fail verdict: the AND of every individual check
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns only error-level diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    /// True if any diagnostic has the given kind
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    pub(crate) fn add_error(&mut self, kind: DiagnosticKind, location: &SourceInfo, message: String) {
        let diagnostic = Diagnostic::error(kind, location.clone(), message);
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    fn finish(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

// ── Schema Values ─────────────────────────────────────────

/// The shape a schema node expects
#[derive(Debug)]
pub enum SchemaKind {
    Boolean,
    /// Any string when `allowed` is empty, otherwise one of `allowed`
    String { allowed: Vec<String> },
    /// Inclusive bounds; `None` is unbounded on that side
    Numeric { min: Option<f64>, max: Option<f64> },
    Group(SchemaGroup),
    List(SchemaList),
    /// Validates a group holding exactly N of the named options
    Union(SchemaUnion),
}

/// A shareable, immutable schema node
#[derive(Debug, Clone)]
pub struct SchemaValue(Arc<SchemaKind>);

static ANY_BOOL: Lazy<SchemaValue> = Lazy::new(|| SchemaValue::from_kind(SchemaKind::Boolean));
static ANY_STRING: Lazy<SchemaValue> = Lazy::new(|| {
    SchemaValue::from_kind(SchemaKind::String {
        allowed: Vec::new(),
    })
});
static ANY_NUMBER: Lazy<SchemaValue> = Lazy::new(|| SchemaValue::numeric(None, None));
static NON_NEGATIVE: Lazy<SchemaValue> = Lazy::new(|| SchemaValue::numeric(Some(0.0), None));
static NON_POSITIVE: Lazy<SchemaValue> = Lazy::new(|| SchemaValue::numeric(None, Some(0.0)));

impl SchemaValue {
    pub fn from_kind(kind: SchemaKind) -> Self {
        SchemaValue(Arc::new(kind))
    }

    /// Any boolean (shared instance)
    pub fn any_bool() -> Self {
        ANY_BOOL.clone()
    }

    /// Any string (shared instance)
    pub fn any_string() -> Self {
        ANY_STRING.clone()
    }

    /// Any number (shared instance)
    pub fn any_number() -> Self {
        ANY_NUMBER.clone()
    }

    /// Numbers `>= 0` (shared instance)
    pub fn non_negative() -> Self {
        NON_NEGATIVE.clone()
    }

    /// Numbers `<= 0` (shared instance)
    pub fn non_positive() -> Self {
        NON_POSITIVE.clone()
    }

    /// A string that must equal one of `values`
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Self::any_string();
        }
        Self::from_kind(SchemaKind::String { allowed })
    }

    pub fn numeric(min: Option<f64>, max: Option<f64>) -> Self {
        Self::from_kind(SchemaKind::Numeric { min, max })
    }

    /// A number in `[min, max]`
    pub fn range(min: f64, max: f64) -> Self {
        Self::numeric(Some(min), Some(max))
    }

    pub fn group(group: SchemaGroup) -> Self {
        Self::from_kind(SchemaKind::Group(group))
    }

    pub fn list(list: SchemaList) -> Self {
        Self::from_kind(SchemaKind::List(list))
    }

    pub fn union(union: SchemaUnion) -> Self {
        Self::from_kind(SchemaKind::Union(union))
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.0
    }

    /// Tag a conforming value must carry
    pub fn value_type(&self) -> ValueType {
        match self.kind() {
            SchemaKind::Boolean => ValueType::Boolean,
            SchemaKind::String { .. } => ValueType::String,
            SchemaKind::Numeric { .. } => ValueType::Numeric,
            SchemaKind::Group(_) | SchemaKind::Union(_) => ValueType::Group,
            SchemaKind::List(_) => ValueType::List,
        }
    }

    /// True if both handles point at the same node
    pub fn ptr_eq(&self, other: &SchemaValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Validate a value against this schema
    pub fn validate(&self, value: &Value, strict: bool) -> ValidationResult {
        let mut result = ValidationResult::new();
        let valid = self.check(value, strict, &mut result);
        result.finish(valid)
    }

    /// Validate a bare group against this schema (group or union schemas)
    pub fn validate_group(&self, group: &Group, strict: bool) -> ValidationResult {
        let mut result = ValidationResult::new();
        let valid = match self.kind() {
            SchemaKind::Group(schema) => schema.check(group, strict, &mut result),
            SchemaKind::Union(schema) => schema.check(group, strict, &mut result),
            _ => {
                result.add_error(
                    DiagnosticKind::TypeMismatch,
                    group.source(),
                    format!(
                        "Invalid value type: expecting {} got {}",
                        self.value_type(),
                        ValueType::Group
                    ),
                );
                false
            }
        };
        result.finish(valid)
    }

    pub(crate) fn check(&self, value: &Value, strict: bool, result: &mut ValidationResult) -> bool {
        match (self.kind(), value.kind()) {
            (SchemaKind::Boolean, ValueKind::Boolean(_)) => true,
            (SchemaKind::Numeric { min, max }, ValueKind::Numeric(n)) => {
                check_range(*n, *min, *max, value.source(), result)
            }
            (SchemaKind::String { allowed }, ValueKind::String(s)) => {
                check_allowed(s, allowed, value.source(), result)
            }
            (SchemaKind::Group(schema), ValueKind::Group(group)) => {
                schema.check(group, strict, result)
            }
            (SchemaKind::Union(schema), ValueKind::Group(group)) => {
                schema.check(group, strict, result)
            }
            (SchemaKind::List(schema), ValueKind::List(items)) => {
                schema.check(items, value.source(), strict, result)
            }
            _ => {
                result.add_error(
                    DiagnosticKind::TypeMismatch,
                    value.source(),
                    format!(
                        "Invalid value type: expecting {} got {}",
                        self.value_type(),
                        value.value_type()
                    ),
                );
                false
            }
        }
    }

    /// Read the next value with this schema steering the parse.
    ///
    /// Booleans are only recognized here: a boolean schema facing `t` or `f`
    /// reads a bare `true`/`false`. Group, union and list schemas pass their
    /// field and element schemas down. Everything else, including lookaheads
    /// that do not fit the schema, goes through the generic
    /// [`Value::load`], leaving any mismatch for validation to report.
    pub fn load_value(&self, reader: &mut Reader) -> Result<Value, ParseError> {
        reader.ensure_valid()?;

        let next = reader.peek_next_symbol();
        let source = reader.location();
        match (self.kind(), next) {
            (SchemaKind::Boolean, Some('t' | 'f')) => {
                let value = reader.load_bool()?;
                Ok(Value::new(ValueKind::Boolean(value), source))
            }
            (SchemaKind::Group(schema), Some('{')) => {
                let group = schema.load(reader)?;
                Ok(Value::new(ValueKind::Group(group), source))
            }
            (SchemaKind::Union(schema), Some('{')) => {
                let group = schema.load(reader)?;
                Ok(Value::new(ValueKind::Group(group), source))
            }
            (SchemaKind::List(schema), Some('[')) => {
                let element = schema.element();
                let list = load_list_with(reader, |reader| element.load_value(reader))?;
                Ok(Value::new(ValueKind::List(list), source))
            }
            _ => Value::load(reader),
        }
    }
}

fn check_range(
    n: f64,
    min: Option<f64>,
    max: Option<f64>,
    source: &SourceInfo,
    result: &mut ValidationResult,
) -> bool {
    let mut valid = true;
    if let Some(min) = min {
        if n < min {
            result.add_error(
                DiagnosticKind::OutOfRange,
                source,
                format!("Numeric value {} is too low. Min: {}", n, min),
            );
            valid = false;
        }
    }
    if let Some(max) = max {
        if n > max {
            result.add_error(
                DiagnosticKind::OutOfRange,
                source,
                format!("Numeric value {} is too high. Max: {}", n, max),
            );
            valid = false;
        }
    }
    valid
}

fn check_allowed(s: &str, allowed: &[String], source: &SourceInfo, result: &mut ValidationResult) -> bool {
    if allowed.is_empty() || allowed.iter().any(|a| a == s) {
        return true;
    }
    result.add_error(
        DiagnosticKind::InvalidString,
        source,
        format!(
            "\"{}\" is not a valid String value. Must be in [{}]",
            s,
            quoted_list(allowed.iter().map(String::as_str))
        ),
    );
    false
}

/// `"a", "b", "c"`
pub(crate) fn quoted_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Lists ─────────────────────────────────────────────────

/// Homogeneous list with optional length bounds
#[derive(Debug, Clone)]
pub struct SchemaList {
    element: SchemaValue,
    min_len: Option<usize>,
    max_len: Option<usize>,
}

impl SchemaList {
    pub fn new(element: SchemaValue) -> Self {
        SchemaList {
            element,
            min_len: None,
            max_len: None,
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = Some(min_len);
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn element(&self) -> &SchemaValue {
        &self.element
    }

    pub fn min_len(&self) -> Option<usize> {
        self.min_len
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    /// Length bounds and every element are checked; nothing short-circuits
    fn check(&self, items: &List, source: &SourceInfo, strict: bool, result: &mut ValidationResult) -> bool {
        let mut valid = true;

        if let Some(min) = self.min_len {
            if items.len() < min {
                result.add_error(
                    DiagnosticKind::ListLength,
                    source,
                    format!("List size is too small: Min {} actual {}", min, items.len()),
                );
                valid = false;
            }
        }
        if let Some(max) = self.max_len {
            if items.len() > max {
                result.add_error(
                    DiagnosticKind::ListLength,
                    source,
                    format!("List size is too big: Max {} actual {}", max, items.len()),
                );
                valid = false;
            }
        }

        for item in items {
            if !self.element.check(item, strict, result) {
                valid = false;
            }
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_value};

    fn value(text: &str) -> Value {
        parse_value("test.json", text).expect("test input should parse")
    }

    fn passes(schema: &SchemaValue, text: &str) -> bool {
        schema.validate(&value(text), true).is_valid()
    }

    // ── Numeric ────────────────────────────────────────

    #[test]
    fn test_numeric_bounds_inclusive() {
        let color = SchemaValue::range(0.0, 255.0);
        assert!(!passes(&color, "-1"));
        assert!(passes(&color, "0"));
        assert!(passes(&color, "255"));
        assert!(!passes(&color, "256"));
    }

    #[test]
    fn test_numeric_diagnostics_name_bound() {
        let color = SchemaValue::range(0.0, 255.0);
        let low = color.validate(&value("-1"), false);
        assert!(low.diagnostics[0].message.contains("too low. Min: 0"));
        assert_eq!(low.diagnostics[0].kind, DiagnosticKind::OutOfRange);
        let high = color.validate(&value("300"), false);
        assert!(high.diagnostics[0].message.contains("too high. Max: 255"));
    }

    #[test]
    fn test_numeric_half_open() {
        assert!(passes(&SchemaValue::non_negative(), "1000000"));
        assert!(!passes(&SchemaValue::non_negative(), "-0.5"));
        assert!(passes(&SchemaValue::non_positive(), "-7"));
        assert!(!passes(&SchemaValue::non_positive(), "0.1"));
        assert!(passes(&SchemaValue::any_number(), "-99999.5"));
    }

    // ── String ─────────────────────────────────────────

    #[test]
    fn test_string_allow_list() {
        let mode = SchemaValue::one_of(["orbit", "physics"]);
        assert!(passes(&mode, r#""orbit""#));
        assert!(!passes(&mode, r#""Orbit""#));

        let result = mode.validate(&value(r#""static""#), true);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::InvalidString);
        assert!(result.diagnostics[0].message.contains(r#"["orbit", "physics"]"#));
    }

    #[test]
    fn test_empty_allow_list_accepts_anything() {
        assert!(passes(&SchemaValue::any_string(), r#""whatever""#));
        let empty: [&str; 0] = [];
        assert!(passes(&SchemaValue::one_of(empty), r#""x""#));
    }

    // ── Boolean ────────────────────────────────────────

    #[test]
    fn test_boolean_accepts_either_value() {
        let schema = SchemaValue::any_bool();
        assert!(schema.validate(&Value::from(true), true).is_valid());
        assert!(schema.validate(&Value::from(false), true).is_valid());
        assert!(!passes(&schema, "1"));
    }

    // ── Type mismatch ──────────────────────────────────

    #[test]
    fn test_type_mismatch_short_circuits() {
        let schema = SchemaValue::list(SchemaList::new(SchemaValue::range(0.0, 1.0)));
        let result = schema.validate(&value(r#""not a list""#), true);
        assert!(!result.is_valid());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::TypeMismatch);
        assert!(result.diagnostics[0].message.contains("expecting List got String"));
    }

    #[test]
    fn test_unknown_value_never_matches() {
        let result = SchemaValue::any_string().validate(&Value::default(), false);
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::TypeMismatch));
    }

    // ── Lists ──────────────────────────────────────────

    #[test]
    fn test_list_length_bounds() {
        let schema = SchemaValue::list(
            SchemaList::new(SchemaValue::non_negative())
                .with_min_len(1)
                .with_max_len(3),
        );
        assert!(!passes(&schema, "[]"));
        assert!(passes(&schema, "[1, 2]"));
        assert!(!passes(&schema, "[1, 2, 3, 4]"));
    }

    #[test]
    fn test_list_bad_element_fails_whole_list() {
        let schema = SchemaValue::list(
            SchemaList::new(SchemaValue::non_negative())
                .with_min_len(1)
                .with_max_len(3),
        );
        assert!(!passes(&schema, "[1, -5, 2]"));
    }

    #[test]
    fn test_list_reports_every_bad_element() {
        let schema = SchemaValue::list(SchemaList::new(SchemaValue::range(0.0, 1.0)).with_max_len(2));
        let result = schema.validate(&value("[5, 0.5, -1]"), true);
        assert!(!result.is_valid());
        // one length problem plus two element problems
        assert_eq!(result.errors().len(), 3);
        assert!(result.has(DiagnosticKind::ListLength));
    }

    // ── Sharing ────────────────────────────────────────

    #[test]
    fn test_singletons_are_shared() {
        assert!(SchemaValue::any_number().ptr_eq(&SchemaValue::any_number()));
        assert!(SchemaValue::any_bool().ptr_eq(&SchemaValue::any_bool()));
        assert!(!SchemaValue::any_number().ptr_eq(&SchemaValue::numeric(None, None)));
    }

    #[test]
    fn test_schema_reused_across_documents() {
        let schema = SchemaValue::group(
            SchemaGroup::new().required("x", SchemaValue::range(0.0, 10.0)),
        );
        let good = parse("a.json", r#"{"x": 3}"#).unwrap();
        let bad = parse("b.json", r#"{"x": 30}"#).unwrap();
        assert!(schema.validate_group(&good, true).is_valid());
        let result = schema.validate_group(&bad, true);
        assert!(!result.is_valid());
        assert_eq!(result.diagnostics[0].location.origin, "b.json");
        assert!(schema.validate_group(&good, true).is_valid());
    }

    #[test]
    fn test_validate_group_against_scalar_schema() {
        let group = parse("a.json", "{}").unwrap();
        let result = SchemaValue::any_number().validate_group(&group, false);
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::TypeMismatch));
    }

    // ── Schema-directed loading ────────────────────────

    #[test]
    fn test_load_value_reads_booleans() {
        let mut reader = Reader::new("test.json", "true");
        let value = SchemaValue::any_bool().load_value(&mut reader).unwrap();
        assert_eq!(value.as_bool(), Some(true));
    }

    #[test]
    fn test_load_value_boolean_schema_falls_back_on_other_input() {
        let mut reader = Reader::new("test.json", "12");
        let value = SchemaValue::any_bool().load_value(&mut reader).unwrap();
        assert_eq!(value.as_numeric(), Some(12.0));
        // the mismatch is left for validation
        assert!(!SchemaValue::any_bool().validate(&value, true).is_valid());
    }

    #[test]
    fn test_load_value_list_of_booleans() {
        let schema = SchemaValue::list(SchemaList::new(SchemaValue::any_bool()));
        let mut reader = Reader::new("test.json", "[true, false, true,]");
        let value = schema.load_value(&mut reader).unwrap();
        let flags: Vec<bool> = value
            .as_list()
            .unwrap()
            .iter()
            .filter_map(Value::as_bool)
            .collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_load_value_boolean_typo_is_syntax_error() {
        let mut reader = Reader::new("test.json", "ture");
        assert!(SchemaValue::any_bool().load_value(&mut reader).is_err());
        assert!(!reader.is_valid());
    }
}
