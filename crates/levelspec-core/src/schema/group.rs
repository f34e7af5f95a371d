//! Group and union schemas

use crate::diagnostic::DiagnosticKind;
use crate::error::ParseError;
use crate::parser::document::{Group, Value};
use crate::parser::load_group_with;
use crate::parser::reader::Reader;

use super::{quoted_list, SchemaValue, ValidationResult};

/// A declared field of a [`SchemaGroup`]
#[derive(Debug, Clone)]
pub struct SchemaField {
    name: String,
    required: bool,
    schema: SchemaValue,
}

impl SchemaField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn schema(&self) -> &SchemaValue {
        &self.schema
    }
}

/// Expected structure of a group: required and optional named fields
#[derive(Debug, Clone, Default)]
pub struct SchemaGroup {
    fields: Vec<SchemaField>,
    strictness: Option<bool>,
}

impl SchemaGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group that always validates with the given strictness, whatever the
    /// caller asks for
    pub fn with_strictness(strict: bool) -> Self {
        SchemaGroup {
            fields: Vec::new(),
            strictness: Some(strict),
        }
    }

    pub fn required(self, name: impl Into<String>, schema: SchemaValue) -> Self {
        self.declare(name.into(), true, schema)
    }

    pub fn optional(self, name: impl Into<String>, schema: SchemaValue) -> Self {
        self.declare(name.into(), false, schema)
    }

    fn declare(mut self, name: String, required: bool, schema: SchemaValue) -> Self {
        self.fields.push(SchemaField {
            name,
            required,
            schema,
        });
        self
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn strictness(&self) -> Option<bool> {
        self.strictness
    }

    pub fn validate(&self, group: &Group, strict: bool) -> ValidationResult {
        let mut result = ValidationResult::new();
        let valid = self.check(group, strict, &mut result);
        result.finish(valid)
    }

    pub(super) fn check(&self, group: &Group, strict: bool, result: &mut ValidationResult) -> bool {
        let strict = self.strictness.unwrap_or(strict);
        let mut valid = true;
        let mut leftover: Vec<&str> = group.field_names().collect();

        for declared in &self.fields {
            match group.get_field(&declared.name) {
                None => {
                    if declared.required {
                        result.add_error(
                            DiagnosticKind::MissingField,
                            group.source(),
                            format!("Group is missing field: {}", declared.name),
                        );
                        valid = false;
                    }
                }
                Some(field) => {
                    if !declared.schema.check(field.value(), strict, result) {
                        valid = false;
                    }
                    leftover.retain(|name| *name != declared.name);
                }
            }
        }

        if strict && !leftover.is_empty() {
            result.add_error(
                DiagnosticKind::ExtraFields,
                group.source(),
                format!("Group has extra fields: {}", leftover.join(", ")),
            );
            valid = false;
        }

        valid
    }

    /// Load a group, reading each declared field with its own schema
    pub fn load(&self, reader: &mut Reader) -> Result<Group, ParseError> {
        load_group_with(reader, |name, reader| match self.field(name) {
            Some(declared) => declared.schema.load_value(reader),
            None => Value::load(reader),
        })
    }
}

/// "Exactly N of these named fields, and nothing else"
#[derive(Debug, Clone)]
pub struct SchemaUnion {
    options: Vec<(String, SchemaValue)>,
    required_count: usize,
}

impl Default for SchemaUnion {
    fn default() -> Self {
        SchemaUnion {
            options: Vec::new(),
            required_count: 1,
        }
    }
}

impl SchemaUnion {
    /// A union requiring exactly one option
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required_count(required_count: usize) -> Self {
        SchemaUnion {
            options: Vec::new(),
            required_count,
        }
    }

    pub fn option(mut self, name: impl Into<String>, schema: SchemaValue) -> Self {
        self.options.push((name.into(), schema));
        self
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &SchemaValue)> {
        self.options.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn required_count(&self) -> usize {
        self.required_count
    }

    fn find(&self, name: &str) -> Option<&SchemaValue> {
        self.options
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, schema)| schema)
    }

    fn option_names(&self) -> String {
        quoted_list(self.options.iter().map(|(name, _)| name.as_str()))
    }

    pub fn validate(&self, group: &Group, strict: bool) -> ValidationResult {
        let mut result = ValidationResult::new();
        let valid = self.check(group, strict, &mut result);
        result.finish(valid)
    }

    pub(super) fn check(&self, group: &Group, strict: bool, result: &mut ValidationResult) -> bool {
        let mut valid = true;
        let mut selected = 0;

        for field in group.fields() {
            match self.find(field.name()) {
                None => {
                    result.add_error(
                        DiagnosticKind::UnexpectedField,
                        field.source(),
                        format!(
                            "Unexpected field \"{}\": must be one of [{}]",
                            field.name(),
                            self.option_names()
                        ),
                    );
                    valid = false;
                }
                Some(schema) => {
                    selected += 1;
                    if !schema.check(field.value(), strict, result) {
                        valid = false;
                    }
                }
            }
        }

        if selected != self.required_count {
            result.add_error(
                DiagnosticKind::UnionCount,
                group.source(),
                format!(
                    "Expected exactly {} of [{}] but found {}",
                    self.required_count,
                    self.option_names(),
                    selected
                ),
            );
            valid = false;
        }

        valid
    }

    /// Load a group, reading each option field with its own schema
    pub fn load(&self, reader: &mut Reader) -> Result<Group, ParseError> {
        load_group_with(reader, |name, reader| match self.find(name) {
            Some(schema) => schema.load_value(reader),
            None => Value::load(reader),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn group(text: &str) -> Group {
        parse("test.json", text).expect("test input should parse")
    }

    fn xy_schema() -> SchemaGroup {
        SchemaGroup::new()
            .required("x", SchemaValue::any_number())
            .optional("y", SchemaValue::any_number())
    }

    // ── Groups ─────────────────────────────────────────

    #[test]
    fn test_required_present() {
        let schema = xy_schema();
        assert!(schema.validate(&group(r#"{"x": 1}"#), true).is_valid());
        assert!(schema.validate(&group(r#"{"x": 1}"#), false).is_valid());
        assert!(schema.validate(&group(r#"{"x": 1, "y": 2}"#), true).is_valid());
    }

    #[test]
    fn test_extra_field_strictness() {
        let schema = xy_schema();
        let data = group(r#"{"x": 1, "z": 2}"#);

        let strict = schema.validate(&data, true);
        assert!(!strict.is_valid());
        assert!(strict.has(DiagnosticKind::ExtraFields));
        assert!(strict.diagnostics[0].message.contains("z"));

        let lenient = schema.validate(&data, false);
        assert!(lenient.is_valid());
        assert!(lenient.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let schema = xy_schema();
        for strict in [true, false] {
            let result = schema.validate(&group("{}"), strict);
            assert!(!result.is_valid());
            assert!(result.has(DiagnosticKind::MissingField));
            assert!(result.diagnostics[0].message.contains("missing field: x"));
        }
    }

    #[test]
    fn test_group_accumulates_all_problems() {
        let schema = SchemaGroup::new()
            .required("a", SchemaValue::range(0.0, 1.0))
            .required("b", SchemaValue::any_string())
            .required("c", SchemaValue::any_number());
        let result = schema.validate(&group(r#"{"a": 5, "b": 2, "extra": 1}"#), true);
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::OutOfRange));
        assert!(result.has(DiagnosticKind::TypeMismatch));
        assert!(result.has(DiagnosticKind::MissingField));
        assert!(result.has(DiagnosticKind::ExtraFields));
        assert_eq!(result.errors().len(), 4);
    }

    #[test]
    fn test_strictness_override() {
        let lenient = SchemaGroup::with_strictness(false).required("x", SchemaValue::any_number());
        assert!(lenient.validate(&group(r#"{"x": 1, "z": 2}"#), true).is_valid());

        let strict = SchemaGroup::with_strictness(true).required("x", SchemaValue::any_number());
        assert!(!strict.validate(&group(r#"{"x": 1, "z": 2}"#), false).is_valid());
    }

    #[test]
    fn test_strictness_propagates_to_children() {
        let schema = SchemaGroup::new().required("inner", SchemaValue::group(xy_schema()));
        let data = group(r#"{"inner": {"x": 1, "w": 0}}"#);
        assert!(!schema.validate(&data, true).is_valid());
        assert!(schema.validate(&data, false).is_valid());

        // an overriding parent forces its own mode onto its children
        let forced = SchemaGroup::with_strictness(true).required("inner", SchemaValue::group(xy_schema()));
        assert!(!forced.validate(&data, false).is_valid());
    }

    #[test]
    fn test_missing_field_reports_group_line() {
        let schema = xy_schema();
        let data = group("{\n\"outer\": 1,\n\"g\": {\n\"y\": 2}}");
        let inner = data.get("g").unwrap().as_group().unwrap();
        let result = schema.validate(inner, false);
        assert_eq!(result.diagnostics[0].location.line, 3);
    }

    // ── Unions ─────────────────────────────────────────

    fn scale_union() -> SchemaUnion {
        let fixed = SchemaValue::group(xy_schema());
        let ranged = SchemaValue::group(
            SchemaGroup::new()
                .required("min", SchemaValue::non_negative())
                .required("max", SchemaValue::non_negative()),
        );
        SchemaUnion::new().option("fixed", fixed).option("ranged", ranged)
    }

    #[test]
    fn test_union_exactly_one() {
        let schema = scale_union();
        assert!(schema.validate(&group(r#"{"fixed": {"x": 1}}"#), true).is_valid());
        assert!(schema.validate(&group(r#"{"ranged": {"min": 1, "max": 2}}"#), true).is_valid());
    }

    #[test]
    fn test_union_two_selected() {
        let result = scale_union().validate(
            &group(r#"{"fixed": {"x": 1}, "ranged": {"min": 1, "max": 2}}"#),
            true,
        );
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::UnionCount));
        assert!(result.diagnostics[0].message.contains("found 2"));
    }

    #[test]
    fn test_union_none_selected() {
        let result = scale_union().validate(&group("{}"), true);
        assert!(!result.is_valid());
        assert!(result.diagnostics[0].message.contains("found 0"));
    }

    #[test]
    fn test_union_unexpected_field() {
        let result = scale_union().validate(&group(r#"{"other": {"x": 1}}"#), false);
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::UnexpectedField));
        assert!(result.has(DiagnosticKind::UnionCount));
    }

    #[test]
    fn test_union_validates_selected_option() {
        let result = scale_union().validate(&group(r#"{"ranged": {"min": -1, "max": 2}}"#), true);
        assert!(!result.is_valid());
        assert!(result.has(DiagnosticKind::OutOfRange));
    }

    #[test]
    fn test_union_required_count() {
        let schema = SchemaUnion::with_required_count(2)
            .option("a", SchemaValue::any_number())
            .option("b", SchemaValue::any_number())
            .option("c", SchemaValue::any_number());
        assert!(schema.validate(&group(r#"{"a": 1, "c": 2}"#), true).is_valid());
        assert!(!schema.validate(&group(r#"{"a": 1}"#), true).is_valid());
        assert!(!schema.validate(&group(r#"{"a": 1, "b": 2, "c": 3}"#), true).is_valid());
    }

    #[test]
    fn test_union_as_value() {
        let schema = SchemaValue::union(scale_union());
        let data = group(r#"{"scale": {"fixed": {"x": 2, "y": 3}}}"#);
        assert!(schema.validate(data.get("scale").unwrap(), true).is_valid());
        assert!(!schema.validate(&crate::parser::document::Value::from(1.0), true).is_valid());
    }

    // ── Schema-directed loading ────────────────────────

    #[test]
    fn test_group_load_reads_declared_booleans() {
        let schema = SchemaGroup::new()
            .required("canMove", SchemaValue::any_bool())
            .required("mass", SchemaValue::non_negative());
        let mut reader = Reader::new("test.json", r#"{"canMove": false, "mass": 3, "note": "hi"}"#);
        let data = schema.load(&mut reader).unwrap();
        assert_eq!(data.get("canMove").unwrap().as_bool(), Some(false));
        assert_eq!(data.get("note").unwrap().as_str(), Some("hi"));
        assert!(schema.validate(&data, false).is_valid());
    }

    #[test]
    fn test_group_load_undeclared_boolean_still_rejected() {
        let schema = SchemaGroup::new().required("mass", SchemaValue::non_negative());
        let mut reader = Reader::new("test.json", r#"{"mass": 3, "flag": true}"#);
        assert!(schema.load(&mut reader).is_err());
    }

    #[test]
    fn test_union_load_reads_option_booleans() {
        let schema = SchemaUnion::new()
            .option("enabled", SchemaValue::any_bool())
            .option("ratio", SchemaValue::range(0.0, 1.0));
        let mut reader = Reader::new("test.json", r#"{"enabled": true}"#);
        let data = schema.load(&mut reader).unwrap();
        assert_eq!(data.get("enabled").unwrap().as_bool(), Some(true));
        assert!(schema.validate(&data, true).is_valid());
    }
}
