//! Built-in schemas for level files
//!
//! Each schema is built once, on first use, and shared for the life of the
//! process. The "fixed x/y" and "range" fragments are referenced from more
//! than one union without being copied.

use once_cell::sync::Lazy;

use crate::error::{Error, ParseError, Result};
use crate::file::DocumentFile;
use crate::parser::document::Group;
use crate::parser::reader::Reader;
use crate::schema::{SchemaGroup, SchemaList, SchemaUnion, SchemaValue, ValidationResult};

/// A named root schema for a whole document
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    root: SchemaValue,
}

impl Schema {
    pub fn new(name: impl Into<String>, root: SchemaGroup) -> Self {
        Schema {
            name: name.into(),
            root: SchemaValue::group(root),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root as a schema value, for embedding into other schemas
    pub fn root(&self) -> &SchemaValue {
        &self.root
    }

    /// Validate a document root
    ///
    /// `strict` decides whether undeclared fields are errors.
    pub fn validate(&self, group: &Group, strict: bool) -> ValidationResult {
        self.root.validate_group(group, strict)
    }

    pub fn validate_file(&self, file: &DocumentFile, strict: bool) -> ValidationResult {
        self.validate(file.root(), strict)
    }

    /// Parse a whole document with this schema steering the reader
    pub fn load(&self, reader: &mut Reader) -> std::result::Result<Group, ParseError> {
        let value = self.root.load_value(reader)?;
        let found = value.value_type();
        match value.into_group() {
            Some(group) => Ok(group),
            None => Err(reader.error(format!(
                "Expected a group at document root got {}",
                found
            ))),
        }
    }
}

// ── Shared fragments ──────────────────────────────────────

/// `{"x": n, "y": n}`
static FIXED_XY: Lazy<SchemaValue> = Lazy::new(|| {
    SchemaValue::group(
        SchemaGroup::new()
            .required("x", SchemaValue::any_number())
            .required("y", SchemaValue::any_number()),
    )
});

/// Min/max extents plus optional image flags
static RANGE: Lazy<SchemaValue> = Lazy::new(|| {
    SchemaValue::group(
        SchemaGroup::new()
            .optional("preserveAR", SchemaValue::any_bool())
            .optional("allowHFlip", SchemaValue::any_bool())
            .optional("allowVFlip", SchemaValue::any_bool())
            .required("minx", SchemaValue::non_negative())
            .required("miny", SchemaValue::non_negative())
            .required("maxx", SchemaValue::non_negative())
            .required("maxy", SchemaValue::non_negative()),
    )
});

// ── Document schemas ──────────────────────────────────────

static ENTITY: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "entity",
        SchemaGroup::new()
            .required("name", SchemaValue::any_string())
            .required("gfx", SchemaValue::any_string())
            .required("x", SchemaValue::any_number())
            .required("y", SchemaValue::any_number())
            .required("vx", SchemaValue::any_number())
            .required("vy", SchemaValue::any_number())
            .required("mass", SchemaValue::non_negative())
            .required("canMove", SchemaValue::any_bool())
            .required("hasGravity", SchemaValue::any_bool())
            .optional("gravityRange", SchemaValue::non_negative()),
    )
});

static BACKGROUND: Lazy<Schema> = Lazy::new(|| {
    let scale = SchemaUnion::new()
        .option("fixed", FIXED_XY.clone())
        .option("ranged", RANGE.clone());

    let positioning = SchemaUnion::new()
        .option(
            "random",
            SchemaValue::group(SchemaGroup::new().required("density", SchemaValue::range(0.0, 1.0))),
        )
        .option("fixedSpacing", FIXED_XY.clone())
        .option("rangedSpacing", RANGE.clone());

    let element = SchemaGroup::new()
        .required("file", SchemaValue::any_string())
        .required("positioning", SchemaValue::union(positioning))
        .required("scale", SchemaValue::union(scale));

    let channel = SchemaValue::range(0.0, 255.0);
    let color = SchemaGroup::new()
        .required("red", channel.clone())
        .required("green", channel.clone())
        .required("blue", channel);

    Schema::new(
        "background",
        SchemaGroup::new()
            .required("color", SchemaValue::group(color))
            .required(
                "elements",
                SchemaValue::list(SchemaList::new(SchemaValue::group(element))),
            ),
    )
});

static ENVIRONMENT: Lazy<Schema> = Lazy::new(|| {
    let spawn = SchemaGroup::new()
        .required("x", SchemaValue::any_number())
        .required("y", SchemaValue::any_number());

    let win_zone = SchemaGroup::new()
        .required("top", SchemaValue::non_negative())
        .required("left", SchemaValue::non_negative())
        .required("width", SchemaValue::non_negative())
        .required("height", SchemaValue::non_negative());

    Schema::new(
        "environment",
        SchemaGroup::new()
            .required("name", SchemaValue::any_string())
            .required("width", SchemaValue::non_negative())
            .required("height", SchemaValue::non_negative())
            .required("background", BACKGROUND.root().clone())
            .required("winZone", SchemaValue::group(win_zone))
            .required("playerSpawn", SchemaValue::group(spawn))
            .required(
                "entities",
                SchemaValue::list(SchemaList::new(ENTITY.root().clone())),
            ),
    )
});

/// Schema for a single entity
pub fn entity() -> &'static Schema {
    &ENTITY
}

/// Schema for a background description
pub fn background() -> &'static Schema {
    &BACKGROUND
}

/// Schema for a whole level (environment) file
pub fn environment() -> &'static Schema {
    &ENVIRONMENT
}

/// Names accepted by [`by_name`]
pub const NAMES: [&str; 3] = ["environment", "entity", "background"];

/// Look up a built-in schema
pub fn by_name(name: &str) -> Result<&'static Schema> {
    match name {
        "environment" => Ok(environment()),
        "entity" => Ok(entity()),
        "background" => Ok(background()),
        other => Err(Error::UnknownSchema(other.to_string())),
    }
}
