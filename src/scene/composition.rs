//! Boundary objects for compositions and templates: JSON parsing,
//! serialization, and schema validation at the persistence seam.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::foundation::error::{WishreelError, WishreelResult};
use crate::scene::model::{CompositionDef, TemplateDef};
use crate::schema::validate::{validate_composition, validate_template};

/// Composition boundary object.
///
/// This is the JSON-facing representation handed to and from the persistence
/// adapter. It is validated before being loaded into a
/// [`crate::session::composer::ComposerSession`]. This boundary is the only
/// place hard errors surface; in-memory engine operations never fail.
#[derive(Debug, Clone)]
pub struct Composition {
    def: CompositionDef,
}

impl Composition {
    /// Parse a composition from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WishreelResult<Self> {
        let def: CompositionDef = serde_json::from_reader(r)
            .map_err(|e| WishreelError::serde(format!("parse composition JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a composition from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WishreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WishreelError::serde(format!("open composition JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize the composition as pretty JSON into a writer.
    pub fn to_writer<W: std::io::Write>(&self, w: W) -> WishreelResult<()> {
        serde_json::to_writer_pretty(w, &self.def)
            .map_err(|e| WishreelError::serde(format!("write composition JSON: {e}")))
    }

    /// Serialize the composition as pretty JSON into a file on disk.
    pub fn to_path(&self, path: impl AsRef<Path>) -> WishreelResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            WishreelError::serde(format!("create composition JSON '{}': {e}", path.display()))
        })?;
        self.to_writer(BufWriter::new(f))
    }

    /// Validate the composition against the structural schema.
    pub fn validate(&self) -> WishreelResult<()> {
        validate_composition(&self.def)
            .map_err(|e| WishreelError::validation(format!("composition schema: {e}")))
    }

    /// Wrap an already-built definition.
    pub fn from_def(def: CompositionDef) -> Self {
        Self { def }
    }

    /// Borrow the underlying definition.
    pub fn def(&self) -> &CompositionDef {
        &self.def
    }

    /// Take the underlying definition.
    pub fn into_def(self) -> CompositionDef {
        self.def
    }
}

/// Template boundary object, same seam as [`Composition`].
#[derive(Debug, Clone)]
pub struct Template {
    def: TemplateDef,
}

impl Template {
    /// Parse a template from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WishreelResult<Self> {
        let def: TemplateDef = serde_json::from_reader(r)
            .map_err(|e| WishreelError::serde(format!("parse template JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a template from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WishreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WishreelError::serde(format!("open template JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate the template against the structural schema.
    pub fn validate(&self) -> WishreelResult<()> {
        validate_template(&self.def)
            .map_err(|e| WishreelError::template(format!("template schema: {e}")))
    }

    /// Wrap an already-built definition.
    pub fn from_def(def: TemplateDef) -> Self {
        Self { def }
    }

    /// Borrow the underlying definition.
    pub fn def(&self) -> &TemplateDef {
        &self.def
    }
}
