//! Path-addressed structural validation for composition and template
//! definitions.
//!
//! Validation collects every problem instead of stopping at the first, and
//! each error carries the JSON path it was found at (`$.elements[2].id`).

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::catalog::ElementKind;
use crate::foundation::core::{MAX_SEQUENCE_STEPS, MAX_STEP_ELEMENTS};
use crate::scene::model::{CompositionDef, TemplateDef};

/// One element of a schema error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPathElem {
    /// Named field.
    Field(&'static str),
    /// Array index.
    Index(usize),
}

/// A single structural validation failure.
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Path from the document root to the offending value.
    pub path: Vec<SchemaPathElem>,
    /// Human-readable description.
    pub message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// All failures found while validating one document.
#[derive(Debug, Clone)]
pub struct SchemaErrors {
    /// Collected failures, in document order.
    pub errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// Validate a composition definition.
///
/// Checks element id uniqueness, per-kind property bounds, and every step
/// sequence invariant: 1..=2 members per step, kind-distinct members, each id
/// referenced at most once across the sequence, every referenced id present,
/// and the overall sequence length cap.
pub fn validate_composition(def: &CompositionDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    let mut ids = HashSet::<&str>::new();
    let mut kind_by_id = HashMap::<&str, ElementKind>::new();
    for (i, el) in def.elements.iter().enumerate() {
        let path = [
            SchemaPathElem::Field("elements"),
            SchemaPathElem::Index(i),
        ];
        if el.id.trim().is_empty() {
            errors.push(SchemaError::at(&path, "element id must be non-empty"));
        } else if !ids.insert(&el.id) {
            errors.push(SchemaError::at(
                &path,
                format!("duplicate element id \"{}\"", el.id),
            ));
        }
        kind_by_id.insert(&el.id, el.kind());
        if let Err(e) = el.props.validate() {
            errors.push(SchemaError::at(&path, e.to_string()));
        }
    }

    if def.step_sequence.len() > MAX_SEQUENCE_STEPS {
        errors.push(SchemaError::at(
            &[SchemaPathElem::Field("step_sequence")],
            format!("step_sequence must have at most {MAX_SEQUENCE_STEPS} steps"),
        ));
    }

    let mut sequenced = HashSet::<&str>::new();
    for (i, step) in def.step_sequence.iter().enumerate() {
        let path = [
            SchemaPathElem::Field("step_sequence"),
            SchemaPathElem::Index(i),
        ];
        if step.is_empty() || step.len() > MAX_STEP_ELEMENTS {
            errors.push(SchemaError::at(
                &path,
                format!("step must have 1..={MAX_STEP_ELEMENTS} members"),
            ));
        }
        let mut kinds_in_step = HashSet::<ElementKind>::new();
        for (j, id) in step.iter().enumerate() {
            let path = [
                SchemaPathElem::Field("step_sequence"),
                SchemaPathElem::Index(i),
                SchemaPathElem::Index(j),
            ];
            match kind_by_id.get(id.as_str()) {
                None => errors.push(SchemaError::at(
                    &path,
                    format!("step references unknown element id \"{id}\""),
                )),
                Some(kind) => {
                    if !kinds_in_step.insert(*kind) {
                        errors.push(SchemaError::at(
                            &path,
                            format!("step contains two elements of kind \"{kind}\""),
                        ));
                    }
                }
            }
            if !sequenced.insert(id) {
                errors.push(SchemaError::at(
                    &path,
                    format!("element id \"{id}\" appears in more than one step"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

/// Validate a template definition.
///
/// Template kinds must be non-empty and distinct (template slots are singular
/// per kind), and every property override must target a declared kind and
/// agree with it.
pub fn validate_template(def: &TemplateDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    if def.default_element_kinds.is_empty() {
        errors.push(SchemaError::at(
            &[SchemaPathElem::Field("default_element_kinds")],
            "template must declare at least one element kind",
        ));
    }

    let mut seen = HashSet::<ElementKind>::new();
    for (i, kind) in def.default_element_kinds.iter().enumerate() {
        if !seen.insert(*kind) {
            errors.push(SchemaError::at(
                &[
                    SchemaPathElem::Field("default_element_kinds"),
                    SchemaPathElem::Index(i),
                ],
                format!("duplicate template kind \"{kind}\""),
            ));
        }
    }

    for (kind, props) in &def.props_overrides {
        let path = [SchemaPathElem::Field("props_overrides")];
        if !seen.contains(kind) {
            errors.push(SchemaError::at(
                &path,
                format!("override targets kind \"{kind}\" not declared by the template"),
            ));
        }
        if props.kind() != *kind {
            errors.push(SchemaError::at(
                &path,
                format!(
                    "override for kind \"{kind}\" carries \"{}\" properties",
                    props.kind()
                ),
            ));
        } else if let Err(e) = props.validate() {
            errors.push(SchemaError::at(&path, e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}
