//! Serde wire definitions for compositions and templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ElementKind, ElementProps};

/// Wire form of one placed element.
///
/// `props` is flattened, so the serialized shape is
/// `{"id", "kind", "props", "order"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    /// Unique id within the composition.
    pub id: String,
    /// Kind tag plus the per-kind property set.
    #[serde(flatten)]
    pub props: ElementProps,
    /// Insertion index (display/z-order hint).
    #[serde(default)]
    pub order: usize,
}

impl ElementDef {
    /// The element's kind, derived from its property set.
    pub fn kind(&self) -> ElementKind {
        self.props.kind()
    }
}

/// Wire form of a whole composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionDef {
    /// Ordered element instances.
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    /// Step sequence: each inner array is one step, each string an element id
    /// referenced in `elements`.
    #[serde(default)]
    pub step_sequence: Vec<Vec<String>>,
}

/// Wire form of a template a composition can be instantiated from.
///
/// Templates reference element *kinds*, not instance ids. An optional step
/// sequence may reference those kinds directly or carry legacy instance-id
/// patterns (`balloons-1`); hydration re-resolves both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Human-readable template name.
    #[serde(default)]
    pub name: String,
    /// Kinds to instantiate, in canvas order. One instance per kind.
    pub default_element_kinds: Vec<ElementKind>,
    /// Optional step sequence over kind names or legacy instance ids.
    #[serde(default)]
    pub step_sequence: Option<Vec<Vec<String>>>,
    /// Per-kind property overrides applied instead of catalog defaults.
    #[serde(default)]
    pub props_overrides: BTreeMap<ElementKind, ElementProps>,
}
