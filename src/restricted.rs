//! Restricted mode gate: constrains add/remove to the element kinds present
//! in the source template.
//!
//! Active when an authoring session derives from a template rather than the
//! blank starting point. The gate holds the immutable kind palette captured
//! at hydration time, plus the original per-kind properties so removed
//! template elements can be restored (never duplicated, never novel).

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{ElementKind, ElementProps};

/// Immutable template-derived kind palette.
///
/// Template slots are singular per kind: `select` on a kind that already has
/// a canvas instance re-selects it instead of duplicating. This is the
/// documented contract; richer multi-slot templates would need explicit slot
/// ids.
#[derive(Debug, Clone)]
pub struct RestrictedGate {
    kinds: Vec<ElementKind>,
    defaults: BTreeMap<ElementKind, ElementProps>,
}

impl RestrictedGate {
    /// Build a gate from the template's kinds, in palette order.
    ///
    /// `defaults` carries the properties each kind was originally
    /// instantiated with; kinds without an entry fall back to catalog
    /// defaults on restore.
    pub fn new(
        kinds: impl IntoIterator<Item = ElementKind>,
        defaults: BTreeMap<ElementKind, ElementProps>,
    ) -> Self {
        let mut seen = Vec::new();
        for kind in kinds {
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        Self {
            kinds: seen,
            defaults,
        }
    }

    /// Whether `kind` may be added: true only for template kinds.
    pub fn can_add(&self, kind: ElementKind) -> bool {
        let allowed = self.kinds.contains(&kind);
        if !allowed {
            debug!(%kind, "restricted mode rejected non-template kind");
        }
        allowed
    }

    /// The template's kind palette in order.
    pub fn template_kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    /// Properties to instantiate `kind` with when restoring a removed
    /// template element.
    pub fn restore_props(&self, kind: ElementKind) -> ElementProps {
        self.defaults
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ElementProps::defaults(kind))
    }
}
