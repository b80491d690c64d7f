//! Template-to-composition bridge.
//!
//! A template stores element *kinds*, not instance ids. Hydration is a
//! synchronous-once step: it expands each kind into a fresh element instance,
//! re-resolves the template's step sequence references to the newly minted
//! ids, and produces the fully-formed initial state an authoring session
//! starts from. Nothing is patched in incrementally afterwards, so early user
//! edits can never race template data.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::canvas::CanvasStore;
use crate::catalog::{ElementKind, ElementProps};
use crate::restricted::RestrictedGate;
use crate::scene::model::TemplateDef;
use crate::sequence::StepSequence;

/// Fully-formed initial state hydrated from a template.
#[derive(Debug, Clone)]
pub struct HydratedComposition {
    /// Canvas pre-populated with one instance per template kind.
    pub canvas: CanvasStore,
    /// Step sequence with references resolved to the minted instance ids.
    pub sequence: StepSequence,
    /// Gate constraining the session to the template's kind palette.
    pub gate: RestrictedGate,
}

/// Expand a template into a composition snapshot.
///
/// Each kind in `default_element_kinds` becomes one fresh element carrying
/// the template's property override for that kind (falling back to catalog
/// defaults; invalid overrides are ignored with a warning). Step sequence
/// entries may be kind names or legacy instance-id patterns (`text-2`); each
/// is re-resolved against the minted instances, exact id match first, then a
/// kind-name match. Unresolvable references are dropped.
pub fn hydrate(def: &TemplateDef) -> HydratedComposition {
    let mut canvas = CanvasStore::new();
    let mut gate_defaults = BTreeMap::new();

    let mut seen = Vec::new();
    for kind in &def.default_element_kinds {
        // template slots are singular per kind
        if seen.contains(kind) {
            warn!(%kind, "ignored duplicate template kind");
            continue;
        }
        seen.push(*kind);

        let props = match def.props_overrides.get(kind) {
            Some(p) if p.kind() == *kind && p.validate().is_ok() => p.clone(),
            Some(_) => {
                warn!(%kind, "ignored invalid template override");
                ElementProps::defaults(*kind)
            }
            None => ElementProps::defaults(*kind),
        };
        gate_defaults.insert(*kind, props.clone());
        canvas.add_element(props);
    }

    let sequence = match &def.step_sequence {
        Some(wire) => {
            let resolved: Vec<Vec<String>> = wire
                .iter()
                .map(|step| {
                    step.iter()
                        .filter_map(|r| resolve_ref(r, &canvas))
                        .collect()
                })
                .collect();
            StepSequence::from_wire(&resolved, canvas.elements())
        }
        None => StepSequence::new(),
    };

    debug!(
        template = %def.name,
        elements = canvas.len(),
        steps = sequence.len(),
        "template hydrated"
    );

    HydratedComposition {
        gate: RestrictedGate::new(seen, gate_defaults),
        canvas,
        sequence,
    }
}

// Resolve one template step reference to a minted instance id. Exact id
// match wins; otherwise the reference is read as a kind name, with a legacy
// `kind-N` pattern stripped down to its kind.
fn resolve_ref(reference: &str, canvas: &CanvasStore) -> Option<String> {
    if canvas.contains(reference) {
        return Some(reference.to_owned());
    }
    let kind = ElementKind::from_str(reference)
        .ok()
        .or_else(|| {
            let stem = reference.rsplit_once('-').map(|(stem, n)| {
                if n.chars().all(|c| c.is_ascii_digit()) {
                    stem
                } else {
                    reference
                }
            })?;
            ElementKind::from_str(stem).ok()
        })?;
    match canvas.first_of_kind(kind) {
        Some(el) => Some(el.id.clone()),
        None => {
            debug!(%reference, "dropped unresolvable template step reference");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(kinds: &[ElementKind], steps: Option<Vec<Vec<&str>>>) -> TemplateDef {
        TemplateDef {
            name: "birthday".to_owned(),
            default_element_kinds: kinds.to_vec(),
            step_sequence: steps.map(|s| {
                s.into_iter()
                    .map(|step| step.into_iter().map(str::to_owned).collect())
                    .collect()
            }),
            props_overrides: BTreeMap::new(),
        }
    }

    #[test]
    fn hydrate_mints_one_instance_per_kind() {
        let def = template(&[ElementKind::Balloons, ElementKind::Text], None);
        let hydrated = hydrate(&def);
        assert_eq!(hydrated.canvas.len(), 2);
        assert_eq!(
            hydrated.gate.template_kinds(),
            [ElementKind::Balloons, ElementKind::Text]
        );
        assert!(hydrated.sequence.is_empty());
    }

    #[test]
    fn hydrate_resolves_kind_name_references() {
        let def = template(
            &[ElementKind::Balloons, ElementKind::Text],
            Some(vec![vec!["balloons"], vec!["text"]]),
        );
        let hydrated = hydrate(&def);
        assert_eq!(hydrated.sequence.len(), 2);
        let first = &hydrated.sequence.steps()[0].members()[0];
        assert_eq!(
            hydrated.canvas.get(first).unwrap().kind(),
            ElementKind::Balloons
        );
    }

    #[test]
    fn hydrate_resolves_legacy_instance_id_references() {
        let def = template(
            &[ElementKind::Text, ElementKind::Quiz],
            Some(vec![vec!["text-7"], vec!["quiz-3"]]),
        );
        let hydrated = hydrate(&def);
        assert_eq!(hydrated.sequence.len(), 2);
        for (step, kind) in hydrated
            .sequence
            .steps()
            .iter()
            .zip([ElementKind::Text, ElementKind::Quiz])
        {
            let el = hydrated.canvas.get(&step.members()[0]).unwrap();
            assert_eq!(el.kind(), kind);
        }
    }

    #[test]
    fn hydrate_drops_unresolvable_references() {
        let def = template(
            &[ElementKind::Text],
            Some(vec![vec!["balloons"], vec!["text"], vec!["what-ever"]]),
        );
        let hydrated = hydrate(&def);
        assert_eq!(hydrated.sequence.len(), 1);
    }

    #[test]
    fn hydrate_applies_valid_overrides_and_ignores_invalid_ones() {
        let mut def = template(&[ElementKind::Text, ElementKind::Balloons], None);
        def.props_overrides.insert(
            ElementKind::Text,
            ElementProps::Text {
                content: "from template".into(),
                size_px: 20.0,
                color: None,
                animated: false,
            },
        );
        def.props_overrides.insert(
            ElementKind::Balloons,
            ElementProps::Balloons {
                count: 0, // invalid, falls back to defaults
                images: Vec::new(),
                color: "#fff".into(),
            },
        );
        let hydrated = hydrate(&def);
        let text = hydrated.canvas.first_of_kind(ElementKind::Text).unwrap();
        assert!(matches!(
            &text.props,
            ElementProps::Text { content, .. } if content == "from template"
        ));
        let balloons = hydrated.canvas.first_of_kind(ElementKind::Balloons).unwrap();
        assert_eq!(balloons.props, ElementProps::defaults(ElementKind::Balloons));
        // restore path keeps the template's original (valid) properties
        assert!(matches!(
            hydrated.gate.restore_props(ElementKind::Text),
            ElementProps::Text { content, .. } if content == "from template"
        ));
    }

    #[test]
    fn duplicate_template_kinds_collapse_to_one_instance() {
        let def = template(&[ElementKind::Text, ElementKind::Text], None);
        let hydrated = hydrate(&def);
        assert_eq!(hydrated.canvas.len(), 1);
    }
}
