//! Canvas element store: the ordered collection of element instances placed
//! on the composition surface, plus the current selection.
//!
//! All mutations are synchronous and atomic; rejected operations are silent
//! no-ops so the authoring surface never crashes mid-edit. The selection
//! holds ids only, so there is no separate copy of element state to drift
//! out of sync when properties change.

use tracing::debug;

use crate::catalog::{ElementKind, ElementProps};
use crate::foundation::core::IdMinter;
use crate::scene::model::ElementDef;

/// One placed instance of a catalog kind on the composition surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Unique id within the composition.
    pub id: String,
    /// Per-kind property set.
    pub props: ElementProps,
    /// Insertion index (display/z-order hint).
    pub order: usize,
}

impl Element {
    /// The element's kind.
    pub fn kind(&self) -> ElementKind {
        self.props.kind()
    }
}

/// Ordered element instances plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct CanvasStore {
    elements: Vec<Element>,
    selected: Vec<String>,
    minter: IdMinter,
}

impl CanvasStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from pre-existing (already validated) element defs.
    pub fn from_defs(defs: &[ElementDef]) -> Self {
        let mut store = Self::new();
        for def in defs {
            store.elements.push(Element {
                id: def.id.clone(),
                props: def.props.clone(),
                order: store.elements.len(),
            });
        }
        store
    }

    /// Instantiate a new element with the given properties.
    ///
    /// Invalid properties are a silent no-op. The new element becomes the
    /// sole selection. Returns the minted id.
    pub fn add_element(&mut self, props: ElementProps) -> Option<String> {
        if props.validate().is_err() {
            debug!(kind = %props.kind(), "rejected add_element: invalid properties");
            return None;
        }
        let id = self.insert(props);
        self.selected = vec![id.clone()];
        Some(id)
    }

    /// Add a new instance of a kind and append it to the selection.
    ///
    /// This is the unrestricted-mode `select` semantic: selecting a palette
    /// entry always creates another canvas instance of that kind.
    pub fn select_instance(&mut self, props: ElementProps) -> Option<String> {
        if props.validate().is_err() {
            debug!(kind = %props.kind(), "rejected select_instance: invalid properties");
            return None;
        }
        let id = self.insert(props);
        self.selected.push(id.clone());
        Some(id)
    }

    fn insert(&mut self, props: ElementProps) -> String {
        let kind = props.kind();
        let id = self
            .minter
            .mint_unused(kind.as_str(), |candidate| {
                self.elements.iter().any(|e| e.id == candidate)
            });
        let order = self.elements.len();
        debug!(%id, %kind, order, "element added");
        self.elements.push(Element { id: id.clone(), props, order });
        id
    }

    /// Replace the property map for the element with `id`.
    ///
    /// No-op if the element does not exist, if the new properties change the
    /// element's kind, or if they fail validation. Returns whether anything
    /// changed.
    pub fn update_element_props(&mut self, id: &str, props: ElementProps) -> bool {
        let Some(el) = self.elements.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if props.kind() != el.kind() {
            debug!(%id, "rejected update: kind change");
            return false;
        }
        if props.validate().is_err() {
            debug!(%id, "rejected update: invalid properties");
            return false;
        }
        el.props = props;
        true
    }

    /// Remove the element with `id` from the store and the selection.
    ///
    /// Returns whether an element was removed. Cascading cleanup of the step
    /// sequence is the caller's half of the operation (see
    /// [`crate::sequence::StepSequence::remove_element`]).
    pub fn delete_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() == before {
            return false;
        }
        self.selected.retain(|s| s != id);
        debug!(%id, "element deleted");
        true
    }

    /// Remove the most recently added instance of `kind`.
    ///
    /// This is the unrestricted-mode `unselect` semantic. Returns the removed
    /// id so the caller can cascade into the step sequence.
    pub fn unselect_instance(&mut self, kind: ElementKind) -> Option<String> {
        let id = self
            .elements
            .iter()
            .rev()
            .find(|e| e.kind() == kind)
            .map(|e| e.id.clone())?;
        self.delete_element(&id);
        Some(id)
    }

    /// Replace the selection with exactly `id`, if it exists on the canvas.
    pub fn set_selection(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selected = vec![id.to_owned()];
        true
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Currently selected ids, oldest first.
    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    /// Look up an element by id.
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Whether an element with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The first instance of `kind` in insertion order, if any.
    pub fn first_of_kind(&self, kind: ElementKind) -> Option<&Element> {
        self.elements.iter().find(|e| e.kind() == kind)
    }

    /// Number of elements on the canvas.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the canvas is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Wire form of the elements.
    pub fn to_defs(&self) -> Vec<ElementDef> {
        self.elements
            .iter()
            .map(|e| ElementDef {
                id: e.id.clone(),
                props: e.props.clone(),
                order: e.order,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_element_mints_unique_ids_and_selects() {
        let mut store = CanvasStore::new();
        let a = store
            .add_element(ElementProps::defaults(ElementKind::Balloons))
            .unwrap();
        let b = store
            .add_element(ElementProps::defaults(ElementKind::Balloons))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        // add replaces the selection wholesale
        assert_eq!(store.selected_ids(), [b.clone()]);
        assert_eq!(store.get(&b).unwrap().order, 1);
    }

    #[test]
    fn add_element_rejects_invalid_props() {
        let mut store = CanvasStore::new();
        let bad = ElementProps::Balloons {
            count: 0,
            images: Vec::new(),
            color: "#fff".into(),
        };
        assert!(store.add_element(bad).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn select_instance_accumulates_selection() {
        let mut store = CanvasStore::new();
        let a = store
            .select_instance(ElementProps::defaults(ElementKind::Text))
            .unwrap();
        let b = store
            .select_instance(ElementProps::defaults(ElementKind::Text))
            .unwrap();
        assert_eq!(store.selected_ids(), [a, b]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unselect_instance_removes_most_recent_of_kind() {
        let mut store = CanvasStore::new();
        let a = store
            .select_instance(ElementProps::defaults(ElementKind::Text))
            .unwrap();
        let b = store
            .select_instance(ElementProps::defaults(ElementKind::Text))
            .unwrap();
        let removed = store.unselect_instance(ElementKind::Text).unwrap();
        assert_eq!(removed, b);
        assert!(store.contains(&a));
        assert_eq!(store.selected_ids(), [a]);
        assert!(store.unselect_instance(ElementKind::Quiz).is_none());
    }

    #[test]
    fn update_keeps_kind_and_validates() {
        let mut store = CanvasStore::new();
        let id = store
            .add_element(ElementProps::defaults(ElementKind::Text))
            .unwrap();

        let updated = ElementProps::Text {
            content: "new".into(),
            size_px: 18.0,
            color: None,
            animated: false,
        };
        assert!(store.update_element_props(&id, updated));
        assert!(matches!(
            &store.get(&id).unwrap().props,
            ElementProps::Text { content, .. } if content == "new"
        ));

        // kind change rejected
        assert!(!store.update_element_props(&id, ElementProps::defaults(ElementKind::Quiz)));
        // unknown id rejected
        assert!(!store.update_element_props("ghost", ElementProps::defaults(ElementKind::Text)));
    }

    #[test]
    fn delete_removes_from_selection_too() {
        let mut store = CanvasStore::new();
        let id = store
            .add_element(ElementProps::defaults(ElementKind::Quiz))
            .unwrap();
        assert!(store.delete_element(&id));
        assert!(store.selected_ids().is_empty());
        assert!(!store.delete_element(&id));
    }

    #[test]
    fn from_defs_preserves_ids_and_minter_avoids_them() {
        let defs = vec![ElementDef {
            id: "text-1".into(),
            props: ElementProps::defaults(ElementKind::Text),
            order: 0,
        }];
        let mut store = CanvasStore::from_defs(&defs);
        let id = store
            .add_element(ElementProps::defaults(ElementKind::Text))
            .unwrap();
        assert_ne!(id, "text-1");
        assert_eq!(store.len(), 2);
    }
}
