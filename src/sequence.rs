//! Step sequence builder: the ordered multi-step reveal script.
//!
//! A step groups at most two kind-distinct elements into one presentation
//! beat. The sequence enforces its invariants by construction: every mutation
//! either preserves them or degrades to a no-op.

use tracing::debug;

use crate::canvas::{CanvasStore, Element};
use crate::foundation::core::{MAX_SEQUENCE_STEPS, MAX_STEP_ELEMENTS};

/// A group of at most [`MAX_STEP_ELEMENTS`] element ids revealed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    members: Vec<String>,
}

impl Step {
    fn singleton(id: impl Into<String>) -> Self {
        Self {
            members: vec![id.into()],
        }
    }

    /// Member ids in reveal order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// A step is never empty while it lives in a sequence.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member of this step.
    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// Ordered list of [`Step`]s defining playback order.
///
/// An element id appears in at most one step across the whole sequence;
/// elements not in any step are not shown during scripted playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSequence {
    steps: Vec<Step>,
}

impl StepSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence from wire form, preserving the wire's step grouping.
    ///
    /// Members that would break an invariant are dropped: unknown ids, ids
    /// already sequenced, members beyond the step size cap, kind collisions
    /// within a step. Steps left empty are skipped, and steps beyond the
    /// sequence cap are discarded.
    pub fn from_wire(wire: &[Vec<String>], elements: &[Element]) -> Self {
        let mut seq = Self::new();
        for step in wire {
            if seq.steps.len() >= MAX_SEQUENCE_STEPS {
                debug!("discarded wire steps beyond sequence cap");
                break;
            }
            let mut members = Vec::new();
            let mut kinds = Vec::new();
            for id in step {
                let Some(kind) = elements.iter().find(|e| &e.id == id).map(Element::kind) else {
                    debug!(%id, "dropped wire step member: unknown element");
                    continue;
                };
                if members.len() >= MAX_STEP_ELEMENTS
                    || kinds.contains(&kind)
                    || members.contains(id)
                    || seq.contains_id(id)
                {
                    debug!(%id, "dropped wire step member: invariant violation");
                    continue;
                }
                members.push(id.clone());
                kinds.push(kind);
            }
            if !members.is_empty() {
                seq.steps.push(Step { members });
            }
        }
        seq
    }

    /// Whether `id` could join `step` without breaking the invariants:
    /// rejected when the step is full, already contains `id`, or already
    /// contains an element of the same kind.
    pub fn can_combine(step: &Step, id: &str, canvas: &CanvasStore) -> bool {
        if step.len() >= MAX_STEP_ELEMENTS || step.contains(id) {
            return false;
        }
        let Some(kind) = canvas.get(id).map(Element::kind) else {
            return false;
        };
        !step
            .members
            .iter()
            .any(|m| canvas.get(m).is_some_and(|e| e.kind() == kind))
    }

    /// Add `id` to the sequence.
    ///
    /// If the tail step can absorb it (per [`StepSequence::can_combine`]) the
    /// two elements share one beat; otherwise a new trailing singleton step
    /// is appended. Combination only ever targets the tail step, which keeps
    /// the merge rule O(1) and unambiguous. No-ops: unknown id, id already
    /// sequenced, or a new step beyond the length cap.
    pub fn add(&mut self, id: &str, canvas: &CanvasStore) -> bool {
        if !canvas.contains(id) || self.contains_id(id) {
            return false;
        }
        if let Some(last) = self.steps.last()
            && Self::can_combine(last, id, canvas)
        {
            let idx = self.steps.len() - 1;
            self.steps[idx].members.push(id.to_owned());
            debug!(%id, step = idx, "merged into tail step");
            return true;
        }
        if self.steps.len() >= MAX_SEQUENCE_STEPS {
            debug!(%id, "rejected add: sequence at maximum length");
            return false;
        }
        self.steps.push(Step::singleton(id));
        debug!(%id, step = self.steps.len() - 1, "appended new step");
        true
    }

    /// Remove `id` from whichever step contains it.
    ///
    /// A step left empty is deleted and subsequent steps shift up (no gaps).
    /// Idempotent: removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let mut removed = false;
        for step in &mut self.steps {
            let before = step.members.len();
            step.members.retain(|m| m != id);
            removed |= step.members.len() != before;
        }
        if removed {
            self.steps.retain(|s| !s.is_empty());
            debug!(%id, "removed from sequence");
        }
        removed
    }

    /// Cascade hook for element deletion; same operation as
    /// [`StepSequence::remove`].
    pub fn remove_element(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    /// Move the step at `from` to position `to`, preserving every step's
    /// contents. Out-of-range indices are a no-op.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.steps.len() || to >= self.steps.len() {
            return false;
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        true
    }

    /// Reset to an empty sequence.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Replace the sequence wholesale with one singleton step per interactive
    /// element, in canvas insertion order (never auto-combines). Capped at
    /// [`MAX_SEQUENCE_STEPS`].
    pub fn auto_generate(&mut self, canvas: &CanvasStore) {
        self.steps = canvas
            .elements()
            .iter()
            .filter(|e| e.kind().is_interactive())
            .take(MAX_SEQUENCE_STEPS)
            .map(|e| Step::singleton(&e.id))
            .collect();
        debug!(steps = self.steps.len(), "auto-generated sequence");
    }

    /// Canvas elements not yet referenced by any step: the candidate pool for
    /// the next [`StepSequence::add`].
    pub fn available_elements<'a>(&self, canvas: &'a CanvasStore) -> Vec<&'a Element> {
        canvas
            .elements()
            .iter()
            .filter(|e| !self.contains_id(&e.id))
            .collect()
    }

    /// Append the first available (unsequenced) element as a new singleton
    /// step. No-op when nothing is available or the sequence is at the cap.
    pub fn add_next_step(&mut self, canvas: &CanvasStore) -> bool {
        if self.steps.len() >= MAX_SEQUENCE_STEPS {
            return false;
        }
        let Some(id) = self
            .available_elements(canvas)
            .first()
            .map(|e| e.id.clone())
        else {
            return false;
        };
        self.steps.push(Step::singleton(id));
        true
    }

    /// Steps in presentation order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether `id` is referenced by any step.
    pub fn contains_id(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.contains(id))
    }

    /// Index of the step containing `id`, if any.
    pub fn step_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.contains(id))
    }

    /// Wire form: one inner array of element ids per step.
    pub fn to_wire(&self) -> Vec<Vec<String>> {
        self.steps.iter().map(|s| s.members.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ElementKind, ElementProps};

    fn canvas_with(kinds: &[ElementKind]) -> (CanvasStore, Vec<String>) {
        let mut canvas = CanvasStore::new();
        let ids = kinds
            .iter()
            .map(|k| canvas.add_element(ElementProps::defaults(*k)).unwrap())
            .collect();
        (canvas, ids)
    }

    #[test]
    fn add_merges_compatible_kinds_into_tail_step() {
        let (canvas, ids) = canvas_with(&[
            ElementKind::Balloons,
            ElementKind::Text,
            ElementKind::Balloons,
        ]);
        let mut seq = StepSequence::new();
        assert!(seq.add(&ids[0], &canvas));
        // text merges with the trailing balloons step
        assert!(seq.add(&ids[1], &canvas));
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.steps()[0].len(), 2);
        // second balloons element collides on kind and opens a new step
        assert!(seq.add(&ids[2], &canvas));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.steps()[1].members(), [ids[2].clone()]);
    }

    #[test]
    fn add_rejects_duplicates_and_unknown_ids() {
        let (canvas, ids) = canvas_with(&[ElementKind::Text]);
        let mut seq = StepSequence::new();
        assert!(seq.add(&ids[0], &canvas));
        assert!(!seq.add(&ids[0], &canvas));
        assert!(!seq.add("ghost", &canvas));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn remove_is_idempotent_and_compacts() {
        let (canvas, ids) = canvas_with(&[
            ElementKind::Balloons,
            ElementKind::Text,
            ElementKind::Quiz,
        ]);
        let mut seq = StepSequence::new();
        for id in &ids {
            assert!(seq.add(id, &canvas));
        }
        // balloons+text merged, quiz alone
        assert_eq!(seq.len(), 2);

        assert!(seq.remove(&ids[0]));
        assert_eq!(seq.len(), 2, "singleton text step stays in place");
        assert!(seq.remove(&ids[1]));
        assert_eq!(seq.len(), 1, "emptied step is deleted and indices compact");
        assert_eq!(seq.step_of(&ids[2]), Some(0));

        assert!(!seq.remove(&ids[1]), "second removal is a no-op");
    }

    #[test]
    fn sequence_length_is_capped() {
        let kinds: Vec<ElementKind> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    ElementKind::Quiz
                } else {
                    ElementKind::Puzzle
                }
            })
            .collect();
        let (canvas, ids) = canvas_with(&kinds);
        let mut seq = StepSequence::new();
        // alternate kinds merge pairwise: 12 elements fill 6 steps, then the
        // cap bites when forcing fresh steps
        for id in &ids {
            seq.add(id, &canvas);
        }
        assert_eq!(seq.len(), 6);

        let (mut canvas2, _) = canvas_with(&[]);
        let mut more = Vec::new();
        for _ in 0..12 {
            more.push(
                canvas2
                    .add_element(ElementProps::defaults(ElementKind::Text))
                    .unwrap(),
            );
        }
        let mut seq2 = StepSequence::new();
        for id in &more {
            seq2.add(id, &canvas2);
        }
        // same-kind elements never merge, so the cap holds at 10
        assert_eq!(seq2.len(), MAX_SEQUENCE_STEPS);
        assert!(!seq2.add_next_step(&canvas2));
    }

    #[test]
    fn reorder_preserves_contents() {
        let (canvas, ids) = canvas_with(&[
            ElementKind::Balloons,
            ElementKind::Quiz,
            ElementKind::Puzzle,
        ]);
        let mut seq = StepSequence::new();
        for id in &ids {
            seq.add(id, &canvas);
        }
        // balloons+quiz share step 0 (step full), puzzle opens step 1
        assert_eq!(seq.len(), 2);
        assert!(seq.reorder(1, 0));
        assert!(seq.steps()[0].contains(&ids[2]));
        assert!(!seq.reorder(5, 0));
    }

    #[test]
    fn auto_generate_takes_interactive_elements_in_canvas_order() {
        let (canvas, ids) = canvas_with(&[
            ElementKind::Balloons,
            ElementKind::Confetti,
            ElementKind::Text,
            ElementKind::Music,
            ElementKind::Quiz,
        ]);
        let mut seq = StepSequence::new();
        seq.auto_generate(&canvas);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.steps()[0].members(), [ids[0].clone()]);
        assert_eq!(seq.steps()[1].members(), [ids[2].clone()]);
        assert_eq!(seq.steps()[2].members(), [ids[4].clone()]);
    }

    #[test]
    fn available_elements_excludes_sequenced_ids() {
        let (canvas, ids) = canvas_with(&[ElementKind::Balloons, ElementKind::Text]);
        let mut seq = StepSequence::new();
        seq.add(&ids[0], &canvas);
        let avail: Vec<&str> = seq
            .available_elements(&canvas)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(avail, [ids[1].as_str()]);

        assert!(seq.add_next_step(&canvas));
        assert!(seq.available_elements(&canvas).is_empty());
        assert!(!seq.add_next_step(&canvas));
    }

    #[test]
    fn from_wire_preserves_grouping_and_drops_violations() {
        let (canvas, ids) = canvas_with(&[
            ElementKind::Balloons,
            ElementKind::Text,
            ElementKind::Balloons,
        ]);
        let wire = vec![
            vec![ids[0].clone(), ids[1].clone()],
            vec![ids[0].clone(), "ghost".to_owned(), ids[2].clone()],
        ];
        let seq = StepSequence::from_wire(&wire, canvas.elements());
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.steps()[0].len(), 2);
        // duplicate and unknown refs dropped, second balloons survives alone
        assert_eq!(seq.steps()[1].members(), [ids[2].clone()]);
        assert_eq!(seq.to_wire(), vec![
            vec![ids[0].clone(), ids[1].clone()],
            vec![ids[2].clone()],
        ]);
    }
}
