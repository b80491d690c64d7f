//! Authoring session: the command/event façade over the canvas store, step
//! sequence, restricted gate, and playback engine.
//!
//! Callers dispatch named [`Command`]s and receive [`EngineEvent`]
//! notifications, instead of threading per-mutation callbacks through UI
//! layers. Commands are synchronous and atomic; a rejected command returns no
//! events and leaves state untouched.
//!
//! Authoring and playback are mutually exclusive: [`Command::StartPlayback`]
//! snapshots the current elements and sequence into a
//! [`PlaybackEngine`], authoring commands are no-ops while that engine
//! exists, and [`Command::StopPlayback`] discards it (tearing down its
//! timer with it).

use std::time::Duration;

use tracing::debug;

use crate::canvas::CanvasStore;
use crate::catalog::{ElementKind, ElementProps};
use crate::foundation::error::WishreelResult;
use crate::playback::{PlaybackEngine, PlaybackOpts, PlaybackPhase};
use crate::restricted::RestrictedGate;
use crate::scene::composition::{Composition, Template};
use crate::scene::model::CompositionDef;
use crate::sequence::StepSequence;
use crate::template::hydrate;

/// A named engine operation dispatched by the UI layer.
#[derive(Debug, Clone)]
pub enum Command {
    /// Place a new element of `kind` with catalog defaults.
    AddElement {
        /// Kind to instantiate.
        kind: ElementKind,
    },
    /// Replace the property set of an element.
    UpdateElementProps {
        /// Target element id.
        id: String,
        /// New properties (same kind, validated).
        props: ElementProps,
    },
    /// Remove an element, cascading out of the step sequence.
    DeleteElement {
        /// Target element id.
        id: String,
    },
    /// Select a palette kind; semantics depend on the authoring mode.
    ///
    /// Unrestricted: always places another instance of the kind. Restricted:
    /// re-selects the existing instance, or restores one from the template.
    SelectElement {
        /// Kind selected in the palette.
        kind: ElementKind,
    },
    /// Unselect a palette kind, removing its most recent instance.
    UnselectElement {
        /// Kind unselected in the palette.
        kind: ElementKind,
    },
    /// Add an element to the step sequence (tail-merge or append).
    AddToSequence {
        /// Element id to sequence.
        id: String,
    },
    /// Remove an element from the step sequence.
    RemoveFromSequence {
        /// Element id to unsequence.
        id: String,
    },
    /// Move a step to a new position.
    ReorderSteps {
        /// Current step index.
        from: usize,
        /// Destination step index.
        to: usize,
    },
    /// Reset the sequence to empty.
    ClearSequence,
    /// Replace the sequence with one step per interactive element.
    AutoGenerateSequence,
    /// Append the first unsequenced element as a new singleton step.
    AddNextStep,
    /// Snapshot state and enter presentation mode.
    StartPlayback,
    /// Leave presentation mode, discarding playback state.
    StopPlayback,
    /// Manual forward navigation.
    NextStep,
    /// Manual backward navigation.
    PreviousStep,
    /// Completion signal from a rendered element.
    CompleteElement {
        /// Element id that finished its interaction.
        id: String,
    },
    /// Enable or disable timed auto-advance.
    SetAutoPlay {
        /// New auto-play state.
        enabled: bool,
    },
    /// Advance the host-driven playback clock.
    Tick {
        /// Time elapsed since the previous tick.
        elapsed: Duration,
    },
    /// Pause the presentation (cancels the auto-play timer).
    PausePlayback,
    /// Resume a paused presentation.
    ResumePlayback,
    /// Reset playback to the beginning, cancelling the timer.
    ResetPlayback,
}

/// State-change notification emitted by [`ComposerSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// An element was placed on the canvas.
    ElementAdded {
        /// Minted element id.
        id: String,
        /// Kind of the new element.
        kind: ElementKind,
    },
    /// An element's properties were replaced.
    ElementUpdated {
        /// Updated element id.
        id: String,
    },
    /// An element was removed from the canvas (and the sequence).
    ElementRemoved {
        /// Removed element id.
        id: String,
    },
    /// The selection changed.
    SelectionChanged {
        /// Selected ids, oldest first.
        selected: Vec<String>,
    },
    /// The step sequence changed.
    SequenceChanged {
        /// Wire form of the new sequence.
        steps: Vec<Vec<String>>,
    },
    /// Presentation mode was entered.
    PlaybackStarted {
        /// Number of steps in this run.
        step_count: usize,
    },
    /// Presentation mode was left.
    PlaybackStopped,
    /// The current step index changed.
    StepChanged {
        /// New 0-based step index.
        index: usize,
    },
    /// The run advanced past the final step.
    PlaybackFinished,
    /// Auto-play was toggled.
    AutoPlayChanged {
        /// New auto-play state.
        enabled: bool,
    },
}

/// One authoring session over a composition.
///
/// Owns the canvas element store and step sequence exclusively; an optional
/// [`RestrictedGate`] is present when the session derives from a template.
#[derive(Debug, Clone, Default)]
pub struct ComposerSession {
    canvas: CanvasStore,
    sequence: StepSequence,
    gate: Option<RestrictedGate>,
    playback: Option<PlaybackEngine>,
    playback_opts: PlaybackOpts,
}

impl ComposerSession {
    /// Start a blank (unrestricted) authoring session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a template: hydration is synchronous-once, and
    /// the session runs in restricted mode.
    pub fn from_template(template: &Template) -> WishreelResult<Self> {
        template.validate()?;
        let hydrated = hydrate(template.def());
        Ok(Self {
            canvas: hydrated.canvas,
            sequence: hydrated.sequence,
            gate: Some(hydrated.gate),
            playback: None,
            playback_opts: PlaybackOpts::default(),
        })
    }

    /// Resume a session from a saved composition (unrestricted).
    pub fn from_composition(comp: &Composition) -> WishreelResult<Self> {
        comp.validate()?;
        let canvas = CanvasStore::from_defs(&comp.def().elements);
        let sequence = StepSequence::from_wire(&comp.def().step_sequence, canvas.elements());
        Ok(Self {
            canvas,
            sequence,
            gate: None,
            playback: None,
            playback_opts: PlaybackOpts::default(),
        })
    }

    /// Wire form of the current state, handed wholesale to the persistence
    /// adapter on save.
    pub fn to_composition(&self) -> Composition {
        Composition::from_def(CompositionDef {
            elements: self.canvas.to_defs(),
            step_sequence: self.sequence.to_wire(),
        })
    }

    /// The canvas element store.
    pub fn canvas(&self) -> &CanvasStore {
        &self.canvas
    }

    /// The step sequence.
    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    /// Whether the session is template-derived (restricted mode).
    pub fn is_restricted(&self) -> bool {
        self.gate.is_some()
    }

    /// The restricted gate, when in restricted mode.
    pub fn gate(&self) -> Option<&RestrictedGate> {
        self.gate.as_ref()
    }

    /// The live playback engine, while in presentation mode.
    pub fn playback(&self) -> Option<&PlaybackEngine> {
        self.playback.as_ref()
    }

    /// Override playback options for subsequent [`Command::StartPlayback`].
    pub fn set_playback_opts(&mut self, opts: PlaybackOpts) {
        self.playback_opts = opts;
    }

    /// Dispatch one command, returning the state-change notifications it
    /// produced. Rejected commands return an empty vector.
    pub fn apply(&mut self, cmd: Command) -> Vec<EngineEvent> {
        match cmd {
            Command::AddElement { kind } => self.add_element(kind),
            Command::UpdateElementProps { id, props } => self.update_props(&id, props),
            Command::DeleteElement { id } => self.delete_element(&id),
            Command::SelectElement { kind } => self.select(kind),
            Command::UnselectElement { kind } => self.unselect(kind),
            Command::AddToSequence { id } => self.sequence_add(&id),
            Command::RemoveFromSequence { id } => self.sequence_remove(&id),
            Command::ReorderSteps { from, to } => self.sequence_reorder(from, to),
            Command::ClearSequence => self.sequence_clear(),
            Command::AutoGenerateSequence => self.sequence_auto_generate(),
            Command::AddNextStep => self.sequence_add_next(),
            Command::StartPlayback => self.start_playback(),
            Command::StopPlayback => self.stop_playback(),
            Command::NextStep => self.with_playback(|p| p.next()),
            Command::PreviousStep => self.with_playback(|p| p.previous()),
            Command::CompleteElement { id } => self.with_playback(|p| p.complete_element(&id)),
            Command::SetAutoPlay { enabled } => self.set_auto_play(enabled),
            Command::Tick { elapsed } => self.with_playback(|p| p.tick(elapsed)),
            Command::PausePlayback => self.with_playback(|p| p.pause()),
            Command::ResumePlayback => self.with_playback(|p| p.resume()),
            Command::ResetPlayback => self.with_playback(|p| p.reset()),
        }
    }

    fn authoring_locked(&self) -> bool {
        let locked = self.playback.is_some();
        if locked {
            debug!("rejected authoring command during playback");
        }
        locked
    }

    fn add_element(&mut self, kind: ElementKind) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        // In restricted mode adding behaves as the template toggle: the kind
        // must be in the palette, and an existing instance is re-selected
        // instead of duplicated.
        if self.gate.is_some() {
            return self.select(kind);
        }
        let Some(id) = self.canvas.add_element(ElementProps::defaults(kind)) else {
            return Vec::new();
        };
        vec![
            EngineEvent::ElementAdded { id, kind },
            self.selection_event(),
        ]
    }

    fn update_props(&mut self, id: &str, props: ElementProps) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        if self.canvas.update_element_props(id, props) {
            vec![EngineEvent::ElementUpdated { id: id.to_owned() }]
        } else {
            Vec::new()
        }
    }

    fn delete_element(&mut self, id: &str) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        if !self.canvas.delete_element(id) {
            return Vec::new();
        }
        let mut events = vec![
            EngineEvent::ElementRemoved { id: id.to_owned() },
            self.selection_event(),
        ];
        // cascading cleanup: purge the id from the sequence, dropping any
        // step left empty
        if self.sequence.remove_element(id) {
            events.push(self.sequence_event());
        }
        events
    }

    fn select(&mut self, kind: ElementKind) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        match &self.gate {
            None => {
                // unrestricted: selecting always creates another instance
                let Some(id) = self.canvas.select_instance(ElementProps::defaults(kind)) else {
                    return Vec::new();
                };
                vec![
                    EngineEvent::ElementAdded { id, kind },
                    self.selection_event(),
                ]
            }
            Some(gate) => {
                // restricted: re-select an existing instance, or restore one
                // from the template's original properties
                if let Some(existing) = self.canvas.first_of_kind(kind) {
                    let id = existing.id.clone();
                    self.canvas.set_selection(&id);
                    return vec![self.selection_event()];
                }
                if !gate.can_add(kind) {
                    return Vec::new();
                }
                let props = gate.restore_props(kind);
                let Some(id) = self.canvas.add_element(props) else {
                    return Vec::new();
                };
                vec![
                    EngineEvent::ElementAdded { id, kind },
                    self.selection_event(),
                ]
            }
        }
    }

    fn unselect(&mut self, kind: ElementKind) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        // In both modes unselect removes the most recent instance of the
        // kind; in restricted mode the kind stays re-addable because the
        // gate's palette is immutable.
        let Some(id) = self.canvas.unselect_instance(kind) else {
            return Vec::new();
        };
        let mut events = vec![
            EngineEvent::ElementRemoved { id: id.clone() },
            self.selection_event(),
        ];
        if self.sequence.remove_element(&id) {
            events.push(self.sequence_event());
        }
        events
    }

    fn sequence_add(&mut self, id: &str) -> Vec<EngineEvent> {
        if self.authoring_locked() || !self.sequence.add(id, &self.canvas) {
            return Vec::new();
        }
        vec![self.sequence_event()]
    }

    fn sequence_remove(&mut self, id: &str) -> Vec<EngineEvent> {
        if self.authoring_locked() || !self.sequence.remove(id) {
            return Vec::new();
        }
        vec![self.sequence_event()]
    }

    fn sequence_reorder(&mut self, from: usize, to: usize) -> Vec<EngineEvent> {
        if self.authoring_locked() || !self.sequence.reorder(from, to) {
            return Vec::new();
        }
        vec![self.sequence_event()]
    }

    fn sequence_clear(&mut self) -> Vec<EngineEvent> {
        if self.authoring_locked() || self.sequence.is_empty() {
            return Vec::new();
        }
        self.sequence.clear();
        vec![self.sequence_event()]
    }

    fn sequence_auto_generate(&mut self) -> Vec<EngineEvent> {
        if self.authoring_locked() {
            return Vec::new();
        }
        self.sequence.auto_generate(&self.canvas);
        vec![self.sequence_event()]
    }

    fn sequence_add_next(&mut self) -> Vec<EngineEvent> {
        if self.authoring_locked() || !self.sequence.add_next_step(&self.canvas) {
            return Vec::new();
        }
        vec![self.sequence_event()]
    }

    fn start_playback(&mut self) -> Vec<EngineEvent> {
        if self.playback.is_some() {
            return Vec::new();
        }
        let sequence = if self.sequence.is_empty() {
            None
        } else {
            Some(&self.sequence)
        };
        let mut engine = PlaybackEngine::new(
            self.canvas.elements().to_vec(),
            sequence,
            self.playback_opts,
        );
        engine.start();
        let step_count = engine.step_count();
        self.playback = Some(engine);
        vec![EngineEvent::PlaybackStarted { step_count }]
    }

    fn stop_playback(&mut self) -> Vec<EngineEvent> {
        // dropping the engine is the teardown: its timer state goes with it
        if self.playback.take().is_none() {
            return Vec::new();
        }
        vec![EngineEvent::PlaybackStopped]
    }

    fn set_auto_play(&mut self, enabled: bool) -> Vec<EngineEvent> {
        self.playback_opts.auto_play = enabled;
        if let Some(p) = &mut self.playback {
            p.set_auto_play(enabled);
        }
        vec![EngineEvent::AutoPlayChanged { enabled }]
    }

    // Run a playback mutation and translate the observable state delta into
    // events.
    fn with_playback(&mut self, f: impl FnOnce(&mut PlaybackEngine)) -> Vec<EngineEvent> {
        let Some(engine) = &mut self.playback else {
            return Vec::new();
        };
        let phase_before = engine.phase();
        let step_before = engine.current_step();
        f(engine);

        let mut events = Vec::new();
        if engine.current_step() != step_before
            || (phase_before != PlaybackPhase::Playing
                && engine.phase() == PlaybackPhase::Playing)
        {
            events.push(EngineEvent::StepChanged {
                index: engine.current_step(),
            });
        }
        if engine.phase() == PlaybackPhase::Finished && phase_before != PlaybackPhase::Finished {
            events.push(EngineEvent::PlaybackFinished);
        }
        events
    }

    fn selection_event(&self) -> EngineEvent {
        EngineEvent::SelectionChanged {
            selected: self.canvas.selected_ids().to_vec(),
        }
    }

    fn sequence_event(&self) -> EngineEvent {
        EngineEvent::SequenceChanged {
            steps: self.sequence.to_wire(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::model::TemplateDef;

    fn add(session: &mut ComposerSession, kind: ElementKind) -> String {
        let events = session.apply(Command::AddElement { kind });
        match &events[0] {
            EngineEvent::ElementAdded { id, .. } => id.clone(),
            other => panic!("expected ElementAdded, got {other:?}"),
        }
    }

    #[test]
    fn add_emits_events_and_updates_selection() {
        let mut session = ComposerSession::new();
        let events = session.apply(Command::AddElement {
            kind: ElementKind::Balloons,
        });
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            EngineEvent::ElementAdded { kind: ElementKind::Balloons, .. }
        ));
        assert!(matches!(&events[1], EngineEvent::SelectionChanged { selected } if selected.len() == 1));
    }

    #[test]
    fn delete_cascades_into_the_sequence() {
        let mut session = ComposerSession::new();
        let b = add(&mut session, ElementKind::Balloons);
        let t = add(&mut session, ElementKind::Text);
        session.apply(Command::AddToSequence { id: b.clone() });
        session.apply(Command::AddToSequence { id: t.clone() });
        assert_eq!(session.sequence().len(), 1, "balloons and text share a step");

        let events = session.apply(Command::DeleteElement { id: b.clone() });
        assert!(events.contains(&EngineEvent::ElementRemoved { id: b }));
        assert!(events.iter().any(|e| matches!(e, EngineEvent::SequenceChanged { steps } if steps == &vec![vec![t.clone()]])));
    }

    #[test]
    fn unrestricted_select_multiplies_instances() {
        let mut session = ComposerSession::new();
        session.apply(Command::SelectElement {
            kind: ElementKind::Text,
        });
        session.apply(Command::SelectElement {
            kind: ElementKind::Text,
        });
        assert_eq!(session.canvas().len(), 2);

        session.apply(Command::UnselectElement {
            kind: ElementKind::Text,
        });
        assert_eq!(session.canvas().len(), 1);
    }

    #[test]
    fn restricted_session_gates_kinds_and_keeps_slots_singular() {
        let template = Template::from_def(TemplateDef {
            name: "t".into(),
            default_element_kinds: vec![ElementKind::Balloons, ElementKind::Text],
            step_sequence: None,
            props_overrides: Default::default(),
        });
        let mut session = ComposerSession::from_template(&template).unwrap();
        assert!(session.is_restricted());
        assert_eq!(session.canvas().len(), 2);

        // non-template kind rejected with no events
        let events = session.apply(Command::AddElement {
            kind: ElementKind::Quiz,
        });
        assert!(events.is_empty());
        assert_eq!(session.canvas().len(), 2);

        // selecting an existing kind re-selects, never duplicates
        let events = session.apply(Command::SelectElement {
            kind: ElementKind::Text,
        });
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], EngineEvent::SelectionChanged { .. }));
        assert_eq!(session.canvas().len(), 2);

        // unselect removes the instance but the kind stays re-addable
        session.apply(Command::UnselectElement {
            kind: ElementKind::Text,
        });
        assert_eq!(session.canvas().len(), 1);
        session.apply(Command::SelectElement {
            kind: ElementKind::Text,
        });
        assert_eq!(session.canvas().len(), 2, "restored exactly one instance");
    }

    #[test]
    fn authoring_commands_are_rejected_during_playback() {
        let mut session = ComposerSession::new();
        add(&mut session, ElementKind::Balloons);
        let events = session.apply(Command::StartPlayback);
        assert!(matches!(&events[0], EngineEvent::PlaybackStarted { step_count: 1 }));

        let events = session.apply(Command::AddElement {
            kind: ElementKind::Text,
        });
        assert!(events.is_empty());
        assert_eq!(session.canvas().len(), 1);

        session.apply(Command::StopPlayback);
        assert!(session.playback().is_none());
        let events = session.apply(Command::AddElement {
            kind: ElementKind::Text,
        });
        assert!(!events.is_empty());
    }

    #[test]
    fn playback_commands_translate_into_step_events() {
        let mut session = ComposerSession::new();
        let b = add(&mut session, ElementKind::Balloons);
        let t = add(&mut session, ElementKind::Text);
        session.apply(Command::AutoGenerateSequence);

        session.apply(Command::StartPlayback);
        let events = session.apply(Command::CompleteElement { id: b });
        assert_eq!(events, [EngineEvent::StepChanged { index: 1 }]);
        let events = session.apply(Command::CompleteElement { id: t });
        assert_eq!(events, [EngineEvent::PlaybackFinished]);
    }

    #[test]
    fn save_roundtrips_through_the_composition_boundary() {
        let mut session = ComposerSession::new();
        let b = add(&mut session, ElementKind::Balloons);
        add(&mut session, ElementKind::Text);
        session.apply(Command::AddToSequence { id: b });

        let comp = session.to_composition();
        comp.validate().unwrap();
        let restored = ComposerSession::from_composition(&comp).unwrap();
        assert_eq!(restored.canvas().len(), 2);
        assert_eq!(restored.sequence().to_wire(), session.sequence().to_wire());
    }
}
