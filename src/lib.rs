//! Wishreel is a composition and guided-reveal playback engine.
//!
//! An author places interactive and decorative elements (balloons, text,
//! quizzes, puzzles, ...) on a composition surface, arranges a subset of them
//! into an ordered multi-step reveal sequence, and later replays that
//! sequence to a recipient as a step-advancing presentation.
//!
//! The engine is a framework-independent state container: plain structs plus
//! transition functions, driven through a command/event interface:
//!
//! - Start a [`ComposerSession`] (blank, from a [`Template`], or from a
//!   saved [`Composition`])
//! - Dispatch [`Command`]s, observe [`EngineEvent`]s
//! - Enter presentation mode, where a [`PlaybackEngine`] snapshot drives
//!   visibility and advancement
//!
//! Rendering of individual elements and persistence of compositions are
//! external collaborators behind narrow boundaries: renderers feed completion
//! signals back via [`Command::CompleteElement`], and the persistence adapter
//! exchanges JSON through [`Composition`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod schema;

/// Canvas element store.
pub mod canvas;
/// Element catalog: kinds, defaults, property schemas.
pub mod catalog;
/// Playback state machine.
pub mod playback;
/// Restricted (template-derived) authoring mode.
pub mod restricted;
/// Boundary scene model and persistence seam.
pub mod scene;
/// Step sequence builder.
pub mod sequence;
/// Session-oriented authoring API.
pub mod session;
/// Template-to-composition hydration bridge.
pub mod template;

pub use crate::foundation::core::{AUTO_ADVANCE_INTERVAL, MAX_SEQUENCE_STEPS, MAX_STEP_ELEMENTS};
pub use crate::foundation::error::{WishreelError, WishreelResult};

pub use crate::canvas::{CanvasStore, Element};
pub use crate::catalog::{ElementKind, ElementProps};
pub use crate::playback::{PlaybackEngine, PlaybackOpts, PlaybackPhase};
pub use crate::restricted::RestrictedGate;
pub use crate::scene::composition::{Composition, Template};
pub use crate::scene::model::{CompositionDef, ElementDef, TemplateDef};
pub use crate::sequence::{Step, StepSequence};
pub use crate::session::composer::{Command, ComposerSession, EngineEvent};
pub use crate::template::{HydratedComposition, hydrate};
