//! Playback engine: the state machine that drives which elements are visible
//! at presentation time and when to advance.
//!
//! The engine takes a snapshot of the canvas elements and step sequence at
//! construction and never touches authoring state; playback and authoring
//! mutation are mutually exclusive on one composition. Everything is
//! single-threaded and host-driven: the auto-play timer is advanced by
//! [`PlaybackEngine::tick`] calls, not by a background thread, and is
//! cancelled deterministically on stop, reset, and teardown so a stale timer
//! can never advance a discarded state.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::canvas::Element;
use crate::foundation::core::AUTO_ADVANCE_INTERVAL;
use crate::sequence::StepSequence;

/// Lifecycle phase of one presentation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Not yet started.
    Idle,
    /// Stepping through, manually or under auto-play.
    Playing,
    /// Advanced past the final step.
    Finished,
}

/// Options controlling playback behavior.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOpts {
    /// Advance on a fixed delay instead of waiting for completion signals.
    pub auto_play: bool,
    /// Delay between auto-play advances.
    pub auto_advance_interval: Duration,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            auto_play: false,
            auto_advance_interval: AUTO_ADVANCE_INTERVAL,
        }
    }
}

/// Step-advancing presentation state machine over a composition snapshot.
///
/// When the composition has no configured step sequence, the engine falls
/// back to treating every interactive element as its own singleton step, in
/// canvas insertion order.
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    elements: Vec<Element>,
    steps: Vec<Vec<String>>,
    phase: PlaybackPhase,
    current: usize,
    completed: HashSet<String>,
    paused: bool,
    opts: PlaybackOpts,
    // None = timer cancelled; Some(acc) = elapsed since the last advance.
    auto_elapsed: Option<Duration>,
}

impl PlaybackEngine {
    /// Snapshot `elements` and `sequence` into a fresh engine in
    /// [`PlaybackPhase::Idle`].
    ///
    /// Pass `None` (or an empty sequence) for a composition whose author
    /// never scripted a sequence; the interactive fallback applies.
    pub fn new(elements: Vec<Element>, sequence: Option<&StepSequence>, opts: PlaybackOpts) -> Self {
        let steps = match sequence {
            Some(seq) if !seq.is_empty() => seq.to_wire(),
            _ => elements
                .iter()
                .filter(|e| e.kind().is_interactive())
                .map(|e| vec![e.id.clone()])
                .collect(),
        };
        debug!(steps = steps.len(), auto_play = opts.auto_play, "playback engine built");
        Self {
            elements,
            steps,
            phase: PlaybackPhase::Idle,
            current: 0,
            completed: HashSet::new(),
            paused: false,
            opts,
            auto_elapsed: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// 0-based index of the current step.
    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Total number of steps in this run.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Whether playback is running (started, not finished, not paused).
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing && !self.paused
    }

    /// Element ids that have signaled completion during this run.
    pub fn completed_ids(&self) -> &HashSet<String> {
        &self.completed
    }

    /// Idle -> Playing at step 0. No-op in any other phase.
    pub fn start(&mut self) {
        if self.phase != PlaybackPhase::Idle {
            return;
        }
        self.phase = PlaybackPhase::Playing;
        self.current = 0;
        self.arm_timer();
        debug!("playback started");
    }

    /// Advance one step; past the final step the run transitions to
    /// [`PlaybackPhase::Finished`]. No-op unless playing.
    pub fn advance(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        if self.current + 1 < self.steps.len() {
            self.current += 1;
            self.arm_timer();
            debug!(step = self.current, "advanced");
        } else {
            self.phase = PlaybackPhase::Finished;
            self.auto_elapsed = None;
            debug!("playback finished");
        }
    }

    /// Explicit "next" navigation; same transition as
    /// [`PlaybackEngine::advance`]. Always available regardless of auto-play.
    pub fn next(&mut self) {
        self.advance();
    }

    /// Navigate one step back, clamped at step 0.
    ///
    /// From [`PlaybackPhase::Finished`] this re-enters the run at the last
    /// step.
    pub fn previous(&mut self) {
        match self.phase {
            PlaybackPhase::Idle => {}
            PlaybackPhase::Playing => {
                self.current = self.current.saturating_sub(1);
                self.arm_timer();
            }
            PlaybackPhase::Finished => {
                self.phase = PlaybackPhase::Playing;
                self.current = self.steps.len().saturating_sub(1);
                self.arm_timer();
            }
        }
    }

    /// Record a completion signal from a rendered element.
    ///
    /// The engine is agnostic to each renderer's completion semantics; it
    /// only consumes the per-element "done" event. When every live member of
    /// the current step has completed, the engine advances. Signals for
    /// elements outside the current step are recorded but never advance.
    pub fn complete_element(&mut self, id: &str) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }
        if !self.elements.iter().any(|e| e.id == id) {
            debug!(%id, "ignored completion for unknown element");
            return;
        }
        self.completed.insert(id.to_owned());
        debug!(%id, "element completed");

        let Some(step) = self.steps.get(self.current) else {
            return;
        };
        let live: Vec<&String> = step
            .iter()
            .filter(|m| self.elements.iter().any(|e| &e.id == *m))
            .collect();
        if !live.is_empty()
            && live.iter().any(|m| *m == id)
            && live.iter().all(|m| self.completed.contains(*m))
        {
            self.advance();
        }
    }

    /// Elements visible at the current step.
    ///
    /// Step members whose element has since been deleted are silently
    /// skipped; a step whose members are all dangling contributes an empty
    /// beat. Outside [`PlaybackPhase::Playing`] nothing is visible.
    pub fn visible_elements(&self) -> Vec<&Element> {
        if self.phase != PlaybackPhase::Playing {
            return Vec::new();
        }
        let Some(step) = self.steps.get(self.current) else {
            return Vec::new();
        };
        step.iter()
            .filter_map(|id| self.elements.iter().find(|e| &e.id == id))
            .collect()
    }

    /// Advance the host-driven auto-play timer.
    ///
    /// Each time the accumulated elapsed time crosses the configured
    /// interval the engine advances one step, independently of element
    /// completion signals. No-op when auto-play is off, playback is paused,
    /// or the timer has been cancelled.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.opts.auto_play || self.paused || self.phase != PlaybackPhase::Playing {
            return;
        }
        let Some(acc) = self.auto_elapsed else {
            return;
        };
        let mut acc = acc + elapsed;
        while acc >= self.opts.auto_advance_interval && self.phase == PlaybackPhase::Playing {
            acc -= self.opts.auto_advance_interval;
            self.advance();
        }
        if self.phase == PlaybackPhase::Playing {
            self.auto_elapsed = Some(acc);
        }
    }

    /// Toggle auto-play, arming or cancelling the timer deterministically.
    pub fn set_auto_play(&mut self, enabled: bool) {
        self.opts.auto_play = enabled;
        if enabled && self.phase == PlaybackPhase::Playing && !self.paused {
            self.arm_timer();
        } else if !enabled {
            self.auto_elapsed = None;
        }
    }

    /// Whether auto-play is enabled.
    pub fn auto_play(&self) -> bool {
        self.opts.auto_play
    }

    /// Pause the run: the auto-play timer is cancelled, manual navigation
    /// stays available.
    pub fn pause(&mut self) {
        self.paused = true;
        self.auto_elapsed = None;
    }

    /// Resume a paused run, re-arming the timer from zero.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.arm_timer();
    }

    /// Discard run state: back to [`PlaybackPhase::Idle`] at step 0, no
    /// completions recorded, timer cancelled.
    pub fn reset(&mut self) {
        self.phase = PlaybackPhase::Idle;
        self.current = 0;
        self.completed.clear();
        self.paused = false;
        self.auto_elapsed = None;
        debug!("playback reset");
    }

    fn arm_timer(&mut self) {
        if self.opts.auto_play && !self.paused {
            self.auto_elapsed = Some(Duration::ZERO);
        }
    }
}
