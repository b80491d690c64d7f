//! Element catalog: the closed set of element kinds, their default
//! properties, and per-kind property schemas.
//!
//! The catalog is consumed by the engine, not built by it. Rendering of each
//! kind (balloon physics, confetti particles, puzzle tile dragging) lives in
//! external renderers; the engine only needs kind identity, defaults, and the
//! interactive/decorative split.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{WishreelError, WishreelResult};

/// Upper bound on poppable balloons (and balloon image sub-slots) per element.
pub const MAX_BALLOONS: usize = 8;

/// Upper bound on quiz answer options.
pub const MAX_QUIZ_OPTIONS: usize = 6;

/// Puzzle grid side length bounds (a `grid` of 3 means a 3x3 tile puzzle).
pub const PUZZLE_GRID_RANGE: std::ops::RangeInclusive<u8> = 2..=5;

/// Identifier for one element type resolvable in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// A set of poppable animated balloons.
    Balloons,
    /// A styled text block revealed as one beat.
    Text,
    /// A multiple-choice quiz card.
    Quiz,
    /// A drag-to-solve image tile puzzle.
    Puzzle,
    /// A wall of recipient comments with an acknowledge interaction.
    CommentWall,
    /// Decorative confetti burst (no completion signal).
    Confetti,
    /// Decorative looping background text (no completion signal).
    AmbientText,
    /// Background music track (no completion signal).
    Music,
}

impl ElementKind {
    /// Every kind the catalog knows, in palette order.
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Balloons,
        ElementKind::Text,
        ElementKind::Quiz,
        ElementKind::Puzzle,
        ElementKind::CommentWall,
        ElementKind::Confetti,
        ElementKind::AmbientText,
        ElementKind::Music,
    ];

    /// Wire identifier for the kind (matches the serde representation).
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Balloons => "balloons",
            ElementKind::Text => "text",
            ElementKind::Quiz => "quiz",
            ElementKind::Puzzle => "puzzle",
            ElementKind::CommentWall => "comment_wall",
            ElementKind::Confetti => "confetti",
            ElementKind::AmbientText => "ambient_text",
            ElementKind::Music => "music",
        }
    }

    /// Whether the kind participates in sequencing.
    ///
    /// Interactive kinds carry a built-in completion signal (or a text
    /// reveal); decorative kinds are ambient and never complete on their own.
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            ElementKind::Balloons
                | ElementKind::Text
                | ElementKind::Quiz
                | ElementKind::Puzzle
                | ElementKind::CommentWall
        )
    }
}

impl std::str::FromStr for ElementKind {
    type Err = WishreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| WishreelError::validation(format!("unknown element kind \"{s}\"")))
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strongly-typed property set, one variant per [`ElementKind`].
///
/// Wire form is adjacently tagged (`kind` + `props`), so an element
/// serializes as `{"id": ..., "kind": "balloons", "props": {...}, "order": N}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "props", rename_all = "snake_case")]
pub enum ElementProps {
    /// Poppable balloon cluster.
    Balloons {
        /// Number of balloons to pop before the element completes.
        count: usize,
        /// Optional per-balloon image sources, at most one per balloon.
        #[serde(default)]
        images: Vec<String>,
        /// Fill color for balloons without an image.
        #[serde(default = "default_balloon_color")]
        color: String,
    },
    /// Styled text block.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        #[serde(default = "default_text_size")]
        size_px: f64,
        /// Optional text color override.
        #[serde(default)]
        color: Option<String>,
        /// Whether the reveal is animated by the renderer.
        #[serde(default)]
        animated: bool,
    },
    /// Multiple-choice quiz.
    Quiz {
        /// Question shown to the recipient.
        question: String,
        /// Answer options, 2 to [`MAX_QUIZ_OPTIONS`].
        options: Vec<String>,
        /// Index into `options` of the correct answer.
        answer_index: usize,
    },
    /// Image tile puzzle.
    Puzzle {
        /// Source image for the tiles.
        image: String,
        /// Grid side length, within [`PUZZLE_GRID_RANGE`].
        #[serde(default = "default_puzzle_grid")]
        grid: u8,
    },
    /// Comment wall.
    CommentWall {
        /// Heading above the comments.
        #[serde(default)]
        title: String,
        /// Whether unauthenticated comments are shown.
        #[serde(default)]
        allow_anonymous: bool,
    },
    /// Decorative confetti.
    Confetti {
        /// Particle density in [0, 1].
        #[serde(default = "default_confetti_density")]
        density: f64,
        /// Particle color palette; empty means renderer default.
        #[serde(default)]
        palette: Vec<String>,
    },
    /// Decorative background text.
    AmbientText {
        /// Text content.
        content: String,
        /// Whether the animation loops.
        #[serde(default = "default_true")]
        looping: bool,
    },
    /// Background music.
    Music {
        /// Audio source identifier.
        source: String,
        /// Volume in [0, 1].
        #[serde(default = "default_volume")]
        volume: f64,
    },
}

fn default_balloon_color() -> String {
    "#e4573d".to_owned()
}

fn default_text_size() -> f64 {
    32.0
}

fn default_puzzle_grid() -> u8 {
    3
}

fn default_confetti_density() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f64 {
    1.0
}

impl ElementProps {
    /// The kind this property set belongs to.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementProps::Balloons { .. } => ElementKind::Balloons,
            ElementProps::Text { .. } => ElementKind::Text,
            ElementProps::Quiz { .. } => ElementKind::Quiz,
            ElementProps::Puzzle { .. } => ElementKind::Puzzle,
            ElementProps::CommentWall { .. } => ElementKind::CommentWall,
            ElementProps::Confetti { .. } => ElementKind::Confetti,
            ElementProps::AmbientText { .. } => ElementKind::AmbientText,
            ElementProps::Music { .. } => ElementKind::Music,
        }
    }

    /// Catalog default property set for a kind.
    pub fn defaults(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Balloons => ElementProps::Balloons {
                count: 5,
                images: Vec::new(),
                color: default_balloon_color(),
            },
            ElementKind::Text => ElementProps::Text {
                content: "Happy day!".to_owned(),
                size_px: default_text_size(),
                color: None,
                animated: true,
            },
            ElementKind::Quiz => ElementProps::Quiz {
                question: "How well do you know me?".to_owned(),
                options: vec!["Very well".to_owned(), "Not at all".to_owned()],
                answer_index: 0,
            },
            ElementKind::Puzzle => ElementProps::Puzzle {
                image: String::new(),
                grid: default_puzzle_grid(),
            },
            ElementKind::CommentWall => ElementProps::CommentWall {
                title: "Leave a wish".to_owned(),
                allow_anonymous: false,
            },
            ElementKind::Confetti => ElementProps::Confetti {
                density: default_confetti_density(),
                palette: Vec::new(),
            },
            ElementKind::AmbientText => ElementProps::AmbientText {
                content: String::new(),
                looping: true,
            },
            ElementKind::Music => ElementProps::Music {
                source: String::new(),
                volume: default_volume(),
            },
        }
    }

    /// Validate per-kind bounds.
    pub fn validate(&self) -> WishreelResult<()> {
        match self {
            ElementProps::Balloons { count, images, .. } => {
                if *count == 0 || *count > MAX_BALLOONS {
                    return Err(WishreelError::validation(format!(
                        "balloons count must be 1..={MAX_BALLOONS}"
                    )));
                }
                if images.len() > *count {
                    return Err(WishreelError::validation(
                        "balloons images must not exceed count",
                    ));
                }
            }
            ElementProps::Text { size_px, .. } => {
                if !size_px.is_finite() || *size_px <= 0.0 {
                    return Err(WishreelError::validation("text size_px must be > 0"));
                }
            }
            ElementProps::Quiz {
                options,
                answer_index,
                ..
            } => {
                if options.len() < 2 || options.len() > MAX_QUIZ_OPTIONS {
                    return Err(WishreelError::validation(format!(
                        "quiz options must be 2..={MAX_QUIZ_OPTIONS}"
                    )));
                }
                if *answer_index >= options.len() {
                    return Err(WishreelError::validation(
                        "quiz answer_index must index into options",
                    ));
                }
            }
            ElementProps::Puzzle { grid, .. } => {
                if !PUZZLE_GRID_RANGE.contains(grid) {
                    return Err(WishreelError::validation(format!(
                        "puzzle grid must be {}..={}",
                        PUZZLE_GRID_RANGE.start(),
                        PUZZLE_GRID_RANGE.end()
                    )));
                }
            }
            ElementProps::Confetti { density, .. } => {
                if !density.is_finite() || !(0.0..=1.0).contains(density) {
                    return Err(WishreelError::validation(
                        "confetti density must be within [0, 1]",
                    ));
                }
            }
            ElementProps::Music { volume, .. } => {
                if !volume.is_finite() || !(0.0..=1.0).contains(volume) {
                    return Err(WishreelError::validation(
                        "music volume must be within [0, 1]",
                    ));
                }
            }
            ElementProps::CommentWall { .. } | ElementProps::AmbientText { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrips_through_str() {
        for kind in ElementKind::ALL {
            let parsed: ElementKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("marquee".parse::<ElementKind>().is_err());
    }

    #[test]
    fn defaults_validate_for_every_kind() {
        for kind in ElementKind::ALL {
            let props = ElementProps::defaults(kind);
            assert_eq!(props.kind(), kind);
            props.validate().unwrap();
        }
    }

    #[test]
    fn balloons_bounds_are_enforced() {
        let props = ElementProps::Balloons {
            count: 0,
            images: Vec::new(),
            color: default_balloon_color(),
        };
        assert!(props.validate().is_err());

        let props = ElementProps::Balloons {
            count: 2,
            images: vec!["a".into(), "b".into(), "c".into()],
            color: default_balloon_color(),
        };
        assert!(props.validate().is_err());
    }

    #[test]
    fn quiz_answer_index_must_be_in_range() {
        let props = ElementProps::Quiz {
            question: "q".into(),
            options: vec!["a".into(), "b".into()],
            answer_index: 2,
        };
        assert!(props.validate().is_err());
    }

    #[test]
    fn interactive_split_matches_completion_semantics() {
        assert!(ElementKind::Balloons.is_interactive());
        assert!(ElementKind::CommentWall.is_interactive());
        assert!(!ElementKind::Confetti.is_interactive());
        assert!(!ElementKind::Music.is_interactive());
    }

    #[test]
    fn props_serialize_adjacently_tagged() {
        let props = ElementProps::defaults(ElementKind::Balloons);
        let v = serde_json::to_value(&props).unwrap();
        assert_eq!(v["kind"], "balloons");
        assert_eq!(v["props"]["count"], 5);
    }
}
