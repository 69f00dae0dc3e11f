//! Story runtime core for Fabula.
//!
//! Fabula stories are directed graphs of text/media sections connected by
//! player choices, with an embedded scripting mini-language that mutates
//! variables and the choice graph as sections are entered. This crate owns
//! the data model, the script interpreter, the player state machine, the
//! linearizer for flat exports, and the validator that admits AI-proposed
//! story extensions only when they are strictly additive. It performs no
//! I/O; editors, persistence, rendering, and LLM transport hand a
//! [`Story`] in and take one out.

/// Script instruction model and its flat wire codec.
pub mod action;
/// Error types used throughout the crate.
pub mod error;
/// Validation of AI-proposed story extensions.
pub mod extend;
/// `${name}` placeholder substitution in section text.
pub mod interpolate;
/// Best-effort script execution with a diagnostic side-channel.
pub mod interpreter;
/// Flattening a branching story into a single linear path.
pub mod linearize;
/// The player state machine that owns the live story during play.
pub mod player;
/// The story graph data model and its JSON wire format.
pub mod story;

pub use action::{Action, CompareOp};
pub use error::{StoryError, StoryResult};
pub use extend::{ExtendError, validate_extension};
pub use interpolate::interpolate;
pub use interpreter::{Interpreter, NoPrompt, PromptSource, ScriptDiagnostic};
pub use linearize::{depth_first_search, linearize, markdown_from_section_id_list};
pub use player::{Phase, Player};
pub use story::{Choice, Media, MediaKind, Section, SectionRef, Story, StoryMeta, StoryState};
