//! The player state machine: owns the live story during play.

use crate::error::{StoryError, StoryResult};
use crate::interpolate::interpolate;
use crate::interpreter::{Interpreter, PromptSource, ScriptDiagnostic};
use crate::story::{Choice, Section, Story};

/// Where the player is in the app lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No story loaded.
    Menu,
    /// A story is loaded and a current section exists.
    Playing,
}

/// The player state machine. Owns the live [`Story`] while one is loaded and
/// drives the script interpreter on every section entry.
#[derive(Debug, Default)]
pub struct Player {
    story: Option<Story>,
    interpreter: Interpreter,
}

impl Player {
    /// Create a player in the menu, with no story loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.story.is_some() {
            Phase::Playing
        } else {
            Phase::Menu
        }
    }

    /// The live story, if one is loaded.
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Hand the live story back out (for saving/export), returning to the
    /// menu.
    pub fn take_story(&mut self) -> Option<Story> {
        self.story.take()
    }

    /// Reset to a fresh section-1-only story.
    pub fn new_story(&mut self) -> Phase {
        self.load_story(Story::starter())
    }

    /// Load a story and start playing it. A story without sections cannot be
    /// played; the player returns to the menu. Otherwise the runtime state
    /// is normalized: a missing or dangling `current_section` defaults to
    /// the first section in insertion order.
    pub fn load_story(&mut self, story: Story) -> Phase {
        if story.sections.is_empty() {
            self.story = None;
            return Phase::Menu;
        }

        let mut story = story;
        let current_is_valid = story
            .state
            .as_ref()
            .and_then(|s| s.current_section.as_ref())
            .is_some_and(|id| story.sections.contains_key(id));
        if !current_is_valid {
            let first = story.first_section_id().map(String::from);
            story.state_mut().current_section = first;
        } else {
            // Ensure the state (and thus history) exists even when current
            // was already valid.
            story.state_mut();
        }

        self.story = Some(story);
        Phase::Playing
    }

    /// Navigate to a section. Pushes the previous section onto the history
    /// when `add_to_history` is set, then runs the target's script. A
    /// missing section id errors without touching any state.
    pub fn load_section(
        &mut self,
        id: &str,
        add_to_history: bool,
        prompts: &mut dyn PromptSource,
    ) -> StoryResult<()> {
        let story = self.story.as_mut().ok_or(StoryError::NoStory)?;
        if !story.sections.contains_key(id) {
            return Err(StoryError::SectionNotFound(id.to_string()));
        }

        let state = story.state_mut();
        if add_to_history {
            if let Some(previous) = state.current_section.clone() {
                state.history.push(previous);
            }
        }
        state.current_section = Some(id.to_string());

        // The script runs after the section becomes current, so dynamic
        // choice edits affect what the player sees for this visit.
        let script = story
            .sections
            .get(id)
            .map(|s| s.script.clone())
            .unwrap_or_default();
        if !script.is_empty() {
            self.interpreter.execute(story, &script, prompts);
        }
        Ok(())
    }

    /// Pick a choice from the current section by index.
    pub fn choose(&mut self, index: usize, prompts: &mut dyn PromptSource) -> StoryResult<()> {
        let target = {
            let story = self.story.as_ref().ok_or(StoryError::NoStory)?;
            let choices = story.current_section().map(|s| s.next.as_slice());
            let choice = choices
                .and_then(|c| c.get(index))
                .ok_or(StoryError::InvalidChoice(index))?;
            choice.next.as_id()
        };
        self.load_section(&target, true, prompts)
    }

    /// Follow the single choice of the current section. Returns whether a
    /// step was taken; sections with zero or several choices are a silent
    /// no-op.
    pub fn one_step_forward(&mut self, prompts: &mut dyn PromptSource) -> StoryResult<bool> {
        let Some(story) = self.story.as_ref() else {
            return Ok(false);
        };
        let Some(section) = story.current_section() else {
            return Ok(false);
        };
        if section.next.len() != 1 {
            return Ok(false);
        }
        let target = section.next[0].next.as_id();
        self.load_section(&target, true, prompts)?;
        Ok(true)
    }

    /// Pop the most recent history entry and navigate back to it. Each call
    /// consumes one entry permanently; there is no forward-redo. Returns
    /// whether a step was taken.
    pub fn one_step_back(&mut self, prompts: &mut dyn PromptSource) -> StoryResult<bool> {
        let Some(previous) = self
            .story
            .as_mut()
            .and_then(|s| s.state.as_mut())
            .and_then(|s| s.history.pop())
        else {
            return Ok(false);
        };
        match self.load_section(&previous, false, prompts) {
            Ok(()) => Ok(true),
            Err(e) => {
                // The target vanished; put the entry back so state stays
                // consistent.
                if let Some(state) = self.story.as_mut().and_then(|s| s.state.as_mut()) {
                    state.history.push(previous);
                }
                Err(e)
            }
        }
    }

    /// The section currently being viewed.
    pub fn current_section(&self) -> Option<&Section> {
        self.story.as_ref()?.current_section()
    }

    /// The current section's text with variables interpolated.
    pub fn current_text(&self) -> String {
        let Some(section) = self.current_section() else {
            return String::new();
        };
        let variables = self
            .story
            .as_ref()
            .and_then(|s| s.state.as_ref())
            .map(|s| &s.variables);
        interpolate(Some(&section.body()), variables)
    }

    /// The current section's choices, in display order.
    pub fn choices(&self) -> &[Choice] {
        self.current_section()
            .map(|s| s.next.as_slice())
            .unwrap_or(&[])
    }

    /// Script diagnostics accumulated across section entries.
    pub fn diagnostics(&self) -> &[ScriptDiagnostic] {
        self.interpreter.diagnostics()
    }

    /// Drain the accumulated script diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<ScriptDiagnostic> {
        self.interpreter.take_diagnostics()
    }
}
