//! The story graph data model and its JSON wire format.
//!
//! A [`Story`] is the root aggregate: informational [`StoryMeta`], a mutable
//! [`StoryState`] overlay, and an insertion-ordered map of [`Section`]s
//! connected by [`Choice`]s. Everything here round-trips through serde so a
//! loaded story saves back structurally unchanged.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{StoryError, StoryResult};

/// Informational metadata about a story. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMeta {
    /// Story title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publication year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    /// License identifier or text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Character name to description, used as context for AI extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<IndexMap<String, String>>,
    /// How many sections ahead an AI extension should plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_look_ahead: Option<u32>,
}

/// The mutable runtime overlay of a story: where the player is, what the
/// script variables hold, and where the player has been.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    /// Id of the section currently being viewed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,
    /// Flat string-valued variables shared across the whole story.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, String>,
    /// Previously visited section ids, most recent last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<String>,
}

/// A section reference as stored on a choice: authors write both `"2"` and
/// `2`, and both denote the section keyed `"2"`. Equality is string-coerced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionRef {
    /// A string section id.
    Id(String),
    /// A numeric section id, coerced to its decimal string for lookups.
    Number(i64),
}

impl SectionRef {
    /// The target section id as a string key into [`Story::sections`].
    pub fn as_id(&self) -> String {
        match self {
            SectionRef::Id(id) => id.clone(),
            SectionRef::Number(n) => n.to_string(),
        }
    }
}

impl PartialEq for SectionRef {
    fn eq(&self, other: &Self) -> bool {
        self.as_id() == other.as_id()
    }
}

impl Eq for SectionRef {}

impl fmt::Display for SectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_id())
    }
}

impl From<&str> for SectionRef {
    fn from(id: &str) -> Self {
        SectionRef::Id(id.to_string())
    }
}

/// A labeled directed edge from one section to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Display label. An empty string means "no label, auto-advance".
    #[serde(default)]
    pub text: String,
    /// Target section.
    pub next: SectionRef,
}

/// The kind of media attached to a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image.
    Image,
    /// A video clip.
    Video,
}

/// Media attached to a section: an image or video with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Whether the source is an image or a video.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Source URL or embedded data URL.
    pub src: String,
}

/// A node in the story graph; the unit of displayed content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section id. Must equal this section's key in [`Story::sections`].
    pub id: String,
    /// Text content as a single string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text content as ordered lines. Takes precedence over `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_lines: Option<Vec<String>>,
    /// Optional attached media.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    /// Outgoing choices, in display order. Index 0 is the default choice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<Choice>,
    /// Script executed, in order, every time this section is entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<Action>,
    /// Whether an AI extension may branch from this section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_extendable: Option<bool>,
    /// Free-form visual-prompt metadata for AI illustration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_gen: Option<serde_json::Value>,
}

impl Section {
    /// The section's display text. `text_lines` wins over `text` when both
    /// are present.
    pub fn body(&self) -> String {
        if let Some(lines) = &self.text_lines {
            lines.join("\n")
        } else {
            self.text.clone().unwrap_or_default()
        }
    }
}

/// The root story aggregate: metadata, runtime state, and the section graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Informational metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<StoryMeta>,
    /// Mutable runtime state. Created lazily on first write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StoryState>,
    /// Sections keyed by id, in insertion order.
    pub sections: IndexMap<String, Section>,
}

impl Story {
    /// A fresh story containing only an empty section `"1"`. This is what
    /// "new story" resets to.
    pub fn starter() -> Self {
        let mut sections = IndexMap::new();
        sections.insert(
            "1".to_string(),
            Section {
                id: "1".to_string(),
                ..Section::default()
            },
        );
        Self {
            meta: None,
            state: None,
            sections,
        }
    }

    /// Parse a story from its JSON wire format.
    pub fn from_json(json: &str) -> StoryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the story to pretty-printed JSON.
    pub fn to_json(&self) -> StoryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The first section key in insertion order, if any.
    pub fn first_section_id(&self) -> Option<&str> {
        self.sections.keys().next().map(String::as_str)
    }

    /// The id of the section currently being viewed.
    pub fn current_section_id(&self) -> Option<&str> {
        self.state.as_ref()?.current_section.as_deref()
    }

    /// The section currently being viewed.
    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current_section_id()?)
    }

    /// The runtime state, created empty on first access.
    pub fn state_mut(&mut self) -> &mut StoryState {
        self.state.get_or_insert_with(StoryState::default)
    }

    /// Look up a script variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.state.as_ref()?.variables.get(name).map(String::as_str)
    }

    /// Total number of choices across all sections.
    pub fn choice_count(&self) -> usize {
        self.sections.values().map(|s| s.next.len()).sum()
    }

    /// Verify the structural invariants of the graph: every section's `id`
    /// equals its key, and every choice targets an existing section.
    pub fn check_integrity(&self) -> StoryResult<()> {
        for (key, section) in &self.sections {
            if section.id != *key {
                return Err(StoryError::IdMismatch {
                    key: key.clone(),
                    id: section.id.clone(),
                });
            }
            for choice in &section.next {
                let target = choice.next.as_id();
                if !self.sections.contains_key(&target) {
                    return Err(StoryError::DanglingChoice {
                        from: key.clone(),
                        target,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_has_single_first_section() {
        let story = Story::starter();
        assert_eq!(story.sections.len(), 1);
        assert_eq!(story.first_section_id(), Some("1"));
        assert!(story.state.is_none());
    }

    #[test]
    fn section_ref_coerces_numbers() {
        let a = SectionRef::Id("2".to_string());
        let b = SectionRef::Number(2);
        assert_eq!(a, b);
        assert_eq!(b.as_id(), "2");
    }

    #[test]
    fn text_lines_take_precedence() {
        let section = Section {
            id: "1".to_string(),
            text: Some("single".to_string()),
            text_lines: Some(vec!["first".to_string(), "second".to_string()]),
            ..Section::default()
        };
        assert_eq!(section.body(), "first\nsecond");
    }

    #[test]
    fn body_falls_back_to_text() {
        let section = Section {
            id: "1".to_string(),
            text: Some("single".to_string()),
            ..Section::default()
        };
        assert_eq!(section.body(), "single");
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let json = r#"{
            "meta": {"title": "Test", "author": "A", "ai_look_ahead": 2},
            "state": {"current_section": "1", "variables": {"gold": "3"}, "history": ["1"]},
            "sections": {
                "1": {
                    "id": "1",
                    "text_lines": ["line one", "line two"],
                    "media": {"type": "image", "src": "cover.png"},
                    "next": [{"text": "go", "next": 2}],
                    "script": [{"action": "SET", "parameters": ["gold", "3"]}]
                },
                "2": {"id": "2", "text": "The end.", "ai_extendable": true}
            }
        }"#;
        let story = Story::from_json(json).unwrap();
        let out = story.to_json().unwrap();
        let reparsed = Story::from_json(&out).unwrap();
        assert_eq!(story, reparsed);

        // Structure survives: numeric target still stored as a number.
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["sections"]["1"]["next"][0]["next"], 2);
    }

    #[test]
    fn sections_preserve_insertion_order() {
        let json = r#"{"sections": {
            "start": {"id": "start"},
            "middle": {"id": "middle"},
            "end": {"id": "end"}
        }}"#;
        let story = Story::from_json(json).unwrap();
        let keys: Vec<_> = story.sections.keys().cloned().collect();
        assert_eq!(keys, vec!["start", "middle", "end"]);
        assert_eq!(story.first_section_id(), Some("start"));
    }

    #[test]
    fn state_is_created_lazily() {
        let mut story = Story::starter();
        assert!(story.state.is_none());
        story
            .state_mut()
            .variables
            .insert("k".to_string(), "v".to_string());
        assert_eq!(story.variable("k"), Some("v"));
    }

    #[test]
    fn integrity_rejects_dangling_choice() {
        let json = r#"{"sections": {
            "1": {"id": "1", "next": [{"text": "go", "next": "missing"}]}
        }}"#;
        let story = Story::from_json(json).unwrap();
        assert!(matches!(
            story.check_integrity(),
            Err(StoryError::DanglingChoice { .. })
        ));
    }

    #[test]
    fn integrity_rejects_id_key_mismatch() {
        let json = r#"{"sections": {"1": {"id": "2"}}}"#;
        let story = Story::from_json(json).unwrap();
        assert!(matches!(
            story.check_integrity(),
            Err(StoryError::IdMismatch { .. })
        ));
    }

    #[test]
    fn integrity_accepts_numeric_targets() {
        let json = r#"{"sections": {
            "1": {"id": "1", "next": [{"text": "go", "next": 2}]},
            "2": {"id": "2"}
        }}"#;
        let story = Story::from_json(json).unwrap();
        assert!(story.check_integrity().is_ok());
    }
}
