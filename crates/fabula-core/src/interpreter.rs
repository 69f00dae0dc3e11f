//! Best-effort execution of section scripts against story state.
//!
//! The interpreter never fails: malformed actions, empty parameters, unset
//! gate variables, and a missing current section all degrade to a skipped
//! action recorded on a diagnostic side-channel. A broken script dims the
//! story, it does not halt it.

use std::fmt;

use crate::action::Action;
use crate::story::{Choice, SectionRef, Story};

/// A source of interactive input for the `INPUT` action. `None` means the
/// prompt was cancelled.
pub trait PromptSource {
    /// Ask the player for a line of input.
    fn prompt(&mut self, message: &str) -> Option<String>;
}

/// A prompt source that always cancels. Used for headless execution, where
/// `INPUT` actions become diagnostic skips.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl PromptSource for NoPrompt {
    fn prompt(&mut self, _message: &str) -> Option<String> {
        None
    }
}

/// A note about an action the interpreter skipped or degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDiagnostic {
    /// Wire tag of the action concerned.
    pub action: String,
    /// What happened.
    pub message: String,
}

impl ScriptDiagnostic {
    fn new(action: &str, message: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.action, self.message)
    }
}

/// Executes scripts against a story, collecting skip diagnostics.
#[derive(Debug, Default)]
pub struct Interpreter {
    diagnostics: Vec<ScriptDiagnostic>,
}

impl Interpreter {
    /// Create an interpreter with an empty diagnostic log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics accumulated so far.
    pub fn diagnostics(&self) -> &[ScriptDiagnostic] {
        &self.diagnostics
    }

    /// Drain the accumulated diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<ScriptDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Run a script in order against the story's state and current section.
    /// Never errors; problems are recorded as diagnostics.
    pub fn execute(
        &mut self,
        story: &mut Story,
        actions: &[Action],
        prompts: &mut dyn PromptSource,
    ) {
        for action in actions {
            self.run(story, action, prompts);
        }
    }

    fn run(&mut self, story: &mut Story, action: &Action, prompts: &mut dyn PromptSource) {
        match action {
            Action::None => {}
            Action::Input { variable, prompt } => {
                if !self.require(action, &[("VARIABLE", variable), ("STRING", prompt)]) {
                    return;
                }
                match prompts.prompt(prompt) {
                    Some(value) => {
                        story.state_mut().variables.insert(variable.clone(), value);
                    }
                    None => self.skip(action, "input cancelled"),
                }
            }
            Action::Set { variable, value } => {
                if self.require(action, &[("VARIABLE", variable), ("STRING", value)]) {
                    story
                        .state_mut()
                        .variables
                        .insert(variable.clone(), value.clone());
                }
            }
            Action::AddToVariable { variable, amount } => {
                if !self.require(action, &[("VARIABLE", variable), ("STRING", amount)]) {
                    return;
                }
                let Ok(delta) = amount.trim().parse::<f64>() else {
                    self.skip(action, format!("non-numeric amount \"{amount}\""));
                    return;
                };
                let state = story.state_mut();
                let base = state
                    .variables
                    .get(variable)
                    .map(|v| v.trim().parse::<f64>().unwrap_or(0.0))
                    .unwrap_or(0.0);
                state
                    .variables
                    .insert(variable.clone(), format_number(base + delta));
            }
            Action::CompareDo {
                variable,
                op,
                value,
                then,
            } => {
                if !self.require(action, &[("VARIABLE", variable), ("STRING", value)]) {
                    return;
                }
                let current = story.variable(variable).map(str::to_string);
                match current {
                    Some(left) if !left.is_empty() => {
                        if op.holds(&left, value) {
                            self.run(story, then, prompts);
                        }
                    }
                    _ => self.skip(action, format!("variable \"{variable}\" is not set")),
                }
            }
            Action::IfSetDo { variable, then } => {
                if !self.require(action, &[("VARIABLE", variable)]) {
                    return;
                }
                if is_truthy(story, variable) {
                    self.run(story, then, prompts);
                }
            }
            Action::IfNotSetDo { variable, then } => {
                if !self.require(action, &[("VARIABLE", variable)]) {
                    return;
                }
                if !is_truthy(story, variable) {
                    self.run(story, then, prompts);
                }
            }
            Action::AddChoice { target, text } => {
                if self.require(action, &[("SECTION", target), ("STRING", text)]) {
                    self.add_choice(story, action, target, text);
                }
            }
            Action::RemoveChoice { target } => {
                if self.require(action, &[("SECTION", target)]) {
                    self.remove_choice(story, action, target);
                }
            }
            Action::IfSetAddChoice {
                variable,
                target,
                text,
            } => {
                if !self.require(
                    action,
                    &[("VARIABLE", variable), ("SECTION", target), ("STRING", text)],
                ) {
                    return;
                }
                if is_truthy(story, variable) {
                    self.add_choice(story, action, target, text);
                }
            }
            Action::IfSetRemoveChoice { variable, target } => {
                if !self.require(action, &[("VARIABLE", variable), ("SECTION", target)]) {
                    return;
                }
                if is_truthy(story, variable) {
                    self.remove_choice(story, action, target);
                }
            }
            Action::Malformed { .. } => self.skip(action, "unknown or malformed action"),
        }
    }

    /// Append a choice to the current section unless an identical one (same
    /// target and same text) is already present.
    fn add_choice(&mut self, story: &mut Story, action: &Action, target: &str, text: &str) {
        let Some(section) = self.current_section_mut(story, action) else {
            return;
        };
        let exists = section
            .next
            .iter()
            .any(|c| c.next.as_id() == target && c.text == text);
        if !exists {
            section.next.push(Choice {
                text: text.to_string(),
                next: SectionRef::Id(target.to_string()),
            });
        }
    }

    /// Remove the first choice on the current section pointing at `target`.
    /// No-op when none matches.
    fn remove_choice(&mut self, story: &mut Story, action: &Action, target: &str) {
        let Some(section) = self.current_section_mut(story, action) else {
            return;
        };
        if let Some(pos) = section.next.iter().position(|c| c.next.as_id() == target) {
            section.next.remove(pos);
        }
    }

    fn current_section_mut<'a>(
        &mut self,
        story: &'a mut Story,
        action: &Action,
    ) -> Option<&'a mut crate::story::Section> {
        let Some(id) = story
            .state
            .as_ref()
            .and_then(|s| s.current_section.clone())
        else {
            self.skip(action, "no current section");
            return None;
        };
        if story.sections.contains_key(&id) {
            story.sections.get_mut(&id)
        } else {
            self.skip(action, format!("current section \"{id}\" does not exist"));
            None
        }
    }

    /// Check that every required parameter is non-empty. The wire format has
    /// no way to omit a slot, so an empty string is "absent"; the action is
    /// skipped with a diagnostic rather than erroring.
    fn require(&mut self, action: &Action, params: &[(&str, &str)]) -> bool {
        for (role, value) in params {
            if value.is_empty() {
                self.skip(action, format!("missing {role} parameter"));
                return false;
            }
        }
        true
    }

    fn skip(&mut self, action: &Action, message: impl Into<String>) {
        self.diagnostics
            .push(ScriptDiagnostic::new(action.tag(), message));
    }
}

/// A variable is truthy when it is set to a non-empty string.
fn is_truthy(story: &Story, variable: &str) -> bool {
    story.variable(variable).is_some_and(|v| !v.is_empty())
}

/// Render an arithmetic result the way authors write counters: integral
/// values without a decimal point.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CompareOp;
    use proptest::prelude::*;

    /// Prompt source that replays scripted answers.
    struct ScriptedPrompt(Vec<Option<String>>);

    impl PromptSource for ScriptedPrompt {
        fn prompt(&mut self, _message: &str) -> Option<String> {
            self.0.pop().flatten()
        }
    }

    fn test_story() -> Story {
        Story::from_json(
            r#"{
                "state": {"current_section": "1"},
                "sections": {
                    "1": {"id": "1", "text": "Start", "next": [{"text": "on", "next": "2"}]},
                    "2": {"id": "2", "text": "End"}
                }
            }"#,
        )
        .unwrap()
    }

    fn run(story: &mut Story, actions: &[Action]) -> Vec<ScriptDiagnostic> {
        let mut interpreter = Interpreter::new();
        interpreter.execute(story, actions, &mut NoPrompt);
        interpreter.take_diagnostics()
    }

    fn set(variable: &str, value: &str) -> Action {
        Action::Set {
            variable: variable.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn set_assigns_variable() {
        let mut story = test_story();
        let diags = run(&mut story, &[set("gold", "10")]);
        assert!(diags.is_empty());
        assert_eq!(story.variable("gold"), Some("10"));
    }

    #[test]
    fn set_with_empty_parameter_is_skipped() {
        let mut story = test_story();
        let diags = run(&mut story, &[set("", "10"), set("gold", "")]);
        assert_eq!(diags.len(), 2);
        assert!(story.variable("gold").is_none());
    }

    #[test]
    fn add_to_variable_defaults_to_zero() {
        let mut story = test_story();
        run(
            &mut story,
            &[Action::AddToVariable {
                variable: "gold".to_string(),
                amount: "4".to_string(),
            }],
        );
        assert_eq!(story.variable("gold"), Some("4"));
    }

    #[test]
    fn add_to_variable_accumulates_as_string() {
        let mut story = test_story();
        let add = Action::AddToVariable {
            variable: "gold".to_string(),
            amount: "2.5".to_string(),
        };
        run(&mut story, &[set("gold", "1"), add.clone(), add]);
        assert_eq!(story.variable("gold"), Some("6"));
    }

    #[test]
    fn add_to_variable_non_numeric_amount_skips() {
        let mut story = test_story();
        let diags = run(
            &mut story,
            &[
                set("gold", "3"),
                Action::AddToVariable {
                    variable: "gold".to_string(),
                    amount: "many".to_string(),
                },
            ],
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(story.variable("gold"), Some("3"));
    }

    #[test]
    fn compare_do_dispatches_when_true() {
        let mut story = test_story();
        run(
            &mut story,
            &[
                set("gold", "10"),
                Action::CompareDo {
                    variable: "gold".to_string(),
                    op: CompareOp::Ge,
                    value: "10".to_string(),
                    then: Box::new(set("rich", "yes")),
                },
            ],
        );
        assert_eq!(story.variable("rich"), Some("yes"));
    }

    #[test]
    fn compare_do_unset_variable_is_logged_noop() {
        let mut story = test_story();
        let diags = run(
            &mut story,
            &[Action::CompareDo {
                variable: "gold".to_string(),
                op: CompareOp::Eq,
                value: "10".to_string(),
                then: Box::new(set("rich", "yes")),
            }],
        );
        assert_eq!(diags.len(), 1);
        assert!(story.variable("rich").is_none());
    }

    #[test]
    fn if_set_gates() {
        let mut story = test_story();
        run(
            &mut story,
            &[
                Action::IfSetDo {
                    variable: "seen".to_string(),
                    then: Box::new(set("a", "1")),
                },
                Action::IfNotSetDo {
                    variable: "seen".to_string(),
                    then: Box::new(set("b", "1")),
                },
            ],
        );
        assert!(story.variable("a").is_none());
        assert_eq!(story.variable("b"), Some("1"));
    }

    #[test]
    fn add_choice_is_idempotent() {
        let mut story = test_story();
        let add = Action::AddChoice {
            target: "2".to_string(),
            text: "Secret door".to_string(),
        };
        run(&mut story, &[add.clone(), add]);
        let next = &story.sections["1"].next;
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].text, "Secret door");
    }

    #[test]
    fn add_choice_same_target_different_text_is_added() {
        let mut story = test_story();
        run(
            &mut story,
            &[Action::AddChoice {
                target: "2".to_string(),
                text: "Another way on".to_string(),
            }],
        );
        assert_eq!(story.sections["1"].next.len(), 2);
    }

    #[test]
    fn remove_choice_removes_first_match() {
        let mut story = test_story();
        run(
            &mut story,
            &[Action::RemoveChoice {
                target: "2".to_string(),
            }],
        );
        assert!(story.sections["1"].next.is_empty());

        // Removing again is a silent no-op.
        let diags = run(
            &mut story,
            &[Action::RemoveChoice {
                target: "2".to_string(),
            }],
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn remove_choice_matches_numeric_targets() {
        let mut story = Story::from_json(
            r#"{
                "state": {"current_section": "1"},
                "sections": {
                    "1": {"id": "1", "next": [{"text": "on", "next": 2}]},
                    "2": {"id": "2"}
                }
            }"#,
        )
        .unwrap();
        run(
            &mut story,
            &[Action::RemoveChoice {
                target: "2".to_string(),
            }],
        );
        assert!(story.sections["1"].next.is_empty());
    }

    #[test]
    fn gated_choice_actions() {
        let mut story = test_story();
        run(
            &mut story,
            &[
                Action::IfSetAddChoice {
                    variable: "key".to_string(),
                    target: "2".to_string(),
                    text: "Unlock".to_string(),
                },
                set("key", "1"),
                Action::IfSetAddChoice {
                    variable: "key".to_string(),
                    target: "2".to_string(),
                    text: "Unlock".to_string(),
                },
                Action::IfSetRemoveChoice {
                    variable: "key".to_string(),
                    target: "2".to_string(),
                },
            ],
        );
        // First add was gated off; the later add appended, then the remove
        // took the first choice pointing at "2" (the original one).
        let next = &story.sections["1"].next;
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].text, "Unlock");
    }

    #[test]
    fn missing_current_section_is_logged_noop() {
        let mut story = test_story();
        story.state_mut().current_section = None;
        let diags = run(
            &mut story,
            &[Action::AddChoice {
                target: "2".to_string(),
                text: "go".to_string(),
            }],
        );
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("no current section"));
    }

    #[test]
    fn input_assigns_prompted_value() {
        let mut story = test_story();
        let mut interpreter = Interpreter::new();
        let mut prompts = ScriptedPrompt(vec![Some("Ada".to_string())]);
        interpreter.execute(
            &mut story,
            &[Action::Input {
                variable: "name".to_string(),
                prompt: "Your name?".to_string(),
            }],
            &mut prompts,
        );
        assert_eq!(story.variable("name"), Some("Ada"));
        assert!(interpreter.diagnostics().is_empty());
    }

    #[test]
    fn input_cancel_is_logged_noop() {
        let mut story = test_story();
        let diags = run(
            &mut story,
            &[Action::Input {
                variable: "name".to_string(),
                prompt: "Your name?".to_string(),
            }],
        );
        assert_eq!(diags.len(), 1);
        assert!(story.variable("name").is_none());
    }

    #[test]
    fn malformed_actions_never_panic() {
        let mut story = test_story();
        let script = vec![
            Action::from_wire("EXPLODE", vec!["x".to_string()]),
            Action::from_wire("SET", vec![]),
            Action::from_wire("COMPARE_DO", vec!["a".to_string()]),
            Action::None,
        ];
        let diags = run(&mut story, &script);
        // NONE is fine, the other three are diagnostic skips.
        assert_eq!(diags.len(), 3);
    }

    proptest! {
        #[test]
        fn add_to_variable_arithmetic(a in -1000i64..1000, b in -1000i64..1000) {
            let mut story = test_story();
            run(&mut story, &[
                set("v", &a.to_string()),
                Action::AddToVariable {
                    variable: "v".to_string(),
                    amount: b.to_string(),
                },
            ]);
            let expected = (a + b).to_string();
            prop_assert_eq!(story.variable("v"), Some(expected.as_str()));
        }
    }
}
