//! The script instruction model and its flat wire codec.
//!
//! On the wire an action is `{"action": TAG, "parameters": [..strings..]}`.
//! A parameter slot may itself name a nested action tag, with the nested
//! action's own parameters following inline in the same flat array. This
//! module decodes that encoding into a recursive [`Action`] tree (any
//! nesting depth) and re-encodes it losslessly. Wire actions that do not
//! decode (unknown tags, missing or trailing parameters) are preserved
//! verbatim as [`Action::Malformed`] so a story file always round-trips.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Comparison operators understood by `COMPARE_DO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`: numeric when both operands parse as numbers, else by string.
    Eq,
    /// `!=`: string inequality.
    Ne,
    /// `>`: numeric, false when either operand is not a number.
    Gt,
    /// `>=`: numeric, false when either operand is not a number.
    Ge,
    /// `<=`: numeric, false when either operand is not a number.
    Le,
    /// `<`: numeric, false when either operand is not a number.
    Lt,
}

impl CompareOp {
    /// Parse an operator from its wire symbol.
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            "<" => Some(Self::Lt),
            _ => None,
        }
    }

    /// The operator's wire symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Lt => "<",
        }
    }

    /// Evaluate the comparison over two string operands.
    pub fn holds(self, left: &str, right: &str) -> bool {
        let nums = || -> Option<(f64, f64)> {
            Some((
                left.trim().parse::<f64>().ok()?,
                right.trim().parse::<f64>().ok()?,
            ))
        };
        match self {
            Self::Eq => match nums() {
                Some((a, b)) => a == b,
                None => left == right,
            },
            Self::Ne => left != right,
            Self::Gt => nums().is_some_and(|(a, b)| a > b),
            Self::Ge => nums().is_some_and(|(a, b)| a >= b),
            Self::Le => nums().is_some_and(|(a, b)| a <= b),
            Self::Lt => nums().is_some_and(|(a, b)| a < b),
        }
    }
}

/// A single script instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `NONE`: does nothing.
    None,
    /// `INPUT`: ask the player for a value and assign it to a variable.
    Input {
        /// Variable to assign.
        variable: String,
        /// Prompt shown to the player.
        prompt: String,
    },
    /// `SET`: assign a literal string to a variable.
    Set {
        /// Variable to assign.
        variable: String,
        /// Literal value.
        value: String,
    },
    /// `ADD_TO_VARIABLE`: numeric addition, stored back as a string.
    AddToVariable {
        /// Variable to adjust. Unset counts as `"0"`.
        variable: String,
        /// Amount to add, as a numeric string.
        amount: String,
    },
    /// `COMPARE_DO`: run a nested action when a comparison holds.
    CompareDo {
        /// Variable whose value is the left operand. Unset means no-op.
        variable: String,
        /// Comparison operator.
        op: CompareOp,
        /// Right operand.
        value: String,
        /// Action dispatched when the comparison holds.
        then: Box<Action>,
    },
    /// `IF_SET_DO`: run a nested action when a variable is set and
    /// non-empty.
    IfSetDo {
        /// Gate variable.
        variable: String,
        /// Action dispatched when the gate is truthy.
        then: Box<Action>,
    },
    /// `IF_NOT_SET_DO`: run a nested action when a variable is unset or
    /// empty.
    IfNotSetDo {
        /// Gate variable.
        variable: String,
        /// Action dispatched when the gate is falsy.
        then: Box<Action>,
    },
    /// `ADD_CHOICE`: append a choice to the current section, skipping
    /// exact duplicates.
    AddChoice {
        /// Target section id.
        target: String,
        /// Choice label.
        text: String,
    },
    /// `REMOVE_CHOICE`: remove the first choice on the current section
    /// pointing at a target.
    RemoveChoice {
        /// Target section id.
        target: String,
    },
    /// `IF_SET_ADD_CHOICE`: `ADD_CHOICE` gated on a variable.
    IfSetAddChoice {
        /// Gate variable.
        variable: String,
        /// Target section id.
        target: String,
        /// Choice label.
        text: String,
    },
    /// `IF_SET_REMOVE_CHOICE`: `REMOVE_CHOICE` gated on a variable.
    IfSetRemoveChoice {
        /// Gate variable.
        variable: String,
        /// Target section id.
        target: String,
    },
    /// A wire action that did not decode. Kept verbatim so the story file
    /// round-trips; the interpreter skips it with a diagnostic.
    Malformed {
        /// The wire tag as written.
        tag: String,
        /// The wire parameters as written.
        parameters: Vec<String>,
    },
}

impl Action {
    /// The wire tag for this action.
    pub fn tag(&self) -> &str {
        match self {
            Action::None => "NONE",
            Action::Input { .. } => "INPUT",
            Action::Set { .. } => "SET",
            Action::AddToVariable { .. } => "ADD_TO_VARIABLE",
            Action::CompareDo { .. } => "COMPARE_DO",
            Action::IfSetDo { .. } => "IF_SET_DO",
            Action::IfNotSetDo { .. } => "IF_NOT_SET_DO",
            Action::AddChoice { .. } => "ADD_CHOICE",
            Action::RemoveChoice { .. } => "REMOVE_CHOICE",
            Action::IfSetAddChoice { .. } => "IF_SET_ADD_CHOICE",
            Action::IfSetRemoveChoice { .. } => "IF_SET_REMOVE_CHOICE",
            Action::Malformed { tag, .. } => tag,
        }
    }

    /// Decode one wire action. Anything that does not decode cleanly is
    /// preserved as [`Action::Malformed`].
    pub fn from_wire(tag: &str, parameters: Vec<String>) -> Self {
        match decode(tag, &parameters) {
            Some((action, used)) if used == parameters.len() => action,
            _ => Action::Malformed {
                tag: tag.to_string(),
                parameters,
            },
        }
    }

    /// Encode to the flat wire form: the tag plus its parameter list.
    pub fn to_wire(&self) -> (String, Vec<String>) {
        let mut parameters = Vec::new();
        self.push_params(&mut parameters);
        (self.tag().to_string(), parameters)
    }

    fn push_params(&self, out: &mut Vec<String>) {
        match self {
            Action::None => {}
            Action::Input { variable, prompt } => {
                out.extend([variable.clone(), prompt.clone()]);
            }
            Action::Set { variable, value } => {
                out.extend([variable.clone(), value.clone()]);
            }
            Action::AddToVariable { variable, amount } => {
                out.extend([variable.clone(), amount.clone()]);
            }
            Action::CompareDo {
                variable,
                op,
                value,
                then,
            } => {
                out.extend([variable.clone(), op.symbol().to_string(), value.clone()]);
                out.push(then.tag().to_string());
                then.push_params(out);
            }
            Action::IfSetDo { variable, then } | Action::IfNotSetDo { variable, then } => {
                out.push(variable.clone());
                out.push(then.tag().to_string());
                then.push_params(out);
            }
            Action::AddChoice { target, text } => {
                out.extend([target.clone(), text.clone()]);
            }
            Action::RemoveChoice { target } => out.push(target.clone()),
            Action::IfSetAddChoice {
                variable,
                target,
                text,
            } => {
                out.extend([variable.clone(), target.clone(), text.clone()]);
            }
            Action::IfSetRemoveChoice { variable, target } => {
                out.extend([variable.clone(), target.clone()]);
            }
            Action::Malformed { parameters, .. } => out.extend(parameters.iter().cloned()),
        }
    }
}

/// Decode a tag and its parameter slice. Returns the action and how many
/// parameters it consumed, or `None` when the encoding is malformed.
fn decode(tag: &str, params: &[String]) -> Option<(Action, usize)> {
    match tag {
        "NONE" => Some((Action::None, 0)),
        "INPUT" => (params.len() >= 2).then(|| {
            (
                Action::Input {
                    variable: params[0].clone(),
                    prompt: params[1].clone(),
                },
                2,
            )
        }),
        "SET" => (params.len() >= 2).then(|| {
            (
                Action::Set {
                    variable: params[0].clone(),
                    value: params[1].clone(),
                },
                2,
            )
        }),
        "ADD_TO_VARIABLE" => (params.len() >= 2).then(|| {
            (
                Action::AddToVariable {
                    variable: params[0].clone(),
                    amount: params[1].clone(),
                },
                2,
            )
        }),
        "COMPARE_DO" => {
            if params.len() < 4 {
                return None;
            }
            let op = CompareOp::parse(&params[1])?;
            let (then, used) = decode(&params[3], &params[4..])?;
            Some((
                Action::CompareDo {
                    variable: params[0].clone(),
                    op,
                    value: params[2].clone(),
                    then: Box::new(then),
                },
                4 + used,
            ))
        }
        "IF_SET_DO" | "IF_NOT_SET_DO" => {
            if params.len() < 2 {
                return None;
            }
            let (then, used) = decode(&params[1], &params[2..])?;
            let variable = params[0].clone();
            let then = Box::new(then);
            let action = if tag == "IF_SET_DO" {
                Action::IfSetDo { variable, then }
            } else {
                Action::IfNotSetDo { variable, then }
            };
            Some((action, 2 + used))
        }
        "ADD_CHOICE" => (params.len() >= 2).then(|| {
            (
                Action::AddChoice {
                    target: params[0].clone(),
                    text: params[1].clone(),
                },
                2,
            )
        }),
        "REMOVE_CHOICE" => (!params.is_empty()).then(|| {
            (
                Action::RemoveChoice {
                    target: params[0].clone(),
                },
                1,
            )
        }),
        "IF_SET_ADD_CHOICE" => (params.len() >= 3).then(|| {
            (
                Action::IfSetAddChoice {
                    variable: params[0].clone(),
                    target: params[1].clone(),
                    text: params[2].clone(),
                },
                3,
            )
        }),
        "IF_SET_REMOVE_CHOICE" => (params.len() >= 2).then(|| {
            (
                Action::IfSetRemoveChoice {
                    variable: params[0].clone(),
                    target: params[1].clone(),
                },
                2,
            )
        }),
        _ => None,
    }
}

#[derive(Serialize, Deserialize)]
struct WireAction {
    action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<String>,
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (action, parameters) = self.to_wire();
        WireAction { action, parameters }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireAction::deserialize(deserializer)?;
        Ok(Action::from_wire(&wire.action, wire.parameters))
    }
}
