//! Personas frame a stage's instruction to the completion service.

use serde::{Deserialize, Serialize};

/// The fixed role/goal/backstory triple that gives a stage its voice.
///
/// Immutable once constructed; rendered as the system-level instruction of
/// every completion request the owning stage makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// The role the model should assume.
    pub role: String,
    /// What the role is trying to achieve.
    pub goal: String,
    /// Background that shapes the role's judgment and register.
    pub backstory: String,
}

impl Persona {
    /// Creates a new persona.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Renders the persona as a system-level instruction.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\nYour goal: {goal}\n\nBackground: {backstory}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_carries_all_fields() {
        let persona = Persona::new(
            "Lead Brand Anthropologist",
            "Find where buyers feel overwhelmed",
            "You study daily routines.",
        );

        let prompt = persona.system_prompt();
        assert!(prompt.contains("Lead Brand Anthropologist"));
        assert!(prompt.contains("Find where buyers feel overwhelmed"));
        assert!(prompt.contains("You study daily routines."));
    }

    #[test]
    fn test_persona_serialize_roundtrip() {
        let persona = Persona::new("Editor", "Polish prose", "Calm and grounded.");
        let json = serde_json::to_string(&persona).unwrap();
        let restored: Persona = serde_json::from_str(&json).unwrap();
        assert_eq!(persona, restored);
    }
}
