//! Agent-attach capability for describing executor usage conventions
//!
//! An executor can hand out a capability value that, when attached to a
//! conversational agent, extends that agent's system prompt with instructions
//! for formatting code the executor can consume. This is a configuration
//! concern, not an execution concern: the only effect is a prompt edit, and
//! there is no behavioral contract beyond informing the agent.

/// The narrow seam into an agent: read and replace its system prompt. Agent
/// frameworks implement this on whatever configuration type they own.
pub trait InstructableAgent {
    fn system_prompt(&self) -> Option<&str>;
    fn set_system_prompt(&mut self, prompt: String);
}

/// A capability that gives an agent the ability to use a code executor.
pub trait AgentCapability: Send + Sync {
    fn add_to_agent(&self, agent: &mut dyn InstructableAgent);
}

/// Instructs the agent to emit fenced code blocks with an explicit language
/// tag, so the paired extractor can recover them reliably.
pub struct CodeBlockUsageCapability {
    languages: Vec<String>,
}

impl CodeBlockUsageCapability {
    pub fn new(languages: Vec<String>) -> Self {
        Self { languages }
    }
}

impl AgentCapability for CodeBlockUsageCapability {
    fn add_to_agent(&self, agent: &mut dyn InstructableAgent) {
        let instructions = format!(
            "You have access to a code executor. To run code, reply with one or \
             more Markdown fenced code blocks, each opened with ``` followed \
             immediately by the language tag (supported: {}). Blocks are executed \
             in order and execution stops at the first failing block.",
            self.languages.join(", ")
        );
        let prompt = match agent.system_prompt() {
            Some(existing) if !existing.is_empty() => {
                format!("{}\n\n{}", existing, instructions)
            }
            _ => instructions,
        };
        agent.set_system_prompt(prompt);
    }
}
