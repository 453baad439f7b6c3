use serde::Deserialize;

/// Input JSON from the Claude Code hook system (Stop event)
#[derive(Debug, Deserialize)]
pub struct HookInput {
    pub transcript_path: Option<String>,
    /// Set when Claude is already continuing because of a previous block
    #[serde(default)]
    pub stop_hook_active: bool,
    pub session_id: Option<String>,
    /// Working directory, used to discover qa-gate.yaml
    pub cwd: Option<String>,
}

impl HookInput {
    /// Parse hook input. Anything unparsable is `None`, which callers treat as "allow stop".
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(input) => Some(input),
            Err(e) => {
                tracing::debug!("failed to parse hook input: {e}");
                None
            }
        }
    }

    /// Transcript path, treating an empty string as absent
    pub fn transcript_path(&self) -> Option<&str> {
        self.transcript_path.as_deref().filter(|p| !p.is_empty())
    }
}
