//! Session-scoped, append-only log of conversation turns.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    System,
    Persona(String),
    User,
    Assistant,
    /// A person commenting on a panel discussion; never triggers generation.
    Human(String),
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::System => write!(f, "System"),
            Speaker::Persona(name) | Speaker::Human(name) => write!(f, "{}", name),
            Speaker::User => write!(f, "User"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// Cosmetic output attached to a turn. Carries no data from the corpus or the generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideArtifact {
    pub title: String,
    /// Ready-to-embed HTML snippet.
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTurn {
    /// Monotonic position within the session, starting at 0.
    pub seq: u64,
    pub speaker: Speaker,
    pub text: String,
    pub artifact: Option<SideArtifact>,
}

/// Turns are only ever appended; the store hands out shared references, so a turn cannot be
/// edited after it is recorded.
#[derive(Debug, Default)]
pub struct SessionTranscript {
    turns: Vec<GenerationTurn>,
    next_seq: u64,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        speaker: Speaker,
        text: impl Into<String>,
        artifact: Option<SideArtifact>,
    ) -> &GenerationTurn {
        let turn = GenerationTurn {
            seq: self.next_seq,
            speaker,
            text: text.into(),
            artifact,
        };
        self.next_seq += 1;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[GenerationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns appended at or after position `from`.
    pub fn tail(&self, from: usize) -> &[GenerationTurn] {
        &self.turns[from.min(self.turns.len())..]
    }

    /// Ends the session. Sequence numbers restart for the next one.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.next_seq = 0;
    }
}
