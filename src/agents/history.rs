use crate::llm_client::ConversationTurn;

/// Ordered log of exchanged turns.
///
/// Unbounded unless a turn limit is given. With a limit, whole user/assistant
/// pairs are evicted from the front so the log always opens on a user turn.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
    max_turns: Option<usize>,
}

impl ConversationHistory {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits are rounded down to an even count, minimum one pair.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: limit.map(|max| (max - max % 2).max(2)),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[cfg(test)]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[cfg(test)]
    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Current turns followed by a not-yet-recorded user turn.
    pub fn with_pending(&self, user_text: &str) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.extend(self.turns.iter().cloned());
        messages.push(ConversationTurn::user(user_text));
        messages
    }

    pub fn record_exchange(&mut self, user_text: String, assistant_text: String) {
        self.turns.push(ConversationTurn::user(user_text));
        self.turns.push(ConversationTurn::assistant(assistant_text));

        if let Some(max) = self.max_turns {
            while self.turns.len() > max {
                self.turns.drain(..2);
            }
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
