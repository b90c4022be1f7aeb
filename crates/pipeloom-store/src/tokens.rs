//! Heuristic `Tokens` estimator.
//!
//! Not a real tokenizer — the core deliberately delegates token-counting
//! algorithms to a collaborator. Approximates the common "~4 characters
//! per token" rule of thumb, which is close enough for a live budget badge.

use pipeloom_collab::{TokenStatus, Tokens};

const CHARS_PER_TOKEN: usize = 4;

pub struct HeuristicTokens {
    warning_at: usize,
    danger_at: usize,
}

impl HeuristicTokens {
    pub fn new(warning_at: usize, danger_at: usize) -> Self {
        Self { warning_at, danger_at }
    }
}

impl Default for HeuristicTokens {
    fn default() -> Self {
        Self::new(3_000, 6_000)
    }
}

impl Tokens for HeuristicTokens {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }

    fn limit_status(&self, estimate: usize) -> TokenStatus {
        if estimate >= self.danger_at {
            TokenStatus::Danger
        } else if estimate >= self.warning_at {
            TokenStatus::Warning
        } else {
            TokenStatus::Good
        }
    }
}
