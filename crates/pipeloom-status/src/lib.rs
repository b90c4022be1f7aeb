//! Status / Message Bus.
//!
//! Two message kinds: ephemeral (auto-clears after a configured TTL,
//! default 1500 ms) and persistent (cleared only by a superseding message).
//! The bus itself never renders anything — it only tracks current text and
//! timer identity; the parent application is responsible for display
//! the builder itself never renders status — this bus just tracks it.

use std::time::{Duration, Instant};

pub const DEFAULT_EPHEMERAL_TTL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_persistent: bool,
}

impl StatusMessage {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_persistent: false,
        }
    }

    pub fn persistent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_persistent: true,
        }
    }

    /// Convenience constructors matching the bus's fixed lead glyphs.
    pub fn success(text: impl Into<String>) -> Self {
        Self::ephemeral(format!("\u{2713} {}", text.into()))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::ephemeral(format!("\u{00d7} {}", text.into()))
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::ephemeral(format!("\u{26a0} {}", text.into()))
    }
}

/// Identity of a scheduled auto-clear timer. A clear event carries the id it
/// was scheduled for; the bus ignores clears that target a superseded timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct ActiveTimer {
    id: TimerId,
    expires_at: Instant,
}

pub struct StatusBus {
    current: Option<StatusMessage>,
    timer: Option<ActiveTimer>,
    next_id: u64,
    ttl: Duration,
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new(DEFAULT_EPHEMERAL_TTL)
    }
}

impl StatusBus {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            timer: None,
            next_id: 0,
            ttl,
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    /// Post a new message. Any running timer is cancelled first (a new
    /// ephemeral supersedes, a persistent message cancels and leaves none
    /// running). Returns the `TimerId` the runtime must schedule a
    /// `clear_if_current` call for after `ttl`, or `None` for a persistent
    /// message.
    pub fn post(&mut self, message: StatusMessage) -> Option<TimerId> {
        self.timer = None;
        let scheduled = if message.is_persistent {
            None
        } else {
            let id = self.alloc_timer_id();
            self.timer = Some(ActiveTimer {
                id,
                expires_at: Instant::now() + self.ttl,
            });
            Some(id)
        };
        self.current = Some(message);
        scheduled
    }

    /// Explicit clear event: sets text empty and drops any timer.
    pub fn clear(&mut self) {
        self.current = None;
        self.timer = None;
    }

    /// Runtime delivery of a scheduled timer firing. Ignored if `id` no
    /// longer matches the active timer (superseded or already cleared).
    pub fn clear_if_current(&mut self, id: TimerId) {
        if self.timer.as_ref().map(|t| t.id) == Some(id) {
            self.current = None;
            self.timer = None;
        }
    }

    /// Poll-based alternative to `clear_if_current`, for runtimes driving
    /// expiry off a coarse periodic tick rather than per-message timers.
    /// Returns true if a message was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(t) = &self.timer {
            if now >= t.expires_at {
                self.current = None;
                self.timer = None;
                return true;
            }
        }
        false
    }

    fn alloc_timer_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }
}
