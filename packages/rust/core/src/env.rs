//! Read-only view over environment variables.

use std::collections::HashMap;

/// Variable lookup used during resolution.
pub trait Environment {
    /// Current value of `name`, if set and valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment. Every lookup reads live state; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // An empty name never matches.
        if name.is_empty() {
            return None;
        }
        std::env::var(name).ok()
    }
}

/// Synthetic environment for tests and embedding.
impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
