//! Bounded kill-ring stack with chaining semantics (spec.md §4.4, C4).
//!
//! spec.md §9 open question #2: the original has no explicit bound; this
//! picks 64 entries, matching the spec's proposed default.

/// Default cap on the number of retained kill-ring entries.
pub const KILL_RING_DEFAULT_CAP: usize = 64;

pub struct KillRing {
    entries: Vec<String>,
    cap: usize,
}

impl Default for KillRing {
    fn default() -> Self {
        Self::new(KILL_RING_DEFAULT_CAP)
    }
}

impl KillRing {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Push a brand-new entry onto the ring, evicting the oldest if at cap.
    pub fn push(&mut self, text: impl Into<String>) {
        if self.entries.len() >= self.cap {
            self.entries.remove(0);
        }
        self.entries.push(text.into());
    }

    /// Concatenate `text` onto the top entry (kill-chain forward appends),
    /// creating a fresh entry if the ring is empty.
    pub fn append(&mut self, text: &str) {
        match self.entries.last_mut() {
            Some(top) => top.push_str(text),
            None => self.push(text),
        }
    }

    /// Prepend `text` onto the top entry (kill-chain backward appends,
    /// e.g. backspacing a region left of a prior kill).
    pub fn prepend(&mut self, text: &str) {
        match self.entries.last_mut() {
            Some(top) => *top = format!("{text}{top}"),
            None => self.push(text),
        }
    }

    pub fn head(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_head() {
        let mut k = KillRing::default();
        k.push("a");
        k.push("b");
        assert_eq!(k.head(), Some("b"));
        assert_eq!(k.len(), 2);
    }

    #[test]
    fn append_and_prepend_chain_onto_top() {
        let mut k = KillRing::default();
        k.push("mid");
        k.append("-right");
        k.prepend("left-");
        assert_eq!(k.head(), Some("left-mid-right"));
        assert_eq!(k.len(), 1);
    }

    #[test]
    fn bounded_eviction_drops_oldest() {
        let mut k = KillRing::new(2);
        k.push("1");
        k.push("2");
        k.push("3");
        assert_eq!(k.len(), 2);
        assert_eq!(k.head(), Some("3"));
    }
}
