//! Caching highlighter engine with a background warmer thread (spec.md
//! §4.6, C5/C6). Ported from `HighlighterEngine.{h,cc}`: a per-row span
//! cache stamped with the buffer version that produced it, a parallel
//! per-row lexer-state cache for stateful highlighters, and a worker thread
//! that prefetches a margin around the visible viewport so scrolling doesn't
//! stall on cache misses.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::trace;

use crate::highlighter::{Highlighter, LineSource};
use crate::types::{LineHighlight, LineState};

#[derive(Clone)]
struct StateEntry {
    version: u64,
    state: LineState,
}

#[derive(Default)]
struct Shared {
    highlighter: Option<Box<dyn Highlighter>>,
    cache: HashMap<usize, LineHighlight>,
    state_cache: HashMap<usize, StateEntry>,
}

struct WarmJob {
    src: Arc<dyn LineSource + Send + Sync>,
    version: u64,
    start: usize,
    end: usize,
}

/// A single pending-job slot rather than a queue: spec.md §4.5 requires a
/// newer prefetch request to replace whatever the warmer hasn't started
/// yet, not queue behind it — scrolling fast should only ever warm the
/// latest viewport, never a backlog of stale ones.
#[derive(Default)]
struct WarmSlot {
    job: Option<WarmJob>,
    shutdown: bool,
}

pub struct HighlighterEngine {
    shared: Arc<Mutex<Shared>>,
    slot: Arc<(Mutex<WarmSlot>, Condvar)>,
    worker: Option<JoinHandle<()>>,
}

impl Default for HighlighterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlighterEngine {
    pub fn new() -> Self {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let slot: Arc<(Mutex<WarmSlot>, Condvar)> = Arc::new((Mutex::new(WarmSlot::default()), Condvar::new()));
        let worker_shared = shared.clone();
        let worker_slot = slot.clone();
        let worker = thread::Builder::new()
            .name("quill-syntax-warmer".into())
            .spawn(move || {
                let (lock, cvar) = &*worker_slot;
                loop {
                    let job = {
                        let mut guard = lock.lock().unwrap();
                        while guard.job.is_none() && !guard.shutdown {
                            guard = cvar.wait(guard).unwrap();
                        }
                        if guard.shutdown && guard.job.is_none() {
                            break;
                        }
                        guard.job.take()
                    };
                    if let Some(job) = job {
                        for row in job.start..=job.end {
                            compute_line(&worker_shared, job.src.as_ref(), row, job.version);
                        }
                    }
                }
            })
            .expect("spawn syntax warmer thread");
        Self {
            shared,
            slot,
            worker: Some(worker),
        }
    }

    pub fn set_highlighter(&self, hl: Box<dyn Highlighter>) {
        let mut s = self.shared.lock().unwrap();
        s.highlighter = Some(hl);
        s.cache.clear();
        s.state_cache.clear();
    }

    pub fn has_highlighter(&self) -> bool {
        self.shared.lock().unwrap().highlighter.is_some()
    }

    /// Drop cached spans/state for every row `>= row` (spec.md §4.6: any
    /// edit invalidates everything after it, never before).
    pub fn invalidate_from(&self, row: usize) {
        let mut s = self.shared.lock().unwrap();
        s.cache.retain(|&r, _| r < row);
        s.state_cache.retain(|&r, _| r < row);
        trace!(target: "syntax.engine", row, "invalidate_from");
    }

    pub fn get_line(&self, src: &dyn LineSource, row: usize, version: u64) -> LineHighlight {
        compute_line(&self.shared, src, row, version)
    }

    /// Synchronously highlight the visible range, then enqueue a background
    /// warm of `warm_margin` extra lines on either side.
    pub fn prefetch_viewport(
        &self,
        src: Arc<dyn LineSource + Send + Sync>,
        first_row: usize,
        row_count: usize,
        version: u64,
        warm_margin: usize,
    ) {
        if row_count == 0 {
            return;
        }
        let max_rows = src.nrows();
        if max_rows == 0 || first_row >= max_rows {
            return;
        }
        let start = first_row;
        let end = (start + row_count - 1).min(max_rows - 1);
        for row in start..=end {
            self.get_line(src.as_ref(), row, version);
        }

        let warm_start = start.saturating_sub(warm_margin);
        let warm_end = (end + warm_margin).min(max_rows - 1);
        let (lock, cvar) = &*self.slot;
        {
            let mut guard = lock.lock().unwrap();
            guard.job = Some(WarmJob {
                src,
                version,
                start: warm_start,
                end: warm_end,
            });
        }
        cvar.notify_one();
    }
}

impl Drop for HighlighterEngine {
    fn drop(&mut self) {
        {
            let (lock, cvar) = &*self.slot;
            let mut guard = lock.lock().unwrap();
            guard.shutdown = true;
            guard.job = None;
            cvar.notify_one();
        }
        if let Some(w) = self.worker.take() {
            let _ = w.join();
        }
    }
}

fn compute_line(shared: &Arc<Mutex<Shared>>, src: &dyn LineSource, row: usize, version: u64) -> LineHighlight {
    if let Some(hit) = shared.lock().unwrap().cache.get(&row)
        && hit.version == version
    {
        return hit.clone();
    }

    let (has_hl, stateful) = {
        let s = shared.lock().unwrap();
        (s.highlighter.is_some(), s.highlighter.as_ref().map(|h| h.is_stateful()).unwrap_or(false))
    };
    if !has_hl {
        let lh = LineHighlight { spans: Vec::new(), version };
        shared.lock().unwrap().cache.insert(row, lh.clone());
        return lh;
    }

    if !stateful {
        let line = src.line(row);
        let spans = {
            let s = shared.lock().unwrap();
            s.highlighter.as_ref().unwrap().highlight(&line, row, &LineState::default()).0
        };
        let lh = LineHighlight { spans, version };
        shared.lock().unwrap().cache.insert(row, lh.clone());
        return lh;
    }

    // Stateful path: find the highest cached row below `row` still valid for
    // this version, and replay forward from there. Mirrors the original's
    // linear scan over its state cache rather than a proper interval index.
    let start_row = {
        let s = shared.lock().unwrap();
        s.state_cache
            .iter()
            .filter(|&(&r, e)| r < row && e.version == version)
            .map(|(&r, _)| r)
            .max()
    };
    let mut cur_state = match start_row {
        Some(r) => shared.lock().unwrap().state_cache.get(&r).unwrap().state.clone(),
        None => LineState::default(),
    };

    let mut result = LineHighlight { spans: Vec::new(), version };
    let from = start_row.map(|r| r + 1).unwrap_or(0);
    for r in from..=row {
        let line = src.line(r);
        let (spans, next_state) = {
            let s = shared.lock().unwrap();
            s.highlighter.as_ref().unwrap().highlight(&line, r, &cur_state)
        };
        shared.lock().unwrap().state_cache.insert(
            r,
            StateEntry {
                version,
                state: next_state.clone(),
            },
        );
        cur_state = next_state;
        if r == row {
            result = LineHighlight { spans, version };
        }
    }
    shared.lock().unwrap().cache.insert(row, result.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    struct FixedLines(Vec<String>);
    impl LineSource for FixedLines {
        fn nrows(&self) -> usize {
            self.0.len()
        }
        fn line(&self, row: usize) -> String {
            self.0.get(row).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn cache_hit_returns_same_version_without_recompute() {
        let engine = HighlighterEngine::new();
        engine.set_highlighter(registry::create_for("json"));
        let src = FixedLines(vec![r#"{"a": 1}"#.into()]);
        let first = engine.get_line(&src, 0, 1);
        let second = engine.get_line(&src, 0, 1);
        assert_eq!(first.spans, second.spans);
    }

    #[test]
    fn version_bump_invalidates_cache() {
        let engine = HighlighterEngine::new();
        engine.set_highlighter(registry::create_for("json"));
        let src = FixedLines(vec!["1".into()]);
        let v1 = engine.get_line(&src, 0, 1);
        let src2 = FixedLines(vec!["22".into()]);
        let v2 = engine.get_line(&src2, 0, 2);
        assert_ne!(v1.spans, v2.spans);
    }

    #[test]
    fn stateful_highlighter_replays_from_best_prior_row() {
        let engine = HighlighterEngine::new();
        engine.set_highlighter(registry::create_for("cpp"));
        let src = FixedLines(vec!["/* start".into(), "still".into(), "end */ int x;".into()]);
        let last = engine.get_line(&src, 2, 1);
        assert!(last.spans.iter().any(|s| s.kind == crate::types::TokenKind::Comment));
    }

    #[test]
    fn invalidate_from_drops_only_later_rows() {
        let engine = HighlighterEngine::new();
        engine.set_highlighter(registry::create_for("json"));
        let src = FixedLines(vec!["1".into(), "2".into()]);
        engine.get_line(&src, 0, 1);
        engine.get_line(&src, 1, 1);
        engine.invalidate_from(1);
        let s = engine.shared.lock().unwrap();
        assert!(s.cache.contains_key(&0));
        assert!(!s.cache.contains_key(&1));
    }

    #[test]
    fn prefetch_viewport_warms_synchronously_and_in_background() {
        let engine = HighlighterEngine::new();
        engine.set_highlighter(registry::create_for("json"));
        let src: Arc<dyn LineSource + Send + Sync> =
            Arc::new(FixedLines((0..10).map(|i| i.to_string()).collect()));
        engine.prefetch_viewport(src, 2, 3, 1, 50);
        // visible rows are synchronous, so they're cached immediately.
        let s = engine.shared.lock().unwrap();
        assert!(s.cache.contains_key(&2));
        assert!(s.cache.contains_key(&4));
    }
}
