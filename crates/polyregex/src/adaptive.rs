//! # Adaptive Engine Selection
//!
//! [`AdaptivePattern`] composes behaviorally equivalent candidate
//! patterns (typically the same source compiled on different engines)
//! and converges on the fastest one for the workload it actually sees.
//!
//! The policy is uniform exploration followed by a permanent commit,
//! not a bandit: pattern cost is stationary, so once enough samples
//! exist there is nothing left to learn. During exploration every
//! routed call is timed against the round-robin candidate; at the trial
//! threshold the candidate with the minimum cumulative elapsed time
//! wins, ties going to the lowest index. After that the selector is a
//! read-only delegate.
//!
//! Bookkeeping is shared across caller threads: elapsed slots and the
//! call counter are atomics, and the winner is published through a
//! write-once cell, so a thread that observes the winner routes to it
//! and writes nothing further. A thread already mid-sample when the
//! winner lands may still complete its add; that stray sample cannot
//! change the already-published winner.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::errors::{PolyResult, PolyregexError};
use crate::matchable::Matchable;
use crate::matcher::Matcher;
use crate::pattern::Pattern;

/// The default number of timed calls before committing to a winner.
pub const DEFAULT_TRIAL: u64 = 100;

/// An online explore/exploit selector over candidate patterns.
///
/// Implements [`Matchable`], so it drops in anywhere a
/// [`Pattern`] does. Candidates are assumed behaviorally equivalent on
/// the inputs they will see; a failing candidate call propagates
/// immediately and is never retried on another engine.
pub struct AdaptivePattern {
    candidates: Vec<Pattern>,

    /// Cumulative elapsed nanoseconds per candidate. Monotone;
    /// never reset.
    elapsed: Vec<AtomicU64>,
    calls: AtomicU64,
    trial: u64,
    winner: OnceLock<usize>,
}

impl AdaptivePattern {
    /// Create a selector with the default trial threshold.
    ///
    /// ## Arguments
    /// * `candidates` - The candidate patterns, in round-robin and
    ///   tie-break order.
    ///
    /// ## Returns
    /// The selector, or [`PolyregexError::Configuration`] if
    /// `candidates` is empty.
    pub fn new(candidates: Vec<Pattern>) -> PolyResult<Self> {
        Self::with_trial(candidates, DEFAULT_TRIAL)
    }

    /// Create a selector that commits after `trial` timed calls.
    pub fn with_trial(
        candidates: Vec<Pattern>,
        trial: u64,
    ) -> PolyResult<Self> {
        if candidates.is_empty() {
            return Err(PolyregexError::Configuration(
                "adaptive pattern requires at least one candidate".to_string(),
            ));
        }
        let elapsed = candidates.iter().map(|_| AtomicU64::new(0)).collect();
        Ok(Self {
            candidates,
            elapsed,
            calls: AtomicU64::new(0),
            trial,
            winner: OnceLock::new(),
        })
    }

    /// The candidate patterns, in round-robin order.
    pub fn candidates(&self) -> &[Pattern] {
        &self.candidates
    }

    /// The configured trial threshold.
    pub fn trial(&self) -> u64 {
        self.trial
    }

    /// The number of timed exploration calls recorded so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }

    /// Has the selector committed to a winner?
    pub fn converged(&self) -> bool {
        self.winner.get().is_some()
    }

    /// The winning candidate, once the selector has converged.
    pub fn winner(&self) -> Option<&Pattern> {
        self.winner.get().map(|&w| &self.candidates[w])
    }

    /// The index of the winning candidate, once converged.
    pub fn winner_index(&self) -> Option<usize> {
        self.winner.get().copied()
    }

    /// The committed candidate, or `None` while still exploring.
    ///
    /// Checked on every routed call; once this returns `Some` it
    /// returns the same index forever and no bookkeeping is touched.
    fn choose(&self) -> Option<usize> {
        if let Some(&w) = self.winner.get() {
            return Some(w);
        }
        if self.calls.load(Ordering::Acquire) >= self.trial {
            let w = *self.winner.get_or_init(|| {
                let w = self.fastest_index();
                log::debug!(
                    "adaptive pattern `{}` converged on candidate {w} ({} engine) \
                     after {} calls",
                    self.candidates[w].as_str(),
                    self.candidates[w].engine(),
                    self.trial,
                );
                w
            });
            return Some(w);
        }
        None
    }

    /// Argmin over cumulative elapsed time; ties go to the lowest index.
    fn fastest_index(&self) -> usize {
        let mut best = 0;
        let mut best_elapsed = self.elapsed[0].load(Ordering::Acquire);
        for (idx, slot) in self.elapsed.iter().enumerate().skip(1) {
            let elapsed = slot.load(Ordering::Acquire);
            if elapsed < best_elapsed {
                best = idx;
                best_elapsed = elapsed;
            }
        }
        best
    }

    /// Route an infallible operation, timing it during exploration.
    fn route<'s, R>(
        &'s self,
        op: impl FnOnce(&'s Pattern) -> R,
    ) -> R {
        match self.choose() {
            Some(w) => op(&self.candidates[w]),
            None => {
                let idx = self.explore_index();
                let started = Instant::now();
                let out = op(&self.candidates[idx]);
                self.record(idx, started);
                out
            }
        }
    }

    /// Route a fallible operation; a failed call is not recorded.
    fn try_route<'s, R>(
        &'s self,
        op: impl FnOnce(&'s Pattern) -> PolyResult<R>,
    ) -> PolyResult<R> {
        match self.choose() {
            Some(w) => op(&self.candidates[w]),
            None => {
                let idx = self.explore_index();
                let started = Instant::now();
                let out = op(&self.candidates[idx]);
                if out.is_ok() {
                    self.record(idx, started);
                }
                out
            }
        }
    }

    fn explore_index(&self) -> usize {
        (self.calls.load(Ordering::Acquire) % self.candidates.len() as u64) as usize
    }

    fn record(
        &self,
        idx: usize,
        started: Instant,
    ) {
        let nanos = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.elapsed[idx].fetch_add(nanos, Ordering::AcqRel);
        self.calls.fetch_add(1, Ordering::AcqRel);
    }
}

impl Matchable for AdaptivePattern {
    fn pattern(&self) -> &str {
        self.route(|p| p.as_str())
    }

    fn matcher<'h>(
        &self,
        haystack: &'h str,
    ) -> Matcher<'_, 'h> {
        // The timed work is cursor construction; the cursor itself
        // outlives the routed call.
        self.route(|p| p.matcher(haystack))
    }

    fn test(
        &self,
        haystack: &str,
    ) -> PolyResult<bool> {
        self.try_route(|p| p.test(haystack))
    }

    fn find(
        &self,
        haystack: &str,
    ) -> PolyResult<bool> {
        self.try_route(|p| p.find(haystack))
    }

    fn split_n<'h>(
        &self,
        haystack: &'h str,
        limit: isize,
    ) -> PolyResult<Vec<&'h str>> {
        self.try_route(|p| p.split_n(haystack, limit))
    }

    fn replace_limited(
        &self,
        haystack: &str,
        replacement: &str,
        max: usize,
    ) -> PolyResult<String> {
        self.try_route(|p| p.replace_limited(haystack, replacement, max))
    }

    fn replace<F>(
        &self,
        haystack: &str,
        f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.try_route(|p| p.replace(haystack, f))
    }

    fn subst<F>(
        &self,
        haystack: &str,
        f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.try_route(|p| p.subst(haystack, f))
    }
}

impl core::fmt::Debug for AdaptivePattern {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("AdaptivePattern")
            .field("pattern", &self.candidates[0].as_str())
            .field("candidates", &self.candidates.len())
            .field("trial", &self.trial)
            .field("calls", &self.calls())
            .field("winner", &self.winner_index())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(trial: u64) -> AdaptivePattern {
        AdaptivePattern::with_trial(Pattern::compile_all(r"\w+").unwrap(), trial).unwrap()
    }

    #[test]
    fn test_empty_candidates_rejected() {
        assert!(matches!(
            AdaptivePattern::new(Vec::new()),
            Err(PolyregexError::Configuration(_))
        ));
    }

    #[test]
    fn test_explores_then_converges() {
        let sel = selector(6);

        for _ in 0..6 {
            assert!(!sel.converged());
            assert!(sel.test("word").unwrap());
        }
        assert_eq!(sel.calls(), 6);

        // The sixth recorded call crosses the threshold; the next call
        // commits.
        assert!(sel.test("word").unwrap());
        assert!(sel.converged());
        assert!(sel.winner_index().is_some());

        // Converged: bookkeeping is frozen.
        let calls = sel.calls();
        let snapshot: Vec<u64> = sel
            .elapsed
            .iter()
            .map(|e| e.load(Ordering::Acquire))
            .collect();
        for _ in 0..20 {
            assert!(sel.test("word").unwrap());
        }
        assert_eq!(sel.calls(), calls);
        let after: Vec<u64> = sel
            .elapsed
            .iter()
            .map(|e| e.load(Ordering::Acquire))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_winner_is_argmin_of_elapsed() {
        let sel = selector(3);

        // Synthetic costs: candidate 1 is cheapest.
        sel.elapsed[0].store(3_000, Ordering::Release);
        sel.elapsed[1].store(1_000, Ordering::Release);
        sel.elapsed[2].store(2_000, Ordering::Release);
        sel.calls.store(3, Ordering::Release);

        assert!(sel.test("word").unwrap());
        assert_eq!(sel.winner_index(), Some(1));
        assert_eq!(sel.winner().unwrap().engine(), crate::Engine::Dfa);
    }

    #[test]
    fn test_ties_break_to_lowest_index() {
        for _ in 0..10 {
            let sel = selector(3);
            sel.elapsed[0].store(500, Ordering::Release);
            sel.elapsed[1].store(500, Ordering::Release);
            sel.elapsed[2].store(500, Ordering::Release);
            sel.calls.store(3, Ordering::Release);

            sel.pattern();
            assert_eq!(sel.winner_index(), Some(0));
        }
    }

    #[test]
    fn test_round_robin_during_exploration() {
        let sel = selector(90);

        for _ in 0..9 {
            assert!(sel.test("word").unwrap());
        }

        // Three candidates, nine calls: every slot saw three samples.
        assert_eq!(sel.calls(), 9);
        for slot in &sel.elapsed {
            assert!(slot.load(Ordering::Acquire) > 0);
        }
    }

    #[test]
    fn test_failed_calls_are_not_recorded() {
        // A DFA candidate cannot do template replacement; the error
        // must propagate without polluting the timings.
        let sel = AdaptivePattern::with_trial(
            vec![Pattern::dfa(r"\w+").unwrap()],
            10,
        )
        .unwrap();

        assert!(sel.replace("foo", |s| s.to_string()).is_err());
        assert_eq!(sel.calls(), 0);
        assert_eq!(sel.elapsed[0].load(Ordering::Acquire), 0);

        // Successful calls still count.
        assert!(sel.test("foo").unwrap());
        assert_eq!(sel.calls(), 1);
    }

    #[test]
    fn test_surface_matches_pattern_surface() {
        let sel = selector(4);

        assert_eq!(sel.pattern(), r"\w+");
        assert_eq!(sel.replace_all("a b", "x").unwrap(), "x x");
        assert_eq!(sel.replace_first("a b", "x").unwrap(), "x b");

        let tokens: Vec<&str> = sel
            .matcher("foo.bar")
            .collect::<PolyResult<_>>()
            .unwrap();
        assert_eq!(tokens, ["foo", "bar"]);

        let delim =
            AdaptivePattern::with_trial(Pattern::compile_all(r"\.").unwrap(), 4).unwrap();
        assert_eq!(delim.split("a.b.c").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_exploration_converges_once() {
        let sel = std::sync::Arc::new(selector(64));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let sel = sel.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        assert!(sel.test("word").unwrap());
                    }
                });
            }
        });

        assert!(sel.converged());
        let w = sel.winner_index().unwrap();
        assert!(w < sel.candidates().len());
    }
}
