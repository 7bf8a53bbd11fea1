//! # Stateful Match Cursor
//!
//! A [`Matcher`] binds one compiled pattern to one input and walks
//! successive matches. It is a state machine over fresh /
//! positioned-at-match / exhausted: `find` advances, group and position
//! queries are only legal while positioned, and exhaustion is sticky
//! until an explicit `reset`. One cursor per caller; share the
//! [`Pattern`] instead.
//!
//! Capability-restricted operations (group extraction, region bounds,
//! incremental replace) are gated per engine and fail with
//! [`PolyregexError::Capability`] rather than degrading silently.

use regex_automata::Input;

use crate::engine::{Capability, Engine};
use crate::errors::{PolyResult, PolyregexError};
use crate::pattern::{EngineImpl, Pattern};

/// A stateful cursor over one input for one pattern.
///
/// Iterating a `Matcher` yields successive matched substrings, lazily;
/// once exhausted it stays empty until [`Matcher::reset`].
pub struct Matcher<'p, 'h> {
    pattern: &'p Pattern,
    haystack: &'h str,

    /// Next search origin, in absolute haystack offsets.
    at: usize,
    state: State<'h>,
    append_pos: usize,

    region_start: usize,
    region_end: usize,
    transparent: bool,
    anchoring: bool,
}

enum State<'h> {
    Fresh,
    Matched(MatchData<'h>),
    Done,
}

/// The engine-native view of the current match.
///
/// `start`/`end` are absolute haystack offsets; capture positions
/// inside `caps` may be relative to a region slice and are shifted by
/// `base` on the way out.
enum MatchData<'h> {
    Backtracking {
        caps: fancy_regex::Captures<'h>,
        base: usize,
        start: usize,
        end: usize,
    },
    Dfa {
        start: usize,
        end: usize,
    },
    LinearNfa {
        caps: regex::Captures<'h>,
        start: usize,
        end: usize,
    },
}

impl MatchData<'_> {
    fn span(&self) -> (usize, usize) {
        match self {
            MatchData::Backtracking { start, end, .. }
            | MatchData::Dfa { start, end }
            | MatchData::LinearNfa { start, end, .. } => (*start, *end),
        }
    }
}

/// The first char boundary strictly after `i`.
///
/// Past the end of the haystack this keeps growing, which is what lets
/// a zero-width match at the very end terminate the next `find`.
fn next_boundary(
    haystack: &str,
    i: usize,
) -> usize {
    if i >= haystack.len() {
        return haystack.len() + 1;
    }
    let mut j = i + 1;
    while j < haystack.len() && !haystack.is_char_boundary(j) {
        j += 1;
    }
    j
}

fn engine_error(
    engine: Engine,
    message: impl core::fmt::Display,
) -> PolyregexError {
    PolyregexError::Engine {
        engine,
        message: message.to_string(),
    }
}

impl<'p, 'h> Matcher<'p, 'h> {
    pub(crate) fn new(
        pattern: &'p Pattern,
        haystack: &'h str,
    ) -> Self {
        Self {
            pattern,
            haystack,
            at: 0,
            state: State::Fresh,
            append_pos: 0,
            region_start: 0,
            region_end: haystack.len(),
            transparent: false,
            anchoring: true,
        }
    }

    /// The pattern this cursor was created from.
    pub fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    /// The input this cursor is bound to.
    pub fn haystack(&self) -> &'h str {
        self.haystack
    }

    fn gate(
        &self,
        capability: Capability,
    ) -> PolyResult<()> {
        if self.pattern.supports(capability) {
            Ok(())
        } else {
            Err(PolyregexError::Capability {
                engine: self.pattern.engine(),
                capability,
            })
        }
    }

    fn positioned(&self) -> PolyResult<&MatchData<'h>> {
        match &self.state {
            State::Matched(data) => Ok(data),
            _ => Err(PolyregexError::IllegalState(
                "no match available; call find() first".to_string(),
            )),
        }
    }

    fn clear_position(&mut self) {
        if matches!(self.state, State::Matched(_)) {
            self.state = State::Fresh;
        }
    }

    /// Position the cursor at `data` and advance the search origin
    /// past it, stepping over zero-width matches so iteration
    /// terminates.
    fn position_at(
        &mut self,
        data: MatchData<'h>,
    ) {
        let (start, end) = data.span();
        self.at = if start == end {
            next_boundary(self.haystack, end)
        } else {
            end
        };
        self.state = State::Matched(data);
    }

    // ---- searching -------------------------------------------------

    fn search_at(
        &self,
        from: usize,
    ) -> PolyResult<Option<MatchData<'h>>> {
        match &self.pattern.imp {
            EngineImpl::LinearNfa { re, .. } => {
                if from > self.haystack.len() {
                    return Ok(None);
                }
                Ok(re.captures_at(self.haystack, from).and_then(|caps| {
                    let g = caps.get(0)?;
                    Some(MatchData::LinearNfa {
                        start: g.start(),
                        end: g.end(),
                        caps,
                    })
                }))
            }
            EngineImpl::Dfa { re, .. } => {
                if from > self.haystack.len() {
                    return Ok(None);
                }
                let input = Input::new(self.haystack).range(from..);
                let m = re
                    .try_search(&input)
                    .map_err(|e| engine_error(Engine::Dfa, e))?;
                Ok(m.map(|m| MatchData::Dfa {
                    start: m.start(),
                    end: m.end(),
                }))
            }
            EngineImpl::Backtracking { re, .. } => self.backtracking_search(re, from),
        }
    }

    /// Region-aware search on the backtracking engine.
    ///
    /// With opaque anchoring bounds (the defaults) the region is
    /// searched as a slice, so `^`/`$` anchor at the region edges.
    /// Otherwise the haystack prefix up to the region end is searched
    /// from the origin: lookbehind sees the text before the region,
    /// the region end stays a hard input edge (greedy matches truncate
    /// there), but lookahead cannot see past it.
    fn backtracking_search(
        &self,
        re: &fancy_regex::Regex,
        from: usize,
    ) -> PolyResult<Option<MatchData<'h>>> {
        let (rs, ren) = (self.region_start, self.region_end);

        if !self.transparent && self.anchoring {
            if from > ren {
                return Ok(None);
            }
            let hay = &self.haystack[rs..ren];
            let pos = from.saturating_sub(rs);
            let caps = re
                .captures_from_pos(hay, pos)
                .map_err(|e| engine_error(Engine::Backtracking, e))?;
            return Ok(caps.and_then(|caps| {
                let g = caps.get(0)?;
                Some(MatchData::Backtracking {
                    start: g.start() + rs,
                    end: g.end() + rs,
                    base: rs,
                    caps,
                })
            }));
        }

        let hay = &self.haystack[..ren];
        let pos = from.max(rs);
        if pos > hay.len() {
            return Ok(None);
        }
        let caps = re
            .captures_from_pos(hay, pos)
            .map_err(|e| engine_error(Engine::Backtracking, e))?;
        Ok(caps.and_then(|caps| {
            let g = caps.get(0)?;
            Some(MatchData::Backtracking {
                start: g.start(),
                end: g.end(),
                base: 0,
                caps,
            })
        }))
    }

    fn full_match(&self) -> PolyResult<Option<MatchData<'h>>> {
        match &self.pattern.imp {
            EngineImpl::LinearNfa { full, .. } => {
                Ok(full.captures(self.haystack).and_then(|caps| {
                    let g = caps.get(0)?;
                    Some(MatchData::LinearNfa {
                        start: g.start(),
                        end: g.end(),
                        caps,
                    })
                }))
            }
            EngineImpl::Dfa { full, .. } => {
                let input = Input::new(self.haystack);
                let m = full
                    .try_search(&input)
                    .map_err(|e| engine_error(Engine::Dfa, e))?;
                Ok(m.map(|_| MatchData::Dfa {
                    start: 0,
                    end: self.haystack.len(),
                }))
            }
            EngineImpl::Backtracking { full, .. } => {
                let (rs, ren) = (self.region_start, self.region_end);
                let hay = &self.haystack[rs..ren];
                let caps = full
                    .captures(hay)
                    .map_err(|e| engine_error(Engine::Backtracking, e))?;
                Ok(caps.and_then(|caps| {
                    let g = caps.get(0)?;
                    Some(MatchData::Backtracking {
                        start: g.start() + rs,
                        end: g.end() + rs,
                        base: rs,
                        caps,
                    })
                }))
            }
        }
    }

    // ---- cursor operations -----------------------------------------

    /// Advance to the next match.
    ///
    /// ## Returns
    /// `true` and positions the cursor at the match, or `false` and
    /// exhausts the cursor. Exhaustion is sticky until [`Matcher::reset`].
    pub fn find(&mut self) -> PolyResult<bool> {
        if matches!(self.state, State::Done) {
            return Ok(false);
        }
        let from = self.at.max(self.region_start);
        match self.search_at(from)? {
            Some(data) => {
                self.position_at(data);
                Ok(true)
            }
            None => {
                self.state = State::Done;
                Ok(false)
            }
        }
    }

    /// Reset the cursor, then search from the given origin.
    ///
    /// ## Arguments
    /// * `from` - Absolute search origin; must lie on a char boundary.
    pub fn find_from(
        &mut self,
        from: usize,
    ) -> PolyResult<bool> {
        if !self.haystack.is_char_boundary(from) {
            return Err(PolyregexError::IllegalState(format!(
                "search origin {from} is not a valid position"
            )));
        }
        self.reset();
        self.at = from;
        self.find()
    }

    /// Does the pattern match the whole input (or, on the backtracking
    /// engine, the whole region)?
    ///
    /// On success the cursor is positioned at the match and later
    /// `find` calls continue past it; a failed call leaves the search
    /// origin where it was.
    pub fn matches(&mut self) -> PolyResult<bool> {
        match self.full_match()? {
            Some(data) => {
                self.position_at(data);
                Ok(true)
            }
            None => {
                self.clear_position();
                Ok(false)
            }
        }
    }

    /// Does the pattern match starting exactly at the region start,
    /// without requiring the match to span the whole input?
    ///
    /// On success the cursor is positioned at the match and later
    /// `find` calls continue past it.
    pub fn looking_at(&mut self) -> PolyResult<bool> {
        let origin = self.region_start;
        match self.search_at(origin)? {
            Some(data) if data.span().0 == origin => {
                self.position_at(data);
                Ok(true)
            }
            _ => {
                self.clear_position();
                Ok(false)
            }
        }
    }

    /// Return the cursor to its fresh state on the same input.
    ///
    /// The region returns to the whole input; transparent/anchoring
    /// bounds settings persist.
    pub fn reset(&mut self) -> &mut Self {
        self.at = 0;
        self.append_pos = 0;
        self.state = State::Fresh;
        self.region_start = 0;
        self.region_end = self.haystack.len();
        self
    }

    /// Rebind the cursor to a new input, consuming this one.
    pub fn reset_with<'i>(
        self,
        haystack: &'i str,
    ) -> Matcher<'p, 'i> {
        let mut m = Matcher::new(self.pattern, haystack);
        m.transparent = self.transparent;
        m.anchoring = self.anchoring;
        m
    }

    // ---- match queries ---------------------------------------------

    /// Start offset of the current match.
    pub fn start(&self) -> PolyResult<usize> {
        Ok(self.positioned()?.span().0)
    }

    /// End offset of the current match.
    pub fn end(&self) -> PolyResult<usize> {
        Ok(self.positioned()?.span().1)
    }

    /// The text of the current match (group 0).
    pub fn group(&self) -> PolyResult<&'h str> {
        let (start, end) = self.positioned()?.span();
        Ok(&self.haystack[start..end])
    }

    /// The text captured by group `group`, or `None` if the group did
    /// not participate in the match.
    ///
    /// Group 0 is available on every engine; higher indices require the
    /// indexed-groups capability.
    pub fn group_at(
        &self,
        group: usize,
    ) -> PolyResult<Option<&'h str>> {
        if group == 0 {
            return self.group().map(Some);
        }
        self.gate(Capability::IndexedGroups)?;
        self.check_group_index(group)?;
        Ok(match self.positioned()? {
            MatchData::Backtracking { caps, .. } => caps.get(group).map(|g| g.as_str()),
            MatchData::LinearNfa { caps, .. } => caps.get(group).map(|g| g.as_str()),
            // Rejected by the capability gate.
            MatchData::Dfa { .. } => None,
        })
    }

    /// The text captured by the named group `name`.
    ///
    /// Requires the named-groups capability.
    pub fn group_name(
        &self,
        name: &str,
    ) -> PolyResult<Option<&'h str>> {
        self.gate(Capability::NamedGroups)?;
        if !self.pattern.has_group_name(name) {
            return Err(PolyregexError::NoSuchGroup(name.to_string()));
        }
        Ok(match self.positioned()? {
            MatchData::Backtracking { caps, .. } => caps.name(name).map(|g| g.as_str()),
            MatchData::LinearNfa { caps, .. } => caps.name(name).map(|g| g.as_str()),
            // Rejected by the capability gate.
            MatchData::Dfa { .. } => None,
        })
    }

    /// Start offset of group `group` within the current match.
    pub fn group_start(
        &self,
        group: usize,
    ) -> PolyResult<Option<usize>> {
        if group == 0 {
            return self.start().map(Some);
        }
        self.gate(Capability::IndexedGroups)?;
        self.check_group_index(group)?;
        Ok(match self.positioned()? {
            MatchData::Backtracking { caps, base, .. } => caps.get(group).map(|g| g.start() + base),
            MatchData::LinearNfa { caps, .. } => caps.get(group).map(|g| g.start()),
            MatchData::Dfa { .. } => None,
        })
    }

    /// End offset of group `group` within the current match.
    pub fn group_end(
        &self,
        group: usize,
    ) -> PolyResult<Option<usize>> {
        if group == 0 {
            return self.end().map(Some);
        }
        self.gate(Capability::IndexedGroups)?;
        self.check_group_index(group)?;
        Ok(match self.positioned()? {
            MatchData::Backtracking { caps, base, .. } => caps.get(group).map(|g| g.end() + base),
            MatchData::LinearNfa { caps, .. } => caps.get(group).map(|g| g.end()),
            MatchData::Dfa { .. } => None,
        })
    }

    /// The number of capture groups in the pattern, excluding group 0.
    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// The texts of groups `1..=group_count()` for the current match.
    pub fn groups(&self) -> PolyResult<Vec<Option<&'h str>>> {
        (1..=self.group_count()).map(|i| self.group_at(i)).collect()
    }

    fn check_group_index(
        &self,
        group: usize,
    ) -> PolyResult<()> {
        if group > self.pattern.group_count() {
            Err(PolyregexError::NoSuchGroup(group.to_string()))
        } else {
            Ok(())
        }
    }

    // ---- region bounds (backtracking engine only) ------------------

    /// Constrain searching to `start..end`.
    ///
    /// Resets the cursor. Requires the region-bounds capability.
    pub fn set_region(
        &mut self,
        start: usize,
        end: usize,
    ) -> PolyResult<&mut Self> {
        self.gate(Capability::RegionBounds)?;
        if start > end
            || !self.haystack.is_char_boundary(start)
            || !self.haystack.is_char_boundary(end)
        {
            return Err(PolyregexError::IllegalState(format!(
                "invalid region {start}..{end} for haystack of length {}",
                self.haystack.len()
            )));
        }
        self.reset();
        self.region_start = start;
        self.region_end = end;
        self.at = start;
        Ok(self)
    }

    /// Start of the current region.
    pub fn region_start(&self) -> PolyResult<usize> {
        self.gate(Capability::RegionBounds)?;
        Ok(self.region_start)
    }

    /// End of the current region.
    pub fn region_end(&self) -> PolyResult<usize> {
        self.gate(Capability::RegionBounds)?;
        Ok(self.region_end)
    }

    /// Let lookaround see outside the region.
    ///
    /// Transparent bounds keep the text before the region visible to
    /// lookbehind; the region end remains a hard input edge, so
    /// lookahead cannot see past it.
    pub fn use_transparent_bounds(
        &mut self,
        transparent: bool,
    ) -> PolyResult<&mut Self> {
        self.gate(Capability::RegionBounds)?;
        self.transparent = transparent;
        Ok(self)
    }

    /// Whether this cursor uses transparent bounds.
    pub fn has_transparent_bounds(&self) -> PolyResult<bool> {
        self.gate(Capability::RegionBounds)?;
        Ok(self.transparent)
    }

    /// Let `^`/`$` match at the region edges (the default).
    ///
    /// Anchoring bounds are only fully honored together with opaque
    /// bounds, where the region is searched as a slice.
    pub fn use_anchoring_bounds(
        &mut self,
        anchoring: bool,
    ) -> PolyResult<&mut Self> {
        self.gate(Capability::RegionBounds)?;
        self.anchoring = anchoring;
        Ok(self)
    }

    /// Whether this cursor uses anchoring bounds.
    pub fn has_anchoring_bounds(&self) -> PolyResult<bool> {
        self.gate(Capability::RegionBounds)?;
        Ok(self.anchoring)
    }

    // ---- replacement -----------------------------------------------

    /// Append the unmatched gap and the `$`-template expansion of
    /// `replacement` for the current match to `dst`.
    ///
    /// Requires the incremental-replace capability.
    pub fn append_replacement(
        &mut self,
        dst: &mut String,
        replacement: &str,
    ) -> PolyResult<()> {
        self.gate(Capability::IncrementalReplace)?;
        let (start, end) = self.positioned()?.span();
        if self.append_pos > start {
            return Err(PolyregexError::IllegalState(format!(
                "append position {} is past match start {start}",
                self.append_pos
            )));
        }
        dst.push_str(&self.haystack[self.append_pos..start]);
        match self.positioned()? {
            MatchData::Backtracking { caps, .. } => {
                fancy_regex::Expander::default().append_expansion(dst, replacement, caps);
            }
            MatchData::LinearNfa { caps, .. } => caps.expand(replacement, dst),
            // Rejected by the capability gate.
            MatchData::Dfa { .. } => {}
        }
        self.append_pos = end;
        Ok(())
    }

    /// Append everything after the last replaced match to `dst`.
    pub fn append_tail(
        &self,
        dst: &mut String,
    ) {
        dst.push_str(&self.haystack[self.append_pos..]);
    }

    /// Replace every match with the result of `f`, treated as a
    /// `$`-template.
    pub fn replace<F>(
        &mut self,
        mut f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.replace_with(|_, text| f(text))
    }

    /// Replace every match with the result of `f`, which also receives
    /// the positioned cursor for group access.
    pub fn replace_with<F>(
        &mut self,
        mut f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&Matcher<'p, 'h>, &str) -> String,
    {
        self.gate(Capability::IncrementalReplace)?;
        let mut out = String::new();
        while self.find()? {
            let matched = self.group()?;
            let replacement = f(self, matched);
            self.append_replacement(&mut out, &replacement)?;
        }
        self.append_tail(&mut out);
        Ok(out)
    }

    /// Like [`Matcher::replace`], but `$` in the result of `f` is
    /// escaped and substituted literally.
    pub fn subst<F>(
        &mut self,
        mut f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.subst_with(|_, text| f(text))
    }

    /// Like [`Matcher::replace_with`], but `$` in the result of `f` is
    /// escaped and substituted literally.
    pub fn subst_with<F>(
        &mut self,
        mut f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&Matcher<'p, 'h>, &str) -> String,
    {
        self.replace_with(|m, text| f(m, text).replace('$', "$$"))
    }
}

impl<'h> Iterator for Matcher<'_, 'h> {
    type Item = PolyResult<&'h str>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.find() {
            Ok(true) => Some(self.group()),
            Ok(false) => None,
            Err(err) => {
                self.state = State::Done;
                Some(Err(err))
            }
        }
    }
}
