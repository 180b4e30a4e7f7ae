use tracing::warn;

use crate::concept::ConceptNode;
use crate::service::ServiceError;

/// Browser-like navigation over concept trees.
///
/// Single owner, single writer: every mutation happens on the event loop, so
/// no locking is needed. History entries are full node snapshots: going back
/// and forward restores the exact tree that was displayed, never a re-fetch.
///
/// A fetch spans two edges: `begin_navigation` runs synchronously when the
/// user asks for a keyword, `finish_navigation` runs when the response (or
/// failure) comes in. The history mutations happen on the first edge and are
/// deliberately not rolled back on failure.
#[derive(Debug, Default)]
pub struct NavigationState {
    current: Option<ConceptNode>,
    back_stack: Vec<ConceptNode>,
    forward_stack: Vec<ConceptNode>,
    loading: bool,
    query: String,
    seq: u64,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a navigation to `keyword` and returns the fetch sequence number
    /// to hand back to `finish_navigation`.
    ///
    /// Overlapping navigations are not deduplicated: a second call while a
    /// fetch is outstanding simply issues a second fetch, and whichever
    /// response resolves last overwrites `current` (see `finish_navigation`).
    pub fn begin_navigation(&mut self, keyword: &str) -> u64 {
        self.loading = true;
        self.query = keyword.to_string();

        if let Some(current) = &self.current {
            self.back_stack.push(current.clone());
        }
        // New navigation invalidates redo history, even if the fetch later fails.
        self.forward_stack.clear();

        self.seq += 1;
        self.seq
    }

    /// Resolves the fetch started by `begin_navigation`.
    ///
    /// On success the node becomes current; on failure the screen keeps
    /// showing the previous tree (fail soft) and the error only goes to the
    /// diagnostic log. Responses arriving out of order are logged but still
    /// applied; last write wins, matching the observed service behavior.
    pub fn finish_navigation(&mut self, seq: u64, result: Result<ConceptNode, ServiceError>) {
        self.loading = false;

        match result {
            Ok(node) => {
                if seq != self.seq {
                    warn!(
                        seq,
                        latest = self.seq,
                        "stale concept response overwrites a newer navigation"
                    );
                }
                self.current = Some(node);
            }
            Err(err) => {
                warn!(seq, query = %self.query, error = %err, "concept fetch failed");
            }
        }
    }

    /// Steps back to the previously displayed tree. No-op when there is no
    /// history; never touches the network.
    pub fn go_back(&mut self) {
        if let Some(previous) = self.back_stack.pop() {
            if let Some(current) = self.current.take() {
                self.forward_stack.push(current);
            }
            self.current = Some(previous);
        }
    }

    /// Redoes a navigation undone by `go_back`. No-op when nothing was undone.
    pub fn go_forward(&mut self) {
        if let Some(next) = self.forward_stack.pop() {
            if let Some(current) = self.current.take() {
                self.back_stack.push(current);
            }
            self.current = Some(next);
        }
    }

    pub fn current(&self) -> Option<&ConceptNode> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn back_len(&self) -> usize {
        self.back_stack.len()
    }

    pub fn forward_len(&self) -> usize {
        self.forward_stack.len()
    }
}
