use netconf_core_types::RequestContext;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::node_id::ModelNodeId;

/// Per-request working state
///
/// Owns the memo of identity comparisons made while serving one request.
/// Created when a request starts and dropped when it ends, so nothing leaks
/// between requests. Not `Sync`: a scope belongs to the thread serving the
/// request.
#[derive(Debug, Default)]
pub struct RequestScope {
    context: RequestContext,
    comparisons: RefCell<HashMap<ModelNodeId, HashMap<ModelNodeId, Ordering>>>,
}

impl RequestScope {
    pub fn new(context: RequestContext) -> Self {
        Self {
            context,
            comparisons: RefCell::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Memoized [`ModelNodeId`] ordering
    pub fn compare(&self, a: &ModelNodeId, b: &ModelNodeId) -> Ordering {
        if let Some(ord) = self
            .comparisons
            .borrow()
            .get(a)
            .and_then(|row| row.get(b))
        {
            return *ord;
        }

        let ord = a.cmp(b);
        let mut memo = self.comparisons.borrow_mut();
        memo.entry(a.clone()).or_default().insert(b.clone(), ord);
        memo.entry(b.clone())
            .or_default()
            .insert(a.clone(), ord.reverse());
        ord
    }

    /// Sort identities using the memo
    pub fn sort_ids(&self, ids: &mut [ModelNodeId]) {
        ids.sort_by(|a, b| self.compare(a, b));
    }

    /// Number of memoized ordered pairs
    pub fn cached_comparisons(&self) -> usize {
        self.comparisons.borrow().values().map(HashMap::len).sum()
    }

    /// Drop everything memoized so far
    pub fn reset(&self) {
        self.comparisons.borrow_mut().clear();
    }
}
