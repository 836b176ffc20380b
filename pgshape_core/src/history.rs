use crate::results::QueryResult;
use std::collections::VecDeque;
use std::sync::Arc;

/// Every executed statement's record, most recent first. Entries are never evicted.
#[derive(Clone, Debug, Default)]
pub struct QueryHistory {
    entries: VecDeque<Arc<QueryResult>>,
}

impl QueryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: QueryResult) -> Arc<QueryResult> {
        let result = Arc::new(result);
        self.entries.push_front(Arc::clone(&result));
        result
    }

    /// The record `offset` steps back from the most recent one
    #[must_use]
    pub fn last(&self, offset: usize) -> Option<&Arc<QueryResult>> {
        self.entries.get(offset)
    }

    /// The record `offset` steps forward from the oldest one
    #[must_use]
    pub fn first(&self, offset: usize) -> Option<&Arc<QueryResult>> {
        let index = self.entries.len().checked_sub(offset.checked_add(1)?)?;
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<QueryResult>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
