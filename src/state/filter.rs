//! Case-insensitive substring filter over the rows

use super::rows::RowList;
use log::debug;

#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    query: String,
    /// Matching row indices; `None` when no filter is active
    indices: Option<Vec<usize>>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `rows` by `query`. A blank query shows every row.
    pub fn apply(&mut self, query: &str, rows: &RowList) {
        self.query = query.trim().to_string();

        if self.query.is_empty() {
            self.indices = None;
            return;
        }

        let needle = self.query.to_lowercase();
        let indices: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, text)| text.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();

        debug!("Filter '{}' matched {} rows", self.query, indices.len());
        self.indices = Some(indices);
    }

    /// Run the current query again after rows changed
    pub fn reapply(&mut self, rows: &RowList) {
        let query = std::mem::take(&mut self.query);
        self.apply(&query, rows);
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.indices = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        self.indices.is_some()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        match &self.indices {
            Some(indices) => indices.contains(&index),
            None => true,
        }
    }

    /// Visible row indices in display order
    pub fn visible(&self, num_items: usize) -> Vec<usize> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..num_items).collect(),
        }
    }
}
