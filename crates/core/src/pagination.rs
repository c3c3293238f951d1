//! Pagination parameters shared by listing queries.

use serde::{Deserialize, Serialize};

/// Pagination parameters for listing queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            // Cap at 1000 for safety.
            limit: limit.unwrap_or(50).min(1000),
            offset: offset.unwrap_or(0),
        }
    }

    /// Apply this page to an already-sorted vector.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_capped() {
        let p = Pagination::new(Some(5000), None);
        assert_eq!(p.limit, 1000);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn slice_applies_offset_then_limit() {
        let items: Vec<u32> = (0..10).collect();
        let p = Pagination {
            limit: 3,
            offset: 4,
        };
        assert_eq!(p.slice(&items), vec![4, 5, 6]);
    }

    #[test]
    fn slice_past_the_end_is_empty() {
        let items = vec![1, 2, 3];
        let p = Pagination {
            limit: 10,
            offset: 5,
        };
        assert!(p.slice(&items).is_empty());
    }
}
