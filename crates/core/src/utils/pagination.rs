use serde::{Deserialize, Serialize};

/// One page of a listing, as returned by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// 1-based page request. Values below 1 are clamped to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, page_size: Option<i64>, default_size: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn wrap<T>(&self, items: Vec<T>, total: i64) -> Page<T> {
        Page {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Clamps `skip`/`limit` query values to sane non-negative bounds.
pub fn skip_limit(skip: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64) {
    (skip.unwrap_or(0).max(0), limit.unwrap_or(default_limit).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_first_page() {
        let req = PageRequest::new(Some(0), Some(-5), 50);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn computes_offset() {
        let req = PageRequest::new(Some(3), None, 20);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn skip_limit_never_negative() {
        assert_eq!(skip_limit(Some(-1), Some(-3), 100), (0, 0));
        assert_eq!(skip_limit(None, None, 100), (0, 100));
    }
}
