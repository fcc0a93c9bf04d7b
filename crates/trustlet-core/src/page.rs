//! Pagination parameters for review listings.

use serde::Serialize;

/// Page size used when the caller gives none or garbage.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// A resolved `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// Maximum items to return.
    pub limit: u64,
    /// Items to skip.
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Resolve raw query-string values.
    ///
    /// Missing or non-numeric values fall back to the defaults (limit 10,
    /// offset 0). Negative numbers clamp to zero and the limit is capped at
    /// [`MAX_PAGE_LIMIT`].
    #[must_use]
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = parse_clamped(limit).unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = parse_clamped(offset).unwrap_or(0);
        Self {
            limit: limit.min(MAX_PAGE_LIMIT),
            offset,
        }
    }

    /// Select this page out of an already-ordered slice.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(items.len());
        let len = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(len).min(items.len());
        &items[start..end]
    }
}

/// Parse a decimal integer, saturating at `0` and `u64::MAX`.
///
/// Anything that is not an optionally signed run of digits yields `None`.
fn parse_clamped(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if negative {
        return Some(0);
    }
    // All digits, so the only possible failure is overflow.
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in listing order.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// An empty page with zero total.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
