use serde::{Deserialize, Serialize};
use validator::Validate;

use super::errors::DomainError;

/// 1-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct PageRequest {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    #[validate(range(min = 1, message = "page_size must be at least 1"))]
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Validate against the configured maximum page size.
    pub fn validated(self, max_page_size: u32) -> Result<Self, DomainError> {
        self.validate()?;
        if self.page_size > max_page_size {
            return Err(DomainError::Validation(format!(
                "page_size: must not exceed {}",
                max_page_size
            )));
        }
        Ok(self)
    }

    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.page_size as u64
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        }
    }

    pub fn empty(total_count: u64, page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), total_count, page, page_size)
    }
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count
        .div_ceil(page_size as u64)
        .try_into()
        .unwrap_or(u32::MAX)
}
