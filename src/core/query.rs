//! Query parameters and pagination utilities

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::order::Order;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Query parameters for listing orders
///
/// # Example
/// ```text
/// GET /orders?page=2&limit=10
/// GET /orders?search=street&sort=total_price:desc
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Sort field and direction: `field`, `field:asc` or `field:desc`
    pub sort: Option<String>,

    /// Case-insensitive text match over name, phone number and address
    pub search: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort: None,
            search: None,
        }
    }
}

impl QueryParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, clamped to 1..=100
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100)
    }

    /// Parsed sort order, newest first when absent
    pub fn sort_order(&self) -> Result<SortOrder, ValidationError> {
        match self.sort.as_deref().map(str::trim) {
            None | Some("") => Ok(SortOrder::default()),
            Some(expr) => SortOrder::parse(expr),
        }
    }

    /// Non-empty search term, if any
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Filter, sort and cut one page out of `orders`
    pub fn apply(&self, orders: Vec<Order>) -> Result<PaginatedResponse<Order>, ValidationError> {
        let sort = self.sort_order()?;

        let mut orders: Vec<Order> = match self.search_term() {
            Some(term) => orders
                .into_iter()
                .filter(|o| o.matches_search(term))
                .collect(),
            None => orders,
        };
        orders.sort_by(|a, b| sort.compare(a, b));

        let page = self.page();
        let limit = self.limit();
        let total = orders.len();
        let data = orders
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(page, limit, total),
        })
    }
}

/// Sortable order fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    TotalPrice,
    CreatedAt,
    UpdatedAt,
}

/// Field plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl SortOrder {
    /// Parse `field[:asc|:desc]`
    pub fn parse(expr: &str) -> Result<Self, ValidationError> {
        let (field, direction) = expr.split_once(':').unwrap_or((expr, "asc"));

        let field = match field {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "total_price" => SortField::TotalPrice,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            other => return Err(sort_error(format!("Unknown sort field '{}'", other))),
        };

        let descending = match direction {
            "asc" => false,
            "desc" => true,
            other => return Err(sort_error(format!("Unknown sort direction '{}'", other))),
        };

        Ok(Self { field, descending })
    }

    /// Compare two orders; ties fall back to the id in the same direction
    pub fn compare(&self, a: &Order, b: &Order) -> Ordering {
        let primary = match self.field {
            SortField::Id => Ordering::Equal,
            SortField::Name => a.name.cmp(&b.name),
            SortField::TotalPrice => a.total_price.cmp(&b.total_price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn sort_error(message: String) -> ValidationError {
    ValidationError::FieldErrors(vec![FieldValidationError::new("sort", message)])
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    /// Transform the page items, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after search)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = page.saturating_sub(1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::order::OrderDraft;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn order(id: u64, name: &str, minutes: i64, price: i64) -> Order {
        let draft = OrderDraft {
            phone_number: "+6281234567890".to_string(),
            name: name.to_string(),
            address: "Jl. Sudirman".to_string(),
            total_lontong_large: 0,
            total_lontong_small: 0,
            total_price: Decimal::from(price),
        };
        Order::from_draft(id, draft, Utc::now() + Duration::minutes(minutes))
    }

    #[test]
    fn test_query_params_defaults() {
        let params = QueryParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.sort_order().expect("sort"), SortOrder::default());
    }

    #[test]
    fn test_limit_is_clamped() {
        let params = QueryParams {
            limit: 1000,
            page: 0,
            ..QueryParams::default()
        };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let orders = vec![order(1, "a", 0, 1), order(2, "b", 1, 1), order(3, "c", 2, 1)];
        let page = QueryParams::default().apply(orders).expect("page");
        let ids: Vec<u64> = page.data.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_id() {
        let now = Utc::now();
        let mut orders = vec![order(1, "a", 0, 1), order(2, "b", 0, 1)];
        for o in &mut orders {
            o.created_at = now;
        }
        let page = QueryParams::default().apply(orders).expect("page");
        assert_eq!(page.data[0].id, 2);
    }

    #[test]
    fn test_sort_by_price_ascending() {
        let orders = vec![order(1, "a", 0, 30), order(2, "b", 1, 10), order(3, "c", 2, 20)];
        let params = QueryParams {
            sort: Some("total_price".to_string()),
            ..QueryParams::default()
        };
        let page = params.apply(orders).expect("page");
        let ids: Vec<u64> = page.data.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_unknown_sort_is_a_validation_error() {
        assert_eq!(SortOrder::parse("phone").unwrap_err().fields(), vec!["sort"]);
        assert!(SortOrder::parse("name:sideways").is_err());
    }

    #[test]
    fn test_search_and_paging() {
        let orders = vec![
            order(1, "Budi", 0, 1),
            order(2, "Siti", 1, 1),
            order(3, "Budiman", 2, 1),
            order(4, "Agus", 3, 1),
        ];
        let params = QueryParams {
            search: Some("budi".to_string()),
            limit: 1,
            page: 2,
            ..QueryParams::default()
        };
        let page = params.apply(orders).expect("page");
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, 1);
        assert!(page.pagination.has_prev);
        assert!(!page.pagination.has_next);
    }
}
