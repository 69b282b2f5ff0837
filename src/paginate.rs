//! Ordering and windowing over a plan's region map
//!
//! Pure and cache-independent: the region map is rebuilt from the (already
//! cached) catalog payload on every request, so nothing here holds state.
//!
//! Only ordering by region identifier is implemented; `order_by` is accepted
//! and echoed in the metadata so callers see what ordering they got.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::upstream::catalog::Region;

/// One region row in identifier order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub id: String,

    #[serde(flatten)]
    pub region: Region,
}

/// Ordering metadata echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderingMeta {
    pub is_ordered: bool,
    pub order_by: String,
}

/// Pagination metadata for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    pub is_paginated: bool,
    pub total_items: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginate_by: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<usize>,

    /// Link to the previous page, only when it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,

    /// Link to the next page, only when it exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A page (or the full set) of a plan's regions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionWindow {
    pub data: Vec<RegionRow>,
    pub ordering: OrderingMeta,
    pub pagination: PaginationMeta,
}

/// Order a plan's regions by identifier and slice out one page.
///
/// Without `paginate_by` the full ordered set is returned. With it, `page`
/// defaults to 1 when unset or below 1, and a page beyond the last is
/// [`Error::PageOutOfRange`]. A `paginate_by` of zero is treated as absent.
pub fn paginate(
    regions: &HashMap<String, Region>,
    order_by: &str,
    page: Option<usize>,
    paginate_by: Option<usize>,
    link_base: &str,
) -> Result<RegionWindow> {
    let mut keys: Vec<&String> = regions.keys().collect();
    keys.sort();
    let total_items = keys.len();

    let ordering = OrderingMeta {
        is_ordered: true,
        order_by: order_by.to_string(),
    };

    let paginate_by = match paginate_by {
        Some(size) if size > 0 => size,
        _ => {
            return Ok(RegionWindow {
                data: rows(&keys, regions),
                ordering,
                pagination: PaginationMeta {
                    is_paginated: false,
                    total_items,
                    paginate_by: None,
                    page: None,
                    num_pages: None,
                    prev: None,
                    next: None,
                },
            });
        }
    };

    let page = page.filter(|p| *p >= 1).unwrap_or(1);
    let num_pages = total_items.div_ceil(paginate_by);

    if page > num_pages && page > 1 {
        return Err(Error::PageOutOfRange { page, num_pages });
    }

    let start = (page - 1) * paginate_by;
    let window_keys: Vec<&String> = keys
        .iter()
        .skip(start)
        .take(paginate_by)
        .copied()
        .collect();

    Ok(RegionWindow {
        data: rows(&window_keys, regions),
        ordering,
        pagination: PaginationMeta {
            is_paginated: true,
            total_items,
            paginate_by: Some(paginate_by),
            page: Some(page),
            num_pages: Some(num_pages),
            prev: (page > 1).then(|| page_link(link_base, paginate_by, page - 1)),
            next: (page < num_pages).then(|| page_link(link_base, paginate_by, page + 1)),
        },
    })
}

fn rows(keys: &[&String], regions: &HashMap<String, Region>) -> Vec<RegionRow> {
    keys.iter()
        .filter_map(|key| {
            regions.get(*key).map(|region| RegionRow {
                id: (*key).clone(),
                region: region.clone(),
            })
        })
        .collect()
}

fn page_link(base: &str, paginate_by: usize, page: usize) -> String {
    format!("{}?paginate_by={}&page={}", base, paginate_by, page)
}
