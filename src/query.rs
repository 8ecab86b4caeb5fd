// 🔎 Plate Query - declarative filter + sort + page request
//
// The service builds one PlateQuery per list call and hands it to the store.
// Evaluation order is fixed: filter → sort → paginate.

use crate::plate::Plate;
use std::cmp::Ordering;

// ============================================================================
// SORT DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending by sale price
    Ascending,
    /// Descending by sale price
    Descending,
}

impl SortDirection {
    /// Parse a caller-supplied sort order. Only the exact strings "asc" and
    /// "desc" select a direction; anything else leaves the order unspecified.
    pub fn parse(sort_order: Option<&str>) -> Option<SortDirection> {
        match sort_order {
            Some("asc") => Some(SortDirection::Ascending),
            Some("desc") => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

// ============================================================================
// QUERY SPECIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateQuery {
    pub for_sale: Option<bool>,
    /// Case-sensitive substring of the registration
    pub registration_contains: Option<String>,
    pub sort: Option<SortDirection>,
    pub offset: u64,
    pub limit: u64,
}

impl PlateQuery {
    /// Unfiltered, unsorted query over `[offset, offset + limit)`
    pub fn page(offset: u64, limit: u64) -> Self {
        PlateQuery {
            for_sale: None,
            registration_contains: None,
            sort: None,
            offset,
            limit,
        }
    }

    pub fn for_sale(mut self, for_sale: Option<bool>) -> Self {
        self.for_sale = for_sale;
        self
    }

    /// Empty filter strings are ignored
    pub fn registration_contains(mut self, filter: Option<&str>) -> Self {
        self.registration_contains = filter.filter(|f| !f.is_empty()).map(str::to_string);
        self
    }

    pub fn sorted(mut self, sort: Option<SortDirection>) -> Self {
        self.sort = sort;
        self
    }

    /// Does this plate pass the query's predicate?
    pub fn matches(&self, plate: &Plate) -> bool {
        if let Some(flag) = self.for_sale {
            if plate.is_for_sale != flag {
                return false;
            }
        }

        if let Some(filter) = &self.registration_contains {
            if !plate.registration.contains(filter.as_str()) {
                return false;
            }
        }

        true
    }

    /// Evaluate the query over plates given in insertion order.
    ///
    /// The sort is stable, so equal sale prices keep insertion order and
    /// consecutive pages never overlap.
    pub fn apply<'a, I>(&self, plates: I) -> Vec<Plate>
    where
        I: IntoIterator<Item = &'a Plate>,
    {
        let mut matching: Vec<&Plate> = plates.into_iter().filter(|p| self.matches(p)).collect();

        if let Some(direction) = self.sort {
            matching.sort_by(|a, b| compare_sale_price(a, b, direction));
        }

        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);

        matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}

fn compare_sale_price(a: &Plate, b: &Plate, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => a.sale_price.cmp(&b.sale_price),
        SortDirection::Descending => b.sale_price.cmp(&a.sale_price),
    }
}
