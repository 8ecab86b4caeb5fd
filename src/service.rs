// 🏷️ Plate Service - list / add / markup / mark-as-sold
//
// Stateless: holds only the store. Every fault coming out of the store is
// logged here and returned unchanged; empty pages and unknown ids are
// ordinary results, not errors.

use crate::error::{CatalogError, Result};
use crate::plate::{Plate, PlateTransfer};
use crate::query::{PlateQuery, SortDirection};
use crate::store::PlateStore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct PlateService<S> {
    store: S,
}

impl<S: PlateStore> PlateService<S> {
    pub fn new(store: S) -> Self {
        PlateService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One page of plates, filtered then sorted by sale price then paged.
    ///
    /// `page_number` and `page_size` start at 1. A page past the end is empty.
    pub fn list(
        &self,
        page_number: u32,
        page_size: u32,
        sort_order: Option<&str>,
        filter: Option<&str>,
        is_for_sale: Option<bool>,
    ) -> Result<Vec<PlateTransfer>> {
        let query = build_list_query(page_number, page_size, sort_order, filter, is_for_sale)?;

        let plates = self.store.query(&query).map_err(|e| {
            error!(page_number, page_size, error = %e, "error occurred while fetching plates");
            CatalogError::from(e)
        })?;

        debug!(page_number, page_size, returned = plates.len(), "listed plates");
        Ok(plates.into_iter().map(PlateTransfer::from).collect())
    }

    /// Persist a new plate under a fresh id and return what the store committed
    pub fn add(&self, transfer: Option<&PlateTransfer>) -> Result<PlateTransfer> {
        let transfer = transfer.ok_or_else(|| CatalogError::validation("plate data is required"))?;
        transfer.validate().map_err(CatalogError::Validation)?;

        let plate = Plate::from_transfer(transfer);

        let committed = self.store.insert(&plate).map_err(|e| {
            error!(plate_id = %plate.id, error = %e, "an error occurred while adding a new plate");
            CatalogError::from(e)
        })?;

        info!(plate_id = %committed.id, registration = %committed.registration, "plate added");
        Ok(committed.into())
    }

    /// Set every plate's sale price to purchase price * 1.20.
    ///
    /// Only the sale price column is written, so a concurrent mark-as-sold
    /// keeps its flag. Updates are written one at a time. The first failing
    /// write (or overflowing price) stops the run and is returned; earlier
    /// writes stay committed.
    pub fn apply_markup(&self) -> Result<Vec<PlateTransfer>> {
        let plates = self.store.fetch_all().map_err(|e| {
            error!(error = %e, "an error occurred while loading plates for markup");
            CatalogError::from(e)
        })?;

        let mut updated: Vec<Plate> = Vec::with_capacity(plates.len());

        for mut plate in plates {
            let outcome = match plate.apply_markup() {
                Some(price) => self
                    .store
                    .update_sale_price(plate.id, price)
                    .map_err(CatalogError::from),
                None => Err(CatalogError::PriceOverflow(plate.id)),
            };

            match outcome {
                Ok(committed) => updated.push(committed),
                Err(e) => {
                    let done: Vec<Uuid> = updated.iter().map(|p| p.id).collect();
                    error!(
                        plate_id = %plate.id,
                        succeeded = done.len(),
                        error = %e,
                        "an error occurred while applying markup to plates"
                    );
                    debug!(?done, "plates already marked up before failure");
                    return Err(e);
                }
            }
        }

        info!(count = updated.len(), "markup applied");
        Ok(updated.into_iter().map(PlateTransfer::from).collect())
    }

    /// Flag a plate as no longer for sale. `Ok(false)` when the id is unknown.
    pub fn mark_as_sold(&self, id: Uuid) -> Result<bool> {
        let found = self.store.fetch_by_id(id).map_err(|e| {
            error!(plate_id = %id, error = %e, "an error occurred while marking a plate as sold");
            CatalogError::from(e)
        })?;

        if found.is_none() {
            warn!(plate_id = %id, "attempted to mark a plate as sold, but the plate was not found");
            return Ok(false);
        }

        self.store.mark_not_for_sale(id).map_err(|e| {
            error!(plate_id = %id, error = %e, "an error occurred while marking a plate as sold");
            CatalogError::from(e)
        })?;

        info!(plate_id = %id, "plate marked as sold");
        Ok(true)
    }
}

/// Validate paging input and build the store query
pub fn build_list_query(
    page_number: u32,
    page_size: u32,
    sort_order: Option<&str>,
    filter: Option<&str>,
    is_for_sale: Option<bool>,
) -> Result<PlateQuery> {
    if page_number == 0 {
        return Err(CatalogError::validation("pageNumber must be at least 1"));
    }
    if page_size == 0 {
        return Err(CatalogError::validation("pageSize must be at least 1"));
    }

    let offset = u64::from(page_number - 1)
        .checked_mul(u64::from(page_size))
        .ok_or_else(|| CatalogError::validation("page offset overflows"))?;

    Ok(PlateQuery::page(offset, u64::from(page_size))
        .for_sale(is_for_sale)
        .registration_contains(filter)
        .sorted(SortDirection::parse(sort_order)))
}
