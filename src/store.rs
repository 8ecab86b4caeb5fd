// 🗃️ Plate Store - the persistence interface the service consumes
//
// Two implementations:
// - SqlitePlateStore (db.rs) for the server and CLI
// - InMemoryPlateStore (below) for tests and embedding

use crate::plate::Plate;
use crate::query::PlateQuery;
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("price {0} cannot be stored")]
    PriceOutOfRange(Decimal),

    #[error("corrupt plate row: {0}")]
    Corrupt(String),

    #[error("plate {0} no longer exists")]
    Missing(Uuid),

    #[error("{0}")]
    Other(String),
}

/// Persistence operations required by `PlateService`.
///
/// Each mutation is atomic per record. Nothing here spans records.
pub trait PlateStore {
    /// Filter, sort and page plates in one declarative request
    fn query(&self, query: &PlateQuery) -> Result<Vec<Plate>, StoreError>;

    /// Insert a new plate and return the committed record
    fn insert(&self, plate: &Plate) -> Result<Plate, StoreError>;

    /// Every plate, in insertion order
    fn fetch_all(&self) -> Result<Vec<Plate>, StoreError>;

    fn fetch_by_id(&self, id: Uuid) -> Result<Option<Plate>, StoreError>;

    /// Persist in-place field changes and return the committed record
    fn update(&self, plate: &Plate) -> Result<Plate, StoreError>;

    /// Write only the sale price; every other column keeps its committed value
    fn update_sale_price(&self, id: Uuid, sale_price: Decimal) -> Result<Plate, StoreError>;

    /// Clear the for-sale flag only
    fn mark_not_for_sale(&self, id: Uuid) -> Result<Plate, StoreError>;
}

impl<S: PlateStore + ?Sized> PlateStore for Arc<S> {
    fn query(&self, query: &PlateQuery) -> Result<Vec<Plate>, StoreError> {
        (**self).query(query)
    }

    fn insert(&self, plate: &Plate) -> Result<Plate, StoreError> {
        (**self).insert(plate)
    }

    fn fetch_all(&self) -> Result<Vec<Plate>, StoreError> {
        (**self).fetch_all()
    }

    fn fetch_by_id(&self, id: Uuid) -> Result<Option<Plate>, StoreError> {
        (**self).fetch_by_id(id)
    }

    fn update(&self, plate: &Plate) -> Result<Plate, StoreError> {
        (**self).update(plate)
    }

    fn update_sale_price(&self, id: Uuid, sale_price: Decimal) -> Result<Plate, StoreError> {
        (**self).update_sale_price(id, sale_price)
    }

    fn mark_not_for_sale(&self, id: Uuid) -> Result<Plate, StoreError> {
        (**self).mark_not_for_sale(id)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Vec-backed store. Clones share the same records.
#[derive(Clone, Default)]
pub struct InMemoryPlateStore {
    plates: Arc<RwLock<Vec<Plate>>>,
}

impl InMemoryPlateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the given plates (ids kept as-is)
    pub fn with_plates(plates: Vec<Plate>) -> Self {
        InMemoryPlateStore {
            plates: Arc::new(RwLock::new(plates)),
        }
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let plates = self.plates.read().map_err(|_| StoreError::Poisoned)?;
        Ok(plates.len())
    }

    fn modify<F>(&self, id: Uuid, change: F) -> Result<Plate, StoreError>
    where
        F: FnOnce(&mut Plate),
    {
        let mut plates = self.plates.write().map_err(|_| StoreError::Poisoned)?;

        let slot = plates
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::Missing(id))?;
        change(&mut *slot);

        Ok(slot.clone())
    }
}

impl PlateStore for InMemoryPlateStore {
    fn query(&self, query: &PlateQuery) -> Result<Vec<Plate>, StoreError> {
        let plates = self.plates.read().map_err(|_| StoreError::Poisoned)?;
        Ok(query.apply(plates.iter()))
    }

    fn insert(&self, plate: &Plate) -> Result<Plate, StoreError> {
        let mut plates = self.plates.write().map_err(|_| StoreError::Poisoned)?;

        if plates.iter().any(|p| p.id == plate.id) {
            return Err(StoreError::Other(format!("duplicate plate id {}", plate.id)));
        }

        plates.push(plate.clone());
        Ok(plate.clone())
    }

    fn fetch_all(&self) -> Result<Vec<Plate>, StoreError> {
        let plates = self.plates.read().map_err(|_| StoreError::Poisoned)?;
        Ok(plates.clone())
    }

    fn fetch_by_id(&self, id: Uuid) -> Result<Option<Plate>, StoreError> {
        let plates = self.plates.read().map_err(|_| StoreError::Poisoned)?;
        Ok(plates.iter().find(|p| p.id == id).cloned())
    }

    fn update(&self, plate: &Plate) -> Result<Plate, StoreError> {
        self.modify(plate.id, |slot| *slot = plate.clone())
    }

    fn update_sale_price(&self, id: Uuid, sale_price: Decimal) -> Result<Plate, StoreError> {
        self.modify(id, |slot| slot.sale_price = sale_price)
    }

    fn mark_not_for_sale(&self, id: Uuid) -> Result<Plate, StoreError> {
        self.modify(id, |slot| slot.is_for_sale = false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_fetch() {
        let store = InMemoryPlateStore::new();
        let plate = Plate::new("ABC123", Decimal::new(100, 0), Decimal::new(120, 0));

        store.insert(&plate).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.fetch_by_id(plate.id).unwrap(), Some(plate.clone()));
        assert_eq!(store.fetch_by_id(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = InMemoryPlateStore::new();
        let plate = Plate::new("ABC123", Decimal::ONE, Decimal::ONE);

        store.insert(&plate).unwrap();
        assert!(store.insert(&plate).is_err());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_update_missing_plate() {
        let store = InMemoryPlateStore::new();
        let plate = Plate::new("GHOST", Decimal::ONE, Decimal::ONE);

        match store.update(&plate) {
            Err(StoreError::Missing(id)) => assert_eq!(id, plate.id),
            other => panic!("expected Missing, got {:?}", other),
        }
    }

    #[test]
    fn test_field_scoped_writes() {
        let plate = Plate::new("ABC123", Decimal::new(100, 0), Decimal::new(120, 0));
        let store = InMemoryPlateStore::with_plates(vec![plate.clone()]);

        store.mark_not_for_sale(plate.id).unwrap();
        let repriced = store.update_sale_price(plate.id, Decimal::new(999, 0)).unwrap();

        assert!(!repriced.is_for_sale);
        assert_eq!(repriced.sale_price, Decimal::new(999, 0));
        assert_eq!(repriced.purchase_price, Decimal::new(100, 0));
        assert!(matches!(
            store.mark_not_for_sale(Uuid::new_v4()),
            Err(StoreError::Missing(_))
        ));
    }

    #[test]
    fn test_count_reports_poisoned_lock() {
        let store = InMemoryPlateStore::new();
        let shared = store.clone();

        let _ = std::thread::spawn(move || {
            let _guard = shared.plates.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.count(), Err(StoreError::Poisoned)));
    }

    #[test]
    fn test_clones_share_records() {
        let store = InMemoryPlateStore::new();
        let shared = store.clone();

        store
            .insert(&Plate::new("ABC123", Decimal::ONE, Decimal::ONE))
            .unwrap();

        assert_eq!(shared.fetch_all().unwrap().len(), 1);
    }
}
