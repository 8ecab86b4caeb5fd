use crate::plate::{Plate, MAX_REGISTRATION_LEN};
use crate::query::PlateQuery;
use crate::store::{PlateStore, StoreError};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Scale of the stored price columns (decimal(18,2))
pub const PRICE_SCALE: u32 = 2;

const PLATE_COLUMNS: &str =
    "plate_id, registration, purchase_price, sale_price, letters, numbers, is_for_sale";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Plates Table
    // Prices are INTEGER minor units (scale 2) so ORDER BY is exact.
    // Registration uniqueness is NOT enforced, only presence and length.
    // ==========================================================================
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS plates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plate_id TEXT UNIQUE NOT NULL,
                registration TEXT NOT NULL
                    CHECK (length(registration) > 0 AND length(registration) <= {max_len}),
                purchase_price INTEGER NOT NULL,
                sale_price INTEGER NOT NULL,
                letters TEXT,
                numbers INTEGER,
                is_for_sale INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            max_len = MAX_REGISTRATION_LEN
        ),
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_plates_sale_price ON plates(sale_price)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_plates_for_sale ON plates(is_for_sale)",
        [],
    )?;

    Ok(())
}

/// Insert the default catalog (ABC123, XYZ789) when the table is empty.
/// Returns how many plates were inserted.
pub fn seed_defaults(conn: &Connection) -> Result<usize, StoreError> {
    if verify_count(conn)? > 0 {
        return Ok(0);
    }

    let defaults = [
        Plate::new("ABC123", Decimal::new(1000, 0), Decimal::new(1200, 0)),
        Plate::new("XYZ789", Decimal::new(1500, 0), Decimal::new(1800, 0)).with_for_sale(false),
    ];

    for plate in &defaults {
        insert_plate(conn, plate)?;
    }

    info!(count = defaults.len(), "seeded default plates");
    Ok(defaults.len())
}

pub fn verify_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM plates", [], |row| row.get(0))
}

// ============================================================================
// PRICE ENCODING
// ============================================================================

/// Round to the column scale and encode as minor units
pub fn price_to_minor(price: Decimal) -> Result<i64, StoreError> {
    let rounded = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or(StoreError::PriceOutOfRange(price))
}

pub fn price_from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, PRICE_SCALE)
}

// ============================================================================
// ROW ACCESS
// ============================================================================

fn plate_from_row(row: &Row) -> rusqlite::Result<Plate> {
    let plate_id: String = row.get(0)?;
    let id = Uuid::parse_str(&plate_id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Plate {
        id,
        registration: row.get(1)?,
        purchase_price: price_from_minor(row.get(2)?),
        sale_price: price_from_minor(row.get(3)?),
        letters: row.get(4)?,
        numbers: row.get(5)?,
        is_for_sale: row.get(6)?,
    })
}

/// Insert one plate and return it as committed (prices at column scale)
pub fn insert_plate(conn: &Connection, plate: &Plate) -> Result<Plate, StoreError> {
    conn.execute(
        "INSERT INTO plates (
            plate_id, registration, purchase_price, sale_price, letters, numbers, is_for_sale
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            plate.id.to_string(),
            plate.registration,
            price_to_minor(plate.purchase_price)?,
            price_to_minor(plate.sale_price)?,
            plate.letters,
            plate.numbers,
            plate.is_for_sale,
        ],
    )?;

    get_plate(conn, plate.id)?.ok_or(StoreError::Missing(plate.id))
}

pub fn get_plate(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Plate>> {
    conn.query_row(
        &format!("SELECT {} FROM plates WHERE plate_id = ?1", PLATE_COLUMNS),
        [id.to_string()],
        plate_from_row,
    )
    .optional()
}

pub fn get_all_plates(conn: &Connection) -> rusqlite::Result<Vec<Plate>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM plates ORDER BY id", PLATE_COLUMNS))?;

    let plates = stmt
        .query_map([], plate_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plates)
}

/// Persist registration, prices, parts and flag for an existing plate
pub fn update_plate(conn: &Connection, plate: &Plate) -> Result<Plate, StoreError> {
    let changed = conn.execute(
        "UPDATE plates
         SET registration = ?2, purchase_price = ?3, sale_price = ?4,
             letters = ?5, numbers = ?6, is_for_sale = ?7
         WHERE plate_id = ?1",
        params![
            plate.id.to_string(),
            plate.registration,
            price_to_minor(plate.purchase_price)?,
            price_to_minor(plate.sale_price)?,
            plate.letters,
            plate.numbers,
            plate.is_for_sale,
        ],
    )?;

    if changed == 0 {
        return Err(StoreError::Missing(plate.id));
    }

    get_plate(conn, plate.id)?.ok_or(StoreError::Missing(plate.id))
}

/// Write the sale price column only
pub fn update_sale_price(conn: &Connection, id: Uuid, sale_price: Decimal) -> Result<Plate, StoreError> {
    let changed = conn.execute(
        "UPDATE plates SET sale_price = ?2 WHERE plate_id = ?1",
        params![id.to_string(), price_to_minor(sale_price)?],
    )?;

    if changed == 0 {
        return Err(StoreError::Missing(id));
    }

    get_plate(conn, id)?.ok_or(StoreError::Missing(id))
}

/// Clear the for-sale flag only
pub fn mark_not_for_sale(conn: &Connection, id: Uuid) -> Result<Plate, StoreError> {
    let changed = conn.execute(
        "UPDATE plates SET is_for_sale = 0 WHERE plate_id = ?1",
        [id.to_string()],
    )?;

    if changed == 0 {
        return Err(StoreError::Missing(id));
    }

    get_plate(conn, id)?.ok_or(StoreError::Missing(id))
}

/// Translate a PlateQuery into one SELECT (WHERE → ORDER BY → LIMIT/OFFSET)
pub fn query_plates(conn: &Connection, query: &PlateQuery) -> Result<Vec<Plate>, StoreError> {
    let mut sql = format!("SELECT {} FROM plates", PLATE_COLUMNS);
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(flag) = query.for_sale {
        clauses.push("is_for_sale = ?");
        values.push(Value::Integer(flag as i64));
    }

    // instr() is case-sensitive, LIKE is not
    if let Some(filter) = &query.registration_contains {
        clauses.push("instr(registration, ?) > 0");
        values.push(Value::Text(filter.clone()));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    match query.sort {
        Some(direction) => sql.push_str(&format!(" ORDER BY sale_price {}, id", direction.as_sql())),
        None => sql.push_str(" ORDER BY id"),
    }

    sql.push_str(" LIMIT ? OFFSET ?");
    values.push(Value::Integer(clamp_i64(query.limit)));
    values.push(Value::Integer(clamp_i64(query.offset)));

    let mut stmt = conn.prepare(&sql)?;
    let plates = stmt
        .query_map(params_from_iter(values), plate_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plates)
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// `PlateStore` over a shared SQLite connection.
///
/// The connection is locked for the duration of one store call only.
#[derive(Clone)]
pub struct SqlitePlateStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlateStore {
    /// Wrap a connection, creating the schema if needed
    pub fn new(conn: Connection) -> Result<Self, StoreError> {
        setup_database(&conn)?;
        Ok(Self::from_shared(Arc::new(Mutex::new(conn))))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::new(Connection::open_in_memory()?)
    }

    /// Wrap an already-initialized shared connection
    pub fn from_shared(conn: Arc<Mutex<Connection>>) -> Self {
        SqlitePlateStore { conn }
    }

    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }
}

impl PlateStore for SqlitePlateStore {
    fn query(&self, query: &PlateQuery) -> Result<Vec<Plate>, StoreError> {
        self.with_conn(|conn| query_plates(conn, query))
    }

    fn insert(&self, plate: &Plate) -> Result<Plate, StoreError> {
        self.with_conn(|conn| insert_plate(conn, plate))
    }

    fn fetch_all(&self) -> Result<Vec<Plate>, StoreError> {
        self.with_conn(|conn| Ok(get_all_plates(conn)?))
    }

    fn fetch_by_id(&self, id: Uuid) -> Result<Option<Plate>, StoreError> {
        self.with_conn(|conn| Ok(get_plate(conn, id)?))
    }

    fn update(&self, plate: &Plate) -> Result<Plate, StoreError> {
        self.with_conn(|conn| update_plate(conn, plate))
    }

    fn update_sale_price(&self, id: Uuid, sale_price: Decimal) -> Result<Plate, StoreError> {
        self.with_conn(|conn| update_sale_price(conn, id, sale_price))
    }

    fn mark_not_for_sale(&self, id: Uuid) -> Result<Plate, StoreError> {
        self.with_conn(|conn| mark_not_for_sale(conn, id))
    }
}
