// 🚘 Plate Entity - persisted record + public transfer shape
//
// "The UUID is the plate's IDENTITY, the registration and prices are VALUES"
//
// - Plate: what the store keeps (id, registration, prices, letters/numbers, flag)
// - PlateTransfer: what callers see (no id, no letters/numbers)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum registration length accepted by the catalog table
pub const MAX_REGISTRATION_LEN: usize = 50;

/// Fixed markup multiplier: sale price = purchase price * 1.20
pub const MARKUP_FACTOR: Decimal = Decimal::from_parts(120, 0, 0, false, 2);

// ============================================================================
// PLATE ENTITY
// ============================================================================

/// Plate record as persisted by a `PlateStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    // ========================================================================
    // IDENTITY (assigned once by `add`, never reused)
    // ========================================================================
    pub id: Uuid,

    // ========================================================================
    // VALUES
    // ========================================================================
    /// Displayable code, e.g. "ABC123"
    pub registration: String,

    pub purchase_price: Decimal,

    pub sale_price: Decimal,

    /// Decomposed letters of the registration (independent of `registration`)
    pub letters: Option<String>,

    /// Decomposed numbers of the registration (independent of `registration`)
    pub numbers: Option<i64>,

    /// true = listed for sale, false = reserved/sold
    pub is_for_sale: bool,
}

impl Plate {
    /// Create a new plate with a fresh UUID
    pub fn new(registration: impl Into<String>, purchase_price: Decimal, sale_price: Decimal) -> Self {
        Plate {
            id: Uuid::new_v4(),
            registration: registration.into(),
            purchase_price,
            sale_price,
            letters: None,
            numbers: None,
            is_for_sale: true,
        }
    }

    /// Build a new record from an inbound transfer (fresh id, no letters/numbers)
    pub fn from_transfer(transfer: &PlateTransfer) -> Self {
        Plate {
            is_for_sale: transfer.is_for_sale,
            ..Plate::new(
                transfer.registration.clone(),
                transfer.purchase_price,
                transfer.sale_price,
            )
        }
    }

    pub fn with_parts(mut self, letters: impl Into<String>, numbers: i64) -> Self {
        self.letters = Some(letters.into());
        self.numbers = Some(numbers);
        self
    }

    pub fn with_for_sale(mut self, is_for_sale: bool) -> Self {
        self.is_for_sale = is_for_sale;
        self
    }

    /// Recompute the sale price from the purchase price using the fixed markup.
    /// Returns the new price, or `None` (sale price untouched) on overflow.
    pub fn apply_markup(&mut self) -> Option<Decimal> {
        let price = self.purchase_price.checked_mul(MARKUP_FACTOR)?;
        self.sale_price = price;
        Some(price)
    }

    /// Transfer view of this record
    pub fn to_transfer(&self) -> PlateTransfer {
        PlateTransfer {
            registration: self.registration.clone(),
            purchase_price: self.purchase_price,
            sale_price: self.sale_price,
            is_for_sale: self.is_for_sale,
        }
    }
}

impl From<Plate> for PlateTransfer {
    fn from(plate: Plate) -> Self {
        PlateTransfer {
            registration: plate.registration,
            purchase_price: plate.purchase_price,
            sale_price: plate.sale_price,
            is_for_sale: plate.is_for_sale,
        }
    }
}

// ============================================================================
// TRANSFER SHAPE
// ============================================================================

/// Public shape returned by list/add/markup and accepted by add
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateTransfer {
    pub registration: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    #[serde(default = "default_for_sale")]
    pub is_for_sale: bool,
}

fn default_for_sale() -> bool {
    true
}

impl PlateTransfer {
    pub fn new(registration: impl Into<String>, purchase_price: Decimal, sale_price: Decimal) -> Self {
        PlateTransfer {
            registration: registration.into(),
            purchase_price,
            sale_price,
            is_for_sale: true,
        }
    }

    /// Check the registration against the table constraints
    pub fn validate(&self) -> Result<(), String> {
        if self.registration.trim().is_empty() {
            return Err("registration is required".to_string());
        }

        let len = self.registration.chars().count();
        if len > MAX_REGISTRATION_LEN {
            return Err(format!(
                "registration is {} characters, maximum is {}",
                len, MAX_REGISTRATION_LEN
            ));
        }

        Ok(())
    }
}
