//! The Order entity and its write payloads
//!
//! [`NewOrder`] and [`OrderPatch`] are what clients send; both are checked with
//! `validator` before anything reaches the store. `total_price` is never read
//! from a payload: it is recomputed by [`OrderDraft::reprice`] on every save.

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::notification;
use crate::core::pricing::{self, UnitPrices};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;
use validator::Validate;

/// Optional `+`, optional country code `1`, then 9 to 15 digits
pub static PHONE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone number pattern compiles"));

pub const PHONE_NUMBER_MESSAGE: &str =
    "Phone number must be entered in the format: '+628..'. Up to 15 digits allowed.";

const REQUIRED_MESSAGE: &str = "This field is required.";
const NAME_MESSAGE: &str = "Ensure this field is not blank and has no more than 255 characters.";
const BLANK_MESSAGE: &str = "This field may not be blank.";
const QUANTITY_MESSAGE: &str = "Ensure this value is between 0 and 2147483647.";
const NULL_MESSAGE: &str = "This field may not be null.";
const INTEGER_MESSAGE: &str = "A valid integer is required.";

/// A persisted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub phone_number: String,
    pub name: String,
    pub address: String,
    pub total_lontong_large: u32,
    pub total_lontong_small: u32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a draft under a freshly assigned id
    pub fn from_draft(id: u64, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phone_number: draft.phone_number,
            name: draft.name,
            address: draft.address,
            total_lontong_large: draft.total_lontong_large,
            total_lontong_small: draft.total_lontong_small,
            total_price: draft.total_price,
            created_at: now,
            updated_at: now,
        }
    }

    /// The writable part of this order
    pub fn draft(&self) -> OrderDraft {
        OrderDraft {
            phone_number: self.phone_number.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            total_lontong_large: self.total_lontong_large,
            total_lontong_small: self.total_lontong_small,
            total_price: self.total_price,
        }
    }

    /// Replace the writable fields, keeping identity and timestamps
    pub fn apply_draft(&mut self, draft: OrderDraft) {
        self.phone_number = draft.phone_number;
        self.name = draft.name;
        self.address = draft.address;
        self.total_lontong_large = draft.total_lontong_large;
        self.total_lontong_small = draft.total_lontong_small;
        self.total_price = draft.total_price;
    }

    /// Case-insensitive substring match over name, phone number and address
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.phone_number.to_lowercase().contains(&term)
            || self.address.to_lowercase().contains(&term)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order {} - {}", self.id, self.name)
    }
}

/// Order fields before the store assigns an id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub phone_number: String,
    pub name: String,
    pub address: String,
    pub total_lontong_large: u32,
    pub total_lontong_small: u32,
    pub total_price: Decimal,
}

impl OrderDraft {
    /// Recompute `total_price` from the quantities
    pub fn reprice(mut self, prices: &UnitPrices) -> Result<Self, ValidationError> {
        self.total_price =
            pricing::total_price(self.total_lontong_large, self.total_lontong_small, prices)?;
        Ok(self)
    }
}

/// Create payload
///
/// Unknown keys (including `id` and `total_price`) are ignored. Quantities may
/// be sent as integers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(from = "RawPayload")]
pub struct NewOrder {
    #[validate(
        required(message = "This field is required."),
        regex(path = *PHONE_NUMBER_RE, message = "Phone number must be entered in the format: '+628..'. Up to 15 digits allowed.")
    )]
    pub phone_number: Option<String>,

    #[validate(
        required(message = "This field is required."),
        length(min = 1, max = 255, message = "Ensure this field is not blank and has no more than 255 characters.")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field may not be blank.")
    )]
    pub address: Option<String>,

    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub total_lontong_large: Option<i64>,

    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub total_lontong_small: Option<i64>,

    /// Problems found while reading the body (explicit nulls, non-numeric quantities)
    pub(crate) input_errors: Vec<FieldValidationError>,
}

impl NewOrder {
    /// Validate and price the payload
    pub fn into_draft(self, prices: &UnitPrices) -> Result<OrderDraft, ValidationError> {
        let this = self.trimmed();
        check(&this.input_errors, this.validate())?;

        let draft = OrderDraft {
            phone_number: required("phone_number", this.phone_number)?,
            name: required("name", this.name)?,
            address: required("address", this.address)?,
            total_lontong_large: quantity("total_lontong_large", this.total_lontong_large)?,
            total_lontong_small: quantity("total_lontong_small", this.total_lontong_small)?,
            total_price: Decimal::ZERO,
        };

        draft.reprice(prices)
    }

    fn trimmed(self) -> Self {
        Self {
            phone_number: trim(self.phone_number),
            name: trim(self.name),
            address: trim(self.address),
            ..self
        }
    }
}

impl From<RawPayload> for NewOrder {
    fn from(raw: RawPayload) -> Self {
        let fields = raw.into_fields();
        Self {
            phone_number: fields.phone_number,
            name: fields.name,
            address: fields.address,
            total_lontong_large: fields.total_lontong_large,
            total_lontong_small: fields.total_lontong_small,
            input_errors: fields.errors,
        }
    }
}

/// Partial update payload; absent fields keep their stored value
///
/// An explicit `null` is not the same as an absent key: it is rejected.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(from = "RawPayload")]
pub struct OrderPatch {
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "Phone number must be entered in the format: '+628..'. Up to 15 digits allowed."))]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Ensure this field is not blank and has no more than 255 characters."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub address: Option<String>,

    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub total_lontong_large: Option<i64>,

    #[validate(range(min = 0, max = 2147483647, message = "Ensure this value is between 0 and 2147483647."))]
    pub total_lontong_small: Option<i64>,

    pub(crate) input_errors: Vec<FieldValidationError>,
}

impl OrderPatch {
    /// Validate the patch, apply it over `current` and reprice
    ///
    /// The price is recomputed even when no quantity changed.
    pub fn apply_to(
        self,
        current: OrderDraft,
        prices: &UnitPrices,
    ) -> Result<OrderDraft, ValidationError> {
        let patch = self.trimmed();
        check(&patch.input_errors, patch.validate())?;

        let mut draft = current;
        if let Some(phone_number) = patch.phone_number {
            draft.phone_number = phone_number;
        }
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(address) = patch.address {
            draft.address = address;
        }
        if patch.total_lontong_large.is_some() {
            draft.total_lontong_large = quantity("total_lontong_large", patch.total_lontong_large)?;
        }
        if patch.total_lontong_small.is_some() {
            draft.total_lontong_small = quantity("total_lontong_small", patch.total_lontong_small)?;
        }

        draft.reprice(prices)
    }

    fn trimmed(self) -> Self {
        Self {
            phone_number: trim(self.phone_number),
            name: trim(self.name),
            address: trim(self.address),
            ..self
        }
    }
}

impl From<RawPayload> for OrderPatch {
    fn from(raw: RawPayload) -> Self {
        let fields = raw.into_fields();
        Self {
            phone_number: fields.phone_number,
            name: fields.name,
            address: fields.address,
            total_lontong_large: fields.total_lontong_large,
            total_lontong_small: fields.total_lontong_small,
            input_errors: fields.errors,
        }
    }
}

/// Wire shape shared by both payloads
///
/// The outer `Option` is "key present", the inner one "value not null".
#[derive(Deserialize)]
struct RawPayload {
    #[serde(default, deserialize_with = "nullable")]
    phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    total_lontong_large: Option<Option<IntegerInput>>,
    #[serde(default, deserialize_with = "nullable")]
    total_lontong_small: Option<Option<IntegerInput>>,
}

/// An integer field as clients send it
#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerInput {
    Number(i64),
    Text(String),
}

struct PayloadFields {
    phone_number: Option<String>,
    name: Option<String>,
    address: Option<String>,
    total_lontong_large: Option<i64>,
    total_lontong_small: Option<i64>,
    errors: Vec<FieldValidationError>,
}

impl RawPayload {
    fn into_fields(self) -> PayloadFields {
        let mut errors = Vec::new();
        let phone_number = non_null(&mut errors, "phone_number", self.phone_number);
        let name = non_null(&mut errors, "name", self.name);
        let address = non_null(&mut errors, "address", self.address);
        let total_lontong_large = non_null(&mut errors, "total_lontong_large", self.total_lontong_large)
            .and_then(|v| integer(&mut errors, "total_lontong_large", v));
        let total_lontong_small = non_null(&mut errors, "total_lontong_small", self.total_lontong_small)
            .and_then(|v| integer(&mut errors, "total_lontong_small", v));

        PayloadFields {
            phone_number,
            name,
            address,
            total_lontong_large,
            total_lontong_small,
            errors,
        }
    }
}

/// Keeps an explicit `null` distinguishable from an absent key
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_null<T>(
    errors: &mut Vec<FieldValidationError>,
    field: &str,
    value: Option<Option<T>>,
) -> Option<T> {
    match value {
        Some(None) => {
            errors.push(FieldValidationError::new(field, NULL_MESSAGE));
            None
        }
        Some(Some(value)) => Some(value),
        None => None,
    }
}

fn integer(errors: &mut Vec<FieldValidationError>, field: &str, value: IntegerInput) -> Option<i64> {
    match value {
        IntegerInput::Number(n) => Some(n),
        IntegerInput::Text(text) => match text.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(FieldValidationError::new(field, INTEGER_MESSAGE));
                None
            }
        },
    }
}

/// Merge read-time problems with `validator`'s findings, one message set per field
fn check(
    input_errors: &[FieldValidationError],
    validated: Result<(), validator::ValidationErrors>,
) -> Result<(), ValidationError> {
    let mut errors = input_errors.to_vec();
    if let Err(found) = validated {
        errors.extend(
            ValidationError::from(found)
                .into_field_errors()
                .into_iter()
                .filter(|e| !input_errors.iter().any(|i| i.field == e.field)),
        );
    }
    if errors.is_empty() {
        return Ok(());
    }
    errors.sort_by(|a, b| a.field.cmp(&b.field));
    Err(ValidationError::FieldErrors(errors))
}

fn trim(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    value.ok_or_else(|| field_error(field, REQUIRED_MESSAGE))
}

fn quantity(field: &str, value: Option<i64>) -> Result<u32, ValidationError> {
    u32::try_from(value.unwrap_or(0)).map_err(|_| field_error(field, QUANTITY_MESSAGE))
}

fn field_error(field: &str, message: &str) -> ValidationError {
    ValidationError::FieldErrors(vec![FieldValidationError::new(field, message)])
}

/// Whether `phone_number` is acceptable on an order
pub fn is_valid_phone_number(phone_number: &str) -> bool {
    PHONE_NUMBER_RE.is_match(phone_number)
}

/// An order as returned by the API, with its contact link
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub whatsapp_link: String,
}

impl OrderView {
    pub fn new(order: Order, prices: &UnitPrices) -> Self {
        let whatsapp_link = notification::build_contact_link(&order, prices);
        Self {
            order,
            whatsapp_link,
        }
    }
}
