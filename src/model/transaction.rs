use crate::error::ValidationError;
use crate::model::{Amount, CategoryId};
use crate::present::Locale;
use rust_decimal::Decimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Owner id recorded when nobody is signed in.
pub const GUEST: &str = "guest";

/// Amounts are whole cents.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// The largest accepted amount, 999,999,999,999.99, in cents. Amounts up to this survive storage as
/// a JSON number unchanged, and sums of any realistic number of them stay within `Decimal` range.
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999_999_999;

/// The largest accepted amount.
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_AMOUNT_CENTS, MAX_DECIMAL_PLACES)
}

/// Whether a transaction brings money in or takes it out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// One recorded income or expense.
///
/// The serialized form is the storage format:
/// ```json
/// {
///   "id": "1709251200000-3f2a9c1e",
///   "description": "Sementes de milho",
///   "amount": 150.0,
///   "type": "expense",
///   "date": "2024-03-01T00:00:00.000Z",
///   "category": "seeds",
///   "userId": "guest"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: String,
    description: String,
    amount: Amount,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(serialize_with = "serialize_date", deserialize_with = "deserialize_date")]
    date: DateTime<Utc>,
    /// Kept exactly as submitted; use `category_id` to resolve it.
    category: String,
    #[serde(
        rename = "userId",
        default = "guest",
        deserialize_with = "deserialize_owner"
    )]
    owner_id: String,
}

impl Transaction {
    /// Validates `input` and builds a transaction from it. The amount is read in the conventions
    /// of `locale`.
    pub fn create(
        input: &NewTransaction,
        locale: Locale,
        id: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if input.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let amount = Amount::parse_with(&input.amount, locale)
            .map_err(|_| ValidationError::InvalidAmount(input.amount.clone()))?;
        if !amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount);
        }
        if amount.decimal_places() > MAX_DECIMAL_PLACES {
            return Err(ValidationError::TooManyDecimalPlaces(input.amount.clone()));
        }
        if amount.value() > max_amount() {
            return Err(ValidationError::AmountTooLarge(input.amount.clone()));
        }
        let date = parse_date(&input.date)
            .ok_or_else(|| ValidationError::InvalidDate(input.date.clone()))?;
        let kind = TransactionType::from_str(input.kind.trim())
            .map_err(|_| ValidationError::InvalidType(input.kind.clone()))?;
        let category = input.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(Self {
            id: id.into(),
            description: input.description.clone(),
            amount,
            kind,
            date,
            category: category.to_string(),
            owner_id: owner_id.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The category id as stored, which may not be one of the known ids.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The known category this transaction belongs to; unknown ids resolve to `Other`.
    pub fn category_id(&self) -> CategoryId {
        CategoryId::lookup(&self.category)
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// The fields of a transaction as a user submits them, before validation.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub category: String,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind: kind.into(),
            date: date.into(),
            category: category.into(),
        }
    }
}

/// Sorts `transactions` newest first. Transactions on the same instant keep their relative order.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Parses a date as entered by a user or found in storage.
///
/// Accepts RFC 3339 (`2024-03-01T12:30:00.000Z`), a bare date (`2024-03-01`, midnight UTC) and a
/// date-time without offset (`2024-03-01T12:30` or `2024-03-01T12:30:00`, taken as UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
}

fn guest() -> String {
    GUEST.to_string()
}

fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Dates are normally stored as ISO-8601 text, but older data may hold a native date value, which
/// JSON carries as epoch milliseconds. Both are accepted.
fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Millis(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms as i64)
            .ok_or_else(|| serde::de::Error::custom(format!("date {ms} is out of range"))),
        Raw::Millis(ms) => Err(serde::de::Error::custom(format!("invalid date {ms}"))),
        Raw::Text(s) => parse_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
    }
}

/// A missing or null owner means the transaction was recorded without a signed-in user.
fn deserialize_owner<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(guest))
}
