//! Date → merchant → line items, the display-ready shape of an export.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::payload::ItemField;

/// One line item: column → value, in the order fields were encountered.
///
/// Values stay as the service sent them: strings, numbers, or `null` for a
/// field whose `value` was explicitly null.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ItemRecord(IndexMap<ItemField, Value>);

impl ItemRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. A repeated field overwrites the value but keeps its
    /// original position.
    pub fn insert(&mut self, field: ItemField, value: impl Into<Value>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: ItemField) -> Option<&Value> {
        self.0.get(&field)
    }

    /// Cell text for a table: `None` when the field is missing or null,
    /// strings as-is, anything else as JSON text.
    pub fn text(&self, field: ItemField) -> Option<String> {
        match self.0.get(&field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (ItemField, &Value)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }
}

impl<const N: usize> From<[(ItemField, &str); N]> for ItemRecord {
    fn from(fields: [(ItemField, &str); N]) -> Self {
        let mut record = Self::new();
        for (field, value) in fields {
            record.insert(field, value);
        }
        record
    }
}

/// Merchant key → items. `None` means no `store_name` field was present,
/// which is a different group from [`UNKNOWN_STORE`](crate::UNKNOWN_STORE).
pub type MerchantGroups = IndexMap<Option<String>, Vec<ItemRecord>>;

/// Transactions grouped by arrival date, then merchant.
///
/// Dates and merchants keep first-seen order; use
/// [`dates_descending`](Self::dates_descending) for display order. Every date
/// holds at least one merchant, though a merchant's item list may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTransactions {
    dates: IndexMap<String, MerchantGroups>,
}

impl GroupedTransactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `items` under `date` / `merchant`, creating either group as needed.
    pub fn extend(&mut self, date: &str, merchant: Option<String>, items: Vec<ItemRecord>) {
        self.dates
            .entry(date.to_owned())
            .or_default()
            .entry(merchant)
            .or_default()
            .extend(items);
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of distinct dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Total line items across every group.
    pub fn item_count(&self) -> usize {
        self.dates
            .values()
            .flat_map(|merchants| merchants.values())
            .map(Vec::len)
            .sum()
    }

    pub fn get(&self, date: &str) -> Option<&MerchantGroups> {
        self.dates.get(date)
    }

    pub fn items(&self, date: &str, merchant: Option<&str>) -> Option<&[ItemRecord]> {
        self.dates
            .get(date)?
            .get(&merchant.map(str::to_owned))
            .map(Vec::as_slice)
    }

    /// Dates in first-seen order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.dates.keys().map(String::as_str)
    }

    /// Groups ordered most recent date first.
    ///
    /// Plain reverse lexicographic order, which is chronological for
    /// `YYYY-MM-DD` keys.
    pub fn dates_descending(&self) -> Vec<(&str, &MerchantGroups)> {
        let mut dates: Vec<(&str, &MerchantGroups)> = self
            .dates
            .iter()
            .map(|(date, merchants)| (date.as_str(), merchants))
            .collect();
        dates.sort_by(|a, b| b.0.cmp(a.0));
        dates
    }
}

/// Serialises as `{date: {merchant: [item, ...]}}` with the most recent date
/// first. A `None` merchant is written as the key `"null"`, so a date holding
/// both `None` and a store literally named `"null"` emits that key twice.
impl Serialize for GroupedTransactions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dates = self.dates_descending();
        let mut map = serializer.serialize_map(Some(dates.len()))?;
        for (date, merchants) in dates {
            map.serialize_entry(date, &MerchantsJson(merchants))?;
        }
        map.end()
    }
}

struct MerchantsJson<'a>(&'a MerchantGroups);

impl Serialize for MerchantsJson<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (merchant, items) in self.0 {
            map.serialize_entry(merchant.as_deref().unwrap_or("null"), items)?;
        }
        map.end()
    }
}
