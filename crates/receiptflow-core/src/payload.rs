//! Typed view of an annotation export payload.
//!
//! The export is an untyped tree whose nodes carry a `schema_id` tag.
//! [`ExportPayload::from_value`] walks it once and sorts every node into a
//! closed set of variants, so the normaliser never matches on strings.
//!
//! Shape of the parts we read:
//!
//! ```text
//! { "results": [
//!     { "arrived_at": "2024-03-20T10:00:00",
//!       "content": [
//!         { "schema_id": "basic_info_section",
//!           "children": [ { "schema_id": "store_name", "value": "Tesco" } ] },
//!         { "schema_id": "line_items_section",
//!           "children": [
//!             { "schema_id": "line_items",
//!               "children": [
//!                 { "category": "tuple",
//!                   "children": [ { "schema_id": "item_description", "value": "Milk" } ] } ] } ] } ] } ] }
//! ```
//!
//! A leaf's `value` is decoded into one of three states, [`LeafValue`]:
//! missing, explicit `null`, or a JSON value kept as sent (so `25` stays a
//! number and `"25"` a string).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::PayloadError;

pub const BASIC_INFO_SECTION: &str = "basic_info_section";
pub const LINE_ITEMS_SECTION: &str = "line_items_section";
pub const STORE_NAME: &str = "store_name";
pub const LINE_ITEMS: &str = "line_items";
pub const TUPLE_CATEGORY: &str = "tuple";

/// Merchant name used when a `store_name` field exists but carries no value.
pub const UNKNOWN_STORE: &str = "Unknown Store";

/// A decoded export: one [`AnnotationResult`] per processed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPayload {
    pub results: Vec<AnnotationResult>,
}

/// One processed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationResult {
    /// ISO 8601 timestamp string, as sent by the extraction service.
    pub arrived_at: Option<String>,
    pub content: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    BasicInfo(BasicInfoSection),
    LineItems(LineItemsSection),
    Other(OtherSection),
}

/// `basic_info_section`. Only its `store_name` children are kept, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicInfoSection {
    pub store_names: Vec<StoreNameField>,
}

/// The `value` of a leaf node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeafValue {
    /// No `value` key at all.
    #[default]
    Absent,
    /// `"value": null`.
    Null,
    /// Any other JSON value, never `Value::Null`.
    Value(Value),
}

impl LeafValue {
    fn of(obj: &Map<String, Value>) -> Self {
        match obj.get("value") {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(value) => Self::Value(value.clone()),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNameField {
    pub value: LeafValue,
}

impl StoreNameField {
    /// The merchant key this field resolves to.
    ///
    /// A missing `value` falls back to [`UNKNOWN_STORE`]; an explicit `null`
    /// gives `None`, the same key as having no `store_name` field at all.
    /// Non-string values are keyed by their JSON text.
    pub fn merchant(&self) -> Option<String> {
        match &self.value {
            LeafValue::Absent => Some(UNKNOWN_STORE.to_string()),
            LeafValue::Null => None,
            LeafValue::Value(Value::String(name)) => Some(name.clone()),
            LeafValue::Value(other) => Some(other.to_string()),
        }
    }
}

/// `line_items_section`. Holds every `line_items` child in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemsSection {
    pub lists: Vec<LineItemList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemList {
    pub items: Vec<ItemNode>,
}

/// Any section whose `schema_id` we do not read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherSection {
    pub schema_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemNode {
    /// A `category == "tuple"` node.
    LineItem(LineItem),
    Unknown,
}

/// Recognised fields of a tuple node, in document order. Unrecognised
/// children are dropped during decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItem {
    pub fields: Vec<(ItemField, LeafValue)>,
}

/// Line-item field kinds and the table column each one lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ItemField {
    #[serde(rename = "Item")]
    Description,
    #[serde(rename = "Price")]
    Amount,
    #[serde(rename = "Quantity")]
    Quantity,
    #[serde(rename = "Total")]
    AmountTotal,
}

impl ItemField {
    pub const ALL: [ItemField; 4] = [
        ItemField::Description,
        ItemField::Amount,
        ItemField::Quantity,
        ItemField::AmountTotal,
    ];

    pub fn from_schema_id(schema_id: &str) -> Option<Self> {
        match schema_id {
            "item_description" => Some(Self::Description),
            "item_amount" => Some(Self::Amount),
            "item_quantity" => Some(Self::Quantity),
            "item_amount_total" => Some(Self::AmountTotal),
            _ => None,
        }
    }

    pub fn schema_id(self) -> &'static str {
        match self {
            Self::Description => "item_description",
            Self::Amount => "item_amount",
            Self::Quantity => "item_quantity",
            Self::AmountTotal => "item_amount_total",
        }
    }

    /// Output column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Description => "Item",
            Self::Amount => "Price",
            Self::Quantity => "Quantity",
            Self::AmountTotal => "Total",
        }
    }
}

impl AnnotationResult {
    /// Date component of `arrived_at`: everything before the first `T`.
    ///
    /// `None` when the timestamp is missing or its date part is empty; such
    /// results cannot be placed in a date-indexed view.
    pub fn arrival_date(&self) -> Option<&str> {
        let ts = self.arrived_at.as_deref()?;
        let date = ts.split_once('T').map_or(ts, |(date, _)| date);
        (!date.is_empty()).then_some(date)
    }
}

impl ExportPayload {
    /// Decode a raw export payload.
    ///
    /// Only a non-object payload is an error. A missing or non-array
    /// `results` decodes as no results, and malformed nodes further down
    /// decode as [`Section::Other`] / [`ItemNode::Unknown`] or are skipped.
    pub fn from_value(value: &Value) -> Result<Self, PayloadError> {
        let obj = value
            .as_object()
            .ok_or_else(|| PayloadError::NotAnObject(json_kind(value)))?;
        let results = array_field(obj, "results")
            .iter()
            .filter_map(Value::as_object)
            .map(decode_result)
            .collect();
        Ok(Self { results })
    }

    /// Parse JSON text and decode it.
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }
}

fn decode_result(obj: &Map<String, Value>) -> AnnotationResult {
    AnnotationResult {
        arrived_at: obj
            .get("arrived_at")
            .and_then(Value::as_str)
            .map(str::to_owned),
        content: array_field(obj, "content")
            .iter()
            .map(decode_section)
            .collect(),
    }
}

fn decode_section(value: &Value) -> Section {
    let Some(obj) = value.as_object() else {
        return Section::Other(OtherSection::default());
    };
    match schema_id(obj) {
        Some(BASIC_INFO_SECTION) => Section::BasicInfo(BasicInfoSection {
            store_names: tagged_children(obj, STORE_NAME)
                .map(|child| StoreNameField {
                    value: LeafValue::of(child),
                })
                .collect(),
        }),
        Some(LINE_ITEMS_SECTION) => Section::LineItems(LineItemsSection {
            lists: tagged_children(obj, LINE_ITEMS)
                .map(|child| LineItemList {
                    items: array_field(child, "children")
                        .iter()
                        .map(decode_item)
                        .collect(),
                })
                .collect(),
        }),
        other => Section::Other(OtherSection {
            schema_id: other.map(str::to_owned),
        }),
    }
}

fn decode_item(value: &Value) -> ItemNode {
    let Some(obj) = value.as_object() else {
        return ItemNode::Unknown;
    };
    if obj.get("category").and_then(Value::as_str) != Some(TUPLE_CATEGORY) {
        return ItemNode::Unknown;
    }
    let fields = array_field(obj, "children")
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|child| {
            let field = ItemField::from_schema_id(schema_id(child)?)?;
            Some((field, LeafValue::of(child)))
        })
        .collect();
    ItemNode::LineItem(LineItem { fields })
}

/// Object children of `obj` whose `schema_id` equals `tag`.
fn tagged_children<'a>(
    obj: &'a Map<String, Value>,
    tag: &'static str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    array_field(obj, "children")
        .iter()
        .filter_map(Value::as_object)
        .filter(move |child| schema_id(child) == Some(tag))
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn schema_id(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("schema_id").and_then(Value::as_str)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
