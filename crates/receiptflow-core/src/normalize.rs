//! Reduce a decoded export payload to [`GroupedTransactions`].
//!
//! For each result, in order:
//!
//! 1. Take the arrival date (part of `arrived_at` before the first `T`).
//!    Results without one are skipped entirely.
//! 2. Resolve the merchant from the last `store_name` field of any
//!    `basic_info_section`; `None` if there is no such field or its value is
//!    `null`.
//! 3. Collect every tuple line item from every `line_items_section`, in
//!    document order, dropping items with no recognised fields.
//! 4. Append those items under date → merchant. Results sharing a date and
//!    merchant accumulate.

use serde_json::Value;
use tracing::debug;

use crate::grouping::{GroupedTransactions, ItemRecord};
use crate::payload::{AnnotationResult, ExportPayload, ItemNode, LeafValue, LineItem, Section};
use crate::PayloadError;

/// Group a decoded payload by date and merchant. Pure; the same payload
/// always yields the same grouping.
pub fn normalize(payload: &ExportPayload) -> GroupedTransactions {
    let mut grouped = GroupedTransactions::new();
    let mut skipped = 0usize;

    for result in &payload.results {
        let Some(date) = result.arrival_date() else {
            skipped += 1;
            debug!(arrived_at = ?result.arrived_at, "skipping result without arrival date");
            continue;
        };
        grouped.extend(date, merchant(result), line_items(result));
    }

    debug!(
        results = payload.results.len(),
        skipped,
        dates = grouped.len(),
        items = grouped.item_count(),
        "normalised export payload"
    );
    grouped
}

/// Decode a raw JSON payload and group it.
pub fn normalize_value(value: &Value) -> Result<GroupedTransactions, PayloadError> {
    let payload = ExportPayload::from_value(value)?;
    Ok(normalize(&payload))
}

/// Parse, decode, and group JSON text.
pub fn normalize_str(text: &str) -> Result<GroupedTransactions, PayloadError> {
    let payload = ExportPayload::from_json(text)?;
    Ok(normalize(&payload))
}

fn merchant(result: &AnnotationResult) -> Option<String> {
    result
        .content
        .iter()
        .filter_map(|section| match section {
            Section::BasicInfo(info) => Some(info),
            Section::LineItems(_) | Section::Other(_) => None,
        })
        .flat_map(|info| &info.store_names)
        .last()
        .and_then(|field| field.merchant())
}

fn line_items(result: &AnnotationResult) -> Vec<ItemRecord> {
    result
        .content
        .iter()
        .filter_map(|section| match section {
            Section::LineItems(items) => Some(items),
            Section::BasicInfo(_) | Section::Other(_) => None,
        })
        .flat_map(|section| &section.lists)
        .flat_map(|list| &list.items)
        .filter_map(|node| match node {
            ItemNode::LineItem(item) => Some(item_record(item)),
            ItemNode::Unknown => None,
        })
        .filter(|record| !record.is_empty())
        .collect()
}

/// A missing `value` becomes `""`; an explicit `null` is kept as null.
fn item_record(item: &LineItem) -> ItemRecord {
    let mut record = ItemRecord::new();
    for (field, value) in &item.fields {
        let value = match value {
            LeafValue::Absent => Value::String(String::new()),
            LeafValue::Null => Value::Null,
            LeafValue::Value(value) => value.clone(),
        };
        record.insert(*field, value);
    }
    record
}
