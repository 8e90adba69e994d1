/// Arrow tables for rendering a merchant's line items.
pub mod items {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;

    use crate::grouping::ItemRecord;
    use crate::payload::ItemField;

    /// Schema with one nullable `Utf8` column per field, in the given order.
    pub fn item_table_schema(columns: &[ItemField]) -> Schema {
        Schema::new(
            columns
                .iter()
                .map(|field| Field::new(field.column(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        )
    }

    /// Columns present in any record, in first-seen order.
    pub fn present_columns(items: &[ItemRecord]) -> Vec<ItemField> {
        let mut columns = Vec::new();
        for (field, _) in items.iter().flat_map(ItemRecord::fields) {
            if !columns.contains(&field) {
                columns.push(field);
            }
        }
        columns
    }

    /// One row per record. A record lacking a column gets a null cell.
    pub fn items_to_batch(items: &[ItemRecord]) -> Result<RecordBatch, ArrowError> {
        let columns = present_columns(items);
        let schema = Arc::new(item_table_schema(&columns));
        if columns.is_empty() {
            return Ok(RecordBatch::new_empty(schema));
        }
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|&field| {
                let values: StringArray = items.iter().map(|record| record.text(field)).collect();
                Arc::new(values) as ArrayRef
            })
            .collect();
        RecordBatch::try_new(schema, arrays)
    }
}
