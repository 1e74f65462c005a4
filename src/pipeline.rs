//! Row pipeline - classify every row of one table.
//!
//! [`classify_rows`] is the pure part: a lazy mapping from rows to
//! [`ClassificationResult`]s in input order. [`normalize_table`] resolves
//! the schema, runs that mapping and writes the results next to the
//! original cells.

use crate::classify::{classify_record, ClassificationResult, RecordFields};
use crate::columns::{resolve_columns, ColumnMapping, ColumnRole};
use crate::error::{Result, TableError};
use crate::table::{Record, Table};
use crate::taxonomy::ActivityTaxonomy;

pub const COL_COMMON_NAME: &str = "CommonActivityName";
pub const COL_CANONICAL_ACTION: &str = "CanonicalAction";
pub const COL_OBJECT_TYPE: &str = "ObjectType";
pub const COL_QUALIFIERS: &str = "Qualifiers";
pub const COL_AGGREGATION_KEY: &str = "AggregationKey";
pub const COL_PROVIDER: &str = "Provider";

/// Columns added to every output table, in output order.
pub const DERIVED_COLUMNS: [&str; 6] = [
    COL_COMMON_NAME,
    COL_CANONICAL_ACTION,
    COL_OBJECT_TYPE,
    COL_QUALIFIERS,
    COL_AGGREGATION_KEY,
    COL_PROVIDER,
];

/// Field names checked for the data-action flag before the mapped column.
const DATA_FLAG_FIELDS: [&str; 2] = ["IsDataAction", "is_data"];

/// A table with the derived columns filled in.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub table: Table,
    pub mapping: ColumnMapping,
}

/// Pull the engine's input fields out of a row. Unmapped roles read as empty.
pub fn record_fields<'a>(record: &Record<'a>, mapping: &ColumnMapping) -> RecordFields<'a> {
    let data_flag = DATA_FLAG_FIELDS
        .iter()
        .find_map(|field| record.get(field))
        .or_else(|| {
            mapping
                .column(ColumnRole::IsData)
                .and_then(|column| record.get(column))
        });

    RecordFields {
        operation: record.get(mapping.operation()).unwrap_or_default(),
        resource_type: record.get(mapping.resource_type()).unwrap_or_default(),
        data_flag,
    }
}

/// Classify each row of `table`, lazily and in order.
pub fn classify_rows<'a>(
    table: &'a Table,
    mapping: &'a ColumnMapping,
    taxonomy: &'a ActivityTaxonomy,
) -> impl Iterator<Item = ClassificationResult> + 'a {
    table
        .records()
        .map(move |record| classify_record(&record_fields(&record, mapping), taxonomy))
}

/// Resolve columns and append the derived columns to every row.
///
/// Fails when no operation column resolves or a row has more cells than
/// there are headers; otherwise every row is classified and emitted. Short
/// rows are padded. A derived column already present in the input is
/// overwritten in place.
pub fn normalize_table(
    table: &Table,
    provider_tag: &str,
    taxonomy: &ActivityTaxonomy,
) -> Result<NormalizedTable> {
    let mapping = resolve_columns(&table.name, &table.headers)?;

    if let Some((row, values)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() > table.headers.len())
    {
        return Err(TableError::RowWidth {
            table: table.name.clone(),
            row,
            cells: values.len(),
            columns: table.headers.len(),
        }
        .into());
    }

    let mut headers = table.headers.clone();
    let derived_idx: Vec<usize> = DERIVED_COLUMNS
        .iter()
        .map(|col| match headers.iter().position(|h| h == col) {
            Some(idx) => idx,
            None => {
                headers.push(col.to_string());
                headers.len() - 1
            }
        })
        .collect();

    let mut out = Table::new(table.name.clone(), headers);
    out.rows.reserve(table.len());

    for (values, result) in table.rows.iter().zip(classify_rows(table, &mapping, taxonomy)) {
        let mut row = values.clone();
        row.resize(out.headers.len(), String::new());

        let derived = [
            result.common_name,
            result.action_label,
            result.object_label,
            result.qualifiers.joined(),
            result.aggregation_key,
            provider_tag.to_string(),
        ];
        for (idx, value) in derived_idx.iter().zip(derived) {
            row[*idx] = value;
        }
        out.rows.push(row);
    }

    tracing::info!(
        table = %table.name,
        rows = out.len(),
        provider = provider_tag,
        "normalized table"
    );

    Ok(NormalizedTable {
        table: out,
        mapping,
    })
}
