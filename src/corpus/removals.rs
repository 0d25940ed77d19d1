// Removal list: docids excluded from the study outright.
//
// Any row whose `remove` cell is not exactly `n` marks its docid for
// removal, including rows where the cell is empty.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::table::TsvTable;

/// The only `remove` value that keeps a document in the study.
pub const KEEP_CODE: &str = "n";

/// Load the removal list at `path`.
pub fn load(path: &Path) -> Result<HashSet<String>> {
    let removed = from_table(TsvTable::open(path)?)
        .with_context(|| format!("Failed to read removal list {}", path.display()))?;
    info!(removed = removed.len(), "Loaded removal list");
    Ok(removed)
}

pub fn from_table<R: Read>(table: TsvTable<R>) -> Result<HashSet<String>> {
    let docid_col = table.column("docid")?;
    let remove_col = table.column("remove")?;

    let mut removed = HashSet::new();
    for row in table {
        let row = row?;
        let Some(docid) = row.get(docid_col) else {
            continue;
        };
        if row.get(remove_col) != Some(KEEP_CODE) {
            removed.insert(docid.to_string());
        }
    }
    Ok(removed)
}
