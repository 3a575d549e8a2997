//! Replace-import of price bars from CSV

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::PriceBar;
use crate::repositories::PriceBarRepository;

/// Header row an import file must carry, in any order.
pub const EXPECTED_COLUMNS: [&str; 7] = ["timestamp", "open", "high", "low", "close", "dt", "time"];

/// Parse every bar from a CSV source.
///
/// The header must name exactly the stored columns and every timestamp must
/// be unique; nothing is written anywhere, so a bad file never touches the
/// table.
pub fn read_bars<R: Read>(reader: R) -> StoreResult<Vec<PriceBar>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: BTreeSet<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let expected: BTreeSet<String> = EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect();
    if headers != expected {
        let missing: Vec<_> = expected.difference(&headers).cloned().collect();
        let unexpected: Vec<_> = headers.difference(&expected).cloned().collect();
        return Err(StoreError::Import(format!(
            "column mismatch (missing: [{}], unexpected: [{}])",
            missing.join(", "),
            unexpected.join(", ")
        )));
    }

    let mut bars = Vec::new();
    let mut seen = HashSet::new();
    for (i, record) in rdr.deserialize::<PriceBar>().enumerate() {
        // Row 1 is the header
        let row = i + 2;
        let bar = record.map_err(|e| StoreError::Import(format!("row {}: {}", row, e)))?;
        if !seen.insert(bar.timestamp.clone()) {
            return Err(StoreError::Import(format!(
                "row {}: duplicate timestamp {}",
                row, bar.timestamp
            )));
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Parse `reader` and make its bars the complete table contents.
///
/// Any failure, including a duplicate key inside the data, is reported as
/// `StoreError::Import`.
pub async fn import_bars<R: Read>(repo: &PriceBarRepository, reader: R) -> StoreResult<u64> {
    let bars = read_bars(reader)?;
    repo.replace_all(&bars).await.map_err(|e| match e {
        StoreError::Import(_) => e,
        other => StoreError::Import(other.to_string()),
    })
}

pub async fn import_file(repo: &PriceBarRepository, path: &Path) -> StoreResult<u64> {
    info!("Importing price bars from {:?}", path);
    let file = std::fs::File::open(path).map_err(|e| {
        warn!("Cannot open import file {:?}: {}", path, e);
        StoreError::Import(format!("{}: {}", path.display(), e))
    })?;
    import_bars(repo, file).await
}
