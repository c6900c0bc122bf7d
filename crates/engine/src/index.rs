//! Mirror index bootstrap.

use mirror::{DatabaseId, IndexInsert, MirrorIndex, MirrorStore, PortError};
use tracing::{info, instrument, warn};

/// Reads every row of `database` and indexes it by issue number.
///
/// Follows the query cursor until the store reports no further pages. Any
/// page failure fails the whole bootstrap; a partial index is never returned.
/// Rows without a page id or an issue number, and later rows repeating an
/// already indexed number, are skipped with a warning.
#[instrument(skip(store), fields(database = %database))]
pub async fn bootstrap_index(
    store: &dyn MirrorStore,
    database: &DatabaseId,
) -> Result<MirrorIndex, PortError> {
    let mut index = MirrorIndex::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let page = store.query_rows(database, cursor.as_ref()).await?;
        pages += 1;

        if page.unidentified > 0 {
            warn!(count = page.unidentified, "Rows have no page id; ignoring them");
            index.skip_unidentified(page.unidentified);
        }
        for row in page.rows {
            let page_id = row.page_id.clone();
            match index.insert(row) {
                IndexInsert::Inserted => {}
                IndexInsert::MissingIssueNumber => {
                    warn!(page = %page_id, "Row has no issue number; ignoring it");
                }
                IndexInsert::Duplicate { kept } => {
                    warn!(page = %page_id, %kept, "Row repeats an indexed issue number; ignoring it");
                }
            }
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        indexed = index.len(),
        skipped = index.skipped_rows(),
        pages,
        "Fetched mirror rows"
    );
    Ok(index)
}
