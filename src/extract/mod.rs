mod error;
mod fields;
mod page;
mod registry;
mod table;

use tracing::{debug, warn};

pub use error::ExtractError;
pub use fields::{NormalizedAction, ResourceRef};
pub use page::{PageParser, ServiceLink, ServicePage};

use fields::{ACTIONS_HEADER, ColumnMap, normalize};
use registry::ActionRegistry;
use table::stitch;

#[derive(Debug)]
pub struct ServiceActions {
    pub prefix: String,
    pub actions: Vec<NormalizedAction>,
    pub tables_recognized: usize,
    pub tables_skipped: usize,
    pub rows_processed: usize,
}

/// Runs every action table of a service page through stitching,
/// normalization and aggregation. Tables without an `Actions` header are
/// skipped; a recognized table missing any other required column fails the
/// whole service.
pub fn extract_service(page: &ServicePage) -> Result<ServiceActions, ExtractError> {
    let mut registry = ActionRegistry::new();
    let mut tables_recognized = 0;
    let mut tables_skipped = 0;
    let mut rows_processed = 0;

    for table in &page.tables {
        let columns = match recognize_table(&table.headers) {
            Ok(columns) => columns,
            Err(ExtractError::ShapeMismatch { headers }) => {
                warn!(prefix = %page.prefix, headers = ?headers, "skipping unrecognized table");
                tables_skipped += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        tables_recognized += 1;
        for row in stitch(&table.headers, &table.rows) {
            registry.merge(normalize(&row, &columns)?);
            rows_processed += 1;
        }
        debug!(
            prefix = %page.prefix,
            rows = table.rows.len(),
            actions = registry.len(),
            "processed action table"
        );
    }

    Ok(ServiceActions {
        prefix: page.prefix.clone(),
        actions: registry.finish(),
        tables_recognized,
        tables_skipped,
        rows_processed,
    })
}

fn recognize_table(headers: &[String]) -> Result<ColumnMap, ExtractError> {
    if !headers.iter().any(|header| header == ACTIONS_HEADER) {
        return Err(ExtractError::ShapeMismatch {
            headers: headers.to_vec(),
        });
    }
    ColumnMap::resolve(headers)
}
