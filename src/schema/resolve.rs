use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SheetError};
use crate::schema::registry::FieldRegistry;

/// Column indices at which each header value occurs.
pub fn header_column_indices(header: &[String]) -> HashMap<&str, Vec<usize>> {
    let mut indices: HashMap<&str, Vec<usize>> = HashMap::new();
    for (col, value) in header.iter().enumerate() {
        indices.entry(value.as_str()).or_default().push(col);
    }
    indices
}

/// Field position to column index mapping for one sheet header.
///
/// Only exists when every tag of the registry occurs in the header exactly
/// once. Header values that are not tags may repeat freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndexMap {
    columns: BTreeMap<usize, usize>,
}

impl ColumnIndexMap {
    /// Matches every tag against the header. Fails on the first tag, in
    /// declaration order, that is missing or repeated; never returns a
    /// partial map.
    pub fn resolve(registry: &FieldRegistry, header: &[String]) -> Result<Self> {
        let indices = header_column_indices(header);
        let mut columns = BTreeMap::new();
        for (position, tag, _) in registry.fields() {
            match indices.get(tag).map(Vec::as_slice) {
                None | Some([]) => {
                    return Err(SheetError::TaggedHeaderMissing {
                        tag: tag.to_string(),
                    });
                }
                Some([col]) => {
                    columns.insert(position, *col);
                }
                Some(found) => {
                    return Err(SheetError::TaggedHeaderDuplicated {
                        tag: tag.to_string(),
                        count: found.len(),
                    });
                }
            }
        }
        Ok(Self { columns })
    }

    pub fn column(&self, position: usize) -> Option<usize> {
        self.columns.get(&position).copied()
    }

    /// `(field position, column index)` pairs ordered by field position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.columns
            .iter()
            .map(|(position, column)| (*position, *column))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
