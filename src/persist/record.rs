//! Record codec: a flat JSON array of `[slot, [key, "label"]]` pairs

use std::collections::BTreeMap;

use super::StorageError;
use crate::state::BoxEntry;

/// Name under which the box record is stored
pub const DEFAULT_RECORD_KEY: &str = "boxData";

type RecordRow = (usize, (u32, String));

/// Serialize the aggregate map. Entries without a key are skipped.
pub fn encode_record(entries: &BTreeMap<usize, BoxEntry>) -> Result<String, StorageError> {
    let rows: Vec<RecordRow> = entries
        .iter()
        .filter_map(|(slot, entry)| entry.key.map(|key| (*slot, (key, entry.label.clone()))))
        .collect();

    Ok(serde_json::to_string(&rows)?)
}

/// Parse a stored record in the order it was written. A JSON `null` is an empty record.
pub fn decode_record(contents: &str) -> Result<Vec<(usize, BoxEntry)>, StorageError> {
    let rows: Option<Vec<RecordRow>> = serde_json::from_str(contents)?;

    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .map(|(slot, (key, label))| (slot, BoxEntry::keyed(key, label)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shape() {
        let mut entries = BTreeMap::new();
        entries.insert(3, BoxEntry::keyed(5, "7"));
        entries.insert(0, BoxEntry::keyed(11, "H"));

        let json = encode_record(&entries).unwrap();
        assert_eq!(json, r#"[[0,[11,"H"]],[3,[5,"7"]]]"#);
    }

    #[test]
    fn test_encode_skips_cleared_entries() {
        let mut entries = BTreeMap::new();
        entries.insert(1, BoxEntry::cleared());
        entries.insert(2, BoxEntry::keyed(1, "1"));

        assert_eq!(encode_record(&entries).unwrap(), r#"[[2,[1,"1"]]]"#);
    }

    #[test]
    fn test_decode_preserves_order() {
        let decoded = decode_record(r#"[[4,[7,"4."]],[1,[36,"A"]]]"#).unwrap();

        assert_eq!(
            decoded,
            vec![
                (4, BoxEntry::keyed(7, "4.")),
                (1, BoxEntry::keyed(36, "A")),
            ]
        );
    }

    #[test]
    fn test_decode_null_is_empty() {
        assert!(decode_record("null").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_record("{not json"),
            Err(StorageError::Malformed(_))
        ));
        assert!(decode_record(r#"[[0,["x","y"]]]"#).is_err());
    }
}
