//! JSON annotation files.
//!
//! One file covers a whole session: `{ "<wav path>": [[time_ms, label], ...] }`.
//! Loading an unknown recording path simply yields no entries; saving writes
//! the entire map, so an existing file is overwritten with the session state.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::FormatError;

/// Annotations per recording path, in creation order.
pub type AnnotationMap = BTreeMap<String, Vec<(f64, String)>>;

pub fn load_annotations(path: &str) -> Result<AnnotationMap, FormatError> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|err| FormatError::Parse(err.to_string()))
}

pub fn save_annotations(path: &str, annotations: &AnnotationMap) -> Result<(), FormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, annotations)
        .map_err(|err| FormatError::Parse(err.to_string()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn test_file_path() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        std::env::temp_dir().join(format!("tonemark-annotations-{}.json", nanos))
    }

    #[test]
    fn round_trips_the_annotation_map() {
        let path = test_file_path();
        let mut annotations = AnnotationMap::new();
        annotations.insert(
            "a.wav".to_string(),
            vec![(900.0, "H*".to_string()), (300.0, "L%".to_string())],
        );
        annotations.insert("b.wav".to_string(), vec![(10.5, "!H*".to_string())]);

        save_annotations(path.to_str().unwrap(), &annotations).expect("save");
        let read_back = load_annotations(path.to_str().unwrap()).expect("load");

        assert_eq!(read_back, annotations);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn creation_order_survives_the_round_trip() {
        let path = test_file_path();
        let mut annotations = AnnotationMap::new();
        // Out-of-time-order on purpose: creation order is the stored order.
        annotations.insert(
            "a.wav".to_string(),
            vec![(2_000.0, "L*".to_string()), (100.0, "H*".to_string())],
        );

        save_annotations(path.to_str().unwrap(), &annotations).expect("save");
        let read_back = load_annotations(path.to_str().unwrap()).expect("load");

        let entries = &read_back["a.wav"];
        assert_eq!(entries[0], (2_000.0, "L*".to_string()));
        assert_eq!(entries[1], (100.0, "H*".to_string()));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let path = test_file_path();
        std::fs::write(&path, "{ not json").expect("write");

        match load_annotations(path.to_str().unwrap()) {
            Err(FormatError::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        match load_annotations("/nonexistent/tonemark.json") {
            Err(FormatError::Io(_)) => {}
            other => panic!("expected io error, got {:?}", other.map(|_| ())),
        }
    }
}
