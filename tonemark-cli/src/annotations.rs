//! Loading and saving the session's annotations.
//!
//! One of two stores may be active: a single JSON file covering every
//! recording, or one TextGrid per recording. Load problems are advisory (an
//! unreadable store starts the session empty); save problems are reported to
//! the caller.

use std::path::Path;

use log::warn;

use tonemark_lib::formats::json::{self, AnnotationMap};
use tonemark_lib::formats::{textgrid, FormatError};
use tonemark_lib::playback;
use tonemark_lib::timeline::AnnotationTimeline;

/// Where annotations are persisted for this session.
pub enum Store {
    Json(String),
    TextGrids(String),
    None,
}

impl Store {
    pub fn from_args(json_path: Option<&str>, tier: Option<&str>) -> Self {
        match (json_path, tier) {
            (Some(path), _) => Self::Json(path.to_string()),
            (None, Some(tier)) => Self::TextGrids(tier.to_string()),
            (None, None) => Self::None,
        }
    }
}

/// The TextGrid path corresponding to a recording path.
pub fn grid_path(wav_path: &str) -> String {
    Path::new(wav_path)
        .with_extension("TextGrid")
        .to_string_lossy()
        .into_owned()
}

/// Load stored annotations for the given recordings.
///
/// Every requested recording gets an entry; recordings without stored
/// annotations get an empty list.
pub fn load_map(files: &[String], store: &Store) -> AnnotationMap {
    let mut map = AnnotationMap::new();
    for file in files {
        map.insert(file.clone(), Vec::new());
    }

    match store {
        Store::Json(path) => {
            if !Path::new(path).exists() {
                return map;
            }
            match json::load_annotations(path) {
                Ok(stored) => {
                    for file in files {
                        if let Some(entries) = stored.get(file) {
                            map.insert(file.clone(), entries.clone());
                        }
                    }
                }
                Err(err) => warn!("could not load {}: {}", path, err),
            }
        }
        Store::TextGrids(tier) => {
            for file in files {
                let grid = grid_path(file);
                if !Path::new(&grid).exists() {
                    continue;
                }
                match textgrid::read_textgrid_tier(&grid, tier) {
                    Ok(entries) => {
                        map.insert(file.clone(), entries);
                    }
                    Err(FormatError::MissingTier(tier)) => {
                        warn!("{} has no \"{}\" tier; starting empty", grid, tier);
                    }
                    Err(err) => warn!("could not load {}: {}", grid, err),
                }
            }
        }
        Store::None => {}
    }

    map
}

/// One timeline per recording, in FILES order.
pub fn timelines_from_map(files: &[String], map: &AnnotationMap) -> Vec<AnnotationTimeline> {
    files
        .iter()
        .map(|file| {
            AnnotationTimeline::from_absolute(map.get(file).cloned().unwrap_or_default())
        })
        .collect()
}

/// Persist every recording's annotations.
///
/// `durations_ms` holds the probed duration per recording where one is
/// known; recordings never played are probed on demand so their grids get a
/// usable time range.
pub fn save(
    files: &[String],
    timelines: &[AnnotationTimeline],
    durations_ms: &[Option<f64>],
    store: &Store,
) -> Result<(), FormatError> {
    match store {
        Store::Json(path) => {
            let mut map = AnnotationMap::new();
            for (file, timeline) in files.iter().zip(timelines) {
                map.insert(file.clone(), timeline.to_pairs());
            }
            json::save_annotations(path, &map)
        }
        Store::TextGrids(tier) => {
            for (index, (file, timeline)) in files.iter().zip(timelines).enumerate() {
                let duration_ms = durations_ms
                    .get(index)
                    .copied()
                    .flatten()
                    .or_else(|| playback::probe_duration_ms(file).ok().flatten())
                    .unwrap_or(0.0);
                textgrid::write_textgrid(&grid_path(file), tier, duration_ms, &timeline.to_pairs())?;
            }
            Ok(())
        }
        Store::None => Ok(()),
    }
}
