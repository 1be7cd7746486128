//! Praat TextGrid point tiers.
//!
//! The writer emits a complete long-format ooTextFile with a single point
//! tier; the reader scans an existing TextGrid for the named point tier and
//! ignores everything else, so grids carrying unrelated interval tiers load
//! fine. Times are seconds on disk and milliseconds in memory.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

use super::FormatError;

/// Write `entries` as a point tier named `tier`.
///
/// Points are sorted by time, as Praat requires, which is why annotation
/// creation order does not survive this format; the `(time, label)` pairs
/// themselves do.
pub fn write_textgrid(
    path: &str,
    tier: &str,
    duration_ms: f64,
    entries: &[(f64, String)],
) -> Result<(), FormatError> {
    let mut points: Vec<&(f64, String)> = entries.iter().collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let last_point_s = points.last().map(|(ms, _)| ms / 1000.0).unwrap_or(0.0);
    let xmax = (duration_ms / 1000.0).max(last_point_s).max(0.0);

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "File type = \"ooTextFile\"")?;
    writeln!(writer, "Object class = \"TextGrid\"")?;
    writeln!(writer)?;
    writeln!(writer, "xmin = 0")?;
    writeln!(writer, "xmax = {}", xmax)?;
    writeln!(writer, "tiers? <exists>")?;
    writeln!(writer, "size = 1")?;
    writeln!(writer, "item []:")?;
    writeln!(writer, "    item [1]:")?;
    writeln!(writer, "        class = \"TextTier\"")?;
    writeln!(writer, "        name = \"{}\"", escape(tier))?;
    writeln!(writer, "        xmin = 0")?;
    writeln!(writer, "        xmax = {}", xmax)?;
    writeln!(writer, "        points: size = {}", points.len())?;
    for (index, (time_ms, label)) in points.iter().enumerate() {
        writeln!(writer, "        points [{}]:", index + 1)?;
        writeln!(writer, "            number = {}", time_ms / 1000.0)?;
        writeln!(writer, "            mark = \"{}\"", escape(label))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the point tier named `tier` from an existing TextGrid.
pub fn read_textgrid_tier(path: &str, tier: &str) -> Result<Vec<(f64, String)>, FormatError> {
    let reader = BufReader::new(File::open(path)?);

    let mut entries = Vec::new();
    let mut in_point_tier = false;
    let mut in_target_tier = false;
    let mut found_tier = false;
    let mut pending_time_ms: Option<f64> = None;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();

        if let Some(value) = keyed_value(trimmed, "class") {
            // A class line opens a new tier; the previous one is over.
            in_target_tier = false;
            in_point_tier = unquote(value)? == "TextTier";
            pending_time_ms = None;
            continue;
        }

        if let Some(value) = keyed_value(trimmed, "name") {
            if in_point_tier && unquote(value)? == tier {
                in_target_tier = true;
                found_tier = true;
            }
            continue;
        }

        if !in_target_tier {
            continue;
        }

        if let Some(value) = keyed_value(trimmed, "number") {
            let seconds: f64 = value
                .parse()
                .map_err(|_| FormatError::Parse(format!("bad point time: {}", value)))?;
            pending_time_ms = Some(seconds * 1000.0);
        } else if let Some(value) = keyed_value(trimmed, "mark") {
            let time_ms = pending_time_ms.take().ok_or_else(|| {
                FormatError::Parse("mark without a preceding point time".to_string())
            })?;
            entries.push((time_ms, unquote(value)?));
        }
    }

    if !found_tier {
        return Err(FormatError::MissingTier(tier.to_string()));
    }
    Ok(entries)
}

fn keyed_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (lhs, rhs) = line.split_once('=')?;
    if lhs.trim() == key {
        Some(rhs.trim())
    } else {
        None
    }
}

fn escape(text: &str) -> String {
    text.replace('"', "\"\"")
}

fn unquote(value: &str) -> Result<String, FormatError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| FormatError::Parse(format!("expected a quoted string: {}", value)))?;
    Ok(inner.replace("\"\"", "\""))
}
