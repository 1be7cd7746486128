use std::fs::File;
use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::PlaybackError;

/// Probe a recording for its duration in milliseconds.
///
/// Returns `Ok(None)` when the container carries no usable frame count or
/// time base; the caller treats that as "duration unknown" rather than a
/// failure.
pub fn probe_duration_ms(file_path: &str) -> Result<Option<f64>, PlaybackError> {
    let path = Path::new(file_path);

    // Provide the file extension as a hint to the format registry.
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let source = Box::new(File::open(path)?) as Box<dyn MediaSource>;
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| PlaybackError::Probe(err.to_string()))?;

    let Some(track) = probed.format.default_track() else {
        return Ok(None);
    };

    let params = &track.codec_params;
    let (Some(time_base), Some(n_frames)) = (params.time_base, params.n_frames) else {
        return Ok(None);
    };

    let time = time_base.calc_time(params.start_ts + n_frames);
    Ok(Some((time.seconds as f64 + time.frac) * 1000.0))
}
