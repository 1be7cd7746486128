use std::env;
use std::path::PathBuf;

use rand::Rng;

const SAMPLE_RATE: u32 = 16_000;

fn main() {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_help();
        return;
    };

    match cmd.as_str() {
        "practice" => practice_cmd(args.collect()),
        "-h" | "--help" => print_help(),
        _ => {
            eprintln!("Unknown command: {}", cmd);
            print_help();
        }
    }
}

/// Generate wav files with randomized pitch contours, for rehearsing
/// annotation without field recordings.
fn practice_cmd(args: Vec<String>) {
    let mut out_dir = PathBuf::from(".");
    let mut count: usize = 5;
    let mut seconds: f64 = 2.5;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out-dir" => {
                if let Some(path) = iter.next() {
                    out_dir = PathBuf::from(path);
                } else {
                    eprintln!("--out-dir requires a path");
                    return;
                }
            }
            "--count" => {
                if let Some(value) = iter.next() {
                    match value.parse::<usize>() {
                        Ok(val) if val > 0 => count = val,
                        _ => {
                            eprintln!("Invalid --count value: {}", value);
                            return;
                        }
                    }
                } else {
                    eprintln!("--count requires a value");
                    return;
                }
            }
            "--seconds" => {
                if let Some(value) = iter.next() {
                    match value.parse::<f64>() {
                        Ok(val) if val > 0.0 => seconds = val,
                        _ => {
                            eprintln!("Invalid --seconds value: {}", value);
                            return;
                        }
                    }
                } else {
                    eprintln!("--seconds requires a value");
                    return;
                }
            }
            "-h" | "--help" => {
                print_practice_help();
                return;
            }
            _ => {
                eprintln!("Unknown practice arg: {}", arg);
                print_practice_help();
                return;
            }
        }
    }

    let mut rng = rand::thread_rng();
    for index in 0..count {
        let path = out_dir.join(format!("practice_{:02}.wav", index + 1));
        match write_contour_wav(&path, seconds, &mut rng) {
            Ok(()) => println!("Wrote {}", path.display()),
            Err(err) => {
                eprintln!("Failed to write {}: {}", path.display(), err);
                return;
            }
        }
    }
}

/// A hum whose pitch wanders between randomly placed turning points,
/// imitating the rises and falls an annotator listens for.
fn write_contour_wav(
    path: &PathBuf,
    seconds: f64,
    rng: &mut impl Rng,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    // Pitch turning points: start, two to four accents, end.
    let accents = rng.gen_range(2..=4);
    let mut turning_points = vec![(0.0, rng.gen_range(140.0..180.0_f64))];
    for accent in 0..accents {
        let at = (accent as f64 + rng.gen_range(0.3..0.7)) / accents as f64;
        let target = if accent % 2 == 0 {
            rng.gen_range(220.0..300.0)
        } else {
            rng.gen_range(110.0..150.0)
        };
        turning_points.push((at * seconds, target));
    }
    turning_points.push((seconds, rng.gen_range(100.0..130.0)));

    let mut writer = hound::WavWriter::create(path, spec)?;
    let frames = (seconds * SAMPLE_RATE as f64) as usize;
    let mut phase = 0.0_f64;
    for frame in 0..frames {
        let t = frame as f64 / SAMPLE_RATE as f64;
        let frequency = contour_at(&turning_points, t);
        phase += frequency / SAMPLE_RATE as f64 * std::f64::consts::TAU;

        // Soft attack and release so the files do not click.
        let envelope = (t / 0.05).min(1.0).min((seconds - t) / 0.05).max(0.0);
        let sample = phase.sin() * envelope * 0.4;
        writer.write_sample((sample * i16::MAX as f64) as i16)?;
    }
    writer.finalize()
}

/// Linear interpolation between pitch turning points.
fn contour_at(turning_points: &[(f64, f64)], t: f64) -> f64 {
    for pair in turning_points.windows(2) {
        let (t0, f0) = pair[0];
        let (t1, f1) = pair[1];
        if t <= t1 {
            let span = (t1 - t0).max(1e-9);
            return f0 + (f1 - f0) * ((t - t0) / span);
        }
    }
    turning_points.last().map(|(_, f)| *f).unwrap_or(120.0)
}

fn print_help() {
    println!(
        "tonemark-scripts\n\nCommands:\n  practice    Generate practice recordings with randomized pitch contours\n\nRun 'tonemark-scripts practice --help' for options."
    );
}

fn print_practice_help() {
    println!(
        "Usage: tonemark-scripts practice [options]\n\nOptions:\n  --out-dir <path>   Output directory (default .)\n  --count <n>        Number of files (default 5)\n  --seconds <s>      Length of each file (default 2.5)\n  -h, --help         Show this help"
    );
}
