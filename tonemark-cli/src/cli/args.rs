//! CLI argument definitions for `tonemark-cli`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    // Build the CLI definition in one place to keep main.rs slim.
    Command::new("Tonemark")
        .version("0.2")
        .author("Adam Howard <adam.thomas.howard@gmail.com>")
        .about("Annotate intonation in speech recordings with ToDI labels")
        .arg_required_else_help(true)
        .arg(
            Arg::new("FILES")
                .help("One or more speech recordings (.wav)")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("textgrid")
                .long("textgrid")
                .value_name("TIER")
                .num_args(0..=1)
                .default_missing_value("ToDI")
                .help(
                    "Save annotations to one .TextGrid per recording, to a point tier with \
                     the given name (default: \"ToDI\"). Existing grids are loaded from that \
                     tier first and overwritten on exit",
                )
                .conflicts_with("json"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .value_name("PATH")
                .help(
                    "Save annotations to the given .json file; if the file already exists it \
                     is loaded first and overwritten on exit",
                ),
        )
        .arg(
            Arg::new("delay-ms")
                .long("delay-ms")
                .value_name("MS")
                .default_value("0")
                .help("Initial annotation delay in milliseconds (adjustable with d/D)"),
        )
        .arg(
            Arg::new("GAIN")
                .long("gain")
                .short('g')
                .value_name("GAIN")
                .default_value("70")
                .help("The playback gain"),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .action(ArgAction::SetTrue)
                .help("Print the stored annotations for FILES as JSON, then exit"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Run without the terminal UI"),
        )
}
