//! Headless annotation inspection (`--dump`).

use std::error::Error;

use clap::ArgMatches;

use crate::annotations::{self, Store};

/// If `--dump` was requested, print the stored annotations for FILES as JSON
/// and return an exit code; otherwise return `None` and let the interactive
/// runner take over.
pub fn maybe_run_dump(args: &ArgMatches) -> Result<Option<i32>, Box<dyn Error>> {
    if !args.get_flag("dump") {
        return Ok(None);
    }

    let files: Vec<String> = args
        .get_many::<String>("FILES")
        .unwrap()
        .cloned()
        .collect();
    let store = Store::from_args(
        args.get_one::<String>("json").map(String::as_str),
        args.get_one::<String>("textgrid").map(String::as_str),
    );

    let map = annotations::load_map(&files, &store);
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(Some(0))
}
