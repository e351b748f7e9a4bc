use std::env;
use std::path::PathBuf;

use menuguard_core::Snapshot;
use schemars::schema_for;

/// Print the snapshot JSON schema, or write it to `--out <path>`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut out_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out_path = args.next().map(PathBuf::from),
            other => return Err(format!("unexpected argument: {other}").into()),
        }
    }

    let schema = schema_for!(Snapshot);
    let json = serde_json::to_string_pretty(&schema)?;
    match out_path {
        Some(path) => {
            std::fs::write(&path, format!("{json}\n"))?;
            println!("schema_path={}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
