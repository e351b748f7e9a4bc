use std::env;
use std::path::{Path, PathBuf};

use menuguard_core::Snapshot;
use menuguard_eval::{EvaluateOptions, Evaluator, compare, render_comparison, render_report};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut baseline_path: Option<PathBuf> = None;
    let mut candidate_path: Option<PathBuf> = None;
    let mut options_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--baseline" => baseline_path = args.next().map(PathBuf::from),
            "--candidate" => candidate_path = args.next().map(PathBuf::from),
            "--options" => options_path = args.next().map(PathBuf::from),
            _ => {
                if baseline_path.is_none() {
                    baseline_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let baseline_path = baseline_path.ok_or("missing --baseline snapshot path")?;
    let options = match options_path {
        Some(path) => EvaluateOptions::load(&path)?,
        None => EvaluateOptions::default(),
    };
    let max_examples = options.max_examples;
    let evaluator = Evaluator::new(options);

    let baseline = evaluator.evaluate(&read_snapshot(&baseline_path)?)?;
    println!("{}", render_report(&baseline, max_examples));

    if let Some(candidate_path) = candidate_path {
        let candidate = evaluator.evaluate(&read_snapshot(&candidate_path)?)?;
        println!();
        println!("{}", render_report(&candidate, max_examples));
        println!();
        println!("{}", render_comparison(&compare(&baseline, &candidate)));
    }
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let mut snapshot: Snapshot = serde_json::from_str(&json)?;
    if snapshot.label.is_none() {
        snapshot.label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(snapshot)
}
