use anyhow::Result;
use billing_reports::{
    cli,
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::{resolve_output_path, ReportFileSink},
    sources::UsageFileSource,
    transform::ConflictTransform,
};
use std::{env, path::PathBuf, process};

/// Report premises whose rows disagree about their account or meter.
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    let (input, output) = match cli::parse_args("find-conflicts", &args) {
        Ok(parsed) => parsed,
        Err(usage) => {
            println!("{usage}");
            process::exit(1);
        }
    };

    let cfg = AppConfig::load()?;
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.conflicts.default_output));

    let pipeline = Pipeline {
        source: UsageFileSource::open(&input)?,
        transform: ConflictTransform,
        sink: ReportFileSink::create(&output)?,
    };
    let report = pipeline.run()?;

    let saved = resolve_output_path(&output);
    for line in cli::conflict_summary(report.summary.len(), report.detail.len(), &saved) {
        println!("{line}");
    }

    Ok(())
}
