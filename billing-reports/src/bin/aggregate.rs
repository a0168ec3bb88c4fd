use anyhow::Result;
use billing_reports::{
    cli,
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::{resolve_output_path, ReportFileSink},
    sources::UsageFileSource,
    transform::MonthlyUsageTransform,
};
use std::{env, path::PathBuf, process};

/// Pivot a billing export into monthly usage per premise/meter/status/cycle.
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    let (input, output) = match cli::parse_args("aggregate", &args) {
        Ok(parsed) => parsed,
        Err(usage) => {
            println!("{usage}");
            process::exit(1);
        }
    };

    let cfg = AppConfig::load()?;
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.aggregate.default_output));

    let pipeline = Pipeline {
        source: UsageFileSource::open(&input)?,
        transform: MonthlyUsageTransform::new(cfg.month_window.window()?),
        sink: ReportFileSink::create(&output)?,
    };
    pipeline.run()?;

    for line in cli::aggregate_summary(&resolve_output_path(&output)) {
        println!("{line}");
    }

    Ok(())
}
