use std::process::ExitCode;
use std::time::Duration;

use dash_player::HttpFetcher;
use emsg_inspector::{
    args::{get_log_level_filter, parse_args, Args},
    inspect_file, Inspector, InspectorError, SegmentReport,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[tokio::main]
async fn main() -> ExitCode {
    let args = parse_args();

    // Build the FmtSubscriber layer, stdout is reserved for the report
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(get_log_level_filter(&args));

    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    info!("{:?}", args);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error processing manifest: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), InspectorError> {
    let report = match (&args.segment_file, &args.manifest) {
        (Some(path), _) => inspect_file(path)?,
        (None, Some(manifest_url)) => {
            let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout))?;
            let inspector = Inspector::new(fetcher, args.template_binding.into());
            inspector.inspect_manifest(manifest_url).await?
        }
        (None, None) => return Err(InspectorError::MissingInput),
    };

    print_report(&report)
}

fn print_report(report: &SegmentReport) -> Result<(), InspectorError> {
    if report.events.is_empty() {
        warn!("No emsg box present in segment ({} top-level boxes).", report.box_count);
        return Ok(());
    }

    for event in &report.events {
        println!("emsg metadata: {}", serde_json::to_string(&event.metadata)?);
    }
    Ok(())
}
