use std::path::Path;

use geocluster::dataset::source::CsvSource;
use geocluster::pipeline::{CsvSink, PlottersRenderer, Workspace};
use geocluster::{ClusterPipeline, Error};

fn run() -> geocluster::Result<()> {
    let (workspace, states) = Workspace::prepare(Path::new(".")).map_err(|e| Error::OutputWrite {
        path: ".".to_string(),
        reason: e.to_string(),
    })?;

    geocluster::logging::init(&workspace.log_file()).map_err(|e| Error::OutputWrite {
        path: workspace.log_file().display().to_string(),
        reason: e.to_string(),
    })?;

    for (path, state) in &states {
        log::info!("checked folder {}: {:?}", path.display(), state);
    }

    let data = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/postcodes.csv".to_string());
    let source = CsvSource::new(data.as_str());
    log::info!("reading postcode dataset from: {}", data);

    let mut pipeline = ClusterPipeline::new(source);
    pipeline.run(&CsvSink, &PlottersRenderer::default(), &workspace)
}

fn main() {
    if let Err(err) = run() {
        log::error!("pipeline aborted: {}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
