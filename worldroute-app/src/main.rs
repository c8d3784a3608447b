use anyhow::Context;
use clap::Parser;
use instant::{Duration, Instant};
use worldroute::{
    core::session::MapSession,
    geometry::{FileFetcher, GeometrySource, HttpFetcher},
    Atlas, Document, MapMode, MemoryDocument, ProjectionId, SessionConfig,
};
use std::sync::Arc;

/// Simulated frame interval while centering animations run
const FRAME: Duration = Duration::from_millis(16);

/// Render a world map, click regions in order and print the resulting route
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Options {
    /// TopoJSON file path or http(s) URL
    #[arg(default_value_t = SessionConfig::default().geometry_url)]
    topology: String,

    /// Map mode: flat or globe
    #[arg(long, default_value_t = MapMode::Flat)]
    mode: MapMode,

    /// Flat-map projection, by label (e.g. "Natural Earth")
    #[arg(long)]
    projection: Option<ProjectionId>,

    /// Region ids or state names to click, comma separated
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Write the SVG here instead of stdout
    #[arg(long)]
    out: Option<String>,
}

/// Load from a URL over HTTP, anything else from the filesystem
async fn load(location: &str) -> anyhow::Result<Arc<Atlas>> {
    let atlas = if location.starts_with("http://") || location.starts_with("https://") {
        GeometrySource::new(HttpFetcher).load(location).await?
    } else {
        GeometrySource::new(FileFetcher::new()).load(location).await?
    };
    Ok(atlas)
}

/// Route builder: renders a map, selects regions and prints the route
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = Options::parse();
    let atlas = load(&options.topology).await?;

    let mut session = MapSession::new(MemoryDocument::host_page(), atlas, SessionConfig::default());
    if let Some(id) = options.projection {
        session.change_projection(id)?;
    }
    session.populate_projection_dropdown()?;
    session.select_mode(options.mode)?;

    let mut now = Instant::now();
    for id in options.select.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        let outcome = session.click_region(id, now)?;
        log::debug!("{id}: {outcome:?}");
        while session.tick(now)? {
            now += FRAME;
        }
    }

    let svg = session
        .document()
        .query(&format!("{} > svg", session.config().container))
        .context("map surface missing")?;
    let markup = session.document().to_markup(svg);
    match &options.out {
        Some(path) => {
            tokio::fs::write(path, markup)
                .await
                .with_context(|| format!("writing {path}"))?;
            log::info!("wrote {path}");
        }
        None => println!("{markup}"),
    }

    println!("{}", serde_json::to_string_pretty(session.route())?);
    Ok(())
}
