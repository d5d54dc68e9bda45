//! gridwatch entry point: CLI wiring, config loading and front-end selection.

use std::process;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use gridwatch::cli::{self, CliOptions};
use gridwatch::config::DashboardConfig;
use gridwatch::grid::alerts::AlertBoard;
use gridwatch::grid::upload::UploadStatus;
use gridwatch::grid::{DatasetStore, ingest_path};
use gridwatch::io::export::export_csv;
use gridwatch::view::{PageContext, Route, build_page};

fn main() -> Result<()> {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let config = load_config(&opts)?;
    init_logging(&config, opts.tui)?;

    let store = DatasetStore::new();
    if let Some(path) = &opts.data {
        // Ingest errors are user-facing text; print them as-is.
        if let Err(e) = store.commit(ingest_path(path)) {
            eprintln!("{e}");
            process::exit(1);
        }
    }

    if let Some(path) = &opts.export {
        export_csv(&store.dataset(), path)
            .with_context(|| format!("failed to export dataset to \"{}\"", path.display()))?;
        eprintln!("Dataset exported to {}", path.display());
    }

    if opts.serve {
        return serve(store, &config, &opts);
    }
    if opts.tui {
        return run_tui(store, &config, &opts);
    }

    print_pages(&store, &config, opts.page);
    Ok(())
}

/// Reads `--config` (or the defaults) and rejects invalid settings.
fn load_config(opts: &CliOptions) -> Result<DashboardConfig> {
    let config = match &opts.config {
        Some(path) => DashboardConfig::from_toml_file(path)?,
        None => DashboardConfig::default(),
    };
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("invalid configuration ({} error(s))", errors.len());
    }
    Ok(config)
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the config filter.
fn init_logging(config: &DashboardConfig, tui: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        // Log lines would tear the raw-mode screen.
        Err(_) if tui => EnvFilter::new("off"),
        Err(_) => EnvFilter::try_new(&config.logging.filter)
            .with_context(|| format!("invalid logging filter \"{}\"", config.logging.filter))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Prints every page, or only `page`, as text.
fn print_pages(store: &DatasetStore, config: &DashboardConfig, page: Option<Route>) {
    let snapshot = store.snapshot();
    let board = AlertBoard::new(snapshot.generation);
    let upload = UploadStatus::Idle;
    let ctx = PageContext {
        dataset: &snapshot.dataset,
        thresholds: &config.thresholds,
        board: &board,
        upload: &upload,
    };
    let routes: Vec<Route> = match page {
        Some(route) => vec![route],
        None => Route::ALL.to_vec(),
    };
    for (i, route) in routes.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", build_page(route, &ctx));
    }
}

#[cfg(feature = "api")]
fn serve(store: DatasetStore, config: &DashboardConfig, opts: &CliOptions) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use gridwatch::api::{self, AppState};

    let port = opts.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{port}", config.server.host)
        .parse()
        .with_context(|| format!("invalid server address \"{}:{port}\"", config.server.host))?;
    let state = Arc::new(AppState::new(
        store,
        config.thresholds.clone(),
        config.server.max_upload_bytes,
    ));
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime
        .block_on(api::serve(state, addr))
        .with_context(|| format!("API server on {addr} failed"))
}

#[cfg(not(feature = "api"))]
fn serve(_store: DatasetStore, _config: &DashboardConfig, _opts: &CliOptions) -> Result<()> {
    bail!("--serve requires the `api` feature (cargo run --features api)")
}

#[cfg(feature = "tui")]
fn run_tui(store: DatasetStore, config: &DashboardConfig, opts: &CliOptions) -> Result<()> {
    use std::time::Duration;

    use gridwatch::tui::{self, runtime::App};

    let app = App::new(
        store,
        config.thresholds.clone(),
        Duration::from_millis(config.tui.tick_ms),
        opts.data.clone(),
    );
    tui::run(app).context("terminal UI failed")
}

#[cfg(not(feature = "tui"))]
fn run_tui(_store: DatasetStore, _config: &DashboardConfig, _opts: &CliOptions) -> Result<()> {
    bail!("--tui requires the `tui` feature (cargo run --features tui)")
}
