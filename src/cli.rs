//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use crate::view::Route;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    /// TOML configuration file.
    pub config: Option<PathBuf>,
    /// CSV file loaded at startup.
    pub data: Option<PathBuf>,
    /// Print only this page instead of every page.
    pub page: Option<Route>,
    /// Write the validated dataset to this CSV path.
    pub export: Option<PathBuf>,
    /// Start the HTTP API.
    pub serve: bool,
    /// Port override for the HTTP API.
    pub port: Option<u16>,
    /// Start the terminal UI.
    pub tui: bool,
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a message describing the first invalid argument.
pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--data" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --data (expected a CSV file path)",
                )?;
                if opts.data.replace(PathBuf::from(path)).is_some() {
                    return Err("--data provided more than once".to_string());
                }
            }
            "--page" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --page (expected a route)")?;
                let route = Route::from_path(name).ok_or_else(|| {
                    format!(
                        "unknown page \"{name}\", available: {}",
                        Route::ALL.map(Route::path).join(", ")
                    )
                })?;
                if opts.page.replace(route).is_some() {
                    return Err("--page provided more than once".to_string());
                }
            }
            "--export" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --export (expected a file path)",
                )?;
                if opts.export.replace(PathBuf::from(path)).is_some() {
                    return Err("--export provided more than once".to_string());
                }
            }
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                opts.port = Some(port);
            }
            "--serve" => opts.serve = true,
            "--tui" => opts.tui = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.serve && opts.tui {
        return Err(
            "arguments `--serve` and `--tui` are mutually exclusive; choose one front end"
                .to_string(),
        );
    }
    if opts.port.is_some() && !opts.serve {
        return Err("`--port` only applies together with `--serve`".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("gridwatch: smart-grid stability dashboard");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  gridwatch [--config <path>] [--data <csv>] [--page <route>] [--export <csv>]");
    eprintln!("            [--serve [--port <u16>] | --tui]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load settings from a TOML file");
    eprintln!("  --data <csv>      Load grid readings from a CSV file");
    eprintln!("  --page <route>    Print one page (/, /devices, /analytics, /alerts, /data)");
    eprintln!("  --export <csv>    Write the validated readings to a CSV file");
    eprintln!("  --serve           Start the HTTP API (requires the `api` feature)");
    eprintln!("  --port <u16>      API port (overrides server.port)");
    eprintln!("  --tui             Start the terminal UI (requires the `tui` feature)");
    eprintln!("  --help            Show this help message");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;
    use crate::view::Route;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_data_and_page() {
        let opts = parse_args_from(args(&["--data", "grid.csv", "--page", "/alerts"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.data.as_deref().and_then(|p| p.to_str()),
            Some("grid.csv")
        );
        assert_eq!(opts.page, Some(Route::Alerts));
        assert!(!opts.serve);
    }

    #[test]
    fn supports_serve_with_port() {
        let opts = parse_args_from(args(&["--serve", "--port", "8080"]))
            .expect("parse should succeed");
        assert!(opts.serve);
        assert_eq!(opts.port, Some(8080));
    }

    #[test]
    fn no_arguments_is_valid() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert!(opts.data.is_none());
        assert!(opts.page.is_none());
    }

    #[test]
    fn rejects_unknown_page() {
        let err = parse_args_from(args(&["--page", "settings"])).unwrap_err();
        assert!(err.contains("unknown page"));
    }

    #[test]
    fn rejects_serve_with_tui() {
        assert!(parse_args_from(args(&["--serve", "--tui"])).is_err());
    }

    #[test]
    fn rejects_port_without_serve() {
        assert!(parse_args_from(args(&["--port", "3000"])).is_err());
    }

    #[test]
    fn rejects_duplicate_data() {
        let err = parse_args_from(args(&["--data", "a.csv", "--data", "b.csv"])).unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args_from(args(&["--config"])).unwrap_err();
        assert!(err.contains("missing value for --config"));
    }
}
