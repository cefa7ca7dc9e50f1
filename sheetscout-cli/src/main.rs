mod logging;
mod tui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sheetscout::{
    display::{shorten_path, WidthMeasure},
    export, host, CsvOptions, MatchResult, SearchEvent, SearchReport, SearchSession, Settings,
    SettingsOverrides,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use logging::{build_filter, init_logging, LogTarget};

/// Width of the directory shown next to the spinner
const SPINNER_PATH_WIDTH: usize = 60;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (default: per-user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
struct CliSearchArgs {
    /// Base directory to search in
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// Text the file name must contain (glob wildcards allowed)
    #[arg(short = 'f', long = "filename")]
    filename_match: Option<String>,

    /// Text to look for in the cells, ignoring case
    #[arg(short = 't', long = "text")]
    search_text: Option<String>,

    /// Search the whole tree instead of only the immediate subdirectories
    #[arg(short, long, overrides_with = "no_recursive")]
    recursive: bool,

    /// Only search the immediate subdirectories, even if recursion was saved
    #[arg(long, overrides_with = "recursive")]
    no_recursive: bool,

    /// Also search .csv files
    #[arg(long, overrides_with = "no_csv")]
    csv: bool,

    /// Skip .csv files, even if they were included last time
    #[arg(long, overrides_with = "csv")]
    no_csv: bool,

    /// CSV field delimiter (default: detected per file)
    #[arg(long)]
    delimiter: Option<char>,

    /// Read CSV files without a BOM in this encoding (default: detected per file)
    #[arg(long)]
    encoding: Option<String>,

    /// Print one JSON object per match
    #[arg(long)]
    json: bool,

    /// Write the results to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Open the exported results with the default application
    #[arg(long)]
    open: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive search window (default)
    Ui,

    /// Search without the interactive window
    Search(Box<CliSearchArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let (stored, load_error) = match Settings::load_from(&settings_path) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };

    let filter = build_filter(cli.log_level.as_deref(), &stored.log_level);
    let target = match cli.command {
        Some(Commands::Search(_)) => LogTarget::Stderr,
        _ => LogTarget::File,
    };
    init_logging(filter, target)?;

    if let Some(err) = load_error {
        warn!("Could not load settings, using defaults: {}", err);
    }

    match cli.command {
        Some(Commands::Search(args)) => run_search(*args, stored, &settings_path),
        Some(Commands::Ui) | None => {
            let app = tui::app::App::new(stored, settings_path, CsvOptions::default());
            tui::run(app).context("terminal UI failed")
        }
    }
}

fn csv_options(args: &CliSearchArgs) -> Result<CsvOptions> {
    let delimiter = match args.delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => bail!("CSV delimiter must be a single ASCII character, got {:?}", c),
        None => None,
    };
    let csv = CsvOptions {
        delimiter,
        encoding: args.encoding.clone(),
    };
    csv.forced_encoding()?;
    Ok(csv)
}

/// Turns an on/off flag pair into an override; neither flag keeps the saved value
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn run_search(args: CliSearchArgs, stored: Settings, settings_path: &Path) -> Result<()> {
    let settings = stored.merge_with_cli(SettingsOverrides {
        path: args.root.clone(),
        filename_match: args.filename_match.clone(),
        search_text: args.search_text.clone(),
        recursive_search: toggle(args.recursive, args.no_recursive),
        include_csv: toggle(args.csv, args.no_csv),
        ..SettingsOverrides::default()
    });
    let request = settings.to_request(csv_options(&args)?);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("invalid progress template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let base = request.root_path.clone();
    let json = args.json;
    let mut session = SearchSession::new();
    let report = session.start(&request, |event| match event {
        SearchEvent::EnteredDirectory(dir) => spinner.set_message(format!(
            "Searching: {}",
            shorten_path(&dir, SPINNER_PATH_WIDTH, WidthMeasure::Columns)
        )),
        SearchEvent::Matched(result) => spinner.suspend(|| print_match(&result, &base, json)),
        SearchEvent::Skipped(skipped) => spinner.suspend(|| {
            eprintln!(
                "{} {}: {}",
                "skipped".yellow(),
                skipped.path.display(),
                skipped.reason
            )
        }),
        SearchEvent::Scanning(_) => {}
    });
    spinner.finish_and_clear();
    let report = report?;

    if let Err(err) = settings.save_to(settings_path) {
        warn!("Could not save settings: {}", err);
    }

    if !json {
        print_summary(&report);
    }

    match (&args.export, args.open) {
        (Some(path), open) => {
            export::export_to_file(path, &base, &report.matches)?;
            if open {
                host::open_with_default_app(path)?;
            }
        }
        (None, true) if !report.matches.is_empty() => {
            let path = export::export_to_temp_file(&base, &report.matches)?;
            host::open_with_default_app(&path)?;
        }
        _ => {}
    }

    Ok(())
}

fn print_match(result: &MatchResult, base: &Path, json: bool) {
    if json {
        let stdout = std::io::stdout();
        if let Err(err) =
            export::write_json_lines(&mut stdout.lock(), base, std::slice::from_ref(result))
        {
            warn!("Could not print match: {}", err);
        }
        return;
    }
    println!("{}", result.relative_path(base).blue());
    println!("    {}", result.joined_row());
}

fn print_summary(report: &SearchReport) {
    if report.should_notify_empty() {
        println!("No results found.");
    }
    println!(
        "\nFound matches in {} of {} files{}",
        report.files_with_matches().to_string().green(),
        report.files_scanned,
        if report.skipped.is_empty() {
            String::new()
        } else {
            format!(" ({} unreadable)", report.skipped.len())
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_args(extra: &[&str]) -> CliSearchArgs {
        let argv = ["sheetscout", "search"].iter().chain(extra.iter());
        match Cli::parse_from(argv).command {
            Some(Commands::Search(args)) => *args,
            _ => panic!("expected the search subcommand"),
        }
    }

    #[test]
    fn test_toggle_flags() {
        let args = search_args(&[]);
        assert_eq!(toggle(args.recursive, args.no_recursive), None);

        let args = search_args(&["--no-recursive", "--no-csv"]);
        assert_eq!(toggle(args.recursive, args.no_recursive), Some(false));
        assert_eq!(toggle(args.csv, args.no_csv), Some(false));

        // The last flag of a pair wins
        let args = search_args(&["--no-csv", "--csv", "-r", "--no-recursive"]);
        assert_eq!(toggle(args.csv, args.no_csv), Some(true));
        assert_eq!(toggle(args.recursive, args.no_recursive), Some(false));
    }

    #[test]
    fn test_encoding_is_detected_unless_forced() {
        let csv = csv_options(&search_args(&[])).unwrap();
        assert_eq!(csv.encoding, None);

        let csv = csv_options(&search_args(&["--encoding", "cp1251"])).unwrap();
        assert_eq!(csv.encoding.as_deref(), Some("cp1251"));

        assert!(csv_options(&search_args(&["--encoding", "klingon"])).is_err());
    }
}
