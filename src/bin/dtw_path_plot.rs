use std::fs;
use std::path::PathBuf;

use clap::Parser;
use hmm_sim::collaborators::dtw_path::{collect_path_tables, read_path_table, PATH_TABLE_PREFIX};
use hmm_sim::plot::render_path_svg;
use hmm_sim::HmmError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dtw_path_plot")]
#[command(about = "Render DTW warping path tables as SVG images")]
struct Args {
    /// Directory holding `path_word*.csv` tables.
    table_dir: PathBuf,
    /// Output directory; created when missing.
    out_dir: PathBuf,
    #[arg(long, default_value = PATH_TABLE_PREFIX)]
    prefix: String,
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let filter = EnvFilter::try_new(&args.log).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let tables = collect_path_tables(&args.table_dir, &args.prefix).map_err(|err| {
        format!(
            "Failed to list path tables in '{}': {err}",
            args.table_dir.display()
        )
    })?;
    if tables.is_empty() {
        return Err(format!(
            "No {}*.csv tables found in '{}'.",
            args.prefix,
            args.table_dir.display()
        ));
    }

    fs::create_dir_all(&args.out_dir).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.out_dir.display()
        )
    })?;

    let mut written = 0usize;
    for table in &tables {
        let points = match read_path_table(table) {
            Ok(points) => points,
            Err(HmmError::InvalidInput { message }) => {
                tracing::warn!(table = %table.display(), "skipping path table: {message}");
                continue;
            }
            Err(err) => return Err(format!("Failed to read '{}': {err}", table.display())),
        };
        let stem = table
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| format!("Failed to derive file stem for '{}'.", table.display()))?;
        let out_path = args.out_dir.join(format!("{stem}.svg"));
        let title = table
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(stem);
        fs::write(&out_path, render_path_svg(title, &points))
            .map_err(|err| format!("Failed to write '{}': {err}", out_path.display()))?;
        println!("{}", out_path.display());
        written += 1;
    }

    println!("Wrote {written} of {} path plot(s).", tables.len());
    Ok(())
}
