use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::Parser;
use hmm_sim::{
    build_run_report, format_percentage_report, FrequencyTable, HmmModel, ModelFile,
    PercentageTextReporter, SimulationConfig, Simulator, SimulatorBuilder, Summary,
    SvgPlotReporter,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hmm_report")]
#[command(about = "Simulate a discrete HMM and report per-state emission frequencies")]
struct Args {
    /// Time steps per simulation run.
    #[arg(long, env = "HMM_REPORT_STEPS", default_value_t = SimulationConfig::DEFAULT_STEPS)]
    steps: usize,
    /// Seed for the random source; entropy when omitted.
    #[arg(long, env = "HMM_REPORT_SEED")]
    seed: Option<u64>,
    /// JSON model file; the built-in three-state model when omitted.
    #[arg(long, env = "HMM_REPORT_MODEL")]
    model: Option<PathBuf>,
    /// Independent runs with seeds `seed`, `seed + 1`, ... whose counts are pooled.
    #[arg(long, env = "HMM_REPORT_RUNS", default_value_t = 1)]
    runs: usize,
    /// Where to write the trajectory plot (single run only).
    #[arg(long, env = "HMM_REPORT_PLOT_OUT")]
    plot_out: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    no_plot: bool,
    /// Write a JSON run report to this path.
    #[arg(long, env = "HMM_REPORT_JSON_OUT")]
    json_out: Option<PathBuf>,
    /// Print the model in use as JSON and exit.
    #[arg(long, default_value_t = false)]
    print_model: bool,
    /// Tracing filter directive, e.g. `debug` or `hmm_sim=trace`.
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
    init_tracing(&args.log);

    if args.runs == 0 {
        return Err("--runs must be >= 1.".to_string());
    }
    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to read the current directory: {err}"))?;
    let model_path = args.model.as_ref().map(|path| resolve_path(&cwd, path));

    if args.print_model {
        let model = load_model(model_path.as_deref())?;
        let json = serde_json::to_string_pretty(&ModelFile::from_model(&model))
            .map_err(|err| format!("Failed to serialize model: {err}"))?;
        println!("{json}");
        return Ok(());
    }

    let base_seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let config = SimulationConfig {
        steps: args.steps,
        seed: Some(base_seed),
        model_path: model_path.map(|path| path.to_string_lossy().into_owned()),
    };

    let started = Instant::now();
    let (model, summary) = if args.runs == 1 {
        run_single(&args, &cwd, config)?
    } else {
        run_pooled(&args, config, base_seed)?
    };
    tracing::info!(
        runs = args.runs,
        steps = args.steps,
        seed = base_seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "hmm_report: simulation complete"
    );

    if let Some(json_out) = args.json_out.as_ref() {
        let report = build_run_report(&model, &summary, Some(base_seed), Utc::now().to_rfc3339());
        let json_path = resolve_path(&cwd, json_out);
        report
            .write_json(&json_path)
            .map_err(|err| format!("Failed to write report '{}': {err}", json_path.display()))?;
        println!("{}", json_path.display());
    }
    Ok(())
}

fn run_single(
    args: &Args,
    cwd: &Path,
    config: SimulationConfig,
) -> Result<(HmmModel, Summary), String> {
    let mut builder = SimulatorBuilder::new(config).with_reporter(Box::new(PercentageTextReporter));
    let plot_path = if args.no_plot {
        None
    } else {
        Some(resolve_plot_path(cwd, args.plot_out.as_ref()))
    };
    if let Some(path) = plot_path.as_ref() {
        builder = builder.with_reporter(Box::new(SvgPlotReporter::new(path.clone())));
    }
    let mut simulator = builder
        .build()
        .map_err(|err| format!("Failed to build simulator: {err}"))?;
    let output = simulator
        .run()
        .map_err(|err| format!("Simulation failed: {err}"))?;
    if let Some(path) = plot_path {
        println!("{}", path.display());
    }
    Ok((simulator.model().clone(), output.summary))
}

fn run_pooled(
    args: &Args,
    config: SimulationConfig,
    base_seed: u64,
) -> Result<(HmmModel, Summary), String> {
    if args.plot_out.is_some() {
        tracing::warn!("--plot-out is ignored when --runs > 1");
    }
    let progress = ProgressBar::new(args.runs as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("simulating...");

    let mut pooled: Option<FrequencyTable> = None;
    let mut model: Option<HmmModel> = None;
    for run_idx in 0..args.runs {
        let seed = base_seed.wrapping_add(run_idx as u64);
        let mut simulator = build_simulator(SimulationConfig {
            seed: Some(seed),
            ..config.clone()
        })?;
        let table = simulator
            .count_steps(args.steps)
            .map_err(|err| format!("run {run_idx} (seed {seed}) failed: {err}"))?;
        match pooled.as_mut() {
            Some(acc) => acc
                .merge(&table)
                .map_err(|err| format!("run {run_idx}: {err}"))?,
            None => pooled = Some(table),
        }
        if model.is_none() {
            model = Some(simulator.model().clone());
        }
        progress.inc(1);
    }
    progress.finish_with_message("simulation runs complete");

    let (Some(model), Some(pooled)) = (model, pooled) else {
        return Err("internal error: no runs were simulated".to_string());
    };
    let summary = Summary::from_frequencies(pooled);
    println!();
    print!("{}", format_percentage_report(&model, &summary));
    Ok((model, summary))
}

fn build_simulator(config: SimulationConfig) -> Result<Simulator, String> {
    SimulatorBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build simulator: {err}"))
}

fn load_model(path: Option<&Path>) -> Result<HmmModel, String> {
    match path {
        Some(path) => {
            let file = ModelFile::load(path)
                .map_err(|err| format!("Failed to load model '{}': {err}", path.display()))?;
            HmmModel::try_from(file)
                .map_err(|err| format!("Invalid model '{}': {err}", path.display()))
        }
        None => Ok(hmm_sim::reference_model()),
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit paths are taken relative to the working directory; the default
/// lands under this crate's `target/`.
fn resolve_plot_path(cwd: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(cwd, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("hmm_reports")
        .join(format!("hmm-plot-{run_id}.svg"))
}

fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_the_working_directory() {
        let cwd = Path::new("/home/user/work");
        assert_eq!(
            resolve_path(cwd, Path::new("models/my.json")),
            PathBuf::from("/home/user/work/models/my.json")
        );
        assert_eq!(
            resolve_path(cwd, Path::new("/abs/model.json")),
            PathBuf::from("/abs/model.json")
        );
        let plot = PathBuf::from("out/plot.svg");
        assert_eq!(
            resolve_plot_path(cwd, Some(&plot)),
            PathBuf::from("/home/user/work/out/plot.svg")
        );
    }

    #[test]
    fn default_plot_path_is_timestamped_under_target() {
        let path = resolve_plot_path(Path::new("/elsewhere"), None);
        assert!(path.starts_with(Path::new(env!("CARGO_MANIFEST_DIR")).join("target/hmm_reports")));
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("hmm-plot-") && name.ends_with(".svg"));
    }
}
