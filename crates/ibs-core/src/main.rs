//! ibs-core command line.
//!
//! Every subcommand prints a single JSON document to stdout. Logs and error
//! documents go to stderr, and the process exit code follows
//! [`ibs_core::exit_codes::ExitCode`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ibs_config::{load_settings, LoadedSettings};
use ibs_core::experiment::{run_sampling_efficiency, ExperimentConfig};
use ibs_core::exit_codes::ExitCode;
use ibs_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use ibs_core::{
    fixed_analytical_moments_all, ibs_analytical_moments, log_event, parse_scheme,
    BernoulliSimulator, Error, FixedEstimator, IbsEstimator, IbsOptions, Method, Result,
};
use ibs_math::{BackendKind, DilogSeries};
use serde_json::json;

/// Version of the JSON documents printed on stdout.
const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

/// Log-likelihood estimation for simulator models
#[derive(Parser)]
#[command(name = "ibs-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to settings.json (overrides IBS_SETTINGS and IBS_CONFIG_DIR)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr: human or jsonl
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Closed-form moments of the IBS and fixed-sample estimators
    Analytic(AnalyticArgs),

    /// Run one estimator on a seeded Bernoulli model
    Estimate(EstimateArgs),

    /// Sampling-efficiency comparison of IBS against fixed sampling
    Compare(CompareArgs),

    /// List estimation methods with pseudo-counts and colors
    Schemes,

    /// Configuration management
    Config(ConfigArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct AnalyticArgs {
    /// Per-trial success probabilities
    #[arg(long, required = true, num_args = 1..)]
    p: Vec<f64>,

    /// Samples per trial for the fixed estimator (default from settings)
    #[arg(long)]
    samples: Option<u64>,

    /// Smoothing scheme for the fixed estimator (default from settings)
    #[arg(long)]
    scheme: Option<String>,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Success probability of the model
    #[arg(long)]
    p: f64,

    /// Number of trials; every observed response is a success
    #[arg(long)]
    trials: u32,

    /// "ibs" or a smoothing scheme name
    #[arg(long, default_value = "ibs")]
    method: String,

    /// IBS repeats (default from settings)
    #[arg(long)]
    repeats: Option<u32>,

    /// Fixed-sample draws per trial (default from settings)
    #[arg(long)]
    samples: Option<u64>,

    /// Simulator seed (default: experiment.seed from settings)
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on IBS simulator calls per trial
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Numeric backend: asymptotic or series
    #[arg(long)]
    backend: Option<BackendKind>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Seeded runs per budget (default from settings)
    #[arg(long)]
    repetitions: Option<u32>,

    /// Base seed (default from settings)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved settings and their snapshot
    Show,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    let exit_code = match run(&cli, &ctx) {
        Ok(()) => ExitCode::Clean,
        Err(err) => report_error(&ctx, &err),
    };

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, ctx: &LogContext) -> Result<()> {
    let command = match &cli.command {
        Commands::Analytic(_) => "analytic",
        Commands::Estimate(_) => "estimate",
        Commands::Compare(_) => "compare",
        Commands::Schemes => "schemes",
        Commands::Config(_) => "config",
    };
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "run started", command = command);

    match &cli.command {
        Commands::Schemes => {
            let (ctx, loaded) = load(&cli.global, ctx)?;
            run_schemes(&ctx, &loaded)?;
        }
        Commands::Analytic(args) => {
            let (ctx, loaded) = load(&cli.global, ctx)?;
            run_analytic(&ctx, &loaded, args)?;
        }
        Commands::Estimate(args) => {
            let (ctx, loaded) = load(&cli.global, ctx)?;
            run_estimate(&ctx, &loaded, args)?;
        }
        Commands::Compare(args) => {
            let (ctx, loaded) = load(&cli.global, ctx)?;
            run_compare(&ctx, &loaded, args)?;
        }
        Commands::Config(ConfigArgs {
            action: ConfigCommand::Show,
        }) => {
            let (ctx, loaded) = load(&cli.global, ctx)?;
            run_config_show(&ctx, &loaded)?;
        }
    }

    log_event!(ctx, DEBUG, event_names::RUN_FINISHED, Stage::Report, "run finished", command = command);
    Ok(())
}

/// Load settings and tag the log context with their snapshot ID.
fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<(LogContext, LoadedSettings)> {
    let loaded = load_settings(global.config.as_deref())?;
    let ctx = ctx.clone().with_config_id(loaded.snapshot.short_id());
    match &loaded.snapshot.settings_path {
        Some(path) => log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "settings loaded",
            path = path.as_str(),
            source = loaded.snapshot.settings_source.as_str()
        ),
        None => log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no settings file found, using defaults"
        ),
    }
    Ok((ctx, loaded))
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_analytic(ctx: &LogContext, loaded: &LoadedSettings, args: &AnalyticArgs) -> Result<()> {
    let settings = &loaded.settings;
    let series = DilogSeries {
        tolerance: settings.analytic.dilog_tolerance,
        max_terms: settings.analytic.dilog_max_terms,
    };
    let samples = args.samples.unwrap_or(settings.fixed.samples_per_trial);
    let scheme = parse_scheme(args.scheme.as_deref().unwrap_or(&settings.fixed.scheme))?;

    let ibs = ibs_analytical_moments(&args.p, &series)?;
    let fixed = fixed_analytical_moments_all(&args.p, samples, scheme)?;
    log_event!(
        ctx,
        INFO,
        event_names::ANALYTIC_COMPUTED,
        Stage::Analyze,
        "analytical moments computed",
        trials = args.p.len(),
        ibs_mean = ibs.mean,
        fixed_mean = fixed.mean
    );

    emit(
        ctx,
        loaded,
        "analytic",
        json!({
            "probabilities": args.p,
            "ibs": ibs,
            "fixed": {
                "scheme": scheme,
                "samples": samples,
                "moments": fixed,
            },
        }),
    )
}

fn run_estimate(ctx: &LogContext, loaded: &LoadedSettings, args: &EstimateArgs) -> Result<()> {
    let settings = &loaded.settings;
    let method: Method = args.method.parse()?;
    let p = args.p;
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::invalid(format!("--p must be in [0, 1] (got {})", p)));
    }

    let seed = args.seed.unwrap_or(settings.experiment.seed);
    let trials = args.trials as usize;
    let stimuli = vec![(); trials];
    let responses = vec![true; trials];
    let probabilities = vec![p; trials];
    let mut simulator = BernoulliSimulator::new(seed);

    let span = tracing::info_span!(
        "estimate",
        run_id = %ctx.run_id,
        config_id = ctx.config_id.as_deref(),
        stage = %Stage::Estimate
    );
    let _guard = span.enter();

    let (estimate, analytical, details) = match method {
        Method::Ibs => {
            let max_attempts = args.max_attempts.or(settings.ibs.max_attempts);
            if p == 0.0 && max_attempts.is_none() {
                return Err(Error::invalid(
                    "IBS never terminates at p = 0; pass --max-attempts to bound it",
                ));
            }
            let backend = args.backend.unwrap_or(settings.numeric.backend);
            let options = IbsOptions::default()
                .with_repeats(args.repeats.unwrap_or(settings.ibs.repeats))
                .with_max_attempts(max_attempts);
            let estimator = IbsEstimator::new(backend.backend(), options)?;
            let backend_name = backend.to_string();

            log_event!(
                ctx,
                INFO,
                event_names::IBS_STARTED,
                Stage::Estimate,
                "IBS estimate started",
                trials = trials,
                repeats = options.repeats,
                backend = backend_name.as_str()
            );
            let estimate = estimator.estimate(&stimuli, &responses, &mut simulator, &p)?;
            log_event!(
                ctx,
                INFO,
                event_names::IBS_FINISHED,
                Stage::Estimate,
                "IBS estimate finished",
                total_samples = estimate.total_samples
            );

            let series = DilogSeries {
                tolerance: settings.analytic.dilog_tolerance,
                max_terms: settings.analytic.dilog_max_terms,
            };
            let analytical = ibs_analytical_moments(&probabilities, &series)?;
            let details = json!({
                "repeats": options.repeats,
                "max_attempts": options.max_attempts,
                "backend": backend,
            });
            (estimate, analytical, details)
        }
        Method::Smoothed(scheme) => {
            let samples = args.samples.unwrap_or(settings.fixed.samples_per_trial);
            let estimator = FixedEstimator::new(samples, scheme)?;
            let estimate = estimator.estimate(&stimuli, &responses, &mut simulator, &p)?;
            let analytical = fixed_analytical_moments_all(&probabilities, samples, scheme)?;
            (estimate, analytical, json!({ "samples": samples }))
        }
    };

    emit(
        ctx,
        loaded,
        "estimate",
        json!({
            "method": method,
            "color": method.color(),
            "probability": p,
            "trials": args.trials,
            "seed": seed,
            "settings": details,
            "estimate": estimate,
            "std_dev": estimate.std_dev(),
            "true_log_likelihood": trials as f64 * p.ln(),
            "analytical": analytical,
        }),
    )
}

fn run_compare(ctx: &LogContext, loaded: &LoadedSettings, args: &CompareArgs) -> Result<()> {
    let settings = &loaded.settings;
    let mut config = ExperimentConfig::from_settings(&settings.experiment)?;
    if let Some(repetitions) = args.repetitions {
        config = config.with_repetitions(repetitions);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let span = tracing::info_span!(
        "compare",
        run_id = %ctx.run_id,
        config_id = ctx.config_id.as_deref(),
        stage = %Stage::Simulate
    );
    let report = span.in_scope(|| run_sampling_efficiency(&config, settings.numeric.backend.backend()))?;

    emit(
        ctx,
        loaded,
        "compare",
        json!({
            "colors": {
                "ibs": Method::Ibs.color(),
                "fixed": Method::from(config.scheme).color(),
            },
            "report": report,
        }),
    )
}

fn run_schemes(ctx: &LogContext, loaded: &LoadedSettings) -> Result<()> {
    let default_scheme = parse_scheme(&loaded.settings.fixed.scheme)?;
    let methods: Vec<serde_json::Value> = Method::ALL
        .iter()
        .map(|&method| {
            let (pseudo_counts, requires_samples) = match method {
                Method::Ibs => (None, false),
                Method::Smoothed(scheme) => (scheme.pseudo_counts(), scheme.requires_samples()),
            };
            json!({
                "name": method.name(),
                "color": method.color(),
                "pseudo_counts": pseudo_counts,
                "requires_samples": requires_samples,
            })
        })
        .collect();

    emit(
        ctx,
        loaded,
        "schemes",
        json!({
            "default_scheme": default_scheme,
            "methods": methods,
        }),
    )
}

fn run_config_show(ctx: &LogContext, loaded: &LoadedSettings) -> Result<()> {
    emit(
        ctx,
        loaded,
        "config show",
        json!({
            "settings": loaded.settings,
            "snapshot": loaded.snapshot,
        }),
    )
}

// ============================================================================
// Output
// ============================================================================

/// Print `payload` wrapped in the common envelope.
fn emit(
    ctx: &LogContext,
    loaded: &LoadedSettings,
    command: &str,
    payload: serde_json::Value,
) -> Result<()> {
    let mut document = json!({
        "schema_version": OUTPUT_SCHEMA_VERSION,
        "run_id": ctx.run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "config": {
            "source": loaded.paths.source.to_string(),
            "path": loaded.snapshot.settings_path,
            "hash": loaded.snapshot.settings_hash,
        },
    });
    if let (Some(doc), serde_json::Value::Object(fields)) = (document.as_object_mut(), payload) {
        doc.extend(fields);
    }
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Log the error, print an error document to stderr, return its exit code.
fn report_error(ctx: &LogContext, err: &Error) -> ExitCode {
    let exit_code = err.exit_code();
    let message = err.to_string();
    match err {
        Error::Config(_) => log_event!(
            ctx,
            ERROR,
            event_names::CONFIG_ERROR,
            Stage::Init,
            message.as_str(),
            code = exit_code.code_name()
        ),
        _ if exit_code == ExitCode::InternalError => log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Report,
            message.as_str(),
            code = exit_code.code_name()
        ),
        _ => log_event!(
            ctx,
            WARN,
            event_names::RUN_FAILED,
            Stage::Report,
            message.as_str(),
            code = exit_code.code_name()
        ),
    }

    let document = json!({
        "schema_version": OUTPUT_SCHEMA_VERSION,
        "run_id": ctx.run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": "error",
        "error": {
            "code": exit_code.code_name(),
            "exit_code": exit_code.as_i32(),
            "category": err.category(),
            "message": message,
        },
    });
    match serde_json::to_string_pretty(&document) {
        Ok(text) => eprintln!("{}", text),
        Err(_) => eprintln!("error: {}", message),
    }
    exit_code
}
