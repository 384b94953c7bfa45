use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rc_batch::{BatchError, RowFilter, Table, TrainerConfig};
use rc_core::units::{g_per_l, gpm, k, pa};
use rc_flowsheet::recipes::{brine_disposal, chemical_addition, ro_train, uf_system, uf_train, uv_aop};
use rc_flowsheet::{Driver, FeedConditions, FlowsheetError};
use rc_project::{InputDocument, ProjectError, load_input, resolve_data_file};
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Flowsheet(#[from] FlowsheetError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "rc-cli")]
#[command(about = "Water reclamation flowsheets: plant recipes, surrogate fitting, membrane inversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate an input document
    Validate {
        /// Document path, or a bare name looked up in the data directory
        config: PathBuf,
    },
    /// Build, solve and report one plant recipe
    Run {
        recipe: Recipe,
        /// Feed flow [gpm]
        #[arg(long)]
        qin: Option<f64>,
        /// Feed concentration [g/L]
        #[arg(long)]
        cin: Option<f64>,
        /// Feed temperature [K]
        #[arg(long)]
        tin: Option<f64>,
        /// Feed pressure [Pa]
        #[arg(long)]
        pin: Option<f64>,
        /// Input document; defaults to the recipe's calibrated document
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip costing
        #[arg(long)]
        no_costing: bool,
        /// Chemical to dose (chemical-addition only)
        #[arg(long)]
        chemical: Option<String>,
        /// Dose override [mg/L] (chemical-addition only)
        #[arg(long)]
        dose: Option<f64>,
        /// Feed split per train (uf-system only)
        #[arg(long, value_delimiter = ',')]
        splits: Option<Vec<f64>>,
    },
    /// Fit the UV power surrogate to reactor history
    TrainSurrogate {
        #[arg(long, default_value = "WRD_UV_Surrogate_Data.csv")]
        data: PathBuf,
        #[arg(short, long, default_value = "UV_surr_rbf_linear.json")]
        output: PathBuf,
        /// Only the first rows of the history are used
        #[arg(long, default_value_t = 100)]
        max_rows: usize,
        /// Rows below this flow [MGD] are dropped
        #[arg(long, default_value_t = 1.0)]
        min_input: f64,
        #[arg(long, default_value_t = 0.8)]
        training_fraction: f64,
    },
    /// Back out membrane permeabilities from RO logger exports
    MembraneProps {
        #[arg(long, default_value = ro_train::DEFAULT_INPUT)]
        config: PathBuf,
        #[arg(long, default_value = "WRD_Data_PRO1.csv")]
        primary: PathBuf,
        #[arg(long, default_value = "WRD_Data_TSRO1.csv")]
        tertiary: PathBuf,
        /// Directory for the per-stage CSV files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Recipe {
    RoTrain,
    UfTrain,
    UfSystem,
    UvAop,
    ChemicalAddition,
    BrineDisposal,
}

impl Recipe {
    fn default_input(self) -> &'static str {
        match self {
            Recipe::RoTrain => ro_train::DEFAULT_INPUT,
            Recipe::UfTrain => uf_train::DEFAULT_INPUT,
            Recipe::UfSystem => uf_system::DEFAULT_INPUT,
            Recipe::UvAop => uv_aop::DEFAULT_INPUT,
            Recipe::ChemicalAddition => chemical_addition::DEFAULT_INPUT,
            Recipe::BrineDisposal => brine_disposal::DEFAULT_INPUT,
        }
    }

    fn default_feed(self) -> FeedConditions {
        match self {
            Recipe::RoTrain => ro_train::default_feed(),
            Recipe::UfTrain => uf_train::default_feed(),
            Recipe::UfSystem => uf_system::default_feed(),
            Recipe::UvAop => uv_aop::default_feed(),
            Recipe::ChemicalAddition => chemical_addition::default_feed(),
            Recipe::BrineDisposal => brine_disposal::default_feed(),
        }
    }
}

struct FeedOverrides {
    qin: Option<f64>,
    cin: Option<f64>,
    tin: Option<f64>,
    pin: Option<f64>,
}

impl FeedOverrides {
    fn apply(&self, mut feed: FeedConditions) -> FeedConditions {
        if let Some(q) = self.qin {
            feed.flow = gpm(q);
        }
        if let Some(c) = self.cin {
            feed.conc = g_per_l(c);
        }
        if let Some(t) = self.tin {
            feed.temperature = k(t);
        }
        if let Some(p) = self.pin {
            feed.pressure = pa(p);
        }
        feed
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Run {
            recipe,
            qin,
            cin,
            tin,
            pin,
            config,
            no_costing,
            chemical,
            dose,
            splits,
        } => cmd_run(
            recipe,
            &FeedOverrides { qin, cin, tin, pin },
            config.as_deref(),
            !no_costing,
            chemical.as_deref(),
            dose,
            splits.as_deref(),
        ),
        Commands::TrainSurrogate {
            data,
            output,
            max_rows,
            min_input,
            training_fraction,
        } => cmd_train_surrogate(
            &data,
            &output,
            TrainerConfig {
                max_rows: Some(max_rows),
                min_input,
                training_fraction,
                ..TrainerConfig::default()
            },
        ),
        Commands::MembraneProps {
            config,
            primary,
            tertiary,
            out_dir,
        } => cmd_membrane_props(&config, &primary, &tertiary, &out_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn driver_for(doc: &InputDocument) -> CliResult<Driver> {
    let config = doc.solver.clone().unwrap_or_default();
    Ok(Driver::new(&config)?)
}

fn cmd_validate(config: &Path) -> CliResult<()> {
    println!("Validating input document: {}", config.display());
    let doc = load_input(config)?;
    let sections = [
        ("ro_train", doc.ro_train.is_some()),
        ("uf_train", doc.uf_train.is_some()),
        ("uv_aop", doc.uv_aop.is_some()),
        ("chemical_addition", doc.chemical_addition.is_some()),
        ("brine_disposal", doc.brine_disposal.is_some()),
        ("costing", doc.costing.is_some()),
        ("ro_module", doc.ro_module.is_some()),
        ("solver", doc.solver.is_some()),
    ];
    println!("✓ Input document is valid");
    for (name, present) in sections {
        if present {
            println!("  {name}");
        }
    }
    Ok(())
}

fn cmd_run(
    recipe: Recipe,
    overrides: &FeedOverrides,
    config: Option<&Path>,
    costing: bool,
    chemical: Option<&str>,
    dose: Option<f64>,
    splits: Option<&[f64]>,
) -> CliResult<()> {
    let doc = match config {
        Some(path) => load_input(path)?,
        None => load_input(recipe.default_input())?,
    };
    let driver = driver_for(&doc)?;
    let feed = overrides.apply(recipe.default_feed());

    let report = match recipe {
        Recipe::RoTrain => ro_train::run(&driver, &doc, feed, costing)?.1.report(),
        Recipe::UfTrain => uf_train::run(&driver, &doc, feed, costing)?.1.report(),
        Recipe::UfSystem => {
            let splits = splits.unwrap_or(&uf_system::DEFAULT_SPLITS);
            uf_system::run(&driver, &doc, feed, splits, costing)?.1.report()
        }
        Recipe::UvAop => uv_aop::run(&driver, &doc, feed, costing)?.1.report(),
        Recipe::ChemicalAddition => chemical_addition::run(&driver, &doc, feed, chemical, dose)?.1.report(),
        Recipe::BrineDisposal => brine_disposal::run(&driver, &doc, feed, costing)?.1.report(),
    };
    println!("{report}");
    Ok(())
}

fn cmd_train_surrogate(data: &Path, output: &Path, config: TrainerConfig) -> CliResult<()> {
    let csv = resolve_data_file(data)?;
    let report = rc_batch::train_and_save(&csv, output, &config)?;
    println!(
        "✓ Fitted {} -> {} on {} of {} rows ({} training)",
        report.input_label, report.output_label, report.rows_used, report.rows_read, report.training_rows
    );
    if let Some(m) = report.validation {
        println!("  validation: RMSE {:.4}, R² {:.4} over {} rows", m.rmse, m.r2, m.samples);
    }
    println!("  saved to {}", output.display());
    Ok(())
}

fn cmd_membrane_props(config: &Path, primary: &Path, tertiary: &Path, out_dir: &Path) -> CliResult<()> {
    let doc = load_input(config)?;
    let driver = driver_for(&doc)?;

    let primary = Table::read(&resolve_data_file(primary)?)?;
    let tertiary = Table::read(&resolve_data_file(tertiary)?)?;
    let [stage1, stage2] = rc_batch::primary_membrane_props(&driver, &doc, &primary, &RowFilter::primary())?;
    let stage3 = rc_batch::tertiary_membrane_props(&driver, &doc, &tertiary, &RowFilter::tertiary())?;

    std::fs::create_dir_all(out_dir).map_err(BatchError::from)?;
    for stage in [&stage1, &stage2, &stage3] {
        let path = out_dir.join(stage.file_name());
        rc_batch::write_csv(&path, &stage.rows)?;
        if let Some((a, b)) = stage.average() {
            println!(
                "Stage {}: A = {a:.4e} m/(s·Pa), B = {b:.4e} m/s over {} rows ({} failed) -> {}",
                stage.stage,
                stage.rows.len(),
                stage.failed,
                path.display()
            );
        }
    }
    Ok(())
}
