use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trajkit::core::analysis::fes::{EnergyUnit, ZeroLevel};
use trajkit::core::dynamics::unwrap::UnwrapMethod;
use trajkit::engine::config::{FrameSelection, IdentityPolicy};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Andrea Gardin",
    version,
    about = "trajkit CLI - Molecule detection, center-of-mass unwrapping and free-energy surfaces for molecular-dynamics trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect molecules, reduce them to centers of mass and unwrap their trajectories.
    Analyze(AnalyzeArgs),
    /// Unwrap a single wrapped coordinate series.
    Unwrap(UnwrapArgs),
    /// Compute a pseudo free-energy surface from one or two sampled columns.
    Fes(FesArgs),
    /// Inspect and edit the molecule name registry.
    Registry(RegistryArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the trajectory snapshot file (a JSON array of frames).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving one unwrapped CSV file per molecular species.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the frame selection ('all', '7', '0:100', '0:100:5').
    #[arg(short, long, value_name = "SEL")]
    pub frames: Option<FrameSelection>,

    /// Override the unwrapping method.
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<UnwrapMethod>,

    /// Override how molecule identities are carried across frames.
    #[arg(long, value_name = "POLICY")]
    pub identity: Option<IdentityPolicy>,

    /// Name molecules from this project of the name registry.
    #[arg(short, long, value_name = "NAME")]
    pub project: Option<String>,

    /// Store the resulting formula -> name mapping under the project in the registry.
    #[arg(long, requires = "project")]
    pub save_names: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S unwrap.method=heuristic
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `unwrap` subcommand.
#[derive(Args, Debug)]
pub struct UnwrapArgs {
    /// Path to the wrapped series (CSV with x,y,z and optional lx,ly,lz columns).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the unwrapped series CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Unwrapping method.
    #[arg(short, long, value_name = "METHOD", default_value_t = UnwrapMethod::Hybrid)]
    pub method: UnwrapMethod,

    /// Cubic box length applied to every frame when the input has no box columns.
    #[arg(short = 'b', long = "box", value_name = "LENGTH")]
    pub box_length: Option<f64>,
}

/// Arguments for the `fes` subcommand.
#[derive(Args, Debug)]
pub struct FesArgs {
    /// Path to the CSV file holding the sampled collective variables.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the free-energy table CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Column used as the first variable.
    #[arg(short, long, required = true, value_name = "COLUMN")]
    pub x: String,

    /// Column used as the second variable of a 2D surface.
    #[arg(short, long, value_name = "COLUMN")]
    pub y: Option<String>,

    /// Column holding per-sample weights.
    #[arg(short, long, value_name = "COLUMN")]
    pub weights: Option<String>,

    /// Number of histogram bins per dimension.
    #[arg(short, long, value_name = "INT", default_value_t = 100)]
    pub bins: usize,

    /// Temperature in kelvin.
    #[arg(short, long, required = true, value_name = "KELVIN")]
    pub temperature: f64,

    /// Energy unit of the output ('kb', 'kj', 'kcal').
    #[arg(short, long, value_name = "UNIT", default_value_t = EnergyUnit::Kb)]
    pub unit: EnergyUnit,

    /// Zero level of the surface ('min', 'max' or a number).
    #[arg(short, long, value_name = "LEVEL", default_value = "min")]
    pub zero: ZeroLevel,

    /// Keep empty bins at infinite energy instead of filling them.
    #[arg(long)]
    pub no_fill: bool,
}

/// Arguments for the `registry` subcommand.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    #[command(subcommand)]
    pub command: RegistryCommands,
}

/// Available commands for name registry management.
#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    /// Print every project, or the names of one project.
    Show {
        /// Project to print.
        project: Option<String>,
    },
    /// Name a chemical formula within a project.
    Set {
        project: String,
        formula: String,
        name: String,
    },
    /// Remove a project and all of its names.
    Remove { project: String },
    /// Print the location of the registry file.
    Path,
    /// Store the registry file at a custom location.
    SetPath {
        /// The new registry file path.
        path: PathBuf,
    },
    /// Return to the default registry location.
    ResetPath,
}
