use clap::error::{ContextKind, ContextValue, ErrorKind as ClapErrorKind};
use clap::{Parser, Subcommand};
use log::debug;
use pixmanip::config::{self, ToolConfig};
use pixmanip::error::ErrorKind;
use pixmanip::imaging::{CropRect, Operation};
use pixmanip::output::{self, ImageInfo};
use pixmanip::process::{self, Dimensions, ProcessOutcome};
use pixmanip::{Image, ppm};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit statuses. The numbering is stable; scripts branch on it.
mod exit {
    pub const MISSING_FILES: u8 = 1;
    pub const OPEN_FAILED: u8 = 2;
    pub const INVALID_PPM: u8 = 3;
    pub const UNKNOWN_OPERATION: u8 = 4;
    pub const WRONG_ARGUMENT_COUNT: u8 = 5;
    pub const BAD_ARGUMENT: u8 = 6;
    pub const WRITE_FAILED: u8 = 7;
    pub const OTHER: u8 = 8;
}

/// Input and output paths shared by every transform.
#[derive(clap::Args, Clone)]
struct IoArgs {
    /// P6 image to read
    input: PathBuf,
    /// Where to write the transformed P6 image
    output: PathBuf,
}

#[derive(Parser)]
#[command(name = "pixmanip")]
#[command(about = "Apply a single transform to a binary PPM (P6) image")]
#[command(long_about = "\
Apply a single transform to a binary PPM (P6) image

Every transform reads one P6 file (maxval 255) and writes one P6 file:

  pixmanip binarize    in.ppm out.ppm 128
  pixmanip crop        in.ppm out.ppm 10 20 110 220   # upper col/row, lower col/row
  pixmanip zoom-in     in.ppm out.ppm
  pixmanip rotate-left in.ppm out.ppm
  pixmanip pointillism in.ppm out.ppm --seed 42
  pixmanip blur        in.ppm out.ppm 1.5

Exit status: 0 ok, 1 missing file arguments, 2 open failed, 3 invalid PPM,
4 unknown operation, 5 wrong argument count, 6 bad argument value,
7 write failed, 8 anything else.

Run 'pixmanip gen-config' to generate a documented pixmanip.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log transform details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map every pixel to black or white by luminance
    Binarize {
        #[command(flatten)]
        io: IoArgs,
        /// Luminance cut-off, 0-255; pixels at or above it turn white
        #[arg(allow_negative_numbers = true)]
        threshold: i64,
    },
    /// Keep the rectangle from the upper corner up to, not including, the lower corner
    Crop {
        #[command(flatten)]
        io: IoArgs,
        #[arg(allow_negative_numbers = true)]
        upper_col: i64,
        #[arg(allow_negative_numbers = true)]
        upper_row: i64,
        #[arg(allow_negative_numbers = true)]
        lower_col: i64,
        #[arg(allow_negative_numbers = true)]
        lower_row: i64,
    },
    /// Double both dimensions by pixel replication
    #[command(alias = "zoom_in")]
    ZoomIn(IoArgs),
    /// Rotate 90 degrees counter-clockwise
    RotateLeft(IoArgs),
    /// Repaint as randomly placed filled discs
    #[command(alias = "pointilism")]
    Pointillism {
        #[command(flatten)]
        io: IoArgs,
        /// Fixed RNG seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Gaussian blur with the given standard deviation
    Blur {
        #[command(flatten)]
        io: IoArgs,
        /// Standard deviation; 10 * sigma must be at least 1
        #[arg(allow_negative_numbers = true)]
        sigma: f32,
    },
    /// Print the dimensions of a P6 image
    Inspect {
        input: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock pixmanip.toml with all options documented
    GenConfig,
}

/// A failed run: the status to exit with and the line to print.
struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn from_kind(kind: ErrorKind, message: impl std::fmt::Display) -> Self {
        Self::new(exit_code(kind), format!("{message} ({kind})"))
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = clap_exit_code(&err);
            // Help and version go to stdout, everything else to stderr.
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("pixmanip: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), Failure> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli.config)?;
    let (io, op, seed) = match cli.command {
        Command::GenConfig => return Ok(()),
        Command::Inspect { input, json } => {
            let image = decode_file(&input, &config)?;
            let info = ImageInfo::from(&image);
            if json {
                let text = serde_json::to_string_pretty(&info)
                    .map_err(|e| Failure::new(exit::OTHER, e.to_string()))?;
                println!("{text}");
            } else {
                output::print_inspect(&info);
            }
            return Ok(());
        }
        Command::Binarize { io, threshold } => (io, Operation::Binarize { threshold }, None),
        Command::Crop {
            io,
            upper_col,
            upper_row,
            lower_col,
            lower_row,
        } => (
            io,
            Operation::Crop(CropRect::new(upper_col, upper_row, lower_col, lower_row)),
            None,
        ),
        Command::ZoomIn(io) => (io, Operation::ZoomIn, None),
        Command::RotateLeft(io) => (io, Operation::RotateLeft, None),
        Command::Pointillism { io, seed } => (
            io,
            Operation::Pointillism(config.pointillism.params()),
            seed.or(config.pointillism.seed),
        ),
        Command::Blur { io, sigma } => (io, Operation::Blur { sigma }, None),
    };

    let outcome = transform_file(&io, &op, seed, &config)?;
    output::print_outcome(&outcome);
    Ok(())
}

/// Decode `io.input`, apply `op`, and only then create `io.output`, so a
/// rejected argument never leaves an empty output file behind.
fn transform_file(
    io: &IoArgs,
    op: &Operation,
    seed: Option<u64>,
    config: &ToolConfig,
) -> Result<ProcessOutcome, Failure> {
    let image = decode_file(&io.input, config)?;
    let input = Dimensions::from(&image);

    if matches!(op, Operation::Pointillism(_)) {
        match seed {
            Some(seed) => debug!("pointillism seed {seed}"),
            None => debug!("pointillism seeded from OS entropy"),
        }
    }
    let mut rng = process::rng_from_seed(seed);
    let result = process::apply(image, op, &mut rng)
        .map_err(|e| Failure::from_kind(e.kind(), e))?;

    let file = File::create(&io.output).map_err(|e| {
        Failure::new(
            exit::OPEN_FAILED,
            format!("cannot create {}: {e}", io.output.display()),
        )
    })?;
    let bytes_written = ppm::encode(&result, BufWriter::new(file))
        .map_err(|e| Failure::from_kind(e.kind(), e))?;

    Ok(ProcessOutcome {
        operation: op.name(),
        input,
        output: Dimensions::from(&result),
        bytes_written,
    })
}

fn decode_file(path: &Path, config: &ToolConfig) -> Result<Image, Failure> {
    let file = File::open(path).map_err(|e| {
        Failure::new(
            exit::OPEN_FAILED,
            format!("cannot open {}: {e}", path.display()),
        )
    })?;
    let image = ppm::decode_with(BufReader::new(file), &config.decode.options())
        .map_err(|e| Failure::from_kind(e.kind(), format!("{}: {e}", path.display())))?;
    debug!(
        "decoded {}: {}x{}",
        path.display(),
        image.rows(),
        image.cols()
    );
    Ok(image)
}

fn load_config(path: &Path) -> Result<ToolConfig, Failure> {
    config::load_config(path).map_err(|e| {
        Failure::from_kind(ErrorKind::Config, format!("{}: {e}", path.display()))
    })
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        k if k.is_decode() => exit::INVALID_PPM,
        ErrorKind::InvalidArgument | ErrorKind::OutOfBounds => exit::BAD_ARGUMENT,
        ErrorKind::WriteFailed => exit::WRITE_FAILED,
        _ => exit::OTHER,
    }
}

/// Map a command-line parse failure onto the exit status table.
fn clap_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
        ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ClapErrorKind::MissingSubcommand
        | ClapErrorKind::InvalidSubcommand => exit::UNKNOWN_OPERATION,
        ClapErrorKind::ValueValidation | ClapErrorKind::InvalidValue => exit::BAD_ARGUMENT,
        ClapErrorKind::MissingRequiredArgument if names_file_argument(err) => exit::MISSING_FILES,
        _ => exit::WRONG_ARGUMENT_COUNT,
    }
}

fn names_file_argument(err: &clap::Error) -> bool {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::Strings(args)) => args
            .iter()
            .any(|arg| arg.contains("INPUT") || arg.contains("OUTPUT")),
        Some(ContextValue::String(arg)) => arg.contains("INPUT") || arg.contains("OUTPUT"),
        _ => false,
    }
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
