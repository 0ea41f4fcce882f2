use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use sheetwise::aggregate::ValueFormat;
use sheetwise::io::excel_write::WriteOptions;
use sheetwise::pipeline::{self, AggregateRequest};
use sheetwise::{Result, SheetError, SheetSelector};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| SheetError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sheets(args) => execute_sheets(args),
        Command::Dimension(args) => execute_dimension(args),
        Command::Parse(args) => execute_parse(args),
        Command::Aggregate(args) => execute_aggregate(args),
        Command::Index(args) => execute_index(args),
    }
}

fn execute_sheets(args: InputArgs) -> Result<()> {
    require_input(&args.input)?;
    let summaries = pipeline::sheet_summaries(&args.input)?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn execute_dimension(args: SheetArgs) -> Result<()> {
    require_input(&args.input)?;
    let dimension = pipeline::dimension(&args.input, &args.selection.selector())?;
    println!("{}", serde_json::to_string_pretty(&dimension)?);
    Ok(())
}

fn execute_parse(args: ParseArgs) -> Result<()> {
    require_input(&args.sheet.input)?;
    let shape = pipeline::load_shape(&args.shape)?;
    let selector = args.sheet.selection.selector();
    let records = pipeline::parse_records(&args.sheet.input, &selector, &shape)?;
    pipeline::write_records_json(&records, args.output.as_deref())
}

fn execute_aggregate(args: AggregateArgs) -> Result<()> {
    for input in &args.inputs {
        require_input(input)?;
    }
    let request = AggregateRequest {
        inputs: args.inputs,
        sheet: args.selection.optional_selector(),
        start_row: args.start_row,
        start_col: args.start_col,
        dedupe: args.dedupe,
        format: args.values.into(),
        output: args.output,
        options: WriteOptions {
            overwrite: args.overwrite,
        },
    };
    pipeline::aggregate_files(&request)?;
    Ok(())
}

fn execute_index(args: IndexArgs) -> Result<()> {
    for input in &args.inputs {
        require_input(input)?;
    }
    pipeline::index_files(
        &args.inputs,
        &args.output,
        WriteOptions {
            overwrite: args.overwrite,
        },
    )?;
    Ok(())
}

fn require_input(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SheetError::MissingInput(path.to_path_buf()))
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Dimension, parse, and aggregate spreadsheet tables."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the sheets of a workbook with their dimensions.
    Sheets(InputArgs),
    /// Infer the table dimension of one sheet.
    Dimension(SheetArgs),
    /// Read typed records from a sheet using a JSON record shape.
    Parse(ParseArgs),
    /// Append sheets of several workbooks under one header.
    Aggregate(AggregateArgs),
    /// Copy every sheet of several workbooks into one indexed workbook.
    Index(IndexArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Workbook to read.
    input: PathBuf,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Sheet name.
    #[arg(long, conflicts_with = "sheet_index")]
    sheet: Option<String>,

    /// Zero based sheet position.
    #[arg(long)]
    sheet_index: Option<usize>,
}

impl SelectionArgs {
    fn optional_selector(&self) -> Option<SheetSelector> {
        match (&self.sheet, self.sheet_index) {
            (Some(name), _) => Some(SheetSelector::Name(name.clone())),
            (None, Some(index)) => Some(SheetSelector::Index(index)),
            (None, None) => None,
        }
    }

    /// The selected sheet, defaulting to the first one.
    fn selector(&self) -> SheetSelector {
        self.optional_selector().unwrap_or(SheetSelector::Index(0))
    }
}

#[derive(clap::Args)]
struct SheetArgs {
    /// Workbook to read.
    input: PathBuf,

    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(clap::Args)]
struct ParseArgs {
    #[command(flatten)]
    sheet: SheetArgs,

    /// JSON record shape to apply.
    #[arg(long)]
    shape: PathBuf,

    /// JSON file to write; records are printed when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct AggregateArgs {
    /// Workbooks to aggregate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Row holding the header of every sheet.
    #[arg(long, default_value_t = 0)]
    start_row: usize,

    /// First column of every sheet's table.
    #[arg(long, default_value_t = 0)]
    start_col: usize,

    /// Keep only the left-most column of repeated headers.
    #[arg(long)]
    dedupe: bool,

    /// Rendering of the cell values to write.
    #[arg(long, value_enum, default_value_t = ValuesKind::Original)]
    values: ValuesKind,

    /// Replace the output file if it exists.
    #[arg(long)]
    overwrite: bool,
}

#[derive(clap::Args)]
struct IndexArgs {
    /// Workbooks to index.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Replace the output file if it exists.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ValuesKind {
    Original,
    Precision,
}

impl From<ValuesKind> for ValueFormat {
    fn from(kind: ValuesKind) -> Self {
        match kind {
            ValuesKind::Original => ValueFormat::Original,
            ValuesKind::Precision => ValueFormat::Precision,
        }
    }
}
