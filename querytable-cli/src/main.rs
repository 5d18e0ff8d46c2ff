//! querytable CLI
//!
//! Renders one page of a list view over a SQLite table and prints the
//! payload as JSON.

mod column_arg;

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use querytable_lib::config::DEFAULT_PER_PAGE;
use querytable_lib::config::TableConfig;
use querytable_lib::request::Request;
use querytable_lib::source::SqliteSource;
use querytable_lib::table::Table;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::column_arg::ColumnArg;

#[derive(Parser, Debug)]
#[command(name = "querytable")]
#[command(about = "Render a paginated list view of a SQLite table as JSON", long_about = None)]
struct Args {
    /// SQLite database file
    database: PathBuf,

    /// Table to read
    table: String,

    /// Column declaration, KEY[=DISPLAY][:FLAG,...]; FLAG is sortable,
    /// searchable, hidden, or a format id
    #[arg(short, long = "column", value_name = "COLUMN", required = true)]
    columns: Vec<ColumnArg>,

    /// Request query string, e.g. "q=ann&sort=name:desc&limit=25"
    #[arg(short, long, default_value = "")]
    query: String,

    /// Default ordering, KEY[:DIRECTION]
    #[arg(long = "default-sort", value_name = "KEY[:DIR]")]
    default_sort: Vec<String>,

    /// Page size used when the request has no limit
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    per_page: usize,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pretty: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = TableConfig::new().with_per_page(args.per_page);
    let request = Request::from_query_str_with(&args.query, &config.request_keys);
    let source = SqliteSource::open(&args.database, args.table.as_str())?;
    info!(
        "querytable: {} columns over {}:{}",
        args.columns.len(),
        args.database.display(),
        args.table
    );

    let mut table = Table::with_config(source, request, &config);
    for arg in &args.columns {
        declare(&mut table, arg)?;
    }
    table.default_sort(&args.default_sort);

    let json = table.build()?.to_json()?;
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn declare(table: &mut Table<SqliteSource>, arg: &ColumnArg) -> Result<(), querytable_lib::Error> {
    let column = match (arg.formats.as_slice(), arg.display.as_deref()) {
        ([format], Some(display)) => table.call(format.id(), &[arg.key.as_str(), display])?,
        ([format], None) => table.call(format.id(), &[arg.key.as_str()])?,
        (formats, display) => {
            let column = match display {
                Some(display) => table.column_as(arg.key.as_str(), display),
                None => table.column(arg.key.as_str()),
            };
            column.with_format(formats.iter().copied())
        }
    };
    column
        .sortable(arg.sortable)
        .searchable(arg.searchable)
        .hide(arg.hidden);
    Ok(())
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match &args.log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}
