use clap::{Parser, Subcommand};
use gridstore::{ColumnRef, Persistence, Table, Value};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Create the destination files, leaving existing data intact.
    Init,
    /// Start a fresh table with the given column labels.
    Create { labels: Vec<String> },
    /// Append a row; values parse as JSON where possible, raw text otherwise.
    AddRow { values: Vec<String> },
    /// Append one or more columns.
    AddCols { names: Vec<String> },
    /// Delete a column by data-column index or label.
    DelCol { column: String },
    /// Delete a row by position.
    DelRow { index: usize },
    /// Print a column as its label followed by each value.
    GetCol { column: String },
    /// Print a row, identifier included.
    GetRow { index: usize },
    /// Replace a single cell.
    SetCell {
        row: usize,
        column: usize,
        value: String,
    },
    /// Sort a column in natural order.
    Sort {
        column: String,
        #[arg(long)]
        reverse: bool,
    },
    /// Print the whole table.
    View,
}

/// A numeric argument addresses a column by index, anything else by label.
fn column_ref(arg: &str) -> ColumnRef {
    match arg.parse::<usize>() {
        Ok(index) => ColumnRef::Index(index),
        Err(_) => ColumnRef::Label(arg.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let persistence = Persistence::new(&cli.data_dir)?;
    let mut table = Table::new();

    // Table state lives in the flat files between invocations: every
    // command except init/create starts from a retrieve and ends with a
    // store.
    match &cli.command {
        Commands::Init => {
            println!("OK");
            return Ok(());
        }
        Commands::Create { labels } => {
            table.create(labels)?;
            persistence.store(&mut table)?;
            println!("OK");
            return Ok(());
        }
        _ => persistence.retrieve(&mut table)?,
    }

    match cli.command {
        Commands::AddRow { values } => {
            let values = values.iter().map(|v| Value::from_json(v)).collect();
            table.add_row(values)?;
            println!("OK");
        }
        Commands::AddCols { names } => {
            table.add_columns(&names)?;
            println!("OK");
        }
        Commands::DelCol { column } => {
            table.delete_column(column_ref(&column))?;
            println!("OK");
        }
        Commands::DelRow { index } => {
            table.delete_row(index)?;
            println!("OK");
        }
        Commands::GetCol { column } => {
            let col = table.get_column(column_ref(&column))?;
            println!("{}", serde_json::to_string_pretty(&col)?);
        }
        Commands::GetRow { index } => {
            let row = table.get_row(index)?;
            let mut out = vec![row.id().to_string()];
            out.extend(row.cells().iter().map(Value::to_string));
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::SetCell { row, column, value } => {
            table.update_cell(row, column, Value::from_json(&value))?;
            println!("OK");
        }
        Commands::Sort { column, reverse } => {
            table.sort_column(column_ref(&column), reverse)?;
            println!("OK");
        }
        Commands::View => table.view(),
        Commands::Init | Commands::Create { .. } => unreachable!(),
    }

    persistence.store(&mut table)?;
    Ok(())
}
