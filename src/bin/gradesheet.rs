use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use gradesheet::columns::render_table;
use gradesheet::downloader;
use gradesheet::gradebook::Gradebook;
use gradesheet::labels;
use gradesheet::loader::load_roster;
use gradesheet::session::Session;

#[derive(Parser)]
#[command(name = "gradesheet")]
#[command(about = "Student results sheet: grades, statistics and exports", version)]
struct Args {
    /// Roster to start from (.json, .csv or a .gz session snapshot)
    #[arg(long, short, value_name = "FILE", env = "GRADESHEET_INPUT", global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Edit the results sheet interactively (default)
    Shell,
    /// Print the results table
    Show {
        /// Output the computed roster as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the results table
    Export {
        /// Spreadsheet output path
        #[arg(long, value_name = "FILE")]
        xlsx: Option<PathBuf>,
        /// CSV output path
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// PNG output path
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },
}

fn load(input: Option<&PathBuf>) -> Result<Gradebook> {
    match input {
        Some(path) => load_roster(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(Gradebook::new()),
    }
}

fn show(book: &Gradebook, json: bool) -> Result<()> {
    let roster = book.computed()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&roster)?);
    } else {
        println!("{}", render_table(&roster, &book.subjects));
    }
    Ok(())
}

fn export(
    book: &Gradebook,
    xlsx: Option<PathBuf>,
    csv: Option<PathBuf>,
    png: Option<PathBuf>,
) -> Result<()> {
    let grid = book.sheet_grid()?;
    // With no explicit target, write the spreadsheet under its usual name.
    let xlsx = match (&xlsx, &csv, &png) {
        (None, None, None) => Some(PathBuf::from(labels::DEFAULT_XLSX_FILE)),
        _ => xlsx,
    };

    if let Some(path) = xlsx {
        downloader::save_xlsx(&grid, &path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = csv {
        downloader::save_csv(&grid, &path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = png {
        #[cfg(feature = "render")]
        {
            let options = gradesheet::raster::RasterOptions::default();
            gradesheet::raster::save_png(&grid, &options, &path)?;
            println!("Wrote {}", path.display());
        }
        #[cfg(not(feature = "render"))]
        anyhow::bail!(
            "cannot write {}: built without the render feature",
            path.display()
        );
    }
    Ok(())
}

fn shell(book: Gradebook) -> Result<()> {
    let mut session = Session::new(book);
    let mut status = String::from("ok");
    let mut start_time = Instant::now();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Type 'help' for commands.");
    loop {
        let elapsed_time = start_time.elapsed().as_secs_f64();
        print!("[{:.1}] ({}) > ", elapsed_time, status);
        stdout.flush()?;

        let mut command = String::new();
        if stdin.lock().read_line(&mut command)? == 0 {
            break;
        }
        start_time = Instant::now();

        let outcome = session.handle_line(&command);
        if let Some(output) = &outcome.output {
            println!("{}", output);
        }
        if outcome.quit {
            break;
        }
        status = outcome.status;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gradesheet=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let book = load(args.input.as_ref())?;
    match args.command.unwrap_or(Command::Shell) {
        Command::Shell => shell(book),
        Command::Show { json } => show(&book, json),
        Command::Export { xlsx, csv, png } => export(&book, xlsx, csv, png),
    }
}
