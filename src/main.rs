use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod align;
mod error;
mod render;
mod series;

use series::Signal;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Parser)]
#[command(name = "metrics-csv", version)]
#[command(
    about = "Generate metrics csv file from requests, CPU and memory stats JSON",
    long_about = None
)]
struct Cli {
    /// Path to JSON file of data points for requests received by the ingress controller pod.
    #[arg(long, value_name = "PATH")]
    requests_file: PathBuf,

    /// Path to JSON file of data points for CPU usage of the ingress controller pod.
    #[arg(long, value_name = "PATH")]
    cpu_file: PathBuf,

    /// Path to JSON file of data points for memory usage of the ingress controller pod.
    #[arg(long, value_name = "PATH")]
    memory_file: PathBuf,

    /// Destination path for the metrics CSV file. This will be overwritten.
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(rows) => {
            println!("Wrote {} rows to {}", rows, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(error::exit_code(&err))
        }
    }
}

/// Load, align, merge and write. Returns the number of rows written.
fn run(cli: &Cli) -> Result<usize> {
    // 1) Load the three series, one file at a time.
    let requests = series::load_series(Signal::Requests, &cli.requests_file)?;
    let cpu = series::load_series(Signal::Cpu, &cli.cpu_file)?;
    let memory = series::load_series(Signal::Memory, &cli.memory_file)?;

    // 2) Cut everything to the latest start.
    let at = align::alignment_timestamp(&requests, &cpu, &memory)?;
    let requests = align::align(&requests, &at);
    let cpu = align::align(&cpu, &at);
    let memory = align::align(&memory, &at);
    println!(
        "Aligned at {}: dropped {} requests, {} cpu, {} memory point(s)",
        at,
        requests.dropped(),
        cpu.dropped(),
        memory.dropped()
    );

    // 3) Zip by position; fails before any output is touched.
    let rows = align::merge(&requests, &cpu, &memory)?;
    align::warn_anomalies(&requests, &cpu, &memory);

    // 4) Write.
    render::write_csv(&rows, &cli.output)?;
    Ok(rows.len())
}
