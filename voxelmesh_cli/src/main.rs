//! Entry point for the voxelmesh CLI tool.

mod commands;
mod input;

use clap::{Parser, Subcommand};

use commands::{convert_command, print_command};

#[derive(Parser)]
#[command(
  name = "voxelmesh",
  bin_name = "voxelmesh",
  version = env!("CARGO_PKG_VERSION"),
  about = "voxelmesh reconstructs DICOM series into iso-surface meshes",
  max_term_width = 80
)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  #[arg(
    long,
    default_value_t = false,
    help = "Write timing and memory stats to stderr on exit"
  )]
  print_stats: bool,
}

#[derive(Subcommand)]
enum Commands {
  #[command(about = convert_command::ABOUT)]
  Convert(convert_command::ConvertArgs),

  #[command(about = print_command::ABOUT)]
  Print(print_command::PrintArgs),
}

fn main() -> std::process::ExitCode {
  let _ = env_logger::Builder::from_default_env().try_init();

  let cli = Cli::parse();

  let started_at = std::time::Instant::now();

  let exit_code = match &cli.command {
    Commands::Convert(args) => convert_command::run(args),
    Commands::Print(args) => print_command::run(args),
  };

  if cli.print_stats {
    #[cfg(not(windows))]
    let peak_memory_mb = get_peak_memory_usage() as f64 / (1024.0 * 1024.0);

    eprintln!();
    eprintln!("-----");
    eprintln!(
      "Time elapsed:      {:.2} seconds",
      started_at.elapsed().as_secs_f64()
    );

    #[cfg(not(windows))]
    eprintln!("Peak memory usage: {:.0} MiB", peak_memory_mb);
  }

  exit_code
}

#[cfg(not(windows))]
fn get_peak_memory_usage() -> i64 {
  let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
  unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };

  let mut max = usage.ru_maxrss;

  // On Linux, ru_maxrss is in KiB
  if std::env::consts::OS == "linux" {
    max *= 1024;
  }

  max
}
