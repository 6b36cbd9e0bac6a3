use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tc_shipyard::commands::{self, ReleaseCommand};
use tc_shipyard::core::error::print_error;

/// Build, verify and release TeamCity plugin bundles
#[derive(Parser)]
#[command(name = "tc-shipyard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct ShipyardCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Initialize a tc-shipyard configuration for a plugin project
  Init,
  /// Check dependency freshness and write the structured report
  Check {
    /// Output the report as JSON
    #[arg(long)]
    json: bool,
    /// Skip the tc-shipyard self-update check
    #[arg(long)]
    no_tool_check: bool,
  },
  /// Show the environment matrix and the resolved primary home dir
  Environments {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
  /// Build plugin bundles
  Package {
    /// Package a single module (agent, server, serverPre2018.2)
    #[arg(long)]
    module: Option<String>,
    /// Package every bundle module, agent bundle included
    #[arg(short, long)]
    all: bool,
    /// Output directory (default: build/distributions)
    #[arg(long)]
    output: Option<PathBuf>,
  },
  /// Release pipeline: plan and run
  Release {
    #[command(subcommand)]
    command: ReleaseCommand,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Cyan))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = ShipyardCli::parse();

  let result = match cli.command {
    Commands::Init => commands::run_init(),
    Commands::Check { json, no_tool_check } => commands::run_check(json, no_tool_check),
    Commands::Environments { json } => commands::run_environments(json),
    Commands::Package { module, all, output } => commands::run_package(module, all, output),
    Commands::Release { command } => command.execute(),
  };

  if let Err(error) = result {
    print_error(&error);
    std::process::exit(error.exit_code().as_i32());
  }
}
