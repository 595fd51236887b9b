use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod licenses;
mod rewrite;
mod stubs;
mod update;

#[derive(Parser)]
#[command(name = "revendor")]
#[command(about = "Re-vendor third-party dependency source trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-vendor both dependency trees end to end
    #[command(alias = "u")]
    Update(update::UpdateArgs),

    /// Re-run import rewriting over the vendor tree
    Rewrite(rewrite::RewriteArgs),

    /// Harvest license files for a vendored tree
    Licenses(licenses::LicensesArgs),

    /// Regenerate .pyi re-export stubs for the vendor tree
    Stubs(stubs::StubsArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default to progress-level logging; RUST_LOG still wins.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("info")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Update(args) => update::execute(args),
        Commands::Rewrite(args) => rewrite::execute(args),
        Commands::Licenses(args) => licenses::execute(args),
        Commands::Stubs(args) => stubs::execute(args),
    }
}
