use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::deps::{cmd_deps, DepsAction};
use cli::init::cmd_init;
use cli::locations::{cmd_locations, LocationsAction};
use cli::Context;

#[derive(Parser)]
#[command(
    name = "odm",
    version,
    about = "Dependency manager for OPA policy-bundle projects"
)]
struct Cli {
    /// Project directory (default: nearest opa.project above the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// opa executable used for namespace rewrites (env: ODM_OPA)
    #[arg(long, global = true, value_name = "PATH")]
    opa: Option<PathBuf>,
    /// git executable used for git+ dependencies (env: ODM_GIT)
    #[arg(long, global = true, value_name = "PATH")]
    git: Option<PathBuf>,
    /// Shallow-clone git dependencies (env: ODM_SHALLOW_CLONE)
    #[arg(long, global = true)]
    shallow: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new opa.project
    Init {
        /// Project name (defaults to the directory name)
        name: Option<String>,
        /// Source root, relative to the project directory
        #[arg(long)]
        source: Option<String>,
        /// Test root, relative to the project directory
        #[arg(long)]
        tests: Option<String>,
        /// Overwrite an existing opa.project
        #[arg(long)]
        force: bool,
    },
    /// Manage dependencies
    Deps {
        #[command(subcommand)]
        action: DepsAction,
    },
    /// Print source or test locations of the project and its dependencies
    Locations {
        #[command(subcommand)]
        action: LocationsAction,
    },
}

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    let mut settings = odm::Settings::from_env();
    if let Some(opa) = cli.opa {
        settings.opa = opa;
    }
    if let Some(git) = cli.git {
        settings.git = git;
    }
    settings.shallow_clone |= cli.shallow;

    let ctx = Context {
        project_dir: cli.project,
        settings,
    };

    match cli.command {
        Command::Init {
            name,
            source,
            tests,
            force,
        } => cmd_init(&ctx, name, source, tests, force),
        Command::Deps { action } => cmd_deps(&ctx, action),
        Command::Locations { action } => cmd_locations(&ctx, action),
    }
}
