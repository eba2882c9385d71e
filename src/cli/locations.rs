use clap::Subcommand;

use super::{load_project, Context};

#[derive(Subcommand)]
pub enum LocationsAction {
    /// Source directories: the project's, then every resolved dependency's
    Source,
    /// Test directories of the project
    Test {
        /// Include test directories declared by resolved dependencies
        #[arg(long)]
        with_deps: bool,
    },
}

pub fn cmd_locations(ctx: &Context, action: LocationsAction) {
    let project = load_project(&ctx.project_file(), true);
    let locations = match action {
        LocationsAction::Source => project.source_locations(),
        LocationsAction::Test { with_deps } => project.test_locations(with_deps),
    };
    for path in locations {
        println!("{}", path.display());
    }
}
