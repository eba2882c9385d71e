use clap::Subcommand;

use odm::{DependencyInfo, Resolver};

use super::{fail, load_project, Context};

#[derive(Subcommand)]
pub enum DepsAction {
    /// Show declared dependencies with their namespace and identity
    List,
    /// Declare a dependency in opa.project
    Add {
        /// Dependency name (also the default namespace)
        name: String,
        /// `git+<url>[#<ref>]`, `file:<path>` or a plain path
        location: String,
        /// Namespace to move the dependency's data under
        #[arg(long, conflicts_with = "no_namespace")]
        namespace: Option<String>,
        /// Keep the dependency's data where it is
        #[arg(long)]
        no_namespace: bool,
    },
    /// Remove a dependency from opa.project
    Remove {
        /// Dependency name
        name: String,
    },
    /// Fetch every dependency into .opa/dependencies, replacing what is there
    Update,
    /// Show the resolved dependency tree
    Tree,
}

pub fn cmd_deps(ctx: &Context, action: DepsAction) {
    let manifest = ctx.project_file();

    match action {
        DepsAction::List => {
            let project = load_project(&manifest, false);
            let deps = &project.dependencies;
            if deps.is_empty() {
                println!("No dependencies declared in opa.project.");
                return;
            }
            println!("Dependencies ({}):", deps.len());
            for (name, dep) in deps.iter() {
                let namespace = dep.namespace().unwrap_or("-");
                println!(
                    "  {} = {} (namespace: {}, id: {})",
                    name,
                    dep.location(),
                    namespace,
                    dep.id().to_short()
                );
            }
        }
        DepsAction::Add {
            name,
            location,
            namespace,
            no_namespace,
        } => {
            let mut project = load_project(&manifest, false);
            let namespace = if no_namespace {
                None
            } else {
                Some(namespace.unwrap_or_else(|| name.clone()))
            };
            if let Err(e) = odm::fetch::Location::parse(&location, project.dir()) {
                fail(e);
            }
            let replaced = project.dependencies.contains_key(&name);
            project.set_dependency(&name, DependencyInfo::new(location, namespace));
            if let Err(e) = project.write_to_file(&manifest, true) {
                fail(e);
            }
            if replaced {
                eprintln!("Updated dependency `{}`", name);
            } else {
                eprintln!("Added dependency `{}`", name);
            }
        }
        DepsAction::Remove { name } => {
            let mut project = load_project(&manifest, false);
            if !project.remove_dependency(&name) {
                eprintln!("error: no dependency named `{}`", name);
                std::process::exit(1);
            }
            if let Err(e) = project.write_to_file(&manifest, true) {
                fail(e);
            }
            eprintln!("Removed dependency `{}`", name);
        }
        DepsAction::Update => {
            let mut project = load_project(&manifest, false);
            if project.dependencies.is_empty() {
                println!("No dependencies to fetch.");
                return;
            }
            let resolver = Resolver::new(&ctx.settings);
            if let Err(e) = resolver.resolve_project(&mut project) {
                fail(e);
            }
            let mut total = 0usize;
            let _ = odm::manifest::walk_dependencies(&project, |_| -> Result<(), ()> {
                total += 1;
                Ok(())
            });
            println!(
                "Resolved {} dependencies into {}",
                total,
                project.dependencies_dir().display()
            );
        }
        DepsAction::Tree => {
            let project = load_project(&manifest, true);
            let stdout = std::io::stdout();
            if let Err(e) = project.print_tree(&mut stdout.lock()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
