use super::{fail, Context};

pub fn cmd_init(
    ctx: &Context,
    name: Option<String>,
    source: Option<String>,
    tests: Option<String>,
    force: bool,
) {
    let dir = ctx.working_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("error: {}: {}", dir.display(), e);
        std::process::exit(1);
    }

    let name = name.or_else(|| {
        std::fs::canonicalize(&dir)
            .ok()
            .and_then(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
    });

    let mut project = odm::Project::new(&dir);
    project.name = name;
    project.source = source;
    project.tests = tests;

    if let Err(e) = project.write_to_file(&dir, force) {
        fail(e);
    }
    eprintln!("Created {}", project.path().display());
}
