pub mod deps;
pub mod init;
pub mod locations;

use std::path::{Path, PathBuf};
use std::process;

use odm::{Project, Settings};
use tracing_subscriber::EnvFilter;

/// Options shared by every command.
pub struct Context {
    pub project_dir: Option<PathBuf>,
    pub settings: Settings,
}

impl Context {
    /// Directory the command operates on.
    pub fn working_dir(&self) -> PathBuf {
        match &self.project_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Locate opa.project: `-C DIR` directly, otherwise the nearest ancestor.
    pub fn project_file(&self) -> PathBuf {
        if let Some(dir) = &self.project_dir {
            return odm::project::manifest_path(dir);
        }
        let cwd = self.working_dir();
        match Project::find(&cwd) {
            Some(p) => p,
            None => {
                eprintln!("error: no opa.project found (run from a project directory or pass -C)");
                process::exit(1);
            }
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises odm's level from warn.
pub fn init_tracing(verbose: u8) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("warn,odm={level}"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Load a project, or print the error and exit.
pub fn load_project(path: &Path, with_tree: bool) -> Project {
    let result = if with_tree {
        Project::read_and_load(path, false)
    } else {
        Project::read_from_file(path, false)
    };
    result.unwrap_or_else(|e| fail(e))
}

pub fn fail(err: odm::Error) -> ! {
    eprintln!("error: {}", err);
    process::exit(1);
}
