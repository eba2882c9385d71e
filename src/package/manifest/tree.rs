use std::io::{self, Write};

use crate::config::project::Project;

use super::Dependency;

const ROOT_LABEL: &str = "root";

/// Visit every dependency in the tree in pre-order. Stops at the first
/// error returned by `f`.
pub fn walk_dependencies<E, F>(project: &Project, mut f: F) -> Result<(), E>
where
    F: FnMut(&Dependency) -> Result<(), E>,
{
    walk(project, &mut f)
}

fn walk<E, F>(project: &Project, f: &mut F) -> Result<(), E>
where
    F: FnMut(&Dependency) -> Result<(), E>,
{
    for dep in project.dependencies.values() {
        f(dep)?;
        if let Some(nested) = &dep.project {
            walk(nested, f)?;
        }
    }
    Ok(())
}

// ─── Rendering ─────────────────────────────────────────────────────

impl Project {
    /// Write the dependency tree, one line per node, children indented two
    /// spaces below their parent.
    pub fn print_tree<W: Write>(&self, w: &mut W) -> io::Result<()> {
        print_node(w, ROOT_LABEL, Some(self), 0)
    }

    pub fn render_tree(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.print_tree(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn print_node<W: Write>(
    w: &mut W,
    label: &str,
    project: Option<&Project>,
    depth: usize,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match project.and_then(|p| p.name.as_deref()) {
        Some(name) => writeln!(w, "{}{} ({})", indent, label, name)?,
        None => writeln!(w, "{}{}", indent, label)?,
    }
    if let Some(project) = project {
        for dep in project.dependencies.values() {
            print_node(w, &dep.name, dep.project.as_ref(), depth + 1)?;
        }
    }
    Ok(())
}
