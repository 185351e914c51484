//! Emission routing
//!
//! Decides, per top-level declaration, which output unit it is written to
//! and whether its rendering is replaced or deleted. Rendering itself is
//! delegated to a [`DeclRenderer`].
//!
//! Directives are looked up by exact declaration name, then by the
//! lower-cased name. A deletion wins over a replacement and means
//! "replace with nothing". Replaced declarations keep their comments: the
//! leading comments, then the replacement text, then the suffix and
//! trailing comments.
//!
//! [`EmitConfig::unused_directives`] reports `replace` and `delete` names
//! that match no declaration. `[groups]` entries are not checked.
//!
//! ```toml
//! default_group = "other"
//! delete = ["unused_helper"]
//!
//! [groups]
//! main = "cmd/tool"
//!
//! [replace]
//! debug_print = "func debugPrint() {}"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use thiserror::Error;

use crate::syntax::{BindError, Decl, DeclId, Program};

/// Errors from loading an [`EmitConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid emit config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Renders a declaration that has no replacement directive.
pub trait DeclRenderer {
    fn render(&self, program: &Program, decl: DeclId) -> String;
}

impl<F> DeclRenderer for F
where
    F: Fn(&Program, DeclId) -> String,
{
    fn render(&self, program: &Program, decl: DeclId) -> String {
        self(program, decl)
    }
}

/// Output routing and replacement directives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
    /// Group for declarations with no `[groups]` entry.
    pub default_group: String,
    /// Declaration name to output group.
    pub groups: FxHashMap<String, String>,
    /// Declaration name to verbatim replacement text.
    pub replace: FxHashMap<String, String>,
    /// Declarations to drop from the output.
    pub delete: FxHashSet<String>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            default_group: "other".to_string(),
            groups: FxHashMap::default(),
            replace: FxHashMap::default(),
            delete: FxHashSet::default(),
        }
    }
}

impl EmitConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading emit config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Output group for a declaration named `name`.
    pub fn group_for(&self, name: &str) -> &str {
        lookup(&self.groups, name).unwrap_or(&self.default_group)
    }

    /// Replacement text for a declaration named `name`; `Some("")` if it is
    /// deleted.
    pub fn replacement(&self, name: &str) -> Option<&str> {
        if self.delete.contains(name) || self.delete.contains(&name.to_lowercase()) {
            return Some("");
        }
        lookup(&self.replace, name)
    }

    /// Assign every top-level declaration its output group.
    ///
    /// Groups are write-once, so routing a program twice is an error.
    pub fn route(&self, program: &Program) -> Result<(), BindError> {
        for &id in &program.decls {
            let name = &program.decl(id).name;
            let group = self.group_for(name);
            debug!("route '{}' -> {}", name, group);
            program.assign_group(id, group)?;
        }
        Ok(())
    }

    /// Render the program into output units keyed `group/<file stem>`.
    ///
    /// Declarations that were not routed use their configured group.
    /// Items that render to nothing are skipped; every other item is
    /// followed by a blank line.
    pub fn emit(&self, program: &Program, renderer: &dyn DeclRenderer) -> BTreeMap<String, String> {
        let stem = Path::new(&program.file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut units: BTreeMap<String, String> = BTreeMap::new();
        for &id in &program.decls {
            let decl = program.decl(id);
            let group = decl.group().unwrap_or_else(|| self.group_for(&decl.name));
            let unit = units.entry(format!("{}/{}", group, stem)).or_default();

            let text = match self.replacement(&decl.name) {
                Some(replacement) => with_comments(decl, replacement),
                None => renderer.render(program, id),
            };
            if !text.is_empty() {
                unit.push_str(&text);
                unit.push_str("\n\n");
            }
        }

        for name in self.unused_directives(program) {
            warn!("{}: directive for '{}' matches no declaration", program.file, name);
        }
        units
    }

    /// Replace and delete names that match no top-level declaration.
    pub fn unused_directives(&self, program: &Program) -> Vec<&str> {
        let mut names: FxHashSet<String> = FxHashSet::default();
        for &id in &program.decls {
            let name = &program.decl(id).name;
            names.insert(name.clone());
            names.insert(name.to_lowercase());
        }

        let mut unused: Vec<&str> = self
            .replace
            .keys()
            .chain(self.delete.iter())
            .filter(|name| !names.contains(name.as_str()))
            .map(String::as_str)
            .collect();
        unused.sort_unstable();
        unused.dedup();
        unused
    }
}

fn lookup<'a>(map: &'a FxHashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name)
        .or_else(|| map.get(&name.to_lowercase()))
        .map(String::as_str)
}

fn with_comments(decl: &Decl, replacement: &str) -> String {
    let mut out = String::new();
    for comment in &decl.comments.before {
        out.push_str(comment);
        out.push('\n');
    }
    out.push_str(replacement);
    for comment in &decl.comments.suffix {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(comment);
    }
    for comment in &decl.comments.after {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(comment);
    }
    out
}
