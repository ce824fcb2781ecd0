//! Command execution against a layout document on disk.
//!
//! Every command loads the document into a fresh [`LayoutStore`], applies one
//! store operation, and writes the export back when the operation changed
//! state. Nothing here prints; callers get the text to show back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use layout::audit::Violation;
use layout::block::BlockKind;
use layout::doc::{ComponentId, LayoutDocument};
use layout::error::LayoutError;
use layout::notify::{NullNotifier, TracingNotifier};
use layout::palette::{GridConfig, PaletteItem, palette};
use layout::store::{LayoutStore, TreeNode};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} already exists; pass --force to overwrite", .0.display())]
    Exists(PathBuf),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("--props must be a JSON object: {0}")]
    Props(String),
    #[error("no component with id {0}")]
    NotFound(String),
    #[error("layout check found {} violation(s):\n{}", .0.len(), format_violations(.0))]
    Check(Vec<Violation>),
}

impl CliError {
    /// Stable code for scripts reading stderr.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E_CONFIG",
            Self::Io { .. } => "E_IO",
            Self::Exists(_) => "E_EXISTS",
            Self::Layout(e) => e.error_code(),
            Self::Props(_) => "E_INVALID_PROPS",
            Self::NotFound(_) => "E_UNKNOWN_COMPONENT",
            Self::Check(_) => "E_CHECK",
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations.iter().map(|v| format!("  - {v}")).collect::<Vec<_>>().join("\n")
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Write an empty layout document.
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// List the block kinds with their default sizes.
    Palette,
    /// Add a block at a grid cell, or inside a container with --parent.
    Add {
        kind: BlockKind,
        #[arg(long, default_value_t = 0)]
        col: u32,
        #[arg(long, default_value_t = 0)]
        row: u32,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, help = "JSON object merged over the kind's default props")]
        props: Option<String>,
    },
    /// Merge a JSON object into a component's props.
    Update {
        id: String,
        #[arg(long)]
        props: String,
    },
    /// Remove a component and everything nested inside it.
    Remove { id: String },
    /// Move a component into a container, or back to the grid without --parent.
    Reparent {
        child: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print one component the way the inspector shows it.
    Select { id: String },
    /// Replace the document with another exported layout.
    Import { src: PathBuf },
    /// Print the document as JSON.
    Export,
    /// Clear the document.
    Reset,
    /// Print the component tree.
    Tree,
    /// Check the document's invariants.
    Check,
}

impl Command {
    /// Whether the command reads the existing document before running.
    #[must_use]
    pub fn reads_document(&self) -> bool {
        !matches!(self, Self::Init { .. } | Self::Palette)
    }
}

/// What a command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Text for stdout.
    pub output: Option<String>,
    /// Whether the document must be written back.
    pub changed: bool,
}

impl Outcome {
    fn show(output: String) -> Self {
        Self { output: Some(output), changed: false }
    }

    fn changed(output: Option<String>) -> Self {
        Self { output, changed: true }
    }
}

// =============================================================================
// FILE WORKFLOW
// =============================================================================

/// Run `command` against the document at `path` and return the text to print.
///
/// A missing file reads as an empty layout.
///
/// # Errors
///
/// Fails on I/O errors, rejected store operations, unknown ids and a failed
/// `check`. The file is left untouched on any error.
pub fn run_on_file(path: &Path, command: Command, grid: &GridConfig) -> Result<Option<String>, CliError> {
    if let Command::Init { force } = command {
        if path.exists() && !force {
            return Err(CliError::Exists(path.to_path_buf()));
        }
    }

    let text = if command.reads_document() { read_optional(path)? } else { None };
    let mut store = open(text.as_deref())?;
    let outcome = execute(&mut store, command, grid)?;
    if outcome.changed {
        write(path, &store.get_layout_json())?;
        debug!(path = %path.display(), components = store.len(), "layout written");
    }
    Ok(outcome.output)
}

/// Store loaded from `text`, or empty when there is no document yet.
///
/// # Errors
///
/// Returns the import error when `text` is not a valid layout document.
pub fn open(text: Option<&str>) -> Result<LayoutStore, CliError> {
    let mut store = LayoutStore::with_notifier(Box::new(NullNotifier));
    if let Some(text) = text {
        store.load_document(LayoutDocument::parse(text)?)?;
    }
    store.set_notifier(Box::new(TracingNotifier));
    Ok(store)
}

fn read_optional(path: &Path) -> Result<Option<String>, CliError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no layout file yet; starting empty");
            Ok(None)
        }
        Err(source) => Err(CliError::Io { path: path.to_path_buf(), source }),
    }
}

fn write(path: &Path, text: &str) -> Result<(), CliError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| CliError::Io { path: dir.to_path_buf(), source })?;
    }
    fs::write(path, format!("{text}\n")).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Apply one command to `store`.
///
/// # Errors
///
/// See [`run_on_file`].
pub fn execute(store: &mut LayoutStore, command: Command, grid: &GridConfig) -> Result<Outcome, CliError> {
    match command {
        Command::Init { .. } | Command::Reset => {
            store.reset_layout();
            Ok(Outcome::changed(None))
        }
        Command::Palette => Ok(Outcome::show(palette_listing())),
        Command::Add { kind, col, row, parent, props } => {
            let id = add(store, kind, col, row, parent, props.as_deref(), grid)?;
            Ok(Outcome::changed(Some(id.to_string())))
        }
        Command::Update { id, props } => {
            let partial = parse_props(&props)?;
            if !store.update_component(&id, &partial)? {
                return Err(CliError::NotFound(id));
            }
            Ok(Outcome::changed(None))
        }
        Command::Remove { id } => {
            let removed = store.remove_component(&id);
            if removed.is_empty() {
                return Err(CliError::NotFound(id));
            }
            let ids: Vec<&str> = removed.iter().map(ComponentId::as_str).collect();
            Ok(Outcome::changed(Some(ids.join("\n"))))
        }
        Command::Reparent { child, parent } => {
            store.set_component_parent(&child, parent.as_deref())?;
            Ok(Outcome::changed(None))
        }
        Command::Select { id } => {
            store.select_item(Some(ComponentId::new(id.as_str())));
            let Some(component) = store.selected_component() else {
                return Err(CliError::NotFound(id));
            };
            let json = serde_json::to_string_pretty(component).map_err(|e| CliError::Props(e.to_string()))?;
            Ok(Outcome::show(json))
        }
        Command::Import { src } => {
            let text = fs::read_to_string(&src).map_err(|source| CliError::Io { path: src.clone(), source })?;
            let summary = store.set_layout_from_json(&text)?;
            Ok(Outcome::changed(Some(format!(
                "imported {} components ({} top-level, {} nested)",
                summary.components, summary.top_level, summary.nested
            ))))
        }
        Command::Export => Ok(Outcome::show(store.get_layout_json())),
        Command::Tree => Ok(Outcome::show(render_tree(&store.component_tree()))),
        Command::Check => {
            let violations = store.audit();
            if !violations.is_empty() {
                return Err(CliError::Check(violations));
            }
            Ok(Outcome::show(format!("ok: {} components, {} on the grid", store.len(), store.layout().len())))
        }
    }
}

fn add(
    store: &mut LayoutStore,
    kind: BlockKind,
    col: u32,
    row: u32,
    parent: Option<String>,
    props: Option<&str>,
    grid: &GridConfig,
) -> Result<ComponentId, CliError> {
    if let Some(p) = &parent {
        if !store.contains(p) {
            return Err(LayoutError::UnknownComponent(ComponentId::new(p.as_str())).into());
        }
    }

    let mut payload = PaletteItem::for_kind(kind).payload();
    if let Some(raw) = props {
        let partial = parse_props(raw)?;
        payload.default_props = payload.default_props.merged(&partial).map_err(|e| CliError::Props(e.to_string()))?;
    }
    let placement = payload.placement_at(col, row, grid);
    Ok(store.add_from_payload(&payload, placement, parent.map(ComponentId::from)))
}

fn parse_props(raw: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Props(format!("got {other}"))),
        Err(e) => Err(CliError::Props(e.to_string())),
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// One line per palette entry: kind, title, default span and minimum size.
#[must_use]
pub fn palette_listing() -> String {
    palette()
        .iter()
        .map(|item| {
            format!(
                "{:<10} {:<10} {}x{} (min {}x{})",
                item.kind.as_str(),
                item.title,
                item.default_w,
                item.default_h,
                item.min_w,
                item.min_h
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indented tree: `id kind "label" [x,y wxh]`, placement only on top-level rows.
#[must_use]
pub fn render_tree(roots: &[TreeNode<'_>]) -> String {
    let mut lines = Vec::new();
    for root in roots {
        tree_lines(root, 0, &mut lines);
    }
    if lines.is_empty() {
        return "(empty layout)".to_string();
    }
    lines.join("\n")
}

fn tree_lines(node: &TreeNode<'_>, depth: usize, out: &mut Vec<String>) {
    let mut line = format!("{}{} {}", "  ".repeat(depth), node.component.id, node.component.kind());
    if let Some(label) = node.component.props.label() {
        line.push_str(&format!(" {label:?}"));
    }
    if let Some(p) = node.placement {
        line.push_str(&format!(" [{},{} {}x{}]", p.x, p.y, p.w, p.h));
    }
    out.push(line);
    for child in &node.children {
        tree_lines(child, depth + 1, out);
    }
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
