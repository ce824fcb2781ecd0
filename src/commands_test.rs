use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::*;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh scratch directory under the system temp dir.
fn scratch() -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("blockgrid-test-{}-{n}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn grid() -> GridConfig {
    GridConfig::default()
}

fn add(kind: BlockKind) -> Command {
    Command::Add { kind, col: 0, row: 0, parent: None, props: None }
}

fn add_into(kind: BlockKind, parent: &str) -> Command {
    Command::Add { kind, col: 0, row: 0, parent: Some(parent.into()), props: None }
}

fn run(path: &Path, command: Command) -> Result<Option<String>, CliError> {
    run_on_file(path, command, &grid())
}

fn saved(path: &Path) -> LayoutDocument {
    LayoutDocument::parse(&fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================
// execute
// =============================================================

#[test]
fn add_prints_new_id_and_clamps_column() {
    let mut store = open(None).unwrap();
    let cmd = Command::Add { kind: BlockKind::Text, col: 10, row: 2, parent: None, props: None };
    let out = execute(&mut store, cmd, &grid()).unwrap();
    assert_eq!(out, Outcome { output: Some("item-1".into()), changed: true });
    let rec = store.geometry("item-1").unwrap();
    assert_eq!((rec.placement.x, rec.placement.y, rec.placement.w, rec.placement.h), (6, 2, 6, 2));
}

#[test]
fn add_merges_props_over_defaults() {
    let mut store = open(None).unwrap();
    let cmd = Command::Add {
        kind: BlockKind::Button,
        col: 0,
        row: 0,
        parent: None,
        props: Some(r#"{"text": "Buy", "variant": "secondary"}"#.into()),
    };
    execute(&mut store, cmd, &grid()).unwrap();
    let v = store.component("item-1").unwrap().props.to_value();
    assert_eq!(v["text"], json!("Buy"));
    assert_eq!(v["variant"], json!("secondary"));
    assert_eq!(v["size"], json!("default"));
}

#[test]
fn add_rejects_non_object_props() {
    let mut store = open(None).unwrap();
    let cmd = Command::Add { kind: BlockKind::Text, col: 0, row: 0, parent: None, props: Some("[1]".into()) };
    let err = execute(&mut store, cmd, &grid()).unwrap_err();
    assert_eq!(err.code(), "E_INVALID_PROPS");
    assert!(store.is_empty());
}

#[test]
fn add_rejects_unknown_parent() {
    let mut store = open(None).unwrap();
    let err = execute(&mut store, add_into(BlockKind::Text, "item-9"), &grid()).unwrap_err();
    assert!(matches!(err, CliError::Layout(LayoutError::UnknownComponent(_))));
    assert!(store.is_empty());
}

#[test]
fn update_unknown_id_is_not_found() {
    let mut store = open(None).unwrap();
    let err = execute(&mut store, Command::Update { id: "item-3".into(), props: "{}".into() }, &grid()).unwrap_err();
    assert!(matches!(err, CliError::NotFound(ref id) if id == "item-3"));
}

#[test]
fn remove_lists_cascade() {
    let mut store = open(None).unwrap();
    execute(&mut store, add(BlockKind::Container), &grid()).unwrap();
    execute(&mut store, add_into(BlockKind::Text, "item-1"), &grid()).unwrap();
    let out = execute(&mut store, Command::Remove { id: "item-1".into() }, &grid()).unwrap();
    assert_eq!(out.output.as_deref(), Some("item-1\nitem-2"));
    assert!(store.is_empty());
}

#[test]
fn select_prints_component_without_changing_file() {
    let mut store = open(None).unwrap();
    execute(&mut store, add(BlockKind::Heading), &grid()).unwrap();
    let out = execute(&mut store, Command::Select { id: "item-1".into() }, &grid()).unwrap();
    assert!(!out.changed);
    let v: Value = serde_json::from_str(&out.output.unwrap()).unwrap();
    assert_eq!(v["type"], json!("heading"));

    let err = execute(&mut store, Command::Select { id: "item-2".into() }, &grid()).unwrap_err();
    assert_eq!(err.code(), "E_UNKNOWN_COMPONENT");
}

#[test]
fn check_reports_violations() {
    let text = r#"{"layout": [{"i": "item-2", "x": 0, "y": 0, "w": 1, "h": 1}],
                   "components": [{"id": "item-1", "type": "text"}]}"#;
    let mut store = open(Some(text)).unwrap();
    let err = execute(&mut store, Command::Check, &grid()).unwrap_err();
    let CliError::Check(violations) = &err else {
        panic!("expected check failure, got {err}");
    };
    assert_eq!(violations.len(), 2);
    assert!(err.to_string().contains("2 violation(s)"));
}

#[test]
fn check_passes_on_consistent_layout() {
    let mut store = open(None).unwrap();
    execute(&mut store, add(BlockKind::Container), &grid()).unwrap();
    execute(&mut store, add_into(BlockKind::Chart, "item-1"), &grid()).unwrap();
    let out = execute(&mut store, Command::Check, &grid()).unwrap();
    assert_eq!(out.output.as_deref(), Some("ok: 2 components, 1 on the grid"));
}

#[test]
fn open_rejects_bad_document() {
    let err = open(Some(r#"{"layout": []}"#)).unwrap_err();
    assert_eq!(err.code(), "E_STRUCTURE");
}

// =============================================================
// Rendering
// =============================================================

#[test]
fn palette_lists_every_kind() {
    let listing = palette_listing();
    assert_eq!(listing.lines().count(), BlockKind::ALL.len());
    assert!(listing.lines().next().unwrap().starts_with("text"));
    assert!(listing.contains("6x6 (min 3x3)"));
}

#[test]
fn tree_indents_children() {
    let mut store = open(None).unwrap();
    execute(&mut store, add(BlockKind::Container), &grid()).unwrap();
    let button = Command::Add {
        kind: BlockKind::Button,
        col: 0,
        row: 0,
        parent: Some("item-1".into()),
        props: Some(r#"{"text": "Go"}"#.into()),
    };
    execute(&mut store, button, &grid()).unwrap();
    let tree = render_tree(&store.component_tree());
    assert_eq!(tree, "item-1 container [0,0 6x6]\n  item-2 button \"Go\"");
}

#[test]
fn tree_of_empty_layout() {
    assert_eq!(render_tree(&[]), "(empty layout)");
}

// =============================================================
// File workflow
// =============================================================

#[test]
fn missing_file_starts_empty_and_is_written() {
    let path = scratch().join("nested/layout.json");
    let out = run(&path, add(BlockKind::Text)).unwrap();
    assert_eq!(out.as_deref(), Some("item-1"));
    let doc = saved(&path);
    assert_eq!(doc.components.len(), 1);
    assert_eq!(doc.layout.len(), 1);
}

#[test]
fn commands_accumulate_across_runs() {
    let path = scratch().join("layout.json");
    run(&path, Command::Init { force: false }).unwrap();
    run(&path, add(BlockKind::Text)).unwrap();
    run(&path, add(BlockKind::Container)).unwrap();
    run(&path, add_into(BlockKind::Button, "item-2")).unwrap();
    assert_eq!(run(&path, add(BlockKind::Divider)).unwrap().as_deref(), Some("item-4"));

    run(&path, Command::Remove { id: "item-2".into() }).unwrap();
    let doc = saved(&path);
    let ids: Vec<&str> = doc.components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["item-1", "item-4"]);
    assert!(doc.container_parents.is_empty());

    // Counter continues from the saved ids.
    assert_eq!(run(&path, add(BlockKind::Spacer)).unwrap().as_deref(), Some("item-5"));
}

#[test]
fn read_only_commands_leave_file_untouched() {
    let path = scratch().join("layout.json");
    run(&path, add(BlockKind::Text)).unwrap();
    let before = fs::read_to_string(&path).unwrap();
    let exported = run(&path, Command::Export).unwrap().unwrap();
    run(&path, Command::Tree).unwrap();
    run(&path, Command::Check).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(format!("{exported}\n"), before);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let path = scratch().join("layout.json");
    run(&path, add(BlockKind::Text)).unwrap();
    let err = run(&path, Command::Init { force: false }).unwrap_err();
    assert_eq!(err.code(), "E_EXISTS");
    assert_eq!(saved(&path).components.len(), 1);

    run(&path, Command::Init { force: true }).unwrap();
    assert!(saved(&path).components.is_empty());
}

#[test]
fn init_overwrites_corrupt_file_with_force() {
    let path = scratch().join("layout.json");
    fs::write(&path, "not json").unwrap();
    run(&path, Command::Init { force: true }).unwrap();
    assert_eq!(saved(&path), LayoutDocument::default());
}

#[test]
fn corrupt_file_fails_and_is_kept() {
    let path = scratch().join("layout.json");
    fs::write(&path, "{ broken").unwrap();
    let err = run(&path, add(BlockKind::Text)).unwrap_err();
    assert_eq!(err.code(), "E_PARSE");
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
}

#[test]
fn import_replaces_document() {
    let dir = scratch();
    let path = dir.join("layout.json");
    let src = dir.join("incoming.json");
    run(&path, add(BlockKind::Text)).unwrap();
    fs::write(
        &src,
        r#"{"layout": [{"i": "item-5", "x": 0, "y": 0, "w": 6, "h": 6}],
            "components": [{"id": "item-5", "type": "container"}, {"id": "item-6", "type": "text"}],
            "containerParents": {"item-6": "item-5"}}"#,
    )
    .unwrap();

    let out = run(&path, Command::Import { src }).unwrap();
    assert_eq!(out.as_deref(), Some("imported 2 components (1 top-level, 1 nested)"));
    assert_eq!(saved(&path).components.len(), 2);
    assert_eq!(run(&path, add(BlockKind::Text)).unwrap().as_deref(), Some("item-7"));
}

#[test]
fn failed_import_keeps_document() {
    let dir = scratch();
    let path = dir.join("layout.json");
    let src = dir.join("bad.json");
    run(&path, add(BlockKind::Text)).unwrap();
    let before = fs::read_to_string(&path).unwrap();
    fs::write(&src, r#"{"components": []}"#).unwrap();

    let err = run(&path, Command::Import { src }).unwrap_err();
    assert_eq!(err.code(), "E_STRUCTURE");
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn import_missing_source_is_io_error() {
    let dir = scratch();
    let err = run(&dir.join("layout.json"), Command::Import { src: dir.join("nope.json") }).unwrap_err();
    assert_eq!(err.code(), "E_IO");
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn reparent_round_trip_through_file() {
    let path = scratch().join("layout.json");
    run(&path, add(BlockKind::Container)).unwrap();
    run(&path, add(BlockKind::Image)).unwrap();

    run(&path, Command::Reparent { child: "item-2".into(), parent: Some("item-1".into()) }).unwrap();
    let doc = saved(&path);
    assert_eq!(doc.layout.len(), 1);
    assert_eq!(doc.container_parents.get("item-2").map(ComponentId::as_str), Some("item-1"));

    let err = run(&path, Command::Reparent { child: "item-1".into(), parent: Some("item-2".into()) }).unwrap_err();
    assert_eq!(err.code(), "E_PARENT_CYCLE");

    run(&path, Command::Reparent { child: "item-2".into(), parent: None }).unwrap();
    let doc = saved(&path);
    assert_eq!(doc.layout.len(), 2);
    assert!(doc.container_parents.is_empty());
    run(&path, Command::Check).unwrap();
}

#[test]
fn update_persists_merged_props() {
    let path = scratch().join("layout.json");
    run(&path, add(BlockKind::Card)).unwrap();
    run(&path, Command::Update { id: "item-1".into(), props: r#"{"title": "Pricing"}"#.into() }).unwrap();
    let doc = saved(&path);
    assert_eq!(doc.components[0].props.label(), Some("Pricing"));
}
