use std::{fs, path::PathBuf};

use tempfile::tempdir;

use nodemap::{NodeMapError, geometry::Size};
use nodemap_cli::{Args, run};

/// Collects all .json forests from a directory
fn collect_forest_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args_for(input: impl Into<String>, output: impl Into<String>) -> Args {
    Args {
        input: input.into(),
        output: output.into(),
        config: None,
        detail_level: None,
        viewport: Size::new(1280.0, 720.0),
        outline: None,
        max_frames: 10_000,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demo_forests() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    // Demos are at workspace root, relative to workspace not the crate
    let demos_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos");
    let demos = collect_forest_files(demos_path);

    assert!(!demos.is_empty(), "No demo forests found in demos/");

    let mut failed = Vec::new();

    for demo_path in &demos {
        let output_path = temp_dir.path().join(format!(
            "{}.svg",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));
        let args = args_for(
            demo_path.to_string_lossy(),
            output_path.to_string_lossy(),
        );

        match run(&args) {
            Ok(()) => {
                let svg = fs::read_to_string(&output_path).unwrap_or_default();
                if !svg.contains("</svg>") {
                    failed.push(format!("{}: incomplete SVG", demo_path.display()));
                }
            }
            Err(err) => failed.push(format!("{}: {err}", demo_path.display())),
        }
    }

    assert!(failed.is_empty(), "Failed demos:\n{}", failed.join("\n"));
}

#[test]
fn e2e_detail_level_and_outline() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("map.json");
    fs::write(
        &input,
        r#"[{"id": "r", "title": "Root", "role": "human",
             "children": [{"id": "c", "title": "Leaf", "role": "ai"}]}]"#,
    )
    .unwrap();

    let output = temp_dir.path().join("map.svg");
    let outline = temp_dir.path().join("map.txt");
    let mut args = args_for(input.to_string_lossy(), output.to_string_lossy());
    args.detail_level = Some(0);
    args.outline = Some(outline.to_string_lossy().to_string());

    run(&args).unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert_eq!(svg.matches("<circle").count(), 2);
    // The leaf label is hidden at level 0.
    assert_eq!(svg.matches("opacity=\"0\"").count(), 1);

    let outline = fs::read_to_string(&outline).unwrap();
    assert!(outline.contains("Root"));
    assert!(outline.contains("Leaf"));
}

#[test]
fn e2e_invalid_forest_reports_forest_error() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("broken.json");
    fs::write(&input, r#"[{"id": "x", "children": [}]"#).unwrap();
    let output = temp_dir.path().join("broken.svg");

    let err = run(&args_for(input.to_string_lossy(), output.to_string_lossy())).unwrap_err();

    assert!(matches!(err, NodeMapError::Forest { .. }));
    assert!(!output.exists());
}

#[test]
fn e2e_missing_config_file_is_reported() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("map.json");
    fs::write(&input, "[]").unwrap();

    let mut args = args_for(
        input.to_string_lossy(),
        temp_dir.path().join("map.svg").to_string_lossy(),
    );
    args.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());

    let err = run(&args).unwrap_err();
    assert!(matches!(err, NodeMapError::Config(_)));
}

#[test]
fn e2e_explicit_config_is_applied() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("map.json");
    fs::write(&input, r#"[{"id": "r", "title": "Root"}]"#).unwrap();
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[radius]\nmain = 80.0\n").unwrap();

    let output = temp_dir.path().join("map.svg");
    let mut args = args_for(input.to_string_lossy(), output.to_string_lossy());
    args.config = Some(config.to_string_lossy().to_string());

    run(&args).unwrap();

    let svg = fs::read_to_string(&output).unwrap();
    assert!(svg.contains("r=\"80\""));
}
