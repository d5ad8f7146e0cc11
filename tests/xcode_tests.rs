//! Generates each project under `xcode-tests/` and compares the output with
//! the reference files stored next to it. Run with `BLESS=1` to update them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use idegen::{
    model::{Project, Target},
    xcode::XcodeOptions,
};
use serde::Deserialize;

/// Reference file name to the path it is generated at, below the build directory.
const REFERENCE_FILES: &[(&str, &str)] = &[
    ("Sources.pbxproj", "Sources.xcodeproj/project.pbxproj"),
    ("Products.pbxproj", "Products.xcodeproj/project.pbxproj"),
    ("Workspace.xcworkspacedata", "Workspace.xcworkspace/contents.xcworkspacedata"),
];

#[derive(Deserialize)]
struct Description {
    build_settings: BuildSettings,
    targets: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct BuildSettings {
    root_path: String,
    build_dir: String,
    default_toolchain: String,
}

fn load_project(path: &Path) -> anyhow::Result<Project> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let description: Description = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;

    let settings = description.build_settings;
    let mut project = Project::new(
        settings.root_path,
        settings.build_dir,
        settings.default_toolchain,
    );
    for (label, target) in description.targets {
        let target: Target = serde_json::from_value(target)
            .with_context(|| format!("failed to parse target `{label}`"))?;
        project.add_target(label, target);
    }
    Ok(project)
}

fn test_directories() -> anyhow::Result<Vec<PathBuf>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("xcode-tests");
    let mut directories = vec![];
    for entry in std::fs::read_dir(&root)
        .with_context(|| format!("failed to read `{}`", root.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            directories.push(path);
        }
    }
    directories.sort();
    Ok(directories)
}

fn run_xcode_test(directory: &Path) -> anyhow::Result<()> {
    let project = load_project(&directory.join("project.json"))?;
    let files = idegen::xcode::generate(&project, &XcodeOptions::default())?;
    let build_path = PathBuf::from(project.absolute_build_path());
    let bless = std::env::var("BLESS").is_ok();

    for (reference, generated) in REFERENCE_FILES {
        let reference_path = directory.join(reference);
        if !reference_path.exists() && !bless {
            continue;
        }

        let generated_path = build_path.join(generated);
        let generated_path = generated_path
            .to_str()
            .with_context(|| format!("non-utf8 path `{}`", generated_path.display()))?;
        let contents = files
            .get(generated_path)
            .with_context(|| format!("`{generated_path}` was not generated"))?;
        let expected = std::fs::read_to_string(&reference_path).unwrap_or_default();

        if contents == expected {
            continue;
        }
        if bless {
            eprintln!("`{}` blessed because BLESS=1", reference_path.display());
            std::fs::write(&reference_path, contents)
                .with_context(|| format!("failed to write `{}`", reference_path.display()))?;
        } else {
            let diff = similar::udiff::unified_diff(
                similar::Algorithm::Myers,
                &expected,
                contents,
                2,
                Some((&reference_path.display().to_string(), "generated")),
            );
            anyhow::bail!("`{}` differs\n\n{diff}", reference_path.display());
        }
    }
    Ok(())
}

#[test]
fn xcode_tests() -> anyhow::Result<()> {
    let directories = test_directories()?;
    let mut failures = vec![];
    for directory in &directories {
        if let Err(err) = run_xcode_test(directory) {
            eprintln!("test `{}` failed: {err:?}", directory.display());
            failures.push(directory);
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    anyhow::bail!("{} out of {} tests failed", failures.len(), directories.len())
}
