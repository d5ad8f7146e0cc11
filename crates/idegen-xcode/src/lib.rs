//! Xcode project generation for a GN build graph.
//!
//! Two projects are generated into the build directory: one indexing every
//! source ("Sources") and one with a target per product that builds it
//! through ninja ("Products"), plus a workspace holding both.

use anyhow::Context;
use camino::Utf8PathBuf;
use idegen_model::Project;

mod generator;
pub use generator::ProjectGenerator;

mod options;
pub use options::XcodeOptions;

mod output;
pub use output::{write_if_changed, OutputFiles};

mod workspace;
pub use workspace::workspace_contents;

/// Render every file for `project` without touching the disk.
pub fn generate(project: &Project, options: &XcodeOptions) -> anyhow::Result<OutputFiles> {
    let build_path = Utf8PathBuf::from(project.absolute_build_path());
    let mut files = OutputFiles::new();

    let mut sources = ProjectGenerator::new(project, options.sources_project_name())?;
    sources.generate_targets_for_indexing()?;
    let sources = render(sources)?;

    let mut products = ProjectGenerator::new(project, options.products_project_name())?;
    products.generate_targets_for_products(options.build_tool_path(), options.build_script())?;
    let products = render(products)?;

    // Products first, so their schemes come first in Xcode.
    let workspace = workspace_contents([products.0.as_str(), sources.0.as_str()]);

    for (name, contents) in [products, sources] {
        files.add(
            build_path.join(format!("{name}.xcodeproj")).join("project.pbxproj"),
            contents,
        );
    }
    files.add(
        build_path
            .join(format!("{}.xcworkspace", options.workspace_name()))
            .join("contents.xcworkspacedata"),
        workspace,
    );
    Ok(files)
}

/// Generate and write every file for `project`, leaving unchanged files
/// alone. Returns the paths written.
pub fn write(project: &Project, options: &XcodeOptions) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let files = generate(project, options)?;
    files
        .write()
        .with_context(|| format!("writing Xcode projects to `{}`", project.absolute_build_path()))
}

fn render(generator: ProjectGenerator<'_>) -> anyhow::Result<(String, String)> {
    let name = generator.name().to_string();
    let document = generator
        .finish()
        .with_context(|| format!("finishing project `{name}`"))?;
    let contents = document
        .render()
        .with_context(|| format!("rendering project `{name}`"))?;
    Ok((name, contents))
}
