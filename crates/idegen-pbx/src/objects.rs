//! Constructors for the object classes a generated project is made of.
//!
//! Each constructor takes the hash parent that scopes the new object's id
//! and returns an unfrozen [`Node`] carrying the class's initial properties.

use std::collections::BTreeMap;

use crate::{HashSource, HashableChain, Isa, Node, Result, Value};

/// `buildActionMask` used by build phases (all actions).
pub const BUILD_ACTION_MASK: i64 = 2147483647;

/// Extension (lower-case, without dot) to Xcode file type.
const FILE_TYPES: &[(&str, &str)] = &[
    ("a", "archive.ar"),
    ("app", "wrapper.application"),
    ("bdic", "file"),
    ("bundle", "wrapper.cfbundle"),
    ("c", "sourcecode.c.c"),
    ("cc", "sourcecode.cpp.cpp"),
    ("cpp", "sourcecode.cpp.cpp"),
    ("css", "text.css"),
    ("cxx", "sourcecode.cpp.cpp"),
    ("dart", "sourcecode"),
    ("dylib", "compiled.mach-o.dylib"),
    ("framework", "wrapper.framework"),
    ("gn", "text.script.perl"),
    ("gni", "text.script.perl"),
    ("gyp", "sourcecode"),
    ("gypi", "sourcecode"),
    ("h", "sourcecode.c.h"),
    ("hxx", "sourcecode.cpp.h"),
    ("icns", "image.icns"),
    ("java", "sourcecode.java"),
    ("js", "sourcecode.javascript"),
    ("kext", "wrapper.kext"),
    ("m", "sourcecode.c.objc"),
    ("mm", "sourcecode.cpp.objcpp"),
    ("nib", "wrapper.nib"),
    ("o", "compiled.mach-o.objfile"),
    ("pdf", "image.pdf"),
    ("pl", "text.script.perl"),
    ("plist", "text.plist.xml"),
    ("pm", "text.script.perl"),
    ("png", "image.png"),
    ("py", "text.script.python"),
    ("r", "sourcecode.rez"),
    ("rez", "sourcecode.rez"),
    ("s", "sourcecode.asm"),
    ("storyboard", "file.storyboard"),
    ("strings", "text.plist.strings"),
    ("swift", "sourcecode.swift"),
    ("ttf", "file"),
    ("xcassets", "folder.assetcatalog"),
    ("xcconfig", "text.xcconfig"),
    ("xcdatamodel", "wrapper.xcdatamodel"),
    ("xcdatamodeld", "wrapper.xcdatamodeld"),
    ("xib", "file.xib"),
    ("y", "sourcecode.yacc"),
];

/// Lower-cased extension of `file_name`, without the dot. Leading dots do
/// not start an extension (`.gn` has none).
pub fn file_extension(file_name: &str) -> String {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let stem_start = base.len() - base.trim_start_matches('.').len();
    match base[stem_start..].rfind('.') {
        Some(dot) => base[stem_start + dot + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Xcode file type for an extension; unknown extensions are plain `text`.
pub fn file_type(extension: &str) -> &'static str {
    FILE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, file_type)| *file_type)
        .unwrap_or("text")
}

fn node(
    isa: Isa,
    name: Option<String>,
    parent: Option<&dyn HashSource>,
    extra_hashables: HashableChain,
    properties: impl IntoIterator<Item = (&'static str, Value)>,
) -> Node {
    let mut node = Node::with_extra_hashables(isa, name, parent, extra_hashables);
    node.properties_mut().extend(
        properties
            .into_iter()
            .map(|(key, value)| (key.to_string(), value)),
    );
    node
}

/// A file inside a group. With a `path`, `file_name` becomes the displayed
/// `name` and `path` is what Xcode resolves; the id follows the path.
pub fn file_reference(parent: &dyn HashSource, file_name: &str, path: Option<&str>) -> Node {
    let extension = file_extension(file_name);
    let file_type_key = match extension.as_str() {
        "gn" | "gni" => "explicitFileType",
        _ => "lastKnownFileType",
    };

    let mut properties = vec![
        ("sourceTree", Value::from("<group>")),
        (file_type_key, Value::from(file_type(&extension))),
    ];
    let path = match path {
        Some(path) => {
            properties.push(("name", Value::from(file_name)));
            path
        }
        None => file_name,
    };
    properties.push(("path", Value::from(path)));

    node(
        Isa::FileReference,
        Some(path.to_string()),
        Some(parent),
        HashableChain::new(),
        properties,
    )
}

/// Turn a file reference into the product of an executable target.
pub fn make_executable_product(file: &mut Node) -> Result<()> {
    file.set_property("lastKnownFileType", "compiled.mach-o.executable")?;
    file.set_property("sourceTree", "BUILT_PRODUCTS_DIR")
}

/// Turn a file reference into the product of an application bundle target.
pub fn make_app_bundle_product(file: &mut Node) -> Result<()> {
    file.remove_property("lastKnownFileType")?;
    file.set_property("explicitFileType", "wrapper.application")?;
    file.set_property("includeInIndex", 0)?;
    file.set_property("sourceTree", "BUILT_PRODUCTS_DIR")
}

/// Membership of `file` in the build `phase`.
///
/// The id takes in the full chains of both ends rather than their digests,
/// so it reflects their whole ancestry.
pub fn build_file(parent: &dyn HashSource, file: &Node, phase: &Node) -> Node {
    let mut extra = HashableChain::new();
    extra.extend_from(file.hashable_chain());
    extra.extend_from(phase.hashable_chain());

    let comment = format!(
        "{} in {}",
        file.name().unwrap_or_default(),
        phase.name().unwrap_or_default()
    );

    node(
        Isa::BuildFile,
        None,
        Some(parent),
        extra,
        [("fileRef", Value::from(file.reference()))],
    )
    .with_comment(comment)
}

pub fn sources_build_phase(parent: &dyn HashSource) -> Node {
    node(
        Isa::SourcesBuildPhase,
        Some("Sources".to_string()),
        Some(parent),
        HashableChain::new(),
        [
            ("buildActionMask", Value::Int(BUILD_ACTION_MASK)),
            ("files", Value::list()),
            ("runOnlyForDeploymentPostprocessing", Value::Int(0)),
        ],
    )
}

/// A group; `path` defaults to `name`. The path is part of the id, so two
/// groups named alike under the same parent stay distinct.
pub fn group(parent: &dyn HashSource, name: Option<&str>, path: Option<&str>) -> Node {
    let path = path.or(name);

    let mut extra = HashableChain::new();
    let mut properties = vec![
        ("children", Value::list()),
        ("sourceTree", Value::from("<group>")),
    ];
    if let Some(path) = path {
        extra.push(path);
        properties.push(("path", Value::from(path)));
    }
    if let Some(name) = name.filter(|name| Some(*name) != path) {
        properties.push(("name", Value::from(name)));
    }

    node(
        Isa::Group,
        name.map(str::to_string),
        Some(parent),
        extra,
        properties,
    )
}

pub fn native_target(
    parent: &dyn HashSource,
    name: &str,
    product_name: &str,
    product_type: &str,
) -> Node {
    node(
        Isa::NativeTarget,
        Some(name.to_string()),
        Some(parent),
        HashableChain::new(),
        [
            ("buildPhases", Value::list()),
            ("buildRules", Value::list()),
            ("name", Value::from(name)),
            ("productName", Value::from(product_name)),
            ("productType", Value::from(product_type)),
        ],
    )
}

/// A target that builds by running an external tool.
pub fn legacy_target(
    parent: &dyn HashSource,
    name: &str,
    build_tool_path: &str,
    build_arguments: &str,
    build_working_directory: &str,
) -> Node {
    node(
        Isa::LegacyTarget,
        Some(name.to_string()),
        Some(parent),
        HashableChain::new(),
        [
            ("buildArgumentsString", Value::from(build_arguments)),
            ("buildPhases", Value::list()),
            ("buildToolPath", Value::from(build_tool_path)),
            ("buildWorkingDirectory", Value::from(build_working_directory)),
            ("dependencies", Value::list()),
            ("name", Value::from(name)),
            ("passBuildSettingsInEnvironment", Value::Int(1)),
            ("productName", Value::from(name)),
        ],
    )
}

/// The project object. Always commented as `Project object`.
pub fn project(parent: &dyn HashSource, name: &str) -> Node {
    let attributes: BTreeMap<String, Value> = [
        ("BuildIndependentTargetsInParallel", Value::Bool(true)),
        ("LastUpgradeCheck", Value::from("0800")),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();

    node(
        Isa::Project,
        Some(name.to_string()),
        Some(parent),
        HashableChain::new(),
        [
            ("attributes", Value::Map(attributes)),
            ("compatibilityVersion", Value::from("Xcode 3.2")),
            ("developmentRegion", Value::from("English")),
            ("hasScannedForEncodings", Value::Int(1)),
            ("knownRegions", Value::from(vec!["en"])),
            ("projectDirPath", Value::from("")),
            ("projectRoot", Value::from("")),
            ("targets", Value::list()),
        ],
    )
    .with_comment("Project object")
}

pub fn build_configuration(parent: &dyn HashSource, name: &str) -> Node {
    node(
        Isa::BuildConfiguration,
        Some(name.to_string()),
        Some(parent),
        HashableChain::new(),
        [
            ("buildSettings", Value::map()),
            ("name", Value::from(name)),
        ],
    )
}

/// Configuration list of `owner` (a project or target).
pub fn configuration_list(parent: &dyn HashSource, owner: &Node) -> Node {
    let name = format!(
        "Build configuration list for {} \"{}\"",
        owner.isa(),
        owner.name().unwrap_or_default()
    );
    node(
        Isa::ConfigurationList,
        Some(name),
        Some(parent),
        HashableChain::new(),
        [("buildConfigurations", Value::list())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectPool;

    #[test]
    fn extensions() {
        assert_eq!(file_extension("main.c"), "c");
        assert_eq!(file_extension("Foo.MM"), "mm");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("BUILD.gn"), "gn");
        assert_eq!(file_extension(".gn"), "");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension("dir.d/file"), "");
    }

    #[test]
    fn file_types() {
        assert_eq!(file_type("cc"), "sourcecode.cpp.cpp");
        assert_eq!(file_type("unknown"), "text");
    }

    #[test]
    fn file_reference_properties() -> anyhow::Result<()> {
        let pool = ObjectPool::new();
        let file = file_reference(&pool, "main.c", None);
        assert_eq!(file.name(), Some("main.c"));
        assert_eq!(file.property("path")?.as_text(), Some("main.c"));
        assert!(!file.has_property("name"));
        assert_eq!(
            file.property("lastKnownFileType")?.as_text(),
            Some("sourcecode.c.c")
        );

        let file = file_reference(&pool, "BUILD.gn", Some("../../BUILD.gn"));
        assert_eq!(file.name(), Some("../../BUILD.gn"));
        assert_eq!(file.property("name")?.as_text(), Some("BUILD.gn"));
        assert_eq!(
            file.property("explicitFileType")?.as_text(),
            Some("text.script.perl")
        );
        assert!(!file.has_property("lastKnownFileType"));
        Ok(())
    }

    #[test]
    fn app_bundle_product() -> anyhow::Result<()> {
        let pool = ObjectPool::new();
        let mut file = file_reference(&pool, "Foo.app", None);
        make_app_bundle_product(&mut file)?;
        assert!(!file.has_property("lastKnownFileType"));
        assert_eq!(
            file.property("explicitFileType")?.as_text(),
            Some("wrapper.application")
        );
        assert_eq!(
            file.property("sourceTree")?.as_text(),
            Some("BUILT_PRODUCTS_DIR")
        );
        Ok(())
    }

    #[test]
    fn group_name_and_path() -> anyhow::Result<()> {
        let pool = ObjectPool::new();
        let same = group(&pool, Some("src"), None);
        assert_eq!(same.property("path")?.as_text(), Some("src"));
        assert!(!same.has_property("name"));

        let different = group(&pool, Some("src"), Some("../../src"));
        assert_eq!(different.property("name")?.as_text(), Some("src"));
        assert_ne!(same.id(), different.id());

        let main = group(&pool, None, None);
        assert!(!main.has_property("path"));
        assert_eq!(main.name(), None);
        Ok(())
    }

    #[test]
    fn build_file_comment() {
        let pool = ObjectPool::new();
        let target = native_target(&pool, "base", "base", "com.apple.product-type.library.static");
        let phase = sources_build_phase(&target);
        let file = file_reference(&pool, "main.c", None);
        let build_file = build_file(&phase, &file, &phase);
        assert_eq!(build_file.comment(), Some("main.c in Sources"));
        assert_eq!(build_file.name(), None);
    }

    #[test]
    fn configuration_list_name() {
        let pool = ObjectPool::new();
        let project = project(&pool, "Sources");
        let list = configuration_list(&pool, &project);
        assert_eq!(
            list.name(),
            Some("Build configuration list for PBXProject \"Sources\"")
        );
        assert_eq!(project.comment(), Some("Project object"));
    }
}
