use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{bail, Context};
use idegen_model::{Project, Target, TargetType};
use idegen_pbx::{objects, Document, HashSource, Node, Value};
use tracing::{debug, warn};

/// Extensions of sources the indexing targets compile.
const COMPILABLE_EXTENSIONS: &[&str] = &["c", "cc", "cxx", "cpp", "m", "mm"];

const STATIC_LIBRARY_PRODUCT_TYPE: &str = "com.apple.product-type.library.static";

const CONFIGURATION_NAME: &str = "Default";

const MAIN_GROUP: usize = 0;

/// A group still open for new children. Groups are inserted into the
/// object pool only once the generator is finished with them.
#[derive(Debug)]
struct OpenGroup {
    node: Node,
    children: HashMap<String, Child>,
}

#[derive(Copy, Clone, Debug)]
enum Child {
    Group(usize),
    File,
}

impl OpenGroup {
    fn new(node: Node) -> Self {
        Self {
            node,
            children: HashMap::new(),
        }
    }
}

/// Builds one Xcode project for a [`Project`].
///
/// The project object, its configuration and every group keep accepting
/// changes until [`ProjectGenerator::finish`] inserts them; everything
/// else is inserted as soon as it is complete.
#[derive(Debug)]
pub struct ProjectGenerator<'p> {
    definition: &'p Project,
    document: Document,
    project: Node,
    project_configuration: Node,
    groups: Vec<OpenGroup>,
    target_names: HashSet<String>,
}

impl<'p> ProjectGenerator<'p> {
    pub fn new(definition: &'p Project, name: &str) -> anyhow::Result<Self> {
        let mut document = Document::new();
        let pool = document.objects();

        let mut project = objects::project(pool, name);
        let (project_configuration_list, project_configuration) =
            default_configuration(pool, &project, true)?;
        let main_group = objects::group(pool, None, None);

        project.set_property("buildConfigurationList", project_configuration_list.reference())?;
        project.set_property("mainGroup", main_group.reference())?;
        project.set_property("productRefGroup", main_group.reference())?;

        document.objects_mut().insert(project_configuration_list)?;

        Ok(Self {
            definition,
            document,
            project,
            project_configuration,
            groups: vec![OpenGroup::new(main_group)],
            target_names: HashSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        self.project.name().unwrap_or_default()
    }

    /// Insert the objects held open and return the finished document.
    pub fn finish(mut self) -> anyhow::Result<Document> {
        let pool = self.document.objects_mut();
        for group in self.groups {
            pool.insert(group.node)?;
        }
        pool.insert(self.project_configuration)?;
        let root = pool.insert(self.project)?;
        self.document.set_root_object(root)?;
        Ok(self.document)
    }

    fn insert(&mut self, node: Node) -> anyhow::Result<()> {
        let isa = node.isa();
        let name = node.name().map(str::to_string);
        self.document
            .objects_mut()
            .insert(node)
            .with_context(|| format!("adding {isa} {name:?} to project `{}`", self.name()))?;
        Ok(())
    }

    /// The group for a source-absolute directory, creating missing groups
    /// along the way. The source root and the build directory map to the
    /// main group.
    fn group_for_path(&mut self, path: &str) -> anyhow::Result<usize> {
        if path == "//" || format!("{path}/") == *self.definition.build_dir() {
            return Ok(MAIN_GROUP);
        }
        let Some(relative) = path.strip_prefix("//") else {
            bail!("source directory `{path}` is not source-absolute");
        };

        let mut current = MAIN_GROUP;
        for segment in relative.split('/') {
            current = match self.groups[current].children.get(segment).copied() {
                Some(Child::Group(index)) => index,
                _ => self.add_group(current, segment)?,
            };
        }
        Ok(current)
    }

    fn add_group(&mut self, parent: usize, name: &str) -> anyhow::Result<usize> {
        // Top-level groups point at the source tree from the build directory.
        let path = (parent == MAIN_GROUP).then(|| self.source_root_path(name));

        let group = objects::group(&self.groups[parent].node, Some(name), path.as_deref());
        let index = self.groups.len();
        let parent = &mut self.groups[parent];
        parent.node.push_to_list("children", group.reference())?;
        parent.children.insert(name.to_string(), Child::Group(index));
        self.groups.push(OpenGroup::new(group));
        Ok(index)
    }

    /// `path`, relative to the source root, as seen from the build directory.
    fn source_root_path(&self, path: &str) -> String {
        format!("{}/{path}", self.definition.relative_path("//"))
    }

    /// Add `target` to the project and to the set of taken target names.
    fn add_target(&mut self, target: &Node) -> anyhow::Result<()> {
        self.target_names
            .insert(target.name().unwrap_or_default().to_string());
        self.project.push_to_list("targets", target.reference())?;
        Ok(())
    }

    // Indexing targets

    /// Add every source of the buildable default-toolchain targets, plus a
    /// static library target for each target that compiles any of them.
    pub fn generate_targets_for_indexing(&mut self) -> anyhow::Result<()> {
        self.project_configuration
            .insert_into_map("buildSettings", "USE_HEADERMAP", "NO")?;

        let definition = self.definition;
        let mut done_sources = HashSet::new();

        for target in definition.default_targets() {
            if !target.target_type().is_buildable() {
                continue;
            }

            let sources = target
                .sources()
                .iter()
                .chain(target.precompiled_header());

            let mut compilable = vec![];
            for source in sources {
                // Sources shared by several targets are indexed once.
                if !done_sources.insert(source.as_str()) {
                    continue;
                }
                if let Some(file) = self.add_source(source)? {
                    compilable.push(file);
                }
            }

            if compilable.is_empty() {
                debug!(label = %target.label(), "nothing to compile, skipping target");
                continue;
            }
            self.generate_indexing_target(target, &compilable)
                .with_context(|| format!("generating indexing target for `{}`", target.label()))?;
        }
        Ok(())
    }

    /// File reference for `source` inside its directory's group. Returns the
    /// reference if it is new and compilable.
    fn add_source(&mut self, source: &str) -> anyhow::Result<Option<Node>> {
        let (directory, file_name) = split_path(source);
        let group = self.group_for_path(directory)?;

        // The source root and the build directory share the main group, so
        // its files are keyed by path rather than by name.
        let path = match (group, source.strip_prefix("//")) {
            (MAIN_GROUP, Some(relative)) => Some(self.source_root_path(relative)),
            _ => None,
        };
        let key = path.as_deref().unwrap_or(file_name);
        if self.groups[group].children.contains_key(key) {
            return Ok(None);
        }
        let key = key.to_string();
        let file = objects::file_reference(&self.groups[group].node, file_name, path.as_deref());

        let open = &mut self.groups[group];
        open.node.push_to_list("children", file.reference())?;
        open.children.insert(key, Child::File);

        let extension = objects::file_extension(file_name);
        let compilable = COMPILABLE_EXTENSIONS.contains(&extension.as_str());

        // Build files need the whole reference, so compilable ones are
        // handed back and a copy goes into the pool.
        let copy = compilable.then(|| file.clone());
        self.insert(file)?;
        Ok(copy)
    }

    fn generate_indexing_target(&mut self, target: &Target, compilable: &[Node]) -> anyhow::Result<()> {
        let name = target.label().strip_prefix("//").unwrap_or(target.label());
        let product_name = name.replace(['/', ':'], "_");
        debug!(%name, files = compilable.len(), "adding indexing target");

        let pool = self.document.objects();
        let mut native_target =
            objects::native_target(pool, name, &product_name, STATIC_LIBRARY_PRODUCT_TYPE);

        let mut sources_phase = objects::sources_build_phase(&native_target);
        let mut build_files = vec![];
        for file in compilable {
            let build_file = objects::build_file(&sources_phase, file, &sources_phase);
            sources_phase.push_to_list("files", build_file.reference())?;
            build_files.push(build_file);
        }
        native_target.push_to_list("buildPhases", sources_phase.reference())?;

        let (configuration_list, mut configuration) =
            default_configuration(&native_target, &native_target, false)?;
        native_target.set_property("buildConfigurationList", configuration_list.reference())?;

        for (key, value) in self.indexing_settings(target, &product_name) {
            configuration.insert_into_map("buildSettings", key, value)?;
        }

        self.add_target(&native_target)?;
        for node in build_files {
            self.insert(node)?;
        }
        self.insert(sources_phase)?;
        self.insert(configuration)?;
        self.insert(configuration_list)?;
        self.insert(native_target)
    }

    fn indexing_settings(&self, target: &Target, product_name: &str) -> BTreeMap<&'static str, Value> {
        let header_search_paths: Vec<String> = target
            .include_dirs()
            .iter()
            .map(|dir| self.definition.relative_path(dir))
            .collect();

        let mut settings = BTreeMap::from([
            ("HEADER_SEARCH_PATHS", Value::from(header_search_paths)),
            ("GCC_PREPROCESSOR_DEFINITIONS", Value::from(target.defines().clone())),
            ("PRODUCT_NAME", Value::from(product_name)),
            ("COMBINE_HIDPI_IMAGES", Value::from("YES")),
        ]);

        let c_flags = [target.cflags_c(), target.cflags_objc(), target.cflags()];
        if let Some(dialect) = language_standard(c_flags, false) {
            settings.insert("GCC_C_LANGUAGE_STANDARD", Value::from(dialect));
        }
        let cxx_flags = [target.cflags_cc(), target.cflags_objcc(), target.cflags()];
        if let Some(dialect) = language_standard(cxx_flags, true) {
            settings.insert("CLANG_CXX_LANGUAGE_STANDARD", Value::from(dialect));
        }

        if let Some(header) = target.precompiled_header() {
            settings.extend([
                ("GCC_PREFIX_HEADER", Value::from(self.definition.relative_path(header))),
                ("GCC_PRECOMPILE_PREFIX_HEADER", Value::from("YES")),
                // Lets targets share precompiled headers.
                ("GCC_INCREASE_PRECOMPILED_HEADER_SHARING", Value::from("YES")),
                ("PRECOMPS_INCLUDE_HEADERS_FROM_BUILT_PRODUCTS_DIR", Value::from("NO")),
            ]);
        }
        settings
    }

    // Product targets

    /// One target per executable and application bundle, building it by
    /// running `build_script` through `build_tool_path`.
    pub fn generate_targets_for_products(
        &mut self,
        build_tool_path: &str,
        build_script: &str,
    ) -> anyhow::Result<()> {
        let definition = self.definition;
        let tool = ProductTool {
            path: build_tool_path,
            script: build_script,
        };

        for target in definition.default_targets() {
            let label = target.label();
            if *target.target_type() == TargetType::Executable {
                // Executables that end up in a bundle are built through it.
                if self.is_bundled(label) {
                    debug!(%label, "executable is bundled, skipping");
                    continue;
                }
                let output_dir = target.output_dir(definition);
                self.generate_product_target(&tool, label, &target.output_name(), output_dir, false)?;
            } else if target.is_application_bundle() {
                let Some(root_dir) = target
                    .bundle_data()
                    .as_ref()
                    .and_then(|data| data.root_dir_output().as_deref())
                else {
                    warn!(%label, "application bundle without `root_dir_output`, skipping");
                    continue;
                };
                let (app_dir, app_name) = split_path(root_dir);
                self.generate_product_target(&tool, label, app_name, app_dir, true)?;
            }
        }
        Ok(())
    }

    /// True if a `bundle_data` target depends on `label` directly.
    fn is_bundled(&self, label: &str) -> bool {
        self.definition
            .targets()
            .values()
            .any(|target| *target.target_type() == TargetType::BundleData && target.depends_on(label))
    }

    fn generate_product_target(
        &mut self,
        tool: &ProductTool<'_>,
        label: &str,
        output_name: &str,
        output_dir: &str,
        is_bundle: bool,
    ) -> anyhow::Result<()> {
        // The output name is shorter, as long as no other target has it.
        let name = if self.target_names.contains(output_name) {
            label.strip_prefix("//").unwrap_or(label)
        } else {
            output_name
        };
        debug!(%label, %name, "adding product target");

        let mut legacy_target = objects::legacy_target(
            self.document.objects(),
            name,
            tool.path,
            &format!("{} {label} $(ACTION)", tool.script),
            "$(PROJECT_DIR)",
        );

        let (configuration_list, mut configuration) =
            default_configuration(&legacy_target, &legacy_target, false)?;
        legacy_target.set_property("buildConfigurationList", configuration_list.reference())?;

        let build_dir = match self.definition.relative_path(output_dir).as_str() {
            "" | "." => "$(PROJECT_DIR)".to_string(),
            relative => format!("$(PROJECT_DIR)/{relative}"),
        };
        configuration.insert_into_map("buildSettings", "CONFIGURATION_BUILD_DIR", build_dir)?;
        configuration.insert_into_map("buildSettings", "PRODUCT_NAME", output_name)?;

        let mut product = objects::file_reference(&legacy_target, output_name, None);
        if is_bundle {
            objects::make_app_bundle_product(&mut product)?;
        } else {
            objects::make_executable_product(&mut product)?;
        }
        legacy_target.set_property("productReference", product.reference())?;

        let main_group = &mut self.groups[MAIN_GROUP];
        main_group.node.push_to_list("children", product.reference())?;
        main_group.children.insert(output_name.to_string(), Child::File);

        self.add_target(&legacy_target)
            .with_context(|| format!("adding product target for `{label}`"))?;
        self.insert(product)?;
        self.insert(configuration)?;
        self.insert(configuration_list)?;
        self.insert(legacy_target)
    }
}

struct ProductTool<'a> {
    path: &'a str,
    script: &'a str,
}

/// A configuration list for `owner` holding a single `Default`
/// configuration. Both are returned unfrozen.
fn default_configuration(
    parent: &dyn HashSource,
    owner: &Node,
    visible: bool,
) -> idegen_pbx::Result<(Node, Node)> {
    let mut list = objects::configuration_list(parent, owner);
    let configuration = objects::build_configuration(&list, CONFIGURATION_NAME);
    list.push_to_list("buildConfigurations", configuration.reference())?;
    list.set_property("defaultConfigurationIsVisible", i64::from(visible))?;
    list.set_property("defaultConfigurationName", CONFIGURATION_NAME)?;
    Ok((list, configuration))
}

/// The value of the first `-std=` flag of the first flag set that names a
/// dialect of the wanted language. C++ dialects contain a `+`, C ones don't.
fn language_standard<'a>(flag_sets: [&'a Vec<String>; 3], cxx: bool) -> Option<&'a str> {
    flag_sets.into_iter().find_map(|flags| {
        let dialect = flags.iter().find_map(|flag| flag.strip_prefix("-std="))?;
        (dialect.contains('+') == cxx).then_some(dialect)
    })
}

/// Split at the last `/` into directory and file name. A directory made
/// only of slashes keeps them, so `//main.c` gives `//`.
fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(slash) => {
            let head = &path[..=slash];
            let trimmed = head.trim_end_matches('/');
            let directory = if trimmed.is_empty() { head } else { trimmed };
            (directory, &path[slash + 1..])
        }
        None => ("", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(flags: &[&str]) -> Vec<String> {
        flags.iter().map(|flag| flag.to_string()).collect()
    }

    #[test]
    fn splits_paths() {
        assert_eq!(split_path("//base/files/a.cc"), ("//base/files", "a.cc"));
        assert_eq!(split_path("//main.c"), ("//", "main.c"));
        assert_eq!(split_path("//out/Debug/args.gn"), ("//out/Debug", "args.gn"));
        assert_eq!(split_path("main.c"), ("", "main.c"));
    }

    #[test]
    fn picks_language_standards() {
        let c = flags(&["-Wall", "-std=c11"]);
        let cc = flags(&["-std=c++17"]);
        let common = flags(&["-std=gnu99"]);
        let empty = vec![];

        assert_eq!(language_standard([&c, &empty, &common], false), Some("c11"));
        assert_eq!(language_standard([&cc, &empty, &common], true), Some("c++17"));
        // A C++ dialect in the C flags is skipped.
        assert_eq!(language_standard([&cc, &empty, &common], false), Some("gnu99"));
        assert_eq!(language_standard([&c, &empty, &common], true), None);
        assert_eq!(language_standard([&empty, &empty, &empty], false), None);
    }
}
