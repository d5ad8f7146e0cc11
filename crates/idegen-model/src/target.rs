use std::collections::BTreeMap;

use accessors_rs::Accessors;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::Project;

/// Kind of a GN target, as spelled in the `type` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[default]
    Unknown,
    Group,
    Executable,
    LoadableModule,
    SharedLibrary,
    StaticLibrary,
    SourceSet,
    Copy,
    Action,
    ActionForeach,
    BundleData,
    CreateBundle,
    BuildDir,
}

impl TargetType {
    /// Targets whose sources get compiled.
    pub fn is_buildable(self) -> bool {
        matches!(
            self,
            TargetType::Executable
                | TargetType::StaticLibrary
                | TargetType::SharedLibrary
                | TargetType::LoadableModule
                | TargetType::SourceSet
                | TargetType::BuildDir
        )
    }
}

/// Bundle description of a `create_bundle` target.
#[derive(Accessors, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[accessors(get)]
#[serde(default)]
pub struct BundleData {
    pub(crate) product_type: Option<String>,
    pub(crate) root_dir_output: Option<String>,
}

/// A single target of the build graph.
///
/// Paths starting with `//` are relative to the source root.
#[derive(Accessors, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[accessors(get)]
pub struct Target {
    /// Label such as `//base:base`; set when the target is added to a project.
    #[serde(skip)]
    pub(crate) label: String,

    #[serde(rename = "type")]
    pub(crate) target_type: TargetType,

    pub(crate) toolchain: String,

    #[serde(default)]
    pub(crate) sources: Vec<String>,

    #[serde(default)]
    pub(crate) inputs: Vec<String>,

    #[serde(default)]
    pub(crate) arflags: Vec<String>,

    #[serde(default)]
    pub(crate) asmflags: Vec<String>,

    #[serde(default)]
    pub(crate) cflags: Vec<String>,

    #[serde(default)]
    pub(crate) cflags_c: Vec<String>,

    #[serde(default)]
    pub(crate) cflags_cc: Vec<String>,

    #[serde(default)]
    pub(crate) cflags_objc: Vec<String>,

    #[serde(default)]
    pub(crate) cflags_objcc: Vec<String>,

    #[serde(default)]
    pub(crate) defines: Vec<String>,

    #[serde(default)]
    pub(crate) include_dirs: Vec<String>,

    #[serde(default)]
    pub(crate) ldflags: Vec<String>,

    #[serde(default)]
    pub(crate) lib_dirs: Vec<String>,

    #[serde(default)]
    pub(crate) libs: Vec<String>,

    /// Labels of the targets this one depends on.
    #[serde(default)]
    pub(crate) deps: Vec<String>,

    #[serde(default)]
    pub(crate) precompiled_header: Option<String>,

    #[serde(default)]
    pub(crate) precompiled_source: Option<String>,

    #[serde(default)]
    pub(crate) outputs: Vec<String>,

    /// `output_dir` as written in the build files; see [`Target::output_dir`].
    #[serde(default, rename = "output_dir")]
    pub(crate) explicit_output_dir: Option<String>,

    /// `output_name` as written in the build files; see [`Target::output_name`].
    #[serde(default, rename = "output_name")]
    pub(crate) explicit_output_name: Option<String>,

    #[serde(default)]
    pub(crate) output_extension: Option<String>,

    #[serde(default)]
    pub(crate) bundle_data: Option<BundleData>,

    #[serde(default)]
    pub(crate) source_outputs: BTreeMap<String, Vec<String>>,
}

impl Target {
    /// An empty target of the given type.
    pub fn new(target_type: TargetType, toolchain: impl Into<String>) -> Self {
        Self {
            label: String::new(),
            target_type,
            toolchain: toolchain.into(),
            sources: vec![],
            inputs: vec![],
            arflags: vec![],
            asmflags: vec![],
            cflags: vec![],
            cflags_c: vec![],
            cflags_cc: vec![],
            cflags_objc: vec![],
            cflags_objcc: vec![],
            defines: vec![],
            include_dirs: vec![],
            ldflags: vec![],
            lib_dirs: vec![],
            libs: vec![],
            deps: vec![],
            precompiled_header: None,
            precompiled_source: None,
            outputs: vec![],
            explicit_output_dir: None,
            explicit_output_name: None,
            output_extension: None,
            bundle_data: None,
            source_outputs: BTreeMap::new(),
        }
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deps(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Name part of the label: `//base:base_unittests` gives `base_unittests`.
    pub fn base_name(&self) -> &str {
        let name = self.label.rsplit('/').next().unwrap_or(&self.label);
        name.rsplit(':').next().unwrap_or(name)
    }

    /// Directory part of the label, ending in `/`.
    pub fn source_dir(&self) -> String {
        let dir = match self.label.rfind(':') {
            Some(colon) => &self.label[..colon],
            None => self.label.as_str(),
        };
        if dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{dir}/")
        }
    }

    /// Directory for this target's intermediate files.
    pub fn obj_dir(&self, project: &Project) -> String {
        let source_dir = self.source_dir();
        let source_dir = source_dir.strip_prefix("//").unwrap_or(&source_dir);
        format!("{}obj/{source_dir}", project.build_dir())
    }

    /// File name of the linked product.
    ///
    /// Uses `output_name` or else the base name; `output_extension`, when
    /// given, replaces the extension (an empty one removes it).
    pub fn output_name(&self) -> String {
        let name = match &self.explicit_output_name {
            Some(name) => name.as_str(),
            None => self.base_name(),
        };
        let Some(extension) = &self.output_extension else {
            return name.to_string();
        };

        let stem = match Utf8Path::new(name).extension() {
            Some(current) => &name[..name.len() - current.len() - 1],
            None => name,
        };
        if extension.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}.{extension}")
        }
    }

    /// Directory the product lands in.
    pub fn output_dir<'a>(&'a self, project: &'a Project) -> &'a str {
        self.explicit_output_dir
            .as_deref()
            .unwrap_or(project.build_dir().as_str())
    }

    /// True if `label` is one of this target's direct dependencies.
    pub fn depends_on(&self, label: &str) -> bool {
        self.deps.iter().any(|dep| dep == label)
    }

    /// True for `create_bundle` targets producing an application.
    pub fn is_application_bundle(&self) -> bool {
        self.target_type == TargetType::CreateBundle
            && self
                .bundle_data
                .as_ref()
                .and_then(|data| data.product_type.as_deref())
                == Some("com.apple.product-type.application")
    }
}
