use std::collections::BTreeMap;

use accessors_rs::Accessors;
use serde::{Deserialize, Serialize};

use crate::{relative_path, Target};

/// The build graph: where it lives and the targets in it.
#[derive(Accessors, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[accessors(get)]
pub struct Project {
    /// Absolute path of the source root.
    pub(crate) root_path: String,

    /// Build directory as a source-absolute path ending in `/`, like `//out/Debug/`.
    pub(crate) build_dir: String,

    pub(crate) default_toolchain: String,

    /// Targets keyed by label.
    pub(crate) targets: BTreeMap<String, Target>,
}

impl Project {
    pub fn new(
        root_path: impl Into<String>,
        build_dir: impl Into<String>,
        default_toolchain: impl Into<String>,
    ) -> Self {
        Self {
            root_path: root_path.into(),
            build_dir: build_dir.into(),
            default_toolchain: default_toolchain.into(),
            targets: BTreeMap::new(),
        }
    }

    /// Add `target` under `label`, returning a target previously stored
    /// under the same label.
    pub fn add_target(&mut self, label: impl Into<String>, mut target: Target) -> Option<Target> {
        let label = label.into();
        target.label = label.clone();
        self.targets.insert(label, target)
    }

    pub fn target(&self, label: &str) -> Option<&Target> {
        self.targets.get(label)
    }

    /// Targets built with the default toolchain, in label order.
    pub fn default_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets
            .values()
            .filter(|target| target.toolchain == self.default_toolchain)
    }

    /// Turns a source-absolute path into a file system path.
    pub fn absolute_path(&self, path: &str) -> String {
        match path.strip_prefix("//") {
            Some(rest) => format!("{}/{rest}", self.root_path),
            None => path.to_string(),
        }
    }

    pub fn absolute_build_path(&self) -> String {
        self.absolute_path(&self.build_dir)
    }

    /// Source-absolute paths become relative to the build directory; other
    /// paths are returned as they are.
    pub fn relative_path(&self, path: &str) -> String {
        if path.starts_with("//") {
            relative_path(&self.absolute_path(path), &self.absolute_build_path())
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TargetType;

    fn project() -> Project {
        Project::new("/src/chromium", "//out/Debug/", "//build/toolchain/mac:clang_x64")
    }

    #[test]
    fn paths() {
        let project = project();
        assert_eq!(project.absolute_build_path(), "/src/chromium/out/Debug/");
        assert_eq!(project.absolute_path("//base/a.cc"), "/src/chromium/base/a.cc");
        assert_eq!(project.absolute_path("/usr/include"), "/usr/include");
        assert_eq!(project.relative_path("//"), "../..");
        assert_eq!(project.relative_path("//base/a.cc"), "../../base/a.cc");
        assert_eq!(project.relative_path("//out/Debug/gen"), "gen");
        assert_eq!(project.relative_path("//out/Debug/"), ".");
        assert_eq!(project.relative_path("/usr/include"), "/usr/include");
    }

    #[test]
    fn add_target_sets_label() {
        let mut project = project();
        let target = Target::new(TargetType::StaticLibrary, project.default_toolchain().clone());
        assert!(project.add_target("//base:base", target).is_none());

        let target = project.target("//base:base").unwrap();
        assert_eq!(target.label(), "//base:base");
        assert_eq!(target.obj_dir(&project), "//out/Debug/obj/base/");
        assert_eq!(target.output_dir(&project), "//out/Debug/");
    }

    #[test]
    fn default_targets_skip_other_toolchains() {
        let mut project = project();
        let default = project.default_toolchain().clone();
        project.add_target("//b:b", Target::new(TargetType::Executable, default.clone()));
        project.add_target("//a:a", Target::new(TargetType::Executable, default));
        project.add_target("//c:c", Target::new(TargetType::Executable, "//host:clang"));

        let labels: Vec<&str> = project
            .default_targets()
            .map(|target| target.label().as_str())
            .collect();
        assert_eq!(labels, ["//a:a", "//b:b"]);
    }
}
