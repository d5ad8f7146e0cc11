use accessors_rs::Accessors;
use serde::{Deserialize, Serialize};

/// Names and tools used by the generated projects.
#[derive(Accessors, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[accessors(get)]
#[serde(default)]
pub struct XcodeOptions {
    /// Name of the `.xcworkspace` bundling both projects.
    pub(crate) workspace_name: String,

    /// Name of the project used for code indexing.
    pub(crate) sources_project_name: String,

    /// Name of the project with one buildable target per product.
    pub(crate) products_project_name: String,

    /// Tool run by the product targets.
    pub(crate) build_tool_path: String,

    /// Script handed to the build tool, relative to the build directory.
    pub(crate) build_script: String,
}

impl Default for XcodeOptions {
    fn default() -> Self {
        Self {
            workspace_name: "Workspace".to_string(),
            sources_project_name: "Sources".to_string(),
            products_project_name: "Products".to_string(),
            build_tool_path: "/usr/bin/python".to_string(),
            build_script: "invoke_ninja.py".to_string(),
        }
    }
}

impl XcodeOptions {
    pub fn with_workspace_name(mut self, name: impl Into<String>) -> Self {
        self.workspace_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::XcodeOptions;

    #[test]
    fn missing_fields_take_defaults() {
        let options: XcodeOptions =
            serde_json::from_str(r#"{ "workspace_name": "Chromium" }"#).unwrap();
        assert_eq!(options.workspace_name(), "Chromium");
        assert_eq!(options.sources_project_name(), "Sources");
        assert_eq!(options.build_tool_path(), "/usr/bin/python");
    }
}
