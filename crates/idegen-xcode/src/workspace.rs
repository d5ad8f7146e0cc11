/// Contents of `contents.xcworkspacedata` for a workspace holding the
/// projects named in `projects`, in that order.
///
/// Xcode lists autogenerated schemes in project order, so callers put the
/// products project first.
pub fn workspace_contents<'a>(projects: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<Workspace version = \"1.0\">\n");
    for project in projects {
        out.push_str(&format!(
            "  <FileRef location = \"group:{project}.xcodeproj\"></FileRef>\n"
        ));
    }
    out.push_str("</Workspace>\n");
    out
}
