use idegen_model::{Project, Target, TargetType};
use serde_json::json;

#[test]
fn target_from_description() -> anyhow::Result<()> {
    let target: Target = serde_json::from_value(json!({
        "type": "create_bundle",
        "toolchain": "//build/toolchain/mac:clang_x64",
        "sources": ["//app/main.mm"],
        "deps": ["//app:app_executable"],
        "output_name": "Shell",
        "bundle_data": {
            "product_type": "com.apple.product-type.application",
            "root_dir_output": "//out/Debug/Shell.app"
        },
        "unrelated": true
    }))?;

    assert_eq!(*target.target_type(), TargetType::CreateBundle);
    assert_eq!(target.sources(), &["//app/main.mm"]);
    assert!(target.depends_on("//app:app_executable"));
    assert!(target.is_application_bundle());
    assert_eq!(target.output_name(), "Shell");
    assert!(target.cflags().is_empty());
    assert!(target.precompiled_header().is_none());
    Ok(())
}

#[test]
fn missing_type_is_rejected() {
    let result: Result<Target, _> = serde_json::from_value(json!({
        "toolchain": "//build/toolchain/mac:clang_x64",
    }));
    assert!(result.is_err());
}

#[test]
fn project_owns_targets() -> anyhow::Result<()> {
    let mut project = Project::new("/work/src", "//out/Release/", "//tc:default");
    let target: Target = serde_json::from_value(json!({
        "type": "shared_library",
        "toolchain": "//tc:default",
        "output_dir": "//out/Release/lib",
        "output_extension": "dylib",
    }))?;
    project.add_target("//net:net", target);

    let target = project.target("//net:net").expect("added");
    assert_eq!(target.label(), "//net:net");
    assert_eq!(target.output_name(), "net.dylib");
    assert_eq!(target.output_dir(&project), "//out/Release/lib");
    assert_eq!(project.relative_path(target.output_dir(&project)), "lib");
    Ok(())
}
