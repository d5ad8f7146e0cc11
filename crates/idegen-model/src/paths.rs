use camino::{Utf8Component, Utf8Path};

/// Normalized components of `path`; `.` is dropped and `..` pops.
fn components(path: &str) -> Vec<&str> {
    let mut parts = vec![];
    for component in Utf8Path::new(path).components() {
        match component {
            Utf8Component::Normal(name) => parts.push(name),
            Utf8Component::ParentDir => {
                parts.pop();
            }
            Utf8Component::CurDir | Utf8Component::RootDir | Utf8Component::Prefix(_) => {}
        }
    }
    parts
}

/// `path` expressed relative to the directory `base`, both being absolute
/// (or both relative to the same directory). Returns `.` when they are equal.
pub fn relative_path(path: &str, base: &str) -> String {
    let path = components(path);
    let base = components(base);
    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let parts: Vec<&str> = std::iter::repeat("..")
        .take(base.len() - common)
        .chain(path[common..].iter().copied())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::relative_path;

    #[test]
    fn relative_paths() {
        assert_eq!(relative_path("/r/src/main.c", "/r/out/Debug/"), "../../src/main.c");
        assert_eq!(relative_path("/r/", "/r/out/Debug/"), "../..");
        assert_eq!(relative_path("/r/out/Debug", "/r/out/Debug/"), ".");
        assert_eq!(relative_path("/r/out/Debug/gen", "/r/out/Debug"), "gen");
        assert_eq!(relative_path("/r/./a/../b", "/r"), "b");
        assert_eq!(relative_path("/x/y", "/r/s"), "../../x/y");
    }
}
