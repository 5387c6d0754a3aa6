use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::error::SourceError;

static INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*#include\s+"(.*)""#).unwrap());

/// A shader source file with every `#include` recursively inlined.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct FlattenedSource {
    /// Lines of the root file with include directives replaced by the included text.
    pub lines: Vec<String>,
    /// Every file pulled in transitively, in first use order.
    pub includes: Vec<PathBuf>,
}

/// Read `path` and recursively inline `#include "file"` directives.
///
/// Includes resolve relative to the directory of the including file.
/// The same header may be inlined more than once on disjoint include paths,
/// but a file including itself transitively is an error.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<FlattenedSource, SourceError> {
    let mut source = FlattenedSource::default();
    let mut stack = Vec::new();
    flatten(path.as_ref(), &mut source, &mut stack)?;
    Ok(source)
}

fn flatten(
    path: &Path,
    source: &mut FlattenedSource,
    stack: &mut Vec<PathBuf>,
) -> Result<(), SourceError> {
    if stack.iter().any(|p| p == path) {
        return Err(SourceError::CircularInclude {
            path: path.to_owned(),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.to_owned(),
        source: e,
    })?;

    stack.push(path.to_owned());
    for line in text.lines() {
        match INCLUDE.captures(line) {
            Some(captures) => {
                let include = path
                    .parent()
                    .unwrap_or(Path::new(""))
                    .join(&captures[1]);
                if !source.includes.contains(&include) {
                    source.includes.push(include.clone());
                }
                flatten(&include, source, stack)?;
            }
            None => source.lines.push(line.to_string()),
        }
    }
    stack.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn flatten_nested_includes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("common")).unwrap();
        std::fs::write(
            dir.path().join("water_ps20.fxc"),
            indoc! {r#"
                // water
                #include "common/base.h"
                float4 main() : COLOR
            "#},
        )
        .unwrap();
        std::fs::write(
            dir.path().join("common/base.h"),
            indoc! {r#"
                #include "macros.h"
                #define BASE 1
            "#},
        )
        .unwrap();
        std::fs::write(dir.path().join("common/macros.h"), "#define PI 3.14\n").unwrap();

        let source = read_source(dir.path().join("water_ps20.fxc")).unwrap();
        assert_eq!(
            indoc! {"
                // water
                #define PI 3.14
                #define BASE 1
                float4 main() : COLOR
            "},
            source.lines.join("\n") + "\n"
        );
        assert_eq!(
            vec![
                dir.path().join("common/base.h"),
                dir.path().join("common/macros.h")
            ],
            source.includes
        );
    }

    #[test]
    fn diamond_includes_inline_twice_but_list_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("root.fxc"),
            "#include \"a.h\"\n#include \"b.h\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.h"), "#include \"shared.h\"\n").unwrap();
        std::fs::write(dir.path().join("b.h"), "#include \"shared.h\"\n").unwrap();
        std::fs::write(dir.path().join("shared.h"), "#define SHARED 1\n").unwrap();

        let source = read_source(dir.path().join("root.fxc")).unwrap();
        assert_eq!(vec!["#define SHARED 1", "#define SHARED 1"], source.lines);
        assert_eq!(
            vec![
                dir.path().join("a.h"),
                dir.path().join("shared.h"),
                dir.path().join("b.h")
            ],
            source.includes
        );
    }

    #[test]
    fn recursive_include_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fxc"), "#include \"b.h\"\n").unwrap();
        std::fs::write(dir.path().join("b.h"), "#include \"a.fxc\"\n").unwrap();

        let result = read_source(dir.path().join("a.fxc"));
        assert!(matches!(
            result,
            Err(SourceError::CircularInclude { path }) if path == dir.path().join("a.fxc")
        ));
    }

    #[test]
    fn missing_include_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fxc"), "#include \"missing.h\"\n").unwrap();

        let result = read_source(dir.path().join("a.fxc"));
        assert!(matches!(
            result,
            Err(SourceError::Io { path, .. }) if path == dir.path().join("missing.h")
        ));
    }
}
