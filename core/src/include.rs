//! Include statements: resolving aliases and module paths, listing
//! includable declarations and rendering new include lines.

use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::Regex;

static PROCESS_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^process +(\w+) *\{\s*$").expect("valid regex"));

static FUNCTION_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^def +(\w+) *\([^)]*\) *\{\s*$").expect("valid regex"));

/// Map an alias introduced by `include { ORIG as NAME }` back to `ORIG`.
///
/// Names without an alias are returned unchanged.
pub fn resolve_alias(text: &str, name: &str) -> String {
    let pattern = format!(r"(\w+)\s+as\s+{}\b", regex::escape(name));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// The module path of the first `include { ... name ... } from '<path>'` line.
pub fn find_include_path(text: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"(?m)^include\s*\{{[^}}]*\b{}\b[^}}]*\}}\s*from\s*['"]([^'"]+)['"]"#,
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(text)?;
    caps.get(1).map(|m| m.as_str().to_string())
}

/// Resolve an include path against the including script's directory.
///
/// Include paths usually omit the `.nf` extension.
pub fn include_target(script_dir: &Path, include_path: &str) -> std::path::PathBuf {
    let mut target = script_dir.join(include_path);
    if target.extension().map_or(true, |ext| ext != "nf") {
        target.as_mut_os_string().push(".nf");
    }
    target
}

/// Strip leading `./` and `../` components so the path can be matched as a
/// suffix of workspace files.
pub fn include_suffix(include_path: &str) -> std::path::PathBuf {
    let mut suffix: std::path::PathBuf = Path::new(include_path)
        .components()
        .skip_while(|c| matches!(c, Component::CurDir | Component::ParentDir))
        .collect();
    if suffix.extension().map_or(true, |ext| ext != "nf") {
        suffix.as_mut_os_string().push(".nf");
    }
    suffix
}

/// Names of top-level `process NAME {` declarations.
pub fn find_processes(text: &str) -> Vec<String> {
    PROCESS_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Names of top-level `def NAME(...) {` function declarations.
pub fn find_functions(text: &str) -> Vec<String> {
    FUNCTION_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Path to `module` as written in an include statement of `script`:
/// `./` for modules under the script's directory, otherwise one `../` per
/// directory climbed. The extension is dropped.
pub fn relative_include_path(script: &Path, module: &Path) -> String {
    let module = module.with_extension("");
    for (climbed, parent) in script.ancestors().skip(1).enumerate() {
        let Ok(rel) = module.strip_prefix(parent) else {
            continue;
        };
        let rel = slash_path(rel);
        return if climbed == 0 {
            format!("./{rel}")
        } else {
            format!("{}{rel}", "../".repeat(climbed))
        };
    }
    slash_path(&module)
}

/// `include { NAME } from '<path>' addParams( options: modules['name'] )`
pub fn include_process_statement(process: &str, script: &Path, module: &Path) -> String {
    format!(
        "include {{ {process} }} from '{}' addParams( options: modules['{}'] )",
        relative_include_path(script, module),
        process.to_lowercase()
    )
}

/// `include { f; g } from '<path>'`
pub fn include_functions_statement(functions: &[String], script: &Path, module: &Path) -> String {
    format!(
        "include {{ {} }} from '{}'",
        functions.join("; "),
        relative_include_path(script, module)
    )
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
