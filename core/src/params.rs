//! Pipeline parameters: defaults from `nextflow.config` and documentation
//! from `nextflow_schema.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ScanError, ScanResult};

static PARAMS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^params\s*\{[^\n]*\n").expect("valid regex"));

static PARAM_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)\s*=\s*(\S+).*$").expect("valid regex"));

static DOTTED_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*params\.(\w+)\s*=\s*(\S+)").expect("valid regex"));

/// A parameter and its default as written in the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub default: String,
}

impl Param {
    fn new(name: &str, default: &str) -> Self {
        Self {
            name: name.to_string(),
            default: default.to_string(),
        }
    }
}

/// Parameters assigned in the config's `params { }` block, followed by any
/// `params.name = value` assignments.
///
/// Returns `None` when the config declares no parameters in either form.
/// Assignments inside nested blocks of `params` are skipped.
pub fn params_list(config: &str) -> Option<Vec<Param>> {
    let mut params = Vec::new();
    let block = PARAMS_BLOCK.find(config);

    if let Some(block) = block {
        let mut depth = 1usize;
        for line in config[block.end()..].lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if line.starts_with('}') {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                continue;
            }
            if depth == 1 {
                if let Some(caps) = PARAM_VALUE.captures(line) {
                    params.push(Param::new(&caps[1], &caps[2]));
                    continue;
                }
            }
            if line.ends_with('{') {
                depth += 1;
            }
        }
    }

    params.extend(
        DOTTED_PARAM
            .captures_iter(config)
            .map(|caps| Param::new(&caps[1], &caps[2])),
    );

    if block.is_none() && params.is_empty() {
        None
    } else {
        Some(params)
    }
}

/// Documentation for one parameter in the JSON schema
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParamInfo {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(rename = "enum", default)]
    pub variants: Option<Vec<Value>>,
    #[serde(default)]
    pub help_text: Option<String>,
}

impl ParamInfo {
    /// Markdown rendering used by hover popups
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(self.description.as_deref().unwrap_or("N/A"));
        out.push_str(&format!(
            "\n\n**Type:** `{}`",
            self.kind.as_deref().unwrap_or("string")
        ));
        let default = self
            .default
            .as_ref()
            .map(display_value)
            .unwrap_or_else(|| "?".to_string());
        out.push_str(&format!("\n\n**Default:** `{default}`"));
        if let Some(pattern) = &self.pattern {
            out.push_str(&format!("\n\n**Pattern:** `{pattern}`"));
        }
        if let Some(variants) = &self.variants {
            let mut variants: Vec<String> = variants.iter().map(display_value).collect();
            variants.sort();
            out.push_str(&format!("\n\n**Enum:** {}", variants.join(", ")));
        }
        if let Some(help) = &self.help_text {
            out.push_str(&format!("\n\n*{help}*"));
        }
        out
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaGroup {
    #[serde(default)]
    properties: BTreeMap<String, ParamInfo>,
}

/// An nf-core style `nextflow_schema.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamSchema {
    #[serde(default, alias = "$defs")]
    definitions: BTreeMap<String, SchemaGroup>,
    #[serde(default)]
    properties: BTreeMap<String, ParamInfo>,
}

impl ParamSchema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> ScanResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Self::from_json(&json).map_err(|source| ScanError::Schema {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look a parameter up across every definition group, then top level.
    pub fn param_info(&self, name: &str) -> Option<&ParamInfo> {
        self.definitions
            .values()
            .find_map(|group| group.properties.get(name))
            .or_else(|| self.properties.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
// Global default params
params {
    // Input options
    input                      = null
    outdir                     = './results'
    genomes {
        GRCh38 = 'x'
    }
    max_memory                 = '128.GB'

    skip_fastqc = false
}

process {
    cpus = 1
}

params.extra_flag = true
"#;

    const SCHEMA: &str = r#"{
        "definitions": {
            "input_output_options": {
                "properties": {
                    "outdir": {
                        "type": "string",
                        "description": "The output directory.",
                        "default": "./results",
                        "help_text": "Use absolute paths on cloud infrastructure."
                    }
                }
            },
            "reference_genome_options": {
                "properties": {
                    "aligner": {
                        "type": "string",
                        "default": "star",
                        "enum": ["star", "hisat2", "bowtie2"],
                        "pattern": "^\\w+$"
                    },
                    "max_cpus": { "type": "integer", "default": 16 }
                }
            }
        }
    }"#;

    #[test]
    fn test_params_list() {
        let params = params_list(CONFIG).unwrap();
        let pairs: Vec<_> = params
            .iter()
            .map(|p| (p.name.as_str(), p.default.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("input", "null"),
                ("outdir", "'./results'"),
                ("max_memory", "'128.GB'"),
                ("skip_fastqc", "false"),
                ("extra_flag", "true"),
            ]
        );
    }

    #[test]
    fn test_params_list_without_params() {
        assert_eq!(params_list("process {\n  cpus = 1\n}\n"), None);
    }

    #[test]
    fn test_params_list_empty_block() {
        assert_eq!(params_list("params {\n}\n"), Some(vec![]));
    }

    #[test]
    fn test_schema_lookup() {
        let schema = ParamSchema::from_json(SCHEMA).unwrap();
        let outdir = schema.param_info("outdir").unwrap();
        assert_eq!(outdir.description.as_deref(), Some("The output directory."));
        assert!(schema.param_info("aligner").is_some());
        assert!(schema.param_info("missing").is_none());
    }

    #[test]
    fn test_schema_with_defs_key() {
        let json = r#"{"$defs": {"g": {"properties": {"a": {"type": "boolean"}}}}}"#;
        let schema = ParamSchema::from_json(json).unwrap();
        assert_eq!(schema.param_info("a").unwrap().kind.as_deref(), Some("boolean"));
    }

    #[test]
    fn test_param_markdown() {
        let schema = ParamSchema::from_json(SCHEMA).unwrap();
        let text = schema.param_info("aligner").unwrap().to_markdown();
        assert!(text.starts_with("N/A"));
        assert!(text.contains("**Default:** `star`"));
        assert!(text.contains("**Enum:** bowtie2, hisat2, star"));
        assert!(text.contains("**Pattern:** `^\\w+$`"));

        let text = schema.param_info("max_cpus").unwrap().to_markdown();
        assert!(text.contains("**Type:** `integer`"));
        assert!(text.contains("**Default:** `16`"));

        let text = schema.param_info("outdir").unwrap().to_markdown();
        assert!(text.contains("*Use absolute paths on cloud infrastructure.*"));
    }

    #[test]
    fn test_load_invalid_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nextflow_schema.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ParamSchema::load(&path), Err(ScanError::Schema { .. })));
    }
}
