
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use nfscope_core::config::{load_defaults, IndexConfig};
use nfscope_core::Workspace;
use tempfile::TempDir;
use tower_lsp::lsp_types::Position;

use crate::context::CursorContext;
use crate::indexes::Indexes;
use crate::providers::ProviderRegistry;

const FASTQC: &str = r#"process FASTQC {
    label 'process_low'

    input:
    tuple val(meta), path(reads)

    output:
    tuple val(meta), path("*.html"), emit: html
    tuple val(meta), path("*.zip") , emit: zip

    script:
    """
    fastqc $reads
    """
}
"#;

const QC: &str = r#"include { FASTQC } from '../modules/local/fastqc'

workflow QC {
    take:
    reads

    main:
    FASTQC(reads)

    emit:
    html = FASTQC.out.html
}
"#;

const NEXTFLOW_CONFIG: &str = r#"params {
    input  = null
    outdir = './results'
}

process {
    withLabel: 'process_low' {
        cpus   = 2
        memory = 4.GB
    }
}
"#;

const SCHEMA: &str = r#"{
  "$defs": {
    "input_output_options": {
      "properties": {
        "outdir": {
          "type": "string",
          "description": "The output directory where the results will be saved.",
          "default": "./results"
        }
      }
    }
  }
}"#;

/// A small pipeline on disk with a provider registry over it
pub(crate) struct Fixture {
    dir: TempDir,
    pub registry: ProviderRegistry,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new().prefix("nfscope").tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("modules/local")).unwrap();
        fs::create_dir_all(root.join("subworkflows")).unwrap();
        fs::write(root.join("modules/local/fastqc.nf"), FASTQC).unwrap();
        fs::write(root.join("subworkflows/qc.nf"), QC).unwrap();
        fs::write(root.join("main.nf"), "workflow {\n}\n").unwrap();
        fs::write(root.join("nextflow.config"), NEXTFLOW_CONFIG).unwrap();
        fs::write(root.join("nextflow_schema.json"), SCHEMA).unwrap();

        let indexes = Arc::new(Indexes::new(&root.join("cache"), unreachable_indexes()));
        Self {
            dir,
            registry: ProviderRegistry::new(indexes),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    /// Context for `text` opened as `main.nf` at the workspace root
    pub fn ctx(&self, text: &str, line: u32, character: u32) -> CursorContext {
        let workspace = Workspace::new(self.root(), load_defaults().unwrap().workspace);
        CursorContext::new(
            text,
            Some(self.root().join("main.nf")),
            Position { line, character },
            workspace,
        )
    }

    /// Context with the cursor at the end of the last line of `text`
    pub fn ctx_at_end(&self, text: &str) -> CursorContext {
        let line = text.lines().count().saturating_sub(1);
        let character = text.lines().last().unwrap_or("").chars().count();
        self.ctx(text, line as u32, character as u32)
    }
}

/// Index commands that cannot run, so absent caches stay absent
fn unreachable_indexes() -> IndexConfig {
    IndexConfig {
        conda_command: vec!["nfscope-no-such-program".to_string()],
        container_listing_command: vec!["nfscope-no-such-program".to_string()],
        ..load_defaults().unwrap().indexes
    }
}
