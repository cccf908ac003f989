//! `withLabel` selectors declared in Nextflow config files

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::block::find_closing_brace;

static WITH_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s*withLabel\s*:\s*['"]?(\w+)['"]?\s*\{\s*"#).expect("valid regex")
});

/// A process label and the directives its selector applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigLabel {
    /// File name of the config declaring the selector
    pub config: String,
    pub label: String,
    /// Selector body, one trimmed directive per line
    pub body: String,
}

/// All `withLabel` selectors in a config file.
///
/// A selector with unbalanced braces keeps everything up to the end of the
/// file as its body.
pub fn config_labels(config_name: &str, text: &str) -> Vec<ConfigLabel> {
    WITH_LABEL
        .captures_iter(text)
        .filter_map(|caps| {
            let header = caps.get(0)?;
            let label = caps.get(1)?.as_str();
            let end = find_closing_brace(text, header.end()).unwrap_or(text.len());
            let body = text
                .get(header.end()..end)
                .unwrap_or("")
                .trim()
                .lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n");
            Some(ConfigLabel {
                config: config_name.to_string(),
                label: label.to_string(),
                body,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_CONFIG: &str = r#"
process {
    cpus   = 1
    withLabel:process_low {
        cpus   = 2
        memory = 12.GB
    }
    withLabel: 'process_high' {
        cpus   = { check_max( 12 * task.attempt, 'cpus' ) }
        time   = 16.h
    }
    withLabel:"error_retry" { errorStrategy = 'retry' }
}
"#;

    #[test]
    fn test_labels_in_order() {
        let labels = config_labels("base.config", BASE_CONFIG);
        let names: Vec<_> = labels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(names, vec!["process_low", "process_high", "error_retry"]);
        assert!(labels.iter().all(|l| l.config == "base.config"));
    }

    #[test]
    fn test_label_body_is_trimmed_per_line() {
        let labels = config_labels("base.config", BASE_CONFIG);
        assert_eq!(labels[0].body, "cpus   = 2\nmemory = 12.GB");
        assert_eq!(
            labels[1].body,
            "cpus   = { check_max( 12 * task.attempt, 'cpus' ) }\ntime   = 16.h"
        );
        assert_eq!(labels[2].body, "errorStrategy = 'retry'");
    }

    #[test]
    fn test_unbalanced_label_runs_to_end() {
        let labels = config_labels("x.config", "withLabel:big {\n  cpus = 8\n");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].body, "cpus = 8");
    }

    #[test]
    fn test_no_labels() {
        assert!(config_labels("x.config", "params {\n  a = 1\n}\n").is_empty());
    }
}
