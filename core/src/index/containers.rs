//! Container image index parsed from a Singularity depot directory listing

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Cache file name for the container index
pub const CACHE_NAME: &str = "singularity_images";

static LISTING_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<a href="([^"]+)">[^<]+</a>\s*(\d{2}-\w{3}-\d{4} \d{2}:\d{2})\s*(\d+)$"#)
        .expect("valid regex")
});

const LISTING_TIME_FORMAT: &str = "%d-%b-%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerImage {
    pub name: String,
    pub modified: NaiveDateTime,
    pub size_bytes: u64,
}

impl ContainerImage {
    pub fn size_mb(&self) -> String {
        format!("{:.1} MB", self.size_bytes as f64 / (1024.0 * 1024.0))
    }

    pub fn modified_iso(&self) -> String {
        self.modified.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// One-line description, `name (date) [size]`
    pub fn summary(&self) -> String {
        format!("{} ({}) [{}]", self.name, self.modified_iso(), self.size_mb())
    }
}

/// Parse an HTML directory listing, one `<a href>` row per image.
pub fn parse_listing(html: &str) -> Vec<ContainerImage> {
    html.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let caps = LISTING_ROW.captures(line)?;
            let modified = NaiveDateTime::parse_from_str(&caps[2], LISTING_TIME_FORMAT).ok()?;
            Some(ContainerImage {
                name: unquote_plus(&caps[1]),
                modified,
                size_bytes: caps[3].parse().ok()?,
            })
        })
        .collect()
}

/// Directive choosing the Singularity image or the Docker image depending on
/// the container engine, indented to `column`.
pub fn container_directive(
    image: &str,
    column: usize,
    singularity_base_url: &str,
    docker_base_url: &str,
) -> String {
    let pad = " ".repeat(column);
    format!(
        "if (workflow.containerEngine == 'singularity' && !params.singularity_pull_docker_container) {{\n\
         {pad}  container '{singularity_base_url}{image}'\n\
         {pad}}} else {{\n\
         {pad}  container '{docker_base_url}{image}'\n\
         {pad}}}\n"
    )
}

fn unquote_plus(encoded: &str) -> String {
    form_urlencoded::parse(encoded.as_bytes())
        .map(|(key, value)| {
            if value.is_empty() {
                key.into_owned()
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html>
<head><title>Index of /singularity/</title></head>
<body>
<h1>Index of /singularity/</h1><hr><pre><a href="../">../</a>
<a href="fastqc%3A0.11.9--0">fastqc:0.11.9--0</a>                                  02-Mar-2021 10:22           275771392
<a href="samtools%3A1.15.1--h1170115_0">samtools:1.15.1--h1170115_0</a>      14-Apr-2022 08:01           10485760
<a href="broken">broken</a>      yesterday       12
</pre><hr></body>
</html>
"#;

    #[test]
    fn test_parse_listing() {
        let images = parse_listing(LISTING);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].name, "fastqc:0.11.9--0");
        assert_eq!(images[0].modified_iso(), "2021-03-02T10:22:00");
        assert_eq!(images[1].name, "samtools:1.15.1--h1170115_0");
        assert_eq!(images[1].size_mb(), "10.0 MB");
    }

    #[test]
    fn test_summary() {
        let images = parse_listing(LISTING);
        assert_eq!(
            images[1].summary(),
            "samtools:1.15.1--h1170115_0 (2022-04-14T08:01:00) [10.0 MB]"
        );
    }

    #[test]
    fn test_container_directive() {
        let text = container_directive(
            "fastqc:0.11.9--0",
            4,
            "https://depot.galaxyproject.org/singularity/",
            "quay.io/biocontainers/",
        );
        assert_eq!(
            text,
            "if (workflow.containerEngine == 'singularity' && !params.singularity_pull_docker_container) {\n\
             \x20     container 'https://depot.galaxyproject.org/singularity/fastqc:0.11.9--0'\n\
             \x20   } else {\n\
             \x20     container 'quay.io/biocontainers/fastqc:0.11.9--0'\n\
             \x20   }\n"
        );
    }

    #[test]
    fn test_unquote_plus() {
        assert_eq!(unquote_plus("a%3Ab+c"), "a:b c");
    }
}
