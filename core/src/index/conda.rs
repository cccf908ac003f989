//! Conda package index parsed from `conda search` output

use serde::{Deserialize, Serialize};

/// Cache file name for the package index
pub const CACHE_NAME: &str = "conda_search";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondaPackage {
    pub name: String,
    pub version: String,
    pub build: String,
    pub channel: String,
}

impl CondaPackage {
    /// Fully qualified spec, `channel::name=version=build`
    pub fn spec(&self) -> String {
        format!("{}::{}={}={}", self.channel, self.name, self.version, self.build)
    }

    /// Text inserted into a `conda` directive. Default `pkgs/*` channels are
    /// left implicit.
    pub fn directive_text(&self) -> String {
        if self.channel.starts_with("pkgs/") {
            format!("{}={}={}", self.name, self.version, self.build)
        } else {
            self.spec()
        }
    }
}

/// Parse the table printed by `conda search`.
///
/// Everything up to and including the `#` header line is skipped, as are rows
/// with fewer than four columns.
pub fn parse_search_output(output: &str) -> Vec<CondaPackage> {
    output
        .lines()
        .skip_while(|line| !line.starts_with('#'))
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some(CondaPackage {
                name: fields.next()?.to_string(),
                version: fields.next()?.to_string(),
                build: fields.next()?.to_string(),
                channel: fields.next()?.to_string(),
            })
        })
        .collect()
}
