use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use super::{DiscoveryTool, ToolError, ToolInput, ToolOutput};

const BINARY: &str = "subfinder";

/// Passive subdomain enumeration through the `subfinder` binary.
pub struct SubfinderTool {
    binary: PathBuf,
}

impl SubfinderTool {
    pub fn new(bin_path: Option<&Path>) -> Self {
        let binary = match bin_path {
            Some(dir) => dir.join(BINARY),
            None => PathBuf::from(BINARY),
        };
        Self { binary }
    }

    async fn enumerate(&self, domain: &str) -> Result<Vec<String>, ToolError> {
        let output = Command::new(&self.binary)
            .arg("-d")
            .arg(domain)
            .arg("-silent")
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ToolError::Execution {
                tool: BINARY.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_hosts(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// One host per line; blanks dropped, lowercased.
fn parse_hosts(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|l| l.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

#[async_trait]
impl DiscoveryTool for SubfinderTool {
    fn name(&self) -> &str {
        BINARY
    }

    async fn run(&self, input: &ToolInput) -> Result<ToolOutput, ToolError> {
        let mut hosts = BTreeSet::new();
        for domain in &input.targets {
            let found = self.enumerate(domain).await?;
            debug!("subfinder found {} hosts for {}", found.len(), domain);
            hosts.extend(found);
        }

        let hosts: Vec<String> = hosts.into_iter().collect();
        Ok(ToolOutput {
            summary: json!({
                "domains": input.targets.len(),
                "subdomains_found": hosts.len(),
            }),
            result: hosts
                .iter()
                .map(|h| json!({ "host": h, "source": BINARY }))
                .collect(),
            hosts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_silent_output() {
        let hosts = parse_hosts("api.example.com\n\n WWW.example.com. \n");
        assert_eq!(hosts, vec!["api.example.com", "www.example.com"]);
    }

    #[test]
    fn binary_is_resolved_from_bin_path() {
        let tool = SubfinderTool::new(Some(Path::new("/opt/tools")));
        assert_eq!(tool.binary, PathBuf::from("/opt/tools/subfinder"));
    }

    #[tokio::test]
    async fn missing_binary_fails() {
        let tool = SubfinderTool::new(Some(Path::new("/nonexistent-dir")));
        let input = ToolInput {
            targets: vec!["example.com".to_string()],
        };
        assert!(matches!(tool.run(&input).await, Err(ToolError::Io(_))));
    }
}
