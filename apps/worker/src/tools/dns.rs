use std::collections::BTreeSet;
use std::net::IpAddr;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::lookup_host;
use tracing::debug;

use super::{DiscoveryTool, ToolError, ToolInput, ToolOutput};

/// Resolves every target with the system resolver. Unresolvable targets are
/// reported in the result and do not fail the step.
pub struct DnsResolveTool {
    name: &'static str,
}

impl DnsResolveTool {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

async fn resolve(target: &str) -> std::io::Result<Vec<IpAddr>> {
    let addrs: BTreeSet<IpAddr> = lookup_host((target, 0)).await?.map(|a| a.ip()).collect();
    Ok(addrs.into_iter().collect())
}

#[async_trait]
impl DiscoveryTool for DnsResolveTool {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, input: &ToolInput) -> Result<ToolOutput, ToolError> {
        let mut result = Vec::with_capacity(input.targets.len());
        let mut hosts = Vec::new();
        let mut addresses = 0;

        for target in &input.targets {
            match resolve(target).await {
                Ok(ips) if !ips.is_empty() => {
                    addresses += ips.len();
                    hosts.push(target.clone());
                    result.push(json!({
                        "host": target,
                        "addresses": ips.iter().map(|ip| ip.to_string()).collect::<Vec<_>>(),
                    }));
                }
                Ok(_) => result.push(json!({ "host": target, "addresses": [] })),
                Err(e) => {
                    debug!("{}: {} did not resolve: {}", self.name, target, e);
                    result.push(json!({ "host": target, "addresses": [], "error": e.to_string() }));
                }
            }
        }

        Ok(ToolOutput {
            summary: json!({
                "targets": input.targets.len(),
                "resolved": hosts.len(),
                "addresses": addresses,
            }),
            result,
            hosts,
        })
    }
}
