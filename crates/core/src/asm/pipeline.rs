//! Tool pipeline for a discovery run.
//!
//! A pipeline is an ordered list of tools chosen from the asset kind and the
//! requested intensity. The worker walks it tool by tool, saving the document
//! after each transition so the API can show live progress.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::asm_model::{DiscoveryAssetType, Intensity};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl ToolStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ToolStatus::Completed | ToolStatus::Failed | ToolStatus::Skipped
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    /// 1-based position in the pipeline.
    pub order: usize,
    pub tool: String,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status change for one tool. Unset fields keep their previous value.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUpdate {
    pub status: ToolStatus,
    pub duration_ms: Option<i64>,
    pub summary: Option<Value>,
    pub result: Option<Vec<Value>>,
    pub data_ref: Option<String>,
    pub error: Option<String>,
}

impl ToolUpdate {
    pub fn status(status: ToolStatus) -> Self {
        Self {
            status,
            duration_ms: None,
            summary: None,
            result: None,
            data_ref: None,
            error: None,
        }
    }

    pub fn completed(duration_ms: i64, summary: Value, result: Vec<Value>) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            summary: Some(summary),
            result: Some(result),
            ..Self::status(ToolStatus::Completed)
        }
    }

    pub fn failed(duration_ms: i64, error: impl Into<String>) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            error: Some(error.into()),
            ..Self::status(ToolStatus::Failed)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDocument {
    pub job_id: String,
    pub asset_type: String,
    pub intensity: Intensity,
    pub status: String,
    pub pipeline: Vec<ToolExecution>,
}

impl PipelineDocument {
    pub fn update_tool_status(&mut self, order: usize, update: ToolUpdate) {
        let Some(tool) = order
            .checked_sub(1)
            .and_then(|idx| self.pipeline.get_mut(idx))
        else {
            return;
        };
        tool.status = update.status;
        if update.duration_ms.is_some() {
            tool.duration_ms = update.duration_ms;
        }
        if update.summary.is_some() {
            tool.summary = update.summary;
        }
        if update.result.is_some() {
            tool.result = update.result;
        }
        if update.data_ref.is_some() {
            tool.data_ref = update.data_ref;
        }
        if update.error.is_some() {
            tool.error = update.error;
        }
    }

    pub fn next_pending_tool(&self) -> Option<&ToolExecution> {
        self.pipeline
            .iter()
            .find(|t| t.status == ToolStatus::Pending)
    }

    pub fn is_completed(&self) -> bool {
        self.pipeline.iter().all(|t| t.status.is_terminal())
    }

    pub fn has_failures(&self) -> bool {
        self.pipeline.iter().any(|t| t.status == ToolStatus::Failed)
    }

    /// Marks every tool that has not started as skipped.
    pub fn skip_remaining(&mut self) {
        for tool in self
            .pipeline
            .iter_mut()
            .filter(|t| t.status == ToolStatus::Pending)
        {
            tool.status = ToolStatus::Skipped;
        }
    }
}

/// Pipeline row used for a discovery asset type.
pub fn pipeline_kind(asset_type: DiscoveryAssetType) -> &'static str {
    match asset_type {
        DiscoveryAssetType::Domain => "domain",
        DiscoveryAssetType::Cloud => "cloud",
        DiscoveryAssetType::Saas => "service",
    }
}

fn tools_for(kind: &str, intensity: Intensity) -> Option<&'static [&'static str]> {
    use Intensity::*;
    let tools: &'static [&'static str] = match (kind, intensity) {
        ("domain", Light) => &["subfinder", "basic_dns"],
        ("domain", Normal) => &["amass_passive"],
        ("domain", Deep) => &["amass_active", "reverse_dns", "exposure_scan"],
        ("ip", Light) => &["ip_resolve"],
        ("ip", Normal) => &["asn_geo_mapping"],
        ("ip", Deep) => &["full_port_service_scan"],
        ("service", Light) => &["http_banner_check"],
        ("service", Normal) => &["top_ports_services"],
        ("service", Deep) => &["deep_misconfig_analysis"],
        ("cloud", Light) => &["public_endpoint_detect"],
        ("cloud", Normal) => &["config_review_readonly"],
        ("cloud", Deep) => &["full_osint_correlation"],
        ("human", Light) => &["email_leak_check"],
        ("human", Normal) => &["repo_secret_scan"],
        ("human", Deep) => &["full_osint_correlation"],
        _ => return None,
    };
    Some(tools)
}

/// Builds a fresh pipeline with every tool pending.
pub fn generate_pipeline(
    job_id: &str,
    asset_type: &str,
    intensity: Intensity,
    status: &str,
) -> Result<PipelineDocument> {
    let tools = tools_for(asset_type, intensity).ok_or_else(|| {
        Error::Pipeline(format!(
            "No pipeline for asset type {} with intensity {}",
            asset_type, intensity
        ))
    })?;

    Ok(PipelineDocument {
        job_id: job_id.to_string(),
        asset_type: asset_type.to_string(),
        intensity,
        status: status.to_string(),
        pipeline: tools
            .iter()
            .enumerate()
            .map(|(idx, tool)| ToolExecution {
                order: idx + 1,
                tool: (*tool).to_string(),
                status: ToolStatus::Pending,
                duration_ms: None,
                summary: None,
                result: None,
                data_ref: None,
                error: None,
            })
            .collect(),
    })
}
