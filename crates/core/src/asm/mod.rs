//! Attack Surface Management - discovery definitions, their runs, and the
//! tool pipeline a run executes.

mod asm_model;
mod asm_service;
mod asm_traits;
pub mod pipeline;
pub mod schedule;

pub use asm_model::{
    AsmDashboard, AsmDiscovery, AsmDiscoveryRun, AsmDiscoveryUpdate, AsmTrigger,
    DiscoveryAssetType, DiscoveryStatus, Intensity, NewAsmDiscovery, RunMode, RunStatus,
    ScheduleType, TargetSource, TriggeredBy,
};
pub use asm_service::AsmService;
pub use asm_traits::{AsmRepositoryTrait, AsmServiceTrait, PipelineStoreTrait};
pub use pipeline::{generate_pipeline, PipelineDocument, ToolExecution, ToolStatus, ToolUpdate};
pub use schedule::parse_interval;
