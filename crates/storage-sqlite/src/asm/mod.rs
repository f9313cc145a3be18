//! SQLite storage for attack-surface discoveries, their runs and the
//! short-lived pipeline documents.

mod model;
mod pipeline_store;
mod repository;

pub use model::{AsmDiscoveryDB, AsmDiscoveryRunDB, AsmPipelineDB};
pub use pipeline_store::{SqlitePipelineStore, PIPELINE_TTL_HOURS};
pub use repository::AsmRepository;
