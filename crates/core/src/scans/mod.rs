//! Vulnerability scanning - scan requests, their findings, and the scanner
//! seam the worker drives.

mod scanner;
mod scans_model;
mod scans_service;
mod scans_traits;

pub use scanner::{Scanner, StubScanner};
pub use scans_model::{
    Finding, NewScan, Scan, ScanAccepted, ScanDetail, ScanJob, ScanStatus, Severity,
    SeverityCounts, VsDashboard,
};
pub use scans_service::ScanService;
pub use scans_traits::{ScanRepositoryTrait, ScanServiceTrait};
