pub mod engine;
/// Fleet KPI summary.
pub mod kpi;
pub mod orchestrator;
pub mod strategy;
pub mod types;
/// Zero-emission zone eligibility.
pub mod zone;
