// monitoring/mod.rs
pub mod status_recorder;
