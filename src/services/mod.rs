pub mod aggregator;
pub mod pagination;
pub mod pipeline;
pub mod report_generator;
pub mod retrieval;
pub mod snapshot_service;
pub mod staking_service;
