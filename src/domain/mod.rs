pub mod cluster_metadata;
pub mod grid;
pub mod grid_service;
pub mod health_calculator;
pub mod response_interpreter;
pub mod types;
