// Domain layer: request/report models and the ports the orchestrator depends on.

pub mod model;
pub mod ports;
