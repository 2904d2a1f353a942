// Domain layer: turn/notification models and the ports implemented by adapters.

pub mod model;
pub mod ports;
