// Domain layer: pass-through models and the ports to the two external libraries.

pub mod model;
pub mod ports;
