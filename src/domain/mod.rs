// Domain layer: batch models and the ports (channel, pacer, credentials) the dispatcher depends on.

pub mod model;
pub mod ports;
