// Domain layer: transient migration state and the fixer port.

pub mod model;
pub mod ports;
