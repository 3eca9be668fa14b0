// Domain layer: core models and ports (interfaces). No dependencies on the
// adapters beyond std/serde.

pub mod model;
pub mod ports;
