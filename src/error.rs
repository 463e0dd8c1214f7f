use thiserror::Error;

use crate::config::ConfigError;
use crate::fracture::FractureError;
use crate::geometry::GeometryError;
use crate::physics::PhysicsError;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Fracture(#[from] FractureError),
}

pub type Result<T, E = SandboxError> = std::result::Result<T, E>;
