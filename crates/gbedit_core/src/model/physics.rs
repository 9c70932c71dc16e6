use serde::{Deserialize, Serialize};

/// Player movement tuning written by `PlayerInitPhysics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physics {
    pub x_acceleration: u8,
    pub x_velocity_cap: u8,
    pub y_velocity_cap: i8,
    pub gravity_upwards: u8,
    pub gravity_downwards: u8,
    pub jumping_velocity: i8,
}
