//! Driver positions. Last write wins.

use crate::model::{DriverId, LocationFix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocation {
    pub driver_id: DriverId,
    pub location: LocationFix,
}
