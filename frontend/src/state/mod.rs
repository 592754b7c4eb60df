//! Client-side state holders. None of these perform I/O; controllers drive
//! them around the gateway calls.

pub mod planner_state;
pub mod review_state;
pub mod store;
pub mod table_state;

pub use planner_state::PlannerState;
pub use review_state::{InFlight, ReviewAction, ReviewStage, ReviewState};
pub use store::{CrudDialog, EntityStore};
pub use table_state::{PageView, TableState};
