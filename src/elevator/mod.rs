pub mod car;
pub mod stop_set;

mod car_tests;

pub use car::Car;
pub use car::StepOutcome;
pub use car::DEFAULT_MAX_LOAD;
pub use stop_set::StopSet;
