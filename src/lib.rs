/* Modules */
pub mod config;
pub mod dispatcher;
pub mod elevator;
pub mod shared;

/* Public API */
pub use dispatcher::{Dispatcher, DispatcherHandle, DispatcherService};
pub use elevator::Car;
pub use shared::{CarStatus, Direction, Request};
