pub mod macros;
pub mod structs;

pub use structs::Assignment;
pub use structs::CarId;
pub use structs::CarMode;
pub use structs::CarStatus;
pub use structs::Direction;
pub use structs::DoorState;
pub use structs::Request;
