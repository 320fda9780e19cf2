pub mod dispatcher;
pub mod service;


pub use dispatcher::DispatchError;
pub use dispatcher::Dispatcher;
pub use dispatcher::TickReport;
pub use service::CarAction;
pub use service::DispatcherHandle;
pub use service::DispatcherService;
pub use service::ServiceError;
