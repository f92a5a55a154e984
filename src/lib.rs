pub mod clock;
pub mod logging;
pub mod service;

pub use clock::{Clock, MonotonicClock, SystemClock};
pub use service::{ServiceCommand, ServiceEvent, ServiceHandle, TimerService};
