pub mod broadcaster;
pub mod event;
pub mod registry;

pub use broadcaster::EventBroadcaster;
pub use event::Event;
pub use registry::{ConnectionRegistry, LiveConnection};
