pub mod event;
pub mod reminder;
pub mod user;
pub mod window;

pub use event::*;
pub use reminder::*;
pub use user::*;
pub use window::*;
