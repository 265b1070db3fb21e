pub mod clock;
pub mod draw;
pub mod registration;
pub mod schedule;
pub mod selection;
pub mod window;

pub use clock::*;
pub use draw::*;
pub use registration::*;
pub use schedule::*;
pub use selection::*;
pub use window::*;
