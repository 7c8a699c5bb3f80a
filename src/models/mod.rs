pub mod chapter;
pub mod segment;
pub mod window;

pub use chapter::*;
pub use segment::*;
pub use window::*;
