pub mod client;
pub mod generator;
pub mod parse;
pub mod prompts;
pub mod retry;

pub use client::*;
pub use generator::*;
pub use parse::*;
pub use prompts::*;
pub use retry::*;
