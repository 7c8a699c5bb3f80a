pub mod stage0_window;
pub mod stage1_generate;
pub mod stage2_merge;
pub mod stage3_align;
pub mod stage4_coverage;

pub use stage0_window::*;
pub use stage1_generate::*;
pub use stage2_merge::*;
pub use stage3_align::*;
pub use stage4_coverage::*;
