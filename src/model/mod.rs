pub mod quiz_mode;
pub mod snapshot;
pub mod word;

pub use quiz_mode::*;
pub use snapshot::*;
pub use word::*;
