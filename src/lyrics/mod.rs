// lyrics/mod.rs - timed-lyrics parsing and position mapping
pub mod parse;
pub mod sync;
pub mod types;

pub use parse::parse_lrc;
pub use sync::active_index;
pub use types::LyricLine;
