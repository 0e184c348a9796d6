// ui/mod.rs - terminal front-ends over the playback state snapshots
pub mod gesture;
pub mod modern;
pub mod pipe;
pub mod styles;
