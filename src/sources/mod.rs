//! Pose source implementations

pub mod scripted;

pub use scripted::ScriptedSource;
