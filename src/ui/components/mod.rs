//! Reusable UI components for the mixer window.

pub mod level_meter;
pub mod program_row;

pub use level_meter::LevelMeter;
pub use program_row::ProgramRowView;
