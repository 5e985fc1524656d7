pub mod settings;

pub use settings::{ExportSettings, Settings, WrikeSettings};
