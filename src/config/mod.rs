/// Detection configuration loaded from TOML

pub mod thresholds;

pub use thresholds::*;
