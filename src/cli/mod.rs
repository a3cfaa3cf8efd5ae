/// CLI Indexes: run modes
pub mod run_modes;

/// CLI utilities: fold selection
pub mod folds;

/// CLI utilities: config overrides shared by the binaries
pub mod overrides;

pub use folds::FoldList;
pub use overrides::ConfigOverrides;
pub use run_modes::RunMode;
