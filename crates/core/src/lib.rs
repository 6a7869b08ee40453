pub mod args;
pub mod config;
pub mod error;

pub use args::ArgMap;
pub use config::{
    apply_verbose_side_effects, resolve, verbose_requested, ConfigLayer, ConfigResolver,
    EffectiveConfig, EnvVars,
};
pub use error::*;
