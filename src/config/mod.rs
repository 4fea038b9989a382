//! Configuration: types, default locations and XML loading.
//!
//! Precedence (highest first): CLI flags, the XML file, built-in defaults.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{
    CONFIG_ENV, default_config_path, default_log_path, path_has_symlink_ancestor,
    resolve_config_path,
};
pub use types::{Config, LogLevel};
pub use xml::{ConfigSource, load_config, load_config_from_xml_path};
