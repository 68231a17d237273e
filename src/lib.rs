pub mod build_info;
pub mod config;
pub mod decoration;
pub mod detection;
pub mod graphic;
pub mod logging;
pub mod overlay;
pub mod palette;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod surface;
pub mod tracker;
pub mod transform;
