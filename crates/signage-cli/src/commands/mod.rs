pub mod applet;
pub mod auth;
pub mod config;
pub mod custom_script;
pub mod device;
pub mod firmware;
pub mod organization;
pub mod plugin;
pub mod prompt;
