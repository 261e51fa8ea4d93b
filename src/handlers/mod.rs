pub mod content;
pub mod gate;
pub mod images;
pub mod site_config;
