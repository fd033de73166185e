pub mod data_uri;
pub mod orientation;
pub mod volume;
