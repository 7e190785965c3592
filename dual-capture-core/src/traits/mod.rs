pub mod capture_delegate;
pub mod capture_store;
pub mod display_link;
pub mod encoder;
pub mod media_devices;
