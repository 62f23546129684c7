pub mod agent;
pub mod data;
pub mod environment;
pub mod inference;
pub mod memory;
pub mod params;
pub mod wrapper;
