pub mod cluster;
pub mod general;
