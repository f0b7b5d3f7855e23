//! Fleet DB - IoT fleet metadata API
//!
//! Users, zones, devices, sensors and readings stored without database-level
//! foreign keys. The [`integrity`] module validates references on write and
//! guards deletes; [`services`] apply it per entity kind.

pub mod common;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod integrity;
pub mod routes;
pub mod services;
pub mod store;
