pub mod artifacts;
pub mod config;
pub mod container;
pub mod external_services;
pub mod vector_store;
