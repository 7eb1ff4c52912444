//! Use-case services over the repository layer.

pub mod post_service;
