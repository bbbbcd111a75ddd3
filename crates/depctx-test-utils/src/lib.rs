//! Shared test utilities for the depctx workspace.
//!
//! This crate provides on-disk fixtures so that crate test suites do not
//! each reinvent temporary repositories and settings files. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`repo`]: [`TestRepository`], a temporary default-layout repository
//!   usable as a local cache or as a `file://` remote
//! - [`home`]: [`TestHome`], a temporary user home with settings files

pub mod home;
pub mod repo;

pub use home::TestHome;
pub use repo::TestRepository;
