//! Repository access for commit generation
//!
//! The orchestrator only sees the [`RepositoryGateway`] trait; [`GitRepository`]
//! is the production implementation backed by libgit2 and the `git` binary.

/// Gateway trait consumed by setup and the orchestrator
pub mod gateway;
/// libgit2 + `git` CLI implementation of the gateway
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use gateway::RepositoryGateway;
pub use repository::GitRepository;
