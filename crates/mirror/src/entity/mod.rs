//! Sea-ORM entities for the GreenFi mirror tables

pub mod projects;
pub mod stakes;
pub mod withdrawals;

pub use projects::Entity as Projects;
pub use stakes::Entity as Stakes;
pub use withdrawals::Entity as Withdrawals;
