//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Read methods accept any `PgExecutor` so they run against the pool or
//! inside a workflow transaction; write-set methods that must be atomic take
//! `&mut sqlx::Transaction` explicitly.

pub mod applicant_repo;
pub mod member_repo;
pub mod position_repo;
pub mod project_repo;
pub mod user_repo;

pub use applicant_repo::ApplicantRepo;
pub use member_repo::MemberRepo;
pub use position_repo::PositionRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
