//! Repository layer: one zero-sized struct per table group.

pub mod member_repo;
pub mod note_template_repo;
pub mod project_repo;
pub mod role_repo;
pub mod tracker_repo;
pub mod user_repo;

pub use member_repo::MemberRepo;
pub use note_template_repo::NoteTemplateRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use tracker_repo::TrackerRepo;
pub use user_repo::UserRepo;
