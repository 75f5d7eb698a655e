pub mod memory;
pub mod organisation_repo;
pub mod prospect_repo;
pub mod store;
pub mod user_repo;

pub use memory::MemoryStore;
pub use organisation_repo::OrganisationRepository;
pub use prospect_repo::ProspectRepository;
pub use store::{OrganisationStore, Pagination, ProspectStore, UserStore};
pub use user_repo::UserRepository;
