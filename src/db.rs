pub mod user_repo;
pub use user_repo::UserRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod case_repo;
pub use case_repo::CaseRepository;
pub mod hearing_repo;
pub use hearing_repo::HearingRepository;
pub mod blog_repo;
pub use blog_repo::BlogRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod campaign_repo;
pub use campaign_repo::CampaignRepository;
pub mod content_repo;
pub use content_repo::ContentRepository;
