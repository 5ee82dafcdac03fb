pub mod appointment_service;
pub mod auth;
pub mod blog_service;
pub mod campaign_service;
pub mod case_service;
pub mod client_service;
pub mod content_service;
pub mod document_service;
pub mod email;
pub mod hearing_service;
pub mod media_migration;
pub mod storage;
