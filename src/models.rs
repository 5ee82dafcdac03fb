pub mod appointments;
pub mod auth;
pub mod blog;
pub mod campaigns;
pub mod cases;
pub mod clients;
pub mod contact;
pub mod content;
pub mod documents;
pub mod hearings;
pub mod storage;
