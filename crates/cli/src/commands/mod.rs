pub mod capabilities;
pub mod chat;
pub mod doctor;
