pub mod auth;
pub mod incidents;
pub mod open;
pub mod personnel;
pub mod sos;
