//! Registration, login, logout, and the profile page.

pub mod routes;
pub mod store;
