//! Posts, likes, the feed, and the JSON listing.

pub mod routes;
pub mod store;
