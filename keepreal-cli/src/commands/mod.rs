pub mod gallery;
pub mod mint;
pub mod revoke;
pub mod sync;
