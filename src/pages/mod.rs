pub mod home;
pub mod model;
pub mod not_found;
