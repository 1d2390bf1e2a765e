pub mod health;
pub mod profiles;
