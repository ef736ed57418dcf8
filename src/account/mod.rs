pub mod keystore;
pub mod unlock;
