pub mod auth;
pub mod catalog;
pub mod providers;
pub mod storage;
pub mod transfers;
pub mod users;
