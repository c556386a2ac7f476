mod user;

pub use user::{EmailIndex, Theme, UserAccount, UserSettings};
