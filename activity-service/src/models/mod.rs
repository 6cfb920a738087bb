pub mod account;
pub mod activity;
pub mod location;

pub use account::{normalize_email, Account, AccountChanges, AccountView, NewAccount, Role};
pub use activity::{Activity, ActivityChanges, ActivityStatus, ActivityView, NewActivity};
pub use location::{normalize, Level, LocationCombination, LocationSelection};
