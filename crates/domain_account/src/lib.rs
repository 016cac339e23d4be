//! Account Domain
//!
//! User accounts as seen by the ownership-claim subsystem. An account is
//! either `individual` or `business`; business accounts carry a
//! [`BusinessProfile`] bound to the listing they claimed.
//!
//! ```rust
//! use core_kernel::{AccountId, TargetId};
//! use domain_account::{Account, AccountType, BusinessProfile};
//!
//! let mut account = Account::new_individual(AccountId::new(), "Dana", Some("dana@example.com".into()));
//! let profile = BusinessProfile::new(
//!     "Corner Bakery",
//!     "bakery",
//!     "12 Main St",
//!     TargetId::new("place-123").unwrap(),
//! );
//! account.grant_business(profile);
//! assert_eq!(account.account_type, AccountType::Business);
//! ```

pub mod account;
pub mod error;
pub mod ports;

pub use account::{Account, AccountType, BusinessProfile, Coordinates};
pub use error::AccountError;
pub use ports::{AccountStore, InMemoryAccountStore};
