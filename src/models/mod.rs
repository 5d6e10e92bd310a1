mod account;
mod category;
mod transaction;

pub use account::{Account, AccountType};
pub use category::{category_names, Category, CategoryId, CategoryKind};
pub use transaction::{PaymentMethod, Transaction, TransactionType};

#[cfg(test)]
mod tests;
