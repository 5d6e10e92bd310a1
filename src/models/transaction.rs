use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
    /// Anything the backend stores besides income/expense (transfers,
    /// investments). Kept verbatim, counted as neither.
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "income" => Self::Income,
            "expense" => Self::Expense,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Transfer,
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Transfer => "transfer",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Cash => "Cash",
            Self::CreditCard => "Credit card",
            Self::DebitCard => "Debit card",
            Self::Transfer => "Transfer",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "cash" => Self::Cash,
            "credit_card" | "credit" | "card" => Self::CreditCard,
            "debit_card" | "debit" => Self::DebitCard,
            "transfer" => Self::Transfer,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Methods that get their own series in the daily expense chart.
    pub fn charted() -> &'static [PaymentMethod] {
        &[Self::Cash, Self::CreditCard, Self::DebitCard, Self::Transfer]
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: Option<i64>,
    pub category_id: Option<CategoryId>,
    /// Always non-negative; the direction lives in `transaction_type`.
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub transaction_type: TransactionType,
    pub is_recurring: bool,
    pub created_at: String,
}

impl Transaction {
    pub fn new(
        transaction_date: NaiveDate,
        description: String,
        amount: Decimal,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            id: None,
            account_id: None,
            category_id: None,
            amount,
            transaction_date,
            description,
            payment_method: PaymentMethod::Cash,
            transaction_type,
            is_recurring: false,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Amount with the sign implied by the type: expenses negative,
    /// income positive, anything else zero.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
            TransactionType::Other(_) => Decimal::ZERO,
        }
    }
}
