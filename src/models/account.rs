use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Credit => "credit",
            Self::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "savings" => Self::Savings,
            "credit" | "credit card" | "credit_card" => Self::Credit,
            "investment" => Self::Investment,
            _ => Self::Checking,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub institution: String,
    pub opened_date: Option<NaiveDate>,
}

impl Account {
    pub fn new(name: String, account_type: AccountType, institution: String) -> Self {
        Self {
            id: None,
            name,
            account_type,
            balance: Decimal::ZERO,
            institution,
            opened_date: None,
        }
    }
}
