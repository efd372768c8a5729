use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::{reference::Labeled, FieldValue, Record, CREATED_AT};

/// Welfare fund member with their current savings balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Employee code printed on the passbook.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    pub savings_balance: Decimal,
    pub joined_on: String,
}

impl Record for Member {
    const COLLECTION_KEY: &'static str = "fund.members.v1";
    const ID_PREFIX: &'static str = "MB";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::text(&self.id),
            CREATED_AT => FieldValue::Timestamp(self.created_at),
            "code" => FieldValue::text(&self.code),
            "name" => FieldValue::text(&self.name),
            "department" => FieldValue::optional_text(self.department.as_deref()),
            "savingsBalance" => FieldValue::Number(self.savings_balance),
            "joinedOn" => FieldValue::date(&self.joined_on),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["code", "name", "department"]
    }

    fn date_column() -> &'static str {
        "joinedOn"
    }

    fn default_order(a: &Self, b: &Self) -> std::cmp::Ordering {
        a.code.cmp(&b.code)
    }
}

impl Labeled for Member {
    const ENTITY: &'static str = "Member";

    fn lookup_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} {}", self.code, self.name))
    }
}

/// Money moving into or out of a member's savings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsTransaction {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub date: String,
    pub member_id: String,
    pub amount: Decimal,
    /// Member balance right after this transaction.
    pub balance_after: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SavingsTransaction {
    fn field_value(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::text(&self.id),
            CREATED_AT => FieldValue::Timestamp(self.created_at),
            "date" => FieldValue::date(&self.date),
            "memberId" => FieldValue::text(&self.member_id),
            "amount" => FieldValue::Number(self.amount),
            "balanceAfter" => FieldValue::Number(self.balance_after),
            "notes" => FieldValue::optional_text(self.notes.as_deref()),
            _ => FieldValue::Missing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deposit(pub SavingsTransaction);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Withdrawal(pub SavingsTransaction);

macro_rules! savings_record {
    ($ty:ident, $key:literal, $prefix:literal) => {
        impl Record for $ty {
            const COLLECTION_KEY: &'static str = $key;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.0.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.0.created_at
            }

            fn field(&self, column: &str) -> FieldValue<'_> {
                self.0.field_value(column)
            }

            fn search_columns() -> &'static [&'static str] {
                &["id", "memberId", "notes"]
            }

            fn date_column() -> &'static str {
                "date"
            }
        }

        impl std::ops::Deref for $ty {
            type Target = SavingsTransaction;

            fn deref(&self) -> &SavingsTransaction {
                &self.0
            }
        }
    };
}

savings_record!(Deposit, "fund.deposits.v1", "DP");
savings_record!(Withdrawal, "fund.withdrawals.v1", "WD");

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub member_id: String,
    pub amount: Decimal,
    pub installments: u32,
    pub purpose: String,
    pub status: LoanStatus,
}

impl LoanRequest {
    /// Flat monthly installment, unrounded.
    pub fn monthly_installment(&self) -> Decimal {
        if self.installments == 0 {
            return self.amount;
        }
        self.amount / Decimal::from(self.installments)
    }
}

impl Record for LoanRequest {
    const COLLECTION_KEY: &'static str = "fund.loans.v1";
    const ID_PREFIX: &'static str = "LN";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, column: &str) -> FieldValue<'_> {
        match column {
            "id" => FieldValue::text(&self.id),
            CREATED_AT => FieldValue::Timestamp(self.created_at),
            "memberId" => FieldValue::text(&self.member_id),
            "amount" => FieldValue::Number(self.amount),
            "installments" => FieldValue::Number(self.installments.into()),
            "monthlyInstallment" => FieldValue::Number(self.monthly_installment()),
            "purpose" => FieldValue::text(&self.purpose),
            "status" => FieldValue::tag(self.status),
            _ => FieldValue::Missing,
        }
    }

    fn search_columns() -> &'static [&'static str] {
        &["id", "memberId", "purpose", "status"]
    }
}
