use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::commands::{Command, Plan};
use crate::common::new_record_id;
use crate::errors::ServiceError;
use crate::models::fund::{Deposit, LoanRequest, LoanStatus, Member, SavingsTransaction, Withdrawal};
use crate::models::Record;
use crate::store::{EffectList, Workspace};
use crate::validation::{single_error, validate_not_blank, DraftParser};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn require_member(workspace: &Workspace, member_id: &str) -> Result<Member, ServiceError> {
    workspace
        .find::<Member>(member_id.trim())
        .ok_or_else(|| ServiceError::not_found("Member", member_id.trim()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    #[validate(custom = "validate_not_blank")]
    pub code: String,
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    pub department: String,
    /// Blank means zero.
    pub opening_balance: String,
    #[validate(custom = "validate_not_blank")]
    pub joined_on: String,
}

#[derive(Debug, Clone)]
pub struct RegisterMemberCommand {
    pub draft: MemberDraft,
}

impl Command for RegisterMemberCommand {
    type Output = Member;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Member>, ServiceError> {
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let code = parser.text("code", &draft.code);
        let name = parser.text("name", &draft.name);
        let department = parser.optional_text(&draft.department);
        let savings_balance = if draft.opening_balance.trim().is_empty() {
            Decimal::ZERO
        } else {
            let value = parser.decimal("opening_balance", &draft.opening_balance);
            if value.is_sign_negative() {
                parser.reject("opening_balance", "negative", "Must not be negative");
            }
            value
        };
        let joined_on = parser.date("joined_on", &draft.joined_on);
        parser.finish()?;

        if workspace
            .list::<Member>()
            .iter()
            .any(|member| member.code.eq_ignore_ascii_case(&code))
        {
            return Err(ServiceError::InvalidOperation(format!(
                "Member code {} is already registered",
                code
            )));
        }

        let member = Member {
            id: new_record_id(Member::ID_PREFIX),
            created_at: Utc::now(),
            updated_at: None,
            code,
            name,
            department,
            savings_balance,
            joined_on: joined_on.format(DATE_FORMAT).to_string(),
        };
        info!(id = %member.id, code = %member.code, "Member registered");
        let effects = EffectList::new().insert(&member)?;
        Ok(Plan::new(member, effects))
    }
}

/// Raw inputs shared by the deposit and withdrawal forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavingsDraft {
    #[validate(custom = "validate_not_blank")]
    pub member_id: String,
    #[validate(custom = "validate_not_blank")]
    pub date: String,
    #[validate(custom = "validate_not_blank")]
    pub amount: String,
    pub notes: String,
}

fn savings_transaction(
    id: String,
    date: NaiveDate,
    member: &Member,
    amount: Decimal,
    balance_after: Decimal,
    notes: Option<String>,
) -> SavingsTransaction {
    SavingsTransaction {
        id,
        created_at: Utc::now(),
        date: date.format(DATE_FORMAT).to_string(),
        member_id: member.id.clone(),
        amount,
        balance_after,
        notes,
    }
}

fn with_balance(member: Member, savings_balance: Decimal) -> Member {
    Member {
        savings_balance,
        updated_at: Some(Utc::now()),
        ..member
    }
}

/// Adds to a member's savings. The amount must reach the configured
/// minimum deposit.
#[derive(Debug, Clone)]
pub struct DepositCommand {
    pub draft: SavingsDraft,
}

impl Command for DepositCommand {
    type Output = Deposit;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Deposit>, ServiceError> {
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let date = parser.date("date", &draft.date);
        let amount = parser.at_least("amount", &draft.amount, workspace.rules().min_deposit);
        let notes = parser.optional_text(&draft.notes);
        parser.finish()?;

        let member = require_member(workspace, &draft.member_id)?;
        let balance_after = member.savings_balance.checked_add(amount).ok_or_else(|| {
            single_error("amount", "out_of_range", "Balance would exceed the supported range")
        })?;
        let deposit = Deposit(savings_transaction(
            new_record_id(Deposit::ID_PREFIX),
            date,
            &member,
            amount,
            balance_after,
            notes,
        ));
        let member = with_balance(member, balance_after);

        info!(member = %member.id, amount = %amount, balance = %balance_after, "Deposit accepted");
        let effects = EffectList::new().insert(&deposit)?.replace(&member)?;
        Ok(Plan::new(deposit, effects))
    }
}

/// Takes money out of a member's savings, never below zero.
#[derive(Debug, Clone)]
pub struct WithdrawalCommand {
    pub draft: SavingsDraft,
}

impl Command for WithdrawalCommand {
    type Output = Withdrawal;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Withdrawal>, ServiceError> {
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let date = parser.date("date", &draft.date);
        let amount = parser.positive("amount", &draft.amount);
        let notes = parser.optional_text(&draft.notes);
        parser.finish()?;

        let member = require_member(workspace, &draft.member_id)?;
        if amount > member.savings_balance {
            warn!(member = %member.id, requested = %amount, available = %member.savings_balance, "Withdrawal exceeds balance");
            return Err(ServiceError::InsufficientBalance {
                requested: amount,
                available: member.savings_balance,
            });
        }

        let balance_after = member.savings_balance - amount;
        let withdrawal = Withdrawal(savings_transaction(
            new_record_id(Withdrawal::ID_PREFIX),
            date,
            &member,
            amount,
            balance_after,
            notes,
        ));
        let member = with_balance(member, balance_after);

        info!(member = %member.id, amount = %amount, balance = %balance_after, "Withdrawal accepted");
        let effects = EffectList::new().insert(&withdrawal)?.replace(&member)?;
        Ok(Plan::new(withdrawal, effects))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoanDraft {
    #[validate(custom = "validate_not_blank")]
    pub member_id: String,
    #[validate(custom = "validate_not_blank")]
    pub amount: String,
    #[validate(custom = "validate_not_blank")]
    pub installments: String,
    #[validate(custom = "validate_not_blank")]
    pub purpose: String,
}

/// Files a loan request. The ceiling is the member's savings times the
/// configured loan multiplier.
#[derive(Debug, Clone)]
pub struct LoanRequestCommand {
    pub draft: LoanDraft,
}

impl Command for LoanRequestCommand {
    type Output = LoanRequest;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<LoanRequest>, ServiceError> {
        let rules = workspace.rules();
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let amount = parser.positive("amount", &draft.amount);
        let installments =
            parser.integer_in("installments", &draft.installments, 1, rules.max_loan_installments);
        let purpose = parser.text("purpose", &draft.purpose);
        parser.finish()?;

        let member = require_member(workspace, &draft.member_id)?;
        let limit = member.savings_balance.saturating_mul(rules.loan_multiplier);
        if amount > limit {
            warn!(member = %member.id, requested = %amount, limit = %limit, "Loan exceeds limit");
            return Err(ServiceError::LimitExceeded {
                requested: amount,
                limit,
            });
        }

        let loan = LoanRequest {
            id: new_record_id(LoanRequest::ID_PREFIX),
            created_at: Utc::now(),
            updated_at: None,
            member_id: member.id,
            amount,
            installments,
            purpose,
            status: LoanStatus::Pending,
        };
        info!(id = %loan.id, amount = %amount, installments, "Loan requested");
        let effects = EffectList::new().insert(&loan)?;
        Ok(Plan::new(loan, effects))
    }
}

/// Moves a loan to any status; there is no enforced workflow.
#[derive(Debug, Clone)]
pub struct SetLoanStatusCommand {
    pub loan_id: String,
    pub status: LoanStatus,
}

impl Command for SetLoanStatusCommand {
    type Output = LoanRequest;

    #[instrument(skip(self, workspace), fields(loan = %self.loan_id, status = %self.status))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<LoanRequest>, ServiceError> {
        let loan = workspace
            .find::<LoanRequest>(&self.loan_id)
            .ok_or_else(|| ServiceError::not_found("Loan", &self.loan_id))?;
        let previous = loan.status;
        let loan = LoanRequest {
            status: self.status,
            updated_at: Some(Utc::now()),
            ..loan
        };
        info!(from = %previous, to = %loan.status, "Loan status changed");
        let effects = EffectList::new().replace(&loan)?;
        Ok(Plan::new(loan, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CollectionStore;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn seeded(balance: Decimal) -> (Workspace, Member) {
        let ws = Workspace::default();
        let member = ws
            .execute(&RegisterMemberCommand {
                draft: MemberDraft {
                    code: "E001".into(),
                    name: "Somchai".into(),
                    department: "Logistics".into(),
                    opening_balance: balance.to_string(),
                    joined_on: "2020-01-15".into(),
                },
            })
            .unwrap()
            .output;
        (ws, member)
    }

    fn savings(member: &Member, amount: &str) -> SavingsDraft {
        SavingsDraft {
            member_id: member.id.clone(),
            date: "2024-06-01".into(),
            amount: amount.into(),
            notes: String::new(),
        }
    }

    #[test]
    fn duplicate_member_code_rejected() {
        let (ws, _) = seeded(dec!(0));
        let result = ws.execute(&RegisterMemberCommand {
            draft: MemberDraft {
                code: "e001".into(),
                name: "Other".into(),
                joined_on: "2021-01-01".into(),
                ..MemberDraft::default()
            },
        });
        assert_matches!(result, Err(ServiceError::InvalidOperation(_)));
    }

    #[test]
    fn deposit_below_minimum_rejected() {
        let (ws, member) = seeded(dec!(0));
        let err = ws
            .execute(&DepositCommand {
                draft: savings(&member, "99"),
            })
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap().field_errors()["amount"][0].code, "below_minimum");
    }

    #[test]
    fn deposit_updates_balance() {
        let (ws, member) = seeded(dec!(1000));
        let deposit = ws
            .execute(&DepositCommand {
                draft: savings(&member, "250"),
            })
            .unwrap()
            .output;
        assert_eq!(deposit.balance_after, dec!(1250));
        assert_eq!(
            ws.find::<Member>(&member.id).unwrap().savings_balance,
            dec!(1250)
        );
    }

    #[test]
    fn withdrawal_equal_to_balance_allowed() {
        let (ws, member) = seeded(dec!(5000));
        let withdrawal = ws
            .execute(&WithdrawalCommand {
                draft: savings(&member, "5000"),
            })
            .unwrap()
            .output;
        assert_eq!(withdrawal.balance_after, Decimal::ZERO);
    }

    #[test]
    fn loan_limit_is_balance_times_multiplier() {
        let (ws, member) = seeded(dec!(1000));
        let draft = |amount: &str| LoanDraft {
            member_id: member.id.clone(),
            amount: amount.into(),
            installments: "12".into(),
            purpose: "Tuition".into(),
        };
        assert!(ws.execute(&LoanRequestCommand { draft: draft("5000") }).is_ok());
        assert_matches!(
            ws.execute(&LoanRequestCommand { draft: draft("5000.01") }),
            Err(ServiceError::LimitExceeded { .. })
        );
    }

    #[test]
    fn oversized_opening_balance_rejected() {
        let ws = Workspace::default();
        let err = ws
            .execute(&RegisterMemberCommand {
                draft: MemberDraft {
                    code: "E002".into(),
                    name: "Malee".into(),
                    opening_balance: "70000000000000000000000000000".into(),
                    joined_on: "2020-01-15".into(),
                    ..MemberDraft::default()
                },
            })
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().field_errors()["opening_balance"][0].code,
            "out_of_range"
        );
        assert!(ws.list::<Member>().is_empty());
    }

    #[test]
    fn balance_at_decimal_bound_does_not_panic() {
        let (ws, member) = seeded(dec!(0));
        let mut stored = ws.find::<Member>(&member.id).unwrap();
        stored.savings_balance = Decimal::MAX;
        ws.collection::<Member>().update(stored).unwrap();

        let loan = ws.execute(&LoanRequestCommand {
            draft: LoanDraft {
                member_id: member.id.clone(),
                amount: "1000000".into(),
                installments: "12".into(),
                purpose: "Truck".into(),
            },
        });
        assert!(loan.is_ok());

        let err = ws
            .execute(&DepositCommand {
                draft: savings(&member, "1000"),
            })
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap().field_errors()["amount"][0].code, "out_of_range");
        assert_eq!(ws.find::<Member>(&member.id).unwrap().savings_balance, Decimal::MAX);
        assert!(ws.list::<Deposit>().is_empty());
    }

    #[test]
    fn loan_status_can_move_anywhere() {
        let (ws, member) = seeded(dec!(1000));
        let loan = ws
            .execute(&LoanRequestCommand {
                draft: LoanDraft {
                    member_id: member.id.clone(),
                    amount: "100".into(),
                    installments: "1".into(),
                    purpose: "Repairs".into(),
                },
            })
            .unwrap()
            .output;
        for status in [LoanStatus::Completed, LoanStatus::Pending, LoanStatus::Rejected] {
            let updated = ws
                .execute(&SetLoanStatusCommand {
                    loan_id: loan.id.clone(),
                    status,
                })
                .unwrap()
                .output;
            assert_eq!(updated.status, status);
        }
        assert_matches!(
            ws.execute(&SetLoanStatusCommand {
                loan_id: "LN-missing".into(),
                status: LoanStatus::Approved,
            }),
            Err(ServiceError::NotFound(_))
        );
    }
}
