use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::commands::fund::{
    DepositCommand, LoanDraft, LoanRequestCommand, MemberDraft, RegisterMemberCommand,
    SavingsDraft, SetLoanStatusCommand, WithdrawalCommand,
};
use crate::commands::Executed;
use crate::errors::ServiceError;
use crate::models::fund::{Deposit, LoanRequest, LoanStatus, Member, Withdrawal};
use crate::store::Workspace;
use crate::view::summary::{count_where, sum_by, sum_where};

/// Summary cards of the welfare fund page, computed from the rows shown in
/// each table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSummary {
    pub deposits_total: Decimal,
    pub withdrawals_total: Decimal,
    pub pending_loans: usize,
    pub approved_loan_total: Decimal,
}

impl FundSummary {
    pub fn from_rows(
        deposits: &[&Deposit],
        withdrawals: &[&Withdrawal],
        loans: &[&LoanRequest],
    ) -> Self {
        Self {
            deposits_total: sum_by(deposits, |deposit| deposit.amount),
            withdrawals_total: sum_by(withdrawals, |withdrawal| withdrawal.amount),
            pending_loans: count_where(loans, |loan| loan.status == LoanStatus::Pending),
            approved_loan_total: sum_where(
                loans,
                |loan| loan.status == LoanStatus::Approved,
                |loan| loan.amount,
            ),
        }
    }

    pub fn net_savings(&self) -> Decimal {
        self.deposits_total - self.withdrawals_total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatementEntryKind {
    Deposit,
    Withdrawal,
}

/// One line of a member passbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    pub id: String,
    pub date: String,
    pub kind: StatementEntryKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
}

#[derive(Debug, Clone)]
pub struct FundService {
    workspace: Workspace,
}

impl FundService {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn members(&self) -> Vec<Member> {
        self.workspace.list()
    }

    pub fn deposits(&self) -> Vec<Deposit> {
        self.workspace.list()
    }

    pub fn withdrawals(&self) -> Vec<Withdrawal> {
        self.workspace.list()
    }

    pub fn loans(&self) -> Vec<LoanRequest> {
        self.workspace.list()
    }

    /// Deposits and withdrawals of one member, oldest first.
    pub fn statement(&self, member_id: &str) -> Result<Vec<StatementLine>, ServiceError> {
        self.workspace
            .find::<Member>(member_id)
            .ok_or_else(|| ServiceError::not_found("Member", member_id))?;

        let deposits = self.deposits().into_iter().map(|d| (StatementEntryKind::Deposit, d.0));
        let withdrawals = self
            .withdrawals()
            .into_iter()
            .map(|w| (StatementEntryKind::Withdrawal, w.0));
        let mut lines: Vec<_> = deposits
            .chain(withdrawals)
            .filter(|(_, tx)| tx.member_id == member_id)
            .collect();
        lines.sort_by(|(_, a), (_, b)| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        Ok(lines
            .into_iter()
            .map(|(kind, tx)| StatementLine {
                id: tx.id,
                date: tx.date,
                kind,
                amount: tx.amount,
                balance_after: tx.balance_after,
            })
            .collect())
    }

    #[instrument(skip(self, draft))]
    pub fn register_member(&self, draft: MemberDraft) -> Result<Executed<Member>, ServiceError> {
        self.workspace.execute(&RegisterMemberCommand { draft })
    }

    #[instrument(skip(self, draft))]
    pub fn deposit(&self, draft: SavingsDraft) -> Result<Executed<Deposit>, ServiceError> {
        self.workspace.execute(&DepositCommand { draft })
    }

    #[instrument(skip(self, draft))]
    pub fn withdraw(&self, draft: SavingsDraft) -> Result<Executed<Withdrawal>, ServiceError> {
        self.workspace.execute(&WithdrawalCommand { draft })
    }

    #[instrument(skip(self, draft))]
    pub fn request_loan(&self, draft: LoanDraft) -> Result<Executed<LoanRequest>, ServiceError> {
        self.workspace.execute(&LoanRequestCommand { draft })
    }

    #[instrument(skip(self))]
    pub fn set_loan_status(
        &self,
        loan_id: &str,
        status: LoanStatus,
    ) -> Result<Executed<LoanRequest>, ServiceError> {
        self.workspace.execute(&SetLoanStatusCommand {
            loan_id: loan_id.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn statement_interleaves_by_date() {
        let service = FundService::new(Workspace::default());
        let member = service
            .register_member(MemberDraft {
                code: "E100".into(),
                name: "Anong".into(),
                opening_balance: "1000".into(),
                joined_on: "2022-02-02".into(),
                ..MemberDraft::default()
            })
            .unwrap()
            .output;
        let draft = |date: &str, amount: &str| SavingsDraft {
            member_id: member.id.clone(),
            date: date.into(),
            amount: amount.into(),
            notes: String::new(),
        };
        service.deposit(draft("2024-02-01", "500")).unwrap();
        service.withdraw(draft("2024-01-15", "200")).unwrap();

        let lines = service.statement(&member.id).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, StatementEntryKind::Withdrawal);
        assert_eq!(lines[0].balance_after, dec!(1300));
        assert_eq!(lines[1].balance_after, dec!(1500));
        assert!(service.statement("MB-none").is_err());
    }

    #[test]
    fn summary_counts_only_given_rows() {
        let service = FundService::new(Workspace::default());
        let loans = service.loans();
        let rows: Vec<&LoanRequest> = loans.iter().collect();
        let summary = FundSummary::from_rows(&[], &[], &rows);
        assert_eq!(summary, FundSummary::default());
        assert_eq!(summary.net_savings(), Decimal::ZERO);
    }
}
