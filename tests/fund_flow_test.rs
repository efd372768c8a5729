mod common;

use assert_matches::assert_matches;
use backoffice_engine::{
    commands::fund::{LoanDraft, SavingsDraft, WithdrawalCommand},
    form::{FormMode, FormSession},
    models::fund::{LoanStatus, Member, Withdrawal},
    services::{FundService, FundSummary},
    store::BusinessRules,
    view::TableView,
    ServiceError,
};
use rust_decimal_macros::dec;
use rstest::rstest;

use common::{memory_workspace, register_member, snapshot};

fn withdrawal_draft(member: &Member, amount: &str) -> SavingsDraft {
    SavingsDraft {
        member_id: member.id.clone(),
        date: "2024-06-15".to_string(),
        amount: amount.to_string(),
        notes: String::new(),
    }
}

#[test]
fn over_balance_withdrawal_is_rejected_and_draft_kept() {
    let workspace = memory_workspace();
    let member = register_member(&workspace, "E001", "5000");
    let before = snapshot(&workspace);

    let mut form = FormSession::<SavingsDraft>::create();
    *form.draft_mut() = withdrawal_draft(&member, "6000");
    let result = form.submit(&workspace, |_, draft| WithdrawalCommand {
        draft: draft.clone(),
    });

    assert_matches!(
        result,
        Err(ServiceError::InsufficientBalance { requested, available })
            if requested == dec!(6000) && available == dec!(5000)
    );
    assert!(form.is_open());
    assert_eq!(form.draft().amount, "6000");
    assert_matches!(
        form.last_error(),
        Some(ServiceError::InsufficientBalance { .. })
    );
    assert_eq!(snapshot(&workspace), before);
    assert!(workspace.list::<Withdrawal>().is_empty());
    assert_eq!(
        workspace.find::<Member>(&member.id).unwrap().savings_balance,
        dec!(5000)
    );

    form.draft_mut().amount = "5000".to_string();
    let executed = form
        .submit(&workspace, |_, draft| WithdrawalCommand {
            draft: draft.clone(),
        })
        .unwrap();
    assert_eq!(executed.output.balance_after, dec!(0));
    assert!(!form.is_open());
    assert_eq!(form.mode(), &FormMode::Create);
}

#[rstest]
#[case("", "required")]
#[case("abc", "not_a_number")]
#[case("0", "not_positive")]
#[case("-10", "not_positive")]
fn invalid_amounts_never_write(#[case] amount: &str, #[case] code: &str) {
    let workspace = memory_workspace();
    let member = register_member(&workspace, "E002", "1000");
    let before = snapshot(&workspace);

    let err = workspace
        .execute(&WithdrawalCommand {
            draft: withdrawal_draft(&member, amount),
        })
        .unwrap_err();

    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.field_errors()["amount"][0].code, code);
    assert_eq!(snapshot(&workspace), before);
}

#[test]
fn unknown_member_is_not_found() {
    let workspace = memory_workspace();
    let member = Member {
        id: "MB-missing".to_string(),
        ..register_member(&workspace, "E003", "0")
    };
    assert_matches!(
        workspace.execute(&WithdrawalCommand {
            draft: withdrawal_draft(&member, "1"),
        }),
        Err(ServiceError::NotFound(_))
    );
}

#[test]
fn loan_limits_follow_configured_rules() {
    let workspace = memory_workspace().with_rules(BusinessRules {
        min_deposit: dec!(500),
        loan_multiplier: dec!(2),
        max_loan_installments: 12,
    });
    let service = FundService::new(workspace.clone());
    let member = register_member(&workspace, "E004", "1000");

    let loan = |amount: &str, installments: &str| LoanDraft {
        member_id: member.id.clone(),
        amount: amount.to_string(),
        installments: installments.to_string(),
        purpose: "Motorbike".to_string(),
    };

    assert_matches!(
        service.request_loan(loan("2001", "12")),
        Err(ServiceError::LimitExceeded { limit, .. }) if limit == dec!(2000)
    );
    let err = service.request_loan(loan("1000", "13")).unwrap_err();
    assert!(err.field_errors().unwrap().field_errors().contains_key("installments"));

    let accepted = service.request_loan(loan("2000", "12")).unwrap().output;
    assert_eq!(accepted.status, LoanStatus::Pending);
    assert_eq!(accepted.monthly_installment().round_dp(2), dec!(166.67));

    let err = service.deposit(withdrawal_draft(&member, "499")).unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().field_errors()["amount"][0].code,
        "below_minimum"
    );
}

#[test]
fn fund_summary_follows_the_filtered_tables() {
    let workspace = memory_workspace();
    let service = FundService::new(workspace.clone());
    let first = register_member(&workspace, "E010", "0");
    let second = register_member(&workspace, "E011", "0");
    service.deposit(withdrawal_draft(&first, "1000")).unwrap();
    service.deposit(withdrawal_draft(&second, "300")).unwrap();
    service.withdraw(withdrawal_draft(&first, "200")).unwrap();

    let loan = service
        .request_loan(LoanDraft {
            member_id: first.id.clone(),
            amount: "500".to_string(),
            installments: "5".to_string(),
            purpose: "School".to_string(),
        })
        .unwrap()
        .output;
    service.set_loan_status(&loan.id, LoanStatus::Approved).unwrap();

    let deposits = service.deposits();
    let withdrawals = service.withdrawals();
    let loans = service.loans();

    let mut table = TableView::default();
    table.set_column_filter("memberId", first.id.as_str());
    let deposit_rows = table.derive(&deposits).rows;
    let withdrawal_rows = table.derive(&withdrawals).rows;
    let loan_rows = table.derive(&loans).rows;

    let summary = FundSummary::from_rows(&deposit_rows, &withdrawal_rows, &loan_rows);
    assert_eq!(summary.deposits_total, dec!(1000));
    assert_eq!(summary.withdrawals_total, dec!(200));
    assert_eq!(summary.pending_loans, 0);
    assert_eq!(summary.approved_loan_total, dec!(500));
    assert_eq!(summary.net_savings(), dec!(800));
}
