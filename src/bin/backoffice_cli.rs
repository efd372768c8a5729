use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use backoffice_engine::{
    commands::{
        delivery::SuctionDraft,
        fund::{LoanDraft, MemberDraft, SavingsDraft},
        sales::{QuotationDraft, TruckSaleDraft},
        Executed,
    },
    common::DateRange,
    config::{self, AppConfig},
    format::Formatter,
    models::{
        fund::{Deposit, LoanRequest, LoanStatus, Member, Withdrawal},
        reference::{Branch, LookupTable, ReferenceData},
        sales::{Order, OrderStatus, Quotation, TruckSale},
        Record,
    },
    services::{
        sales::TruckSaleSummary, FundSummary, SalesSummary, Services, SuctionSummary,
    },
    store::Workspace,
    view::{
        column_options, summary::sum_by, ColumnKind, ColumnSpec, DerivedView, TableRenderer,
        TableView,
    },
    ServiceError,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    let outcome = match cli.command {
        Commands::Suction(command) => handle_suction_command(&context, command, cli.json),
        Commands::Fund(command) => handle_fund_command(&context, command, cli.json),
        Commands::Sales(command) => handle_sales_command(&context, command, cli.json),
    };

    outcome.map_err(|err| match err.downcast::<ServiceError>() {
        Ok(service_error) => describe_service_error(service_error),
        Err(other) => other,
    })
}

#[derive(Parser)]
#[command(name = "backoffice", about = "Station back-office tables and forms", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Suction(SuctionCommands),
    #[command(subcommand)]
    Fund(FundCommands),
    #[command(subcommand)]
    Sales(SalesCommands),
}

/// Filter and sort options shared by every listing.
#[derive(Args, Clone, Default)]
struct ViewArgs {
    #[arg(long, help = "Case-insensitive text search")]
    search: Option<String>,
    #[arg(
        long = "filter",
        value_parser = parse_key_value,
        help = "Column filter as column=value; `all` disables it"
    )]
    filters: Vec<(String, String)>,
    #[arg(long, help = "Inclusive start date (YYYY-MM-DD)")]
    from: Option<String>,
    #[arg(long, help = "Inclusive end date (YYYY-MM-DD)")]
    to: Option<String>,
    #[arg(long, help = "Column to sort by, ascending")]
    sort: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, requires = "sort", help = "Sort descending")]
    desc: bool,
    #[arg(long, help = "List the distinct values available for a column filter")]
    options: Option<String>,
}

impl ViewArgs {
    fn table_view(&self) -> TableView {
        let mut table = TableView::default();
        if let Some(search) = &self.search {
            table.set_search(search.as_str());
        }
        for (column, value) in &self.filters {
            table.set_column_filter(column.as_str(), value.as_str());
        }
        table.set_date_range(DateRange {
            from: self.from.clone(),
            to: self.to.clone(),
        });
        if let Some(column) = &self.sort {
            table.toggle_sort(column);
            if self.desc {
                table.toggle_sort(column);
            }
        }
        table
    }
}

#[derive(Subcommand)]
enum SuctionCommands {
    List(ViewArgs),
    Record(SuctionArgs),
    Edit(EditSuctionArgs),
    Stock,
}

#[derive(Args)]
struct SuctionArgs {
    #[arg(long, help = "Operation date (YYYY-MM-DD)")]
    date: String,
    #[arg(long, help = "Branch id")]
    branch: String,
    #[arg(long, help = "Oil grade, e.g. diesel or gasohol95")]
    oil_type: String,
    #[arg(long, default_value = "suction", help = "suction or sell")]
    mode: String,
    #[arg(long, help = "Quantity in liters")]
    liters: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<SuctionArgs> for SuctionDraft {
    fn from(args: SuctionArgs) -> Self {
        SuctionDraft {
            date: args.date,
            branch_id: args.branch,
            oil_type: args.oil_type,
            mode: args.mode,
            quantity_liters: args.liters,
            notes: args.notes,
        }
    }
}

#[derive(Args)]
struct EditSuctionArgs {
    #[arg(long, help = "Suction log id")]
    id: String,
    #[command(flatten)]
    fields: SuctionArgs,
}

#[derive(Subcommand)]
enum FundCommands {
    Members(ViewArgs),
    Register(RegisterArgs),
    Deposits(ViewArgs),
    Deposit(SavingsArgs),
    Withdrawals(ViewArgs),
    Withdraw(SavingsArgs),
    Loans(ViewArgs),
    Loan(LoanArgs),
    LoanStatus(LoanStatusArgs),
    Statement(StatementArgs),
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long, help = "Employee code")]
    code: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long, default_value = "")]
    opening_balance: String,
    #[arg(long, help = "Join date (YYYY-MM-DD)")]
    joined_on: String,
}

#[derive(Args)]
struct SavingsArgs {
    #[arg(long, help = "Member id")]
    member: String,
    #[arg(long, help = "Transaction date (YYYY-MM-DD)")]
    date: String,
    #[arg(long)]
    amount: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<SavingsArgs> for SavingsDraft {
    fn from(args: SavingsArgs) -> Self {
        SavingsDraft {
            member_id: args.member,
            date: args.date,
            amount: args.amount,
            notes: args.notes,
        }
    }
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long, help = "Member id")]
    member: String,
    #[arg(long)]
    amount: String,
    #[arg(long, help = "Number of monthly installments")]
    installments: String,
    #[arg(long)]
    purpose: String,
}

#[derive(Args)]
struct LoanStatusArgs {
    #[arg(long, help = "Loan id")]
    id: String,
    #[arg(long, value_parser = parse_enum::<LoanStatus>, help = "Pending, Approved, Rejected or Completed")]
    status: LoanStatus,
}

#[derive(Args)]
struct StatementArgs {
    #[arg(long, help = "Member id")]
    member: String,
}

#[derive(Subcommand)]
enum SalesCommands {
    Quotations(ViewArgs),
    Quote(QuoteArgs),
    Convert(ConvertArgs),
    Orders(ViewArgs),
    OrderStatus(OrderStatusArgs),
    TruckSales(ViewArgs),
    TruckSale(TruckSaleArgs),
}

#[derive(Args)]
struct QuoteArgs {
    #[arg(long, help = "Branch id")]
    branch: String,
    #[arg(long)]
    customer: String,
    #[arg(long)]
    oil_type: String,
    #[arg(long)]
    liters: String,
    #[arg(long)]
    unit_price: String,
}

#[derive(Args)]
struct ConvertArgs {
    #[arg(long, help = "Quotation id")]
    id: String,
}

#[derive(Args)]
struct OrderStatusArgs {
    #[arg(long, help = "Order id")]
    id: String,
    #[arg(long, value_parser = parse_enum::<OrderStatus>)]
    status: OrderStatus,
}

#[derive(Args)]
struct TruckSaleArgs {
    #[arg(long, help = "Sale date (YYYY-MM-DD)")]
    date: String,
    #[arg(long, help = "Branch id")]
    branch: String,
    #[arg(long)]
    oil_type: String,
    #[arg(long)]
    liters: String,
    #[arg(long)]
    unit_price: String,
    #[arg(long)]
    buyer: String,
}

const SUCTION_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("id", "ID", ColumnKind::Text).unsortable(),
    ColumnSpec::new("date", "Date", ColumnKind::Date),
    ColumnSpec::new("branchId", "Branch", ColumnKind::Lookup).filterable(),
    ColumnSpec::new("oilType", "Oil", ColumnKind::Text).filterable(),
    ColumnSpec::new("mode", "Mode", ColumnKind::Text).filterable(),
    ColumnSpec::new("quantityLiters", "Quantity", ColumnKind::Liters),
    ColumnSpec::new("notes", "Notes", ColumnKind::Text).unsortable(),
];

const MEMBER_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::new("code", "Code", ColumnKind::Text),
    ColumnSpec::new("name", "Name", ColumnKind::Text),
    ColumnSpec::new("department", "Department", ColumnKind::Text).filterable(),
    ColumnSpec::new("savingsBalance", "Savings", ColumnKind::Currency),
    ColumnSpec::new("joinedOn", "Joined", ColumnKind::Date),
];

const SAVINGS_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::new("date", "Date", ColumnKind::Date),
    ColumnSpec::new("memberId", "Member", ColumnKind::Lookup).filterable(),
    ColumnSpec::new("amount", "Amount", ColumnKind::Currency),
    ColumnSpec::new("balanceAfter", "Balance", ColumnKind::Currency),
    ColumnSpec::new("notes", "Notes", ColumnKind::Text).unsortable(),
];

const LOAN_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("createdAt", "Requested", ColumnKind::Timestamp),
    ColumnSpec::new("memberId", "Member", ColumnKind::Lookup).filterable(),
    ColumnSpec::new("amount", "Amount", ColumnKind::Currency),
    ColumnSpec::new("installments", "Months", ColumnKind::Number { decimals: 0 }),
    ColumnSpec::new("monthlyInstallment", "Monthly", ColumnKind::Currency),
    ColumnSpec::new("purpose", "Purpose", ColumnKind::Text).unsortable(),
    ColumnSpec::new("status", "Status", ColumnKind::Text).filterable(),
];

const QUOTATION_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("id", "ID", ColumnKind::Text).unsortable(),
    ColumnSpec::new("createdAt", "Created", ColumnKind::Timestamp),
    ColumnSpec::new("customer", "Customer", ColumnKind::Text),
    ColumnSpec::new("oilType", "Oil", ColumnKind::Text).filterable(),
    ColumnSpec::new("quantityLiters", "Quantity", ColumnKind::Liters),
    ColumnSpec::new("total", "Total", ColumnKind::Currency),
    ColumnSpec::new("status", "Status", ColumnKind::Text).filterable(),
];

const ORDER_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("id", "ID", ColumnKind::Text).unsortable(),
    ColumnSpec::new("quotationId", "Quotation", ColumnKind::Text).unsortable(),
    ColumnSpec::new("branchId", "Branch", ColumnKind::Lookup).filterable(),
    ColumnSpec::new("customer", "Customer", ColumnKind::Text),
    ColumnSpec::new("quantityLiters", "Quantity", ColumnKind::Liters),
    ColumnSpec::new("total", "Total", ColumnKind::Currency),
    ColumnSpec::new("status", "Status", ColumnKind::Text).filterable(),
];

const TRUCK_SALE_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("date", "Date", ColumnKind::Date),
    ColumnSpec::new("branchId", "Branch", ColumnKind::Lookup).filterable(),
    ColumnSpec::new("oilType", "Oil", ColumnKind::Text).filterable(),
    ColumnSpec::new("quantityLiters", "Quantity", ColumnKind::Liters),
    ColumnSpec::new("unitPrice", "Price", ColumnKind::Currency),
    ColumnSpec::new("total", "Total", ColumnKind::Currency),
    ColumnSpec::new("buyer", "Buyer", ColumnKind::Text),
];

struct CliContext {
    _config: AppConfig,
    workspace: Workspace,
    services: Services,
    formatter: Formatter,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let workspace = Workspace::from_config(&config, ReferenceData::default())
            .context("failed to open storage")?;
        let reference = ReferenceData::load(workspace.persistence(), default_branches());
        debug!(branches = reference.branches.items().len(), "Reference data loaded");
        let workspace = workspace.with_reference(reference);

        Ok(Self {
            formatter: config.formatter(),
            services: Services::new(workspace.clone()),
            workspace,
            _config: config,
        })
    }

    fn branches(&self) -> &LookupTable<Branch> {
        &self.workspace.reference().branches
    }
}

fn default_branches() -> Vec<Branch> {
    vec![
        Branch::new(1, "สาขาบางนา", "Bangkok"),
        Branch::new(2, "สาขาระยอง", "East"),
        Branch::new(3, "สาขาลำปาง", "North"),
    ]
}

#[derive(Serialize)]
struct Listing<'a, R, S> {
    rows: &'a [&'a R],
    shown: usize,
    total: usize,
    summary: S,
}

/// Derives the view for `records` and prints it with its summary.
fn show_listing<R, S>(
    context: &CliContext,
    records: &[R],
    args: &ViewArgs,
    renderer: TableRenderer<'_>,
    summarize: impl Fn(&[&R]) -> S,
    summary_lines: impl Fn(&S, &Formatter) -> Vec<String>,
    json: bool,
) -> Result<()>
where
    R: Record,
    S: Serialize,
{
    if let Some(column) = &args.options {
        let options = column_options(records, column);
        if json {
            return print_json(&options);
        }
        for option in options {
            println!("{}", option);
        }
        return Ok(());
    }

    let table = args.table_view();
    let view: DerivedView<'_, R> = table.derive(records);
    let summary = summarize(&view.rows);

    if json {
        return print_json(&Listing {
            rows: &view.rows,
            shown: view.len(),
            total: view.total,
            summary,
        });
    }

    println!("{}", renderer.render(&view, &table.sort, &table.filter));
    for line in summary_lines(&summary, &context.formatter) {
        println!("{}", line);
    }
    Ok(())
}

fn handle_suction_command(context: &CliContext, command: SuctionCommands, json: bool) -> Result<()> {
    let service = &context.services.delivery;
    match command {
        SuctionCommands::List(args) => {
            let records = service.suction_logs();
            let renderer = TableRenderer::new(&SUCTION_COLUMNS, &context.formatter)
                .with_lookup("branchId", context.branches());
            show_listing(
                context,
                &records,
                &args,
                renderer,
                SuctionSummary::from_rows,
                |summary, fmt| {
                    let mut lines = vec![
                        format!("Suction: {}", fmt.liters(summary.suction_liters)),
                        format!("Sell: {}", fmt.liters(summary.sell_liters)),
                    ];
                    lines.extend(
                        summary
                            .by_oil_type
                            .iter()
                            .map(|(oil, liters)| format!("  {}: {}", oil, fmt.liters(*liters))),
                    );
                    lines
                },
                json,
            )
        }
        SuctionCommands::Record(args) => {
            let executed = service.record_suction(args.into())?;
            report_written(context, &executed, json, |log, fmt| {
                format!(
                    "Recorded {} • {} {} • {}",
                    log.id,
                    log.mode,
                    log.oil_type,
                    fmt.liters(log.quantity_liters)
                )
            })
        }
        SuctionCommands::Edit(args) => {
            let executed = service.edit_suction(&args.id, args.fields.into())?;
            report_written(context, &executed, json, |log, fmt| {
                format!("Updated {} • {}", log.id, fmt.liters(log.quantity_liters))
            })
        }
        SuctionCommands::Stock => {
            let levels = service.stock_levels();
            if json {
                return print_json(&levels);
            }
            for (oil, liters) in &levels {
                println!("{}: {}", oil, context.formatter.liters(*liters));
            }
            Ok(())
        }
    }
}

fn handle_fund_command(context: &CliContext, command: FundCommands, json: bool) -> Result<()> {
    let service = &context.services.fund;
    let members = LookupTable::new(service.members());
    let fund_lines = |summary: &FundSummary, fmt: &Formatter| {
        vec![
            format!("Deposits: {}", fmt.currency(summary.deposits_total)),
            format!("Withdrawals: {}", fmt.currency(summary.withdrawals_total)),
            format!("Pending loans: {}", summary.pending_loans),
            format!("Approved loans: {}", fmt.currency(summary.approved_loan_total)),
        ]
    };

    match command {
        FundCommands::Members(args) => {
            let records = service.members();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&MEMBER_COLUMNS, &context.formatter),
                |rows: &[&Member]| sum_by(rows, |member| member.savings_balance),
                |total: &Decimal, fmt: &Formatter| {
                    vec![format!("Total savings: {}", fmt.currency(*total))]
                },
                json,
            )
        }
        FundCommands::Register(args) => {
            let executed = service.register_member(MemberDraft {
                code: args.code,
                name: args.name,
                department: args.department,
                opening_balance: args.opening_balance,
                joined_on: args.joined_on,
            })?;
            report_written(context, &executed, json, |member, fmt| {
                format!(
                    "Registered {} {} ({}) • {}",
                    member.code,
                    member.name,
                    member.id,
                    fmt.currency(member.savings_balance)
                )
            })
        }
        FundCommands::Deposits(args) => {
            let records = service.deposits();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&SAVINGS_COLUMNS, &context.formatter)
                    .with_lookup("memberId", &members),
                |rows: &[&Deposit]| FundSummary::from_rows(rows, &[], &[]),
                fund_lines,
                json,
            )
        }
        FundCommands::Deposit(args) => {
            let executed = service.deposit(args.into())?;
            report_written(context, &executed, json, |deposit, fmt| {
                format!(
                    "Deposited {} • balance {}",
                    fmt.currency(deposit.amount),
                    fmt.currency(deposit.balance_after)
                )
            })
        }
        FundCommands::Withdrawals(args) => {
            let records = service.withdrawals();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&SAVINGS_COLUMNS, &context.formatter)
                    .with_lookup("memberId", &members),
                |rows: &[&Withdrawal]| FundSummary::from_rows(&[], rows, &[]),
                fund_lines,
                json,
            )
        }
        FundCommands::Withdraw(args) => {
            let executed = service.withdraw(args.into())?;
            report_written(context, &executed, json, |withdrawal, fmt| {
                format!(
                    "Withdrew {} • balance {}",
                    fmt.currency(withdrawal.amount),
                    fmt.currency(withdrawal.balance_after)
                )
            })
        }
        FundCommands::Loans(args) => {
            let records = service.loans();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&LOAN_COLUMNS, &context.formatter)
                    .with_lookup("memberId", &members),
                |rows: &[&LoanRequest]| FundSummary::from_rows(&[], &[], rows),
                fund_lines,
                json,
            )
        }
        FundCommands::Loan(args) => {
            let executed = service.request_loan(LoanDraft {
                member_id: args.member,
                amount: args.amount,
                installments: args.installments,
                purpose: args.purpose,
            })?;
            report_written(context, &executed, json, |loan, fmt| {
                format!(
                    "Loan {} requested • {} over {} months ({} / month)",
                    loan.id,
                    fmt.currency(loan.amount),
                    loan.installments,
                    fmt.currency(loan.monthly_installment())
                )
            })
        }
        FundCommands::LoanStatus(args) => {
            let executed = service.set_loan_status(&args.id, args.status)?;
            report_written(context, &executed, json, |loan, _| {
                format!("Loan {} is now {}", loan.id, loan.status)
            })
        }
        FundCommands::Statement(args) => {
            let lines = service.statement(&args.member)?;
            if json {
                return print_json(&lines);
            }
            println!("{}", members.label_or_placeholder(&args.member));
            for line in &lines {
                println!(
                    "{}  {:<10} {:>14} {:>14}",
                    context.formatter.date(&line.date),
                    line.kind,
                    context.formatter.currency(line.amount),
                    context.formatter.currency(line.balance_after)
                );
            }
            Ok(())
        }
    }
}

fn handle_sales_command(context: &CliContext, command: SalesCommands, json: bool) -> Result<()> {
    let service = &context.services.sales;
    match command {
        SalesCommands::Quotations(args) => {
            let records = service.quotations();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&QUOTATION_COLUMNS, &context.formatter),
                |rows: &[&Quotation]| sum_by(rows, Quotation::total),
                |total: &Decimal, fmt: &Formatter| {
                    vec![format!("Quoted: {}", fmt.currency(*total))]
                },
                json,
            )
        }
        SalesCommands::Quote(args) => {
            let executed = service.create_quotation(QuotationDraft {
                branch_id: args.branch,
                customer: args.customer,
                oil_type: args.oil_type,
                quantity_liters: args.liters,
                unit_price: args.unit_price,
            })?;
            report_written(context, &executed, json, |quote, fmt| {
                format!("Quotation {} • {}", quote.id, fmt.currency(quote.total()))
            })
        }
        SalesCommands::Convert(args) => {
            let executed = service.convert_quotation(&args.id)?;
            report_written(context, &executed, json, |order, fmt| {
                format!(
                    "Order {} created from {} • {}",
                    order.id,
                    order.quotation_id,
                    fmt.currency(order.total())
                )
            })
        }
        SalesCommands::Orders(args) => {
            let records = service.orders();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&ORDER_COLUMNS, &context.formatter)
                    .with_lookup("branchId", context.branches()),
                |rows: &[&Order]| SalesSummary::from_rows(rows),
                |summary: &SalesSummary, fmt: &Formatter| {
                    let mut lines = vec![
                        format!("Orders: {}", summary.orders),
                        format!("Liters: {}", fmt.liters(summary.liters)),
                        format!("Revenue: {}", fmt.currency(summary.revenue)),
                    ];
                    lines.extend(
                        summary
                            .by_status
                            .iter()
                            .map(|(status, count)| format!("  {}: {}", status, count)),
                    );
                    lines
                },
                json,
            )
        }
        SalesCommands::OrderStatus(args) => {
            let executed = service.set_order_status(&args.id, args.status)?;
            report_written(context, &executed, json, |order, _| {
                format!("Order {} is now {}", order.id, order.status)
            })
        }
        SalesCommands::TruckSales(args) => {
            let records = service.truck_sales();
            show_listing(
                context,
                &records,
                &args,
                TableRenderer::new(&TRUCK_SALE_COLUMNS, &context.formatter)
                    .with_lookup("branchId", context.branches()),
                |rows: &[&TruckSale]| TruckSaleSummary::from_rows(rows),
                |summary: &TruckSaleSummary, fmt: &Formatter| {
                    vec![
                        format!("Sales: {}", summary.sales),
                        format!("Liters: {}", fmt.liters(summary.liters)),
                        format!("Revenue: {}", fmt.currency(summary.revenue)),
                    ]
                },
                json,
            )
        }
        SalesCommands::TruckSale(args) => {
            let executed = service.record_truck_sale(TruckSaleDraft {
                date: args.date,
                branch_id: args.branch,
                oil_type: args.oil_type,
                quantity_liters: args.liters,
                unit_price: args.unit_price,
                buyer: args.buyer,
            })?;
            report_written(context, &executed, json, |sale, fmt| {
                format!(
                    "Truck sale {} • {} to {} • {}",
                    sale.id,
                    fmt.liters(sale.quantity_liters),
                    sale.buyer,
                    fmt.currency(sale.total())
                )
            })
        }
    }
}

/// Prints the written record and surfaces any write that failed after
/// staging.
fn report_written<T: Serialize>(
    context: &CliContext,
    executed: &Executed<T>,
    json: bool,
    describe: impl Fn(&T, &Formatter) -> String,
) -> Result<()> {
    if json {
        print_json(&executed.output)?;
    } else {
        println!("{}", describe(&executed.output, &context.formatter));
    }
    if !executed.report.is_complete() {
        warn!(report = %executed.report, "Some collections were not saved");
        return Err(anyhow!("partially saved: {}", executed.report));
    }
    Ok(())
}

fn describe_service_error(err: ServiceError) -> anyhow::Error {
    let mut message = err.user_message();
    if let Some(errors) = err.field_errors() {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        for (field, problems) in fields {
            for problem in problems {
                let text = problem
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| problem.code.to_string());
                message.push_str(&format!("\n  {}: {}", field, text));
            }
        }
    }
    anyhow!(message)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{raw}', expected column=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("filter column cannot be empty".to_string());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_enum<T: FromStr>(raw: &str) -> Result<T, String> {
    T::from_str(raw.trim()).map_err(|_| format!("unknown value '{raw}'"))
}
