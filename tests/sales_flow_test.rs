mod common;

use assert_matches::assert_matches;
use backoffice_engine::{
    commands::sales::{QuotationDraft, TruckSaleDraft},
    models::sales::{Order, OrderStatus, Quotation, QuotationStatus},
    services::{sales::TruckSaleSummary, DeliveryService, SalesService, SalesSummary},
    store::CollectionStore,
    view::TableView,
    ServiceError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{memory_workspace, suction_draft, BANG_NA, RAYONG};

fn quote(branch: u32, customer: &str, liters: &str, price: &str) -> QuotationDraft {
    QuotationDraft {
        branch_id: branch.to_string(),
        customer: customer.to_string(),
        oil_type: "diesel".to_string(),
        quantity_liters: liters.to_string(),
        unit_price: price.to_string(),
    }
}

#[test]
fn quotation_to_order_lifecycle() {
    let sales = SalesService::new(memory_workspace());
    let first = sales
        .create_quotation(quote(BANG_NA, "Siam Transport", "1000", "30"))
        .unwrap()
        .output;
    sales
        .create_quotation(quote(RAYONG, "Eastern Farms", "400", "31.25"))
        .unwrap();

    let order = sales.convert_quotation(&first.id).unwrap().output;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.quotation_id, first.id);

    let delivered = sales
        .set_order_status(&order.id, OrderStatus::Delivered)
        .unwrap()
        .output;
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let quotations: Vec<Quotation> = sales.quotations();
    let mut table = TableView::default();
    table.set_column_filter("status", "Open");
    let open = table.derive(&quotations);
    assert_eq!(open.len(), 1);
    assert_eq!(open.rows[0].customer, "Eastern Farms");

    let orders: Vec<Order> = sales.orders();
    let view = TableView::default().derive(&orders);
    let summary = SalesSummary::from_rows(&view.rows);
    assert_eq!(summary.orders, 1);
    assert_eq!(summary.revenue, dec!(30000));
    assert_eq!(summary.by_status[&OrderStatus::Delivered], 1);

    let converted = quotations
        .iter()
        .find(|quotation| quotation.id == first.id)
        .unwrap();
    assert_eq!(converted.status, QuotationStatus::Converted);
}

#[test]
fn oversized_stored_quotation_saturates_instead_of_panicking() {
    let workspace = memory_workspace();
    let sales = SalesService::new(workspace.clone());
    let small = sales
        .create_quotation(quote(BANG_NA, "Siam Transport", "1000", "30"))
        .unwrap()
        .output;
    let huge = sales
        .create_quotation(quote(RAYONG, "Imported Ledger", "1", "1"))
        .unwrap()
        .output;
    workspace
        .collection::<Quotation>()
        .update(Quotation {
            quantity_liters: Decimal::MAX,
            unit_price: dec!(2),
            ..huge.clone()
        })
        .unwrap();

    let quotations = sales.quotations();
    let mut table = TableView::default();
    table.toggle_sort("total");
    let ids: Vec<&str> = table
        .derive(&quotations)
        .rows
        .iter()
        .map(|quotation| quotation.id.as_str())
        .collect();
    assert_eq!(ids, vec![small.id.as_str(), huge.id.as_str()]);

    sales.convert_quotation(&small.id).unwrap();
    sales.convert_quotation(&huge.id).unwrap();
    let orders: Vec<Order> = sales.orders();
    let view = TableView::default().derive(&orders);
    let summary = SalesSummary::from_rows(&view.rows);
    assert_eq!(summary.orders, 2);
    assert_eq!(summary.revenue, Decimal::MAX);
}

#[test]
fn quotation_for_unknown_branch_is_not_found() {
    let sales = SalesService::new(memory_workspace());
    assert_matches!(
        sales.create_quotation(quote(42, "Nobody", "10", "1")),
        Err(ServiceError::NotFound(_))
    );
    assert!(sales.quotations().is_empty());
}

#[test]
fn truck_sales_draw_down_recovered_stock() {
    let workspace = memory_workspace();
    let delivery = DeliveryService::new(workspace.clone());
    let sales = SalesService::new(workspace);
    delivery
        .record_suction(suction_draft("2024-03-05", "sell", "1200"))
        .unwrap();
    delivery
        .record_suction(suction_draft("2024-03-06", "suction", "300"))
        .unwrap();

    let sale = |liters: &str| TruckSaleDraft {
        date: "2024-03-07".to_string(),
        branch_id: BANG_NA.to_string(),
        oil_type: "diesel".to_string(),
        quantity_liters: liters.to_string(),
        unit_price: "12.50".to_string(),
        buyer: "Green Recycling".to_string(),
    };

    sales.record_truck_sale(sale("1000")).unwrap();
    assert_matches!(
        sales.record_truck_sale(sale("300")),
        Err(ServiceError::InsufficientStock { requested, on_hand })
            if requested == dec!(300) && on_hand == dec!(200)
    );
    sales.record_truck_sale(sale("200")).unwrap();

    let levels = delivery.stock_levels();
    assert_eq!(levels.values().copied().sum::<Decimal>(), Decimal::ZERO);

    let truck_sales = sales.truck_sales();
    let view = TableView::default().derive(&truck_sales);
    let summary = TruckSaleSummary::from_rows(&view.rows);
    assert_eq!(summary.sales, 2);
    assert_eq!(summary.liters, dec!(1200));
    assert_eq!(summary.revenue, dec!(15000));
}
