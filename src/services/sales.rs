use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::commands::sales::{
    ConvertQuotationCommand, CreateQuotationCommand, QuotationDraft, SetOrderStatusCommand,
    TruckSaleCommand, TruckSaleDraft,
};
use crate::commands::Executed;
use crate::errors::ServiceError;
use crate::models::sales::{Order, OrderStatus, Quotation, TruckSale};
use crate::store::Workspace;
use crate::view::summary::{group_count, sum_by};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub orders: usize,
    pub liters: Decimal,
    pub revenue: Decimal,
    pub by_status: BTreeMap<OrderStatus, usize>,
}

impl SalesSummary {
    pub fn from_rows(rows: &[&Order]) -> Self {
        Self {
            orders: rows.len(),
            liters: sum_by(rows, |order| order.quantity_liters),
            revenue: sum_by(rows, Order::total),
            by_status: group_count(rows, |order| order.status),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckSaleSummary {
    pub sales: usize,
    pub liters: Decimal,
    pub revenue: Decimal,
}

impl TruckSaleSummary {
    pub fn from_rows(rows: &[&TruckSale]) -> Self {
        Self {
            sales: rows.len(),
            liters: sum_by(rows, |sale| sale.quantity_liters),
            revenue: sum_by(rows, TruckSale::total),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SalesService {
    workspace: Workspace,
}

impl SalesService {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn quotations(&self) -> Vec<Quotation> {
        self.workspace.list()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.workspace.list()
    }

    pub fn truck_sales(&self) -> Vec<TruckSale> {
        self.workspace.list()
    }

    #[instrument(skip(self, draft))]
    pub fn create_quotation(&self, draft: QuotationDraft) -> Result<Executed<Quotation>, ServiceError> {
        self.workspace.execute(&CreateQuotationCommand { draft })
    }

    #[instrument(skip(self))]
    pub fn convert_quotation(&self, quotation_id: &str) -> Result<Executed<Order>, ServiceError> {
        self.workspace.execute(&ConvertQuotationCommand {
            quotation_id: quotation_id.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub fn set_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Executed<Order>, ServiceError> {
        self.workspace.execute(&SetOrderStatusCommand {
            order_id: order_id.to_string(),
            status,
        })
    }

    #[instrument(skip(self, draft))]
    pub fn record_truck_sale(&self, draft: TruckSaleDraft) -> Result<Executed<TruckSale>, ServiceError> {
        self.workspace.execute(&TruckSaleCommand { draft })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reference::OilType;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus, liters: Decimal, price: Decimal) -> Order {
        Order {
            id: "OR-1".into(),
            created_at: Utc::now(),
            updated_at: None,
            quotation_id: "QT-1".into(),
            branch_id: 1,
            customer: "Customer".into(),
            oil_type: OilType::Diesel,
            quantity_liters: liters,
            unit_price: price,
            status,
        }
    }

    #[test]
    fn summary_totals_and_status_counts() {
        let orders = [
            order(OrderStatus::Pending, dec!(100), dec!(30)),
            order(OrderStatus::Delivered, dec!(50), dec!(31.5)),
            order(OrderStatus::Pending, dec!(10), dec!(30)),
        ];
        let rows: Vec<&Order> = orders.iter().collect();
        let summary = SalesSummary::from_rows(&rows);
        assert_eq!(summary.orders, 3);
        assert_eq!(summary.liters, dec!(160));
        assert_eq!(summary.revenue, dec!(4875));
        assert_eq!(summary.by_status[&OrderStatus::Pending], 2);
    }
}
