use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use crate::commands::delivery::{EditSuctionCommand, RecordSuctionCommand, SuctionDraft};
use crate::commands::Executed;
use crate::errors::ServiceError;
use crate::models::delivery::{RecoveredOil, SuctionLog, SuctionMode};
use crate::models::reference::OilType;
use crate::models::sales::TruckSale;
use crate::store::Workspace;
use crate::view::summary::{count_where, group_sum, sum_where};

/// Summary cards above the suction log table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuctionSummary {
    pub records: usize,
    pub suction_liters: Decimal,
    pub sell_liters: Decimal,
    pub by_oil_type: BTreeMap<OilType, Decimal>,
}

impl SuctionSummary {
    /// Reduces the rows currently displayed.
    pub fn from_rows(rows: &[&SuctionLog]) -> Self {
        let liters = |log: &SuctionLog| log.quantity_liters;
        Self {
            records: count_where(rows, |_| true),
            suction_liters: sum_where(rows, |log| log.mode == SuctionMode::Suction, liters),
            sell_liters: sum_where(rows, |log| log.mode == SuctionMode::Sell, liters),
            by_oil_type: group_sum(rows, |log| log.oil_type, liters),
        }
    }
}

/// Recovered liters of `oil_type` not yet sold by truck.
pub fn stock_on_hand(recovered: &[RecoveredOil], sales: &[TruckSale], oil_type: OilType) -> Decimal {
    let received: Decimal = recovered
        .iter()
        .filter(|entry| entry.oil_type == oil_type)
        .map(|entry| entry.quantity_liters)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let sold: Decimal = sales
        .iter()
        .filter(|sale| sale.oil_type == oil_type)
        .map(|sale| sale.quantity_liters)
        .fold(Decimal::ZERO, Decimal::saturating_add);
    received.saturating_sub(sold)
}

/// Stock on hand for every grade that has recovered oil or sales.
pub fn stock_levels(recovered: &[RecoveredOil], sales: &[TruckSale]) -> BTreeMap<OilType, Decimal> {
    let mut levels = BTreeMap::new();
    for entry in recovered {
        let level = levels.entry(entry.oil_type).or_insert(Decimal::ZERO);
        *level = level.saturating_add(entry.quantity_liters);
    }
    for sale in sales {
        let level = levels.entry(sale.oil_type).or_insert(Decimal::ZERO);
        *level = level.saturating_sub(sale.quantity_liters);
    }
    levels
}

#[derive(Debug, Clone)]
pub struct DeliveryService {
    workspace: Workspace,
}

impl DeliveryService {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn suction_logs(&self) -> Vec<SuctionLog> {
        self.workspace.list()
    }

    pub fn recovered_oil(&self) -> Vec<RecoveredOil> {
        self.workspace.list()
    }

    pub fn stock_levels(&self) -> BTreeMap<OilType, Decimal> {
        stock_levels(&self.recovered_oil(), &self.workspace.list::<TruckSale>())
    }

    #[instrument(skip(self, draft))]
    pub fn record_suction(&self, draft: SuctionDraft) -> Result<Executed<SuctionLog>, ServiceError> {
        self.workspace.execute(&RecordSuctionCommand { draft })
    }

    #[instrument(skip(self, draft))]
    pub fn edit_suction(
        &self,
        id: &str,
        draft: SuctionDraft,
    ) -> Result<Executed<SuctionLog>, ServiceError> {
        self.workspace.execute(&EditSuctionCommand {
            id: id.to_string(),
            draft,
        })
    }
}
