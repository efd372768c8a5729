// Page-level services
pub mod delivery;
pub mod fund;
pub mod sales;

pub use delivery::{DeliveryService, SuctionSummary};
pub use fund::{FundService, FundSummary};
pub use sales::{SalesService, SalesSummary};

use crate::store::Workspace;

/// One service per back-office page, all sharing a workspace.
#[derive(Debug, Clone)]
pub struct Services {
    pub delivery: DeliveryService,
    pub fund: FundService,
    pub sales: SalesService,
}

impl Services {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            delivery: DeliveryService::new(workspace.clone()),
            fund: FundService::new(workspace.clone()),
            sales: SalesService::new(workspace),
        }
    }
}
