use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::commands::{Command, Plan};
use crate::common::new_record_id;
use crate::errors::ServiceError;
use crate::models::delivery::RecoveredOil;
use crate::models::reference::OilType;
use crate::models::sales::{Order, OrderStatus, Quotation, QuotationStatus, TruckSale};
use crate::models::Record;
use crate::services::delivery::stock_on_hand;
use crate::store::{EffectList, Workspace};
use crate::validation::{validate_not_blank, DraftParser};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDraft {
    #[validate(custom = "validate_not_blank")]
    pub branch_id: String,
    #[validate(custom = "validate_not_blank")]
    pub customer: String,
    #[validate(custom = "validate_not_blank")]
    pub oil_type: String,
    #[validate(custom = "validate_not_blank")]
    pub quantity_liters: String,
    #[validate(custom = "validate_not_blank")]
    pub unit_price: String,
}

#[derive(Debug, Clone)]
pub struct CreateQuotationCommand {
    pub draft: QuotationDraft,
}

impl Command for CreateQuotationCommand {
    type Output = Quotation;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Quotation>, ServiceError> {
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let branch_id = parser.parse::<u32>("branch_id", &draft.branch_id);
        let customer = parser.text("customer", &draft.customer);
        let oil_type = parser.parse::<OilType>("oil_type", &draft.oil_type);
        let quantity_liters = parser.positive("quantity_liters", &draft.quantity_liters);
        let unit_price = parser.positive("unit_price", &draft.unit_price);
        parser.finish()?;

        workspace
            .reference()
            .branches
            .require(&branch_id.to_string())?;

        let quotation = Quotation {
            id: new_record_id(Quotation::ID_PREFIX),
            created_at: Utc::now(),
            updated_at: None,
            branch_id,
            customer,
            oil_type,
            quantity_liters,
            unit_price,
            status: QuotationStatus::Open,
            order_id: None,
        };
        info!(id = %quotation.id, total = %quotation.total(), "Quotation created");
        let effects = EffectList::new().insert(&quotation)?;
        Ok(Plan::new(quotation, effects))
    }
}

/// Turns an open quotation into a pending order and marks the quotation
/// converted, both in one effect list.
#[derive(Debug, Clone)]
pub struct ConvertQuotationCommand {
    pub quotation_id: String,
}

impl Command for ConvertQuotationCommand {
    type Output = Order;

    #[instrument(skip(self, workspace), fields(quotation = %self.quotation_id))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Order>, ServiceError> {
        let quotation = workspace
            .find::<Quotation>(&self.quotation_id)
            .ok_or_else(|| ServiceError::not_found("Quotation", &self.quotation_id))?;
        if quotation.status != QuotationStatus::Open {
            warn!(status = %quotation.status, "Quotation is not open");
            return Err(ServiceError::InvalidOperation(format!(
                "Quotation {} is {}",
                quotation.id, quotation.status
            )));
        }

        let now = Utc::now();
        let order = Order {
            id: new_record_id(Order::ID_PREFIX),
            created_at: now,
            updated_at: None,
            quotation_id: quotation.id.clone(),
            branch_id: quotation.branch_id,
            customer: quotation.customer.clone(),
            oil_type: quotation.oil_type,
            quantity_liters: quotation.quantity_liters,
            unit_price: quotation.unit_price,
            status: OrderStatus::Pending,
        };
        let quotation = Quotation {
            status: QuotationStatus::Converted,
            order_id: Some(order.id.clone()),
            updated_at: Some(now),
            ..quotation
        };

        info!(order = %order.id, "Quotation converted");
        let effects = EffectList::new().insert(&order)?.replace(&quotation)?;
        Ok(Plan::new(order, effects))
    }
}

#[derive(Debug, Clone)]
pub struct SetOrderStatusCommand {
    pub order_id: String,
    pub status: OrderStatus,
}

impl Command for SetOrderStatusCommand {
    type Output = Order;

    #[instrument(skip(self, workspace), fields(order = %self.order_id, status = %self.status))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<Order>, ServiceError> {
        let order = workspace
            .find::<Order>(&self.order_id)
            .ok_or_else(|| ServiceError::not_found("Order", &self.order_id))?;
        let order = Order {
            status: self.status,
            updated_at: Some(Utc::now()),
            ..order
        };
        info!("Order status changed");
        let effects = EffectList::new().replace(&order)?;
        Ok(Plan::new(order, effects))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TruckSaleDraft {
    #[validate(custom = "validate_not_blank")]
    pub date: String,
    #[validate(custom = "validate_not_blank")]
    pub branch_id: String,
    #[validate(custom = "validate_not_blank")]
    pub oil_type: String,
    #[validate(custom = "validate_not_blank")]
    pub quantity_liters: String,
    #[validate(custom = "validate_not_blank")]
    pub unit_price: String,
    #[validate(custom = "validate_not_blank")]
    pub buyer: String,
}

/// Sells recovered oil off a truck. Quantity is capped by the recovered
/// stock still on hand for that grade.
#[derive(Debug, Clone)]
pub struct TruckSaleCommand {
    pub draft: TruckSaleDraft,
}

impl Command for TruckSaleCommand {
    type Output = TruckSale;

    #[instrument(skip(self, workspace))]
    fn plan(&self, workspace: &Workspace) -> Result<Plan<TruckSale>, ServiceError> {
        let draft = &self.draft;
        let mut parser = DraftParser::new(draft);
        let date = parser.date("date", &draft.date);
        let branch_id = parser.parse::<u32>("branch_id", &draft.branch_id);
        let oil_type = parser.parse::<OilType>("oil_type", &draft.oil_type);
        let quantity_liters = parser.positive("quantity_liters", &draft.quantity_liters);
        let unit_price = parser.positive("unit_price", &draft.unit_price);
        let buyer = parser.text("buyer", &draft.buyer);
        parser.finish()?;

        workspace
            .reference()
            .branches
            .require(&branch_id.to_string())?;

        let on_hand = stock_on_hand(
            &workspace.list::<RecoveredOil>(),
            &workspace.list::<TruckSale>(),
            oil_type,
        );
        if quantity_liters > on_hand {
            warn!(%oil_type, requested = %quantity_liters, on_hand = %on_hand, "Truck sale exceeds recovered stock");
            return Err(ServiceError::InsufficientStock {
                requested: quantity_liters,
                on_hand,
            });
        }

        let sale = TruckSale {
            id: new_record_id(TruckSale::ID_PREFIX),
            created_at: Utc::now(),
            date: date.format("%Y-%m-%d").to_string(),
            branch_id,
            oil_type,
            quantity_liters,
            unit_price,
            buyer,
        };
        info!(id = %sale.id, liters = %quantity_liters, total = %sale.total(), "Truck sale recorded");
        let effects = EffectList::new().insert(&sale)?;
        Ok(Plan::new(sale, effects))
    }
}
