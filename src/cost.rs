//! Consequence Cost Model
//!
//! Prices a single occurrence of a consequence: deferred production while the
//! equipment is under repair, plus replacement and vessel-mobilisation costs
//! pro-rated by the operating area's equity share.
//!
//! The model is a pure function of current attribute values. Nothing is
//! cached, so adding or removing a vessel trip is reflected by the very next
//! call.

use serde::Serialize;
use thiserror::Error;

use crate::model::{Consequence, Facility};

#[derive(Debug, Error)]
pub enum CostError {
    #[error("equity_share must be within [0, 1] (got {0}); pro-ration may not exceed raw cost")]
    InvalidEquityShare(f64),

    #[error("Vessel trip '{trip}' references unknown vessel '{vessel}' on facility '{facility}'")]
    UnknownVessel {
        trip: String,
        vessel: String,
        facility: String,
    },
}

/// Itemised cost of one consequence occurrence. All figures in facility
/// currency.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CostBreakdown {
    /// Production units deferred while under repair
    /// (`mean_time_to_repair * deferred_prod_rate`).
    pub gross_deferred_volume: f64,
    /// Deferred volume priced at the facility's deferred production cost.
    pub production_impact: f64,
    /// Replacement plus vessel-trip charter costs, scaled by equity share.
    pub equipment_cost: f64,
    /// `production_impact + equipment_cost`.
    pub total_cost: f64,
}

/// Price one occurrence of `consequence`.
///
/// `facility` supplies the deferred-production unit cost and resolves the
/// consequence's vessel trips; `equity_share` is the owning area's stake.
pub fn consequence_cost(
    consequence: &Consequence,
    facility: &Facility,
    equity_share: f64,
) -> Result<CostBreakdown, CostError> {
    if !equity_share.is_finite() || !(0.0..=1.0).contains(&equity_share) {
        return Err(CostError::InvalidEquityShare(equity_share));
    }

    let gross_deferred_volume = consequence.mean_time_to_repair * consequence.deferred_prod_rate;
    let production_impact = gross_deferred_volume * facility.deferred_prod_cost;

    let mut vessel_cost = 0.0;
    for trip in &consequence.vessel_trips {
        let vessel =
            facility
                .vessel(&trip.vessel_ident)
                .ok_or_else(|| CostError::UnknownVessel {
                    trip: trip.ident.clone(),
                    vessel: trip.vessel_ident.clone(),
                    facility: facility.ident.clone(),
                })?;
        vessel_cost += trip.total_cost(vessel);
    }
    let equipment_cost = (consequence.replacement_cost + vessel_cost) * equity_share;

    Ok(CostBreakdown {
        gross_deferred_volume,
        production_impact,
        equipment_cost,
        total_cost: production_impact + equipment_cost,
    })
}
