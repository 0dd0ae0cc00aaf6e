//! The named operation surface accepted by the coordinator.
//!
//! Operations arrive as a name plus an ordered list of string arguments and
//! are parsed/validated here before any mutation is planned. Every parse
//! failure is a `Validation` error carrying the offending argument.

use crate::error::{LedgerError, Result};
use crate::key::AssetKey;
use chrono::{DateTime, Utc};

/// A parsed, validated operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateAsset {
        key: AssetKey,
        name: String,
        initial_stock: i64,
        timestamp: DateTime<Utc>,
    },
    UpdateAsset {
        key: AssetKey,
        new_stock: i64,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    RecordForecast {
        product_id: String,
        forecast_data: serde_json::Value,
        accuracy: f64,
        timestamp: DateTime<Utc>,
    },
    RecordQuality {
        batch_id: String,
        sigma_level: f64,
        defect_rate: f64,
        timestamp: DateTime<Utc>,
    },
    RecordSupplierEvent {
        supplier_id: String,
        event_data: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
}

impl Operation {
    pub const CREATE_ASSET: &'static str = "CreateAsset";
    pub const UPDATE_ASSET: &'static str = "UpdateAsset";
    pub const RECORD_FORECAST: &'static str = "RecordForecast";
    pub const RECORD_QUALITY: &'static str = "RecordQuality";
    pub const RECORD_SUPPLIER_EVENT: &'static str = "RecordSupplierEvent";

    /// Parses an operation from its wire name and string arguments
    pub fn parse(name: &str, args: &[String]) -> Result<Self> {
        match name {
            Self::CREATE_ASSET => {
                let [key, asset_name, stock, timestamp] = expect_args(name, args)?;
                Ok(Operation::CreateAsset {
                    key: AssetKey::new(key.as_str())?,
                    name: asset_name.clone(),
                    initial_stock: parse_stock(stock)?,
                    timestamp: parse_timestamp(timestamp)?,
                })
            }
            Self::UPDATE_ASSET => {
                let [key, stock, reason, timestamp] = expect_args(name, args)?;
                Ok(Operation::UpdateAsset {
                    key: AssetKey::new(key.as_str())?,
                    new_stock: parse_stock(stock)?,
                    reason: reason.clone(),
                    timestamp: parse_timestamp(timestamp)?,
                })
            }
            Self::RECORD_FORECAST => {
                let [product_id, data, accuracy, timestamp] = expect_args(name, args)?;
                Ok(Operation::RecordForecast {
                    product_id: require_id("productId", product_id)?,
                    forecast_data: parse_json("forecastData", data)?,
                    accuracy: parse_number("accuracy", accuracy)?,
                    timestamp: parse_timestamp(timestamp)?,
                })
            }
            Self::RECORD_QUALITY => {
                let [batch_id, sigma, defect, timestamp] = expect_args(name, args)?;
                Ok(Operation::RecordQuality {
                    batch_id: require_id("batchId", batch_id)?,
                    sigma_level: parse_number("sigmaLevel", sigma)?,
                    defect_rate: parse_number("defectRate", defect)?,
                    timestamp: parse_timestamp(timestamp)?,
                })
            }
            Self::RECORD_SUPPLIER_EVENT => {
                let [supplier_id, data, timestamp] = expect_args(name, args)?;
                Ok(Operation::RecordSupplierEvent {
                    supplier_id: require_id("supplierId", supplier_id)?,
                    event_data: parse_json("eventData", data)?,
                    timestamp: parse_timestamp(timestamp)?,
                })
            }
            _ => Err(LedgerError::Validation(format!(
                "unknown operation: {}",
                name
            ))),
        }
    }

    /// Gets the wire name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateAsset { .. } => Self::CREATE_ASSET,
            Operation::UpdateAsset { .. } => Self::UPDATE_ASSET,
            Operation::RecordForecast { .. } => Self::RECORD_FORECAST,
            Operation::RecordQuality { .. } => Self::RECORD_QUALITY,
            Operation::RecordSupplierEvent { .. } => Self::RECORD_SUPPLIER_EVENT,
        }
    }
}

fn expect_args<'a, const N: usize>(name: &str, args: &'a [String]) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| {
        LedgerError::Validation(format!(
            "{} expects {} arguments, got {}",
            name,
            N,
            args.len()
        ))
    })
}

fn parse_stock(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| LedgerError::Validation(format!("stock must be an integer, got {:?}", raw)))
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| LedgerError::Validation(format!("{} must be numeric, got {:?}", field, raw)))?;
    if !value.is_finite() {
        return Err(LedgerError::Validation(format!(
            "{} must be finite, got {:?}",
            field, raw
        )));
    }
    Ok(value)
}

fn parse_json(field: &str, raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| LedgerError::Validation(format!("{} is not valid JSON: {}", field, e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|_| LedgerError::Validation(format!("timestamp must be RFC 3339, got {:?}", raw)))
}

fn require_id(field: &str, raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} must not be empty", field)));
    }
    Ok(raw.to_string())
}
