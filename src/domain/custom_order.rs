use super::order::next_reference;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Tableware,
    Art,
    Corporate,
    Event,
    Other,
}

impl FromStr for ProjectType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tableware" => Ok(Self::Tableware),
            "art" => Ok(Self::Art),
            "corporate" => Ok(Self::Corporate),
            "event" => Ok(Self::Event),
            "other" => Ok(Self::Other),
            other => Err(AppError::Validation(format!(
                "unknown project type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CustomOrderStatus {
    Pending,
    Contacted,
    InProgress,
    Completed,
    Cancelled,
}

/// A custom-pottery intake request. Tracked separately from catalog orders:
/// no payment is taken at submission time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CustomOrder {
    pub request_number: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project_type: ProjectType,
    pub brief: String,
    pub budget: Option<String>,
    pub gst_number: Option<String>,
    pub status: CustomOrderStatus,
    pub created_at: DateTime<Utc>,
}

impl CustomOrder {
    pub fn new(
        name: String,
        email: String,
        phone: String,
        project_type: ProjectType,
        brief: String,
        budget: Option<String>,
        gst_number: Option<String>,
    ) -> Self {
        Self {
            request_number: next_reference("CO"),
            name,
            email,
            phone,
            project_type,
            brief,
            budget,
            gst_number,
            status: CustomOrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
