//! Enrollment fee payment.

use crate::model::entity::RecordId;
use crate::model::validation::{require_iso_date, require_range, ValidationResult};
use crate::model::{double_option, set_if, Patch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub enrollment_id: RecordId,
    /// Amount in COP cents; always positive.
    pub amount_cents: i64,
    pub paid_on: String,
    pub method: PaymentMethod,
    pub receipt_file: Option<String>,
}

impl Payment {
    pub fn new(enrollment_id: RecordId, amount_cents: i64, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            enrollment_id,
            amount_cents,
            paid_on: String::new(),
            method,
            receipt_file: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        require_range("amount_cents", self.amount_cents, 1, i64::MAX)?;
        require_iso_date("paid_on", &self.paid_on)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentPatch {
    pub amount_cents: Option<i64>,
    pub paid_on: Option<String>,
    pub method: Option<PaymentMethod>,
    #[serde(deserialize_with = "double_option")]
    pub receipt_file: Option<Option<String>>,
}

impl Patch<Payment> for PaymentPatch {
    fn apply_to(&self, target: &mut Payment) {
        set_if(&mut target.amount_cents, &self.amount_cents);
        set_if(&mut target.paid_on, &self.paid_on);
        set_if(&mut target.method, &self.method);
        set_if(&mut target.receipt_file, &self.receipt_file);
    }
}
