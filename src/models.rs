use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A persisted expense record, serialized with the wire field names of the
/// Billed REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub vat: Option<f64>,
    pub pct: u32,
    pub commentary: Option<String>,
    #[serde(rename = "fileUrl")]
    pub file_url: Option<String>,
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
    pub status: BillStatus,
    #[serde(rename = "commentAdmin", default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
}

/// Lifecycle of a bill. New bills start pending; only the backing store's
/// responses move them to accepted or refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }
}

/// Expense categories offered by the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ExpenseType {
    Transports,
    RestaurantsEtBars,
    HotelEtLogement,
    ServicesEnLigne,
    ItEtElectronique,
    EquipementEtMateriel,
    FournituresDeBureau,
    Other(String),
}

impl ExpenseType {
    pub fn as_str(&self) -> &str {
        match self {
            ExpenseType::Transports => "Transports",
            ExpenseType::RestaurantsEtBars => "Restaurants et bars",
            ExpenseType::HotelEtLogement => "Hôtel et logement",
            ExpenseType::ServicesEnLigne => "Services en ligne",
            ExpenseType::ItEtElectronique => "IT et électronique",
            ExpenseType::EquipementEtMateriel => "Equipement et matériel",
            ExpenseType::FournituresDeBureau => "Fournitures de bureau",
            ExpenseType::Other(s) => s,
        }
    }

    /// All known categories, in the order the form presents them.
    pub fn all() -> Vec<ExpenseType> {
        vec![
            ExpenseType::Transports,
            ExpenseType::RestaurantsEtBars,
            ExpenseType::HotelEtLogement,
            ExpenseType::ServicesEnLigne,
            ExpenseType::ItEtElectronique,
            ExpenseType::EquipementEtMateriel,
            ExpenseType::FournituresDeBureau,
        ]
    }
}

impl From<String> for ExpenseType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Transports" => ExpenseType::Transports,
            "Restaurants et bars" => ExpenseType::RestaurantsEtBars,
            "Hôtel et logement" => ExpenseType::HotelEtLogement,
            "Services en ligne" => ExpenseType::ServicesEnLigne,
            "IT et électronique" => ExpenseType::ItEtElectronique,
            "Equipement et matériel" => ExpenseType::EquipementEtMateriel,
            "Fournitures de bureau" => ExpenseType::FournituresDeBureau,
            _ => ExpenseType::Other(s),
        }
    }
}

impl From<ExpenseType> for String {
    fn from(t: ExpenseType) -> Self {
        t.as_str().to_string()
    }
}

/// Role of the logged-in user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserType {
    Employee,
    Admin,
}

/// The logged-in user's identity, read from the session store under the
/// `user` key. Pre-validated by the login flow; this component only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionIdentity {
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub email: String,
}

/// The store's answer to a successful attachment upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachmentReceipt {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    pub key: String,
}

/// An in-progress, not-yet-persisted expense record. Owned by the form
/// session and discarded after a successful submission.
///
/// `file_url`/`file_name`/`file_key` are set only once the store has
/// accepted the attachment; staging happens on file selection, strictly
/// before submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDraft {
    pub expense_type: Option<ExpenseType>,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub vat: Option<f64>,
    pub pct: Option<u32>,
    pub commentary: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_key: Option<String>,
}

impl BillDraft {
    /// Check the presence of every required field. Optional fields (vat,
    /// commentary) never block submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.expense_type.is_none() {
            return Err(ValidationError::MissingField("expense type"));
        }
        if self.name.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingField("expense name"));
        }
        if self.date.is_none() {
            return Err(ValidationError::MissingField("date"));
        }
        if self.amount.is_none() {
            return Err(ValidationError::MissingField("amount"));
        }
        if self.pct.is_none() {
            return Err(ValidationError::MissingField("pct"));
        }
        Ok(())
    }

    pub fn has_attachment(&self) -> bool {
        self.file_url.is_some()
    }

    /// Drop any staged attachment, e.g. after an unsupported file was picked.
    pub fn clear_attachment(&mut self) {
        self.file_url = None;
        self.file_name = None;
        self.file_key = None;
    }

    /// Assemble the normalized record sent to the store. Fails without
    /// touching the network when a required field is missing.
    pub fn into_bill(self, email: &str) -> Result<Bill, ValidationError> {
        self.validate()?;
        Ok(Bill {
            id: String::new(),
            email: email.to_string(),
            expense_type: self.expense_type.unwrap(),
            name: self.name.unwrap(),
            amount: self.amount.unwrap(),
            date: self.date.unwrap(),
            vat: self.vat,
            pct: self.pct.unwrap(),
            commentary: self.commentary,
            file_url: self.file_url,
            file_name: self.file_name,
            status: BillStatus::Pending,
            comment_admin: None,
        })
    }
}

/// Parse a date as entered in the form. The backend's data carries both
/// ISO dates and French day-first dates, so accept either.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Parse a non-negative monetary amount.
pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(v) if v >= 0.0 && v.is_finite() => Ok(v),
        _ => Err(ValidationError::InvalidAmount(input.to_string())),
    }
}

/// Parse an integer percentage.
pub fn parse_pct(input: &str) -> Result<u32, ValidationError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidPct(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> BillDraft {
        BillDraft {
            expense_type: Some(ExpenseType::Transports),
            name: Some("Vol Marseille".to_string()),
            date: parse_date("03/01/2022").ok(),
            amount: Some(300.0),
            vat: Some(70.0),
            pct: Some(20),
            ..Default::default()
        }
    }

    #[test]
    fn draft_with_all_required_fields_validates() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn each_missing_required_field_blocks_validation() {
        let mut d = valid_draft();
        d.expense_type = None;
        assert_eq!(d.validate(), Err(ValidationError::MissingField("expense type")));

        let mut d = valid_draft();
        d.name = Some(String::new());
        assert_eq!(d.validate(), Err(ValidationError::MissingField("expense name")));

        let mut d = valid_draft();
        d.date = None;
        assert_eq!(d.validate(), Err(ValidationError::MissingField("date")));

        let mut d = valid_draft();
        d.amount = None;
        assert_eq!(d.validate(), Err(ValidationError::MissingField("amount")));

        let mut d = valid_draft();
        d.pct = None;
        assert_eq!(d.validate(), Err(ValidationError::MissingField("pct")));
    }

    #[test]
    fn missing_optional_fields_do_not_block_validation() {
        let mut d = valid_draft();
        d.vat = None;
        d.commentary = None;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn into_bill_normalizes_with_session_email_and_pending_status() {
        let bill = valid_draft().into_bill("jane@doe").unwrap();
        assert_eq!(bill.email, "jane@doe");
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.expense_type, ExpenseType::Transports);
        assert_eq!(bill.amount, 300.0);
        assert_eq!(bill.pct, 20);
    }

    #[test]
    fn date_parsing_accepts_both_observed_formats() {
        assert_eq!(
            parse_date("03/01/2022").unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
        );
        assert_eq!(
            parse_date("2005-02-02").unwrap(),
            NaiveDate::from_ymd_opt(2005, 2, 2).unwrap()
        );
        assert!(parse_date("not a date").is_err());
    }

    #[test]
    fn amount_rejects_negative_and_garbage() {
        assert_eq!(parse_amount("300").unwrap(), 300.0);
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn bill_serializes_with_wire_field_names() {
        let bill = valid_draft().into_bill("a@a").unwrap();
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["type"], "Transports");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["date"], "2022-01-03");
        assert!(json.as_object().unwrap().contains_key("fileUrl"));
    }

    #[test]
    fn expense_type_survives_unknown_categories() {
        let t = ExpenseType::from("Frais divers".to_string());
        assert_eq!(t.as_str(), "Frais divers");
    }
}
