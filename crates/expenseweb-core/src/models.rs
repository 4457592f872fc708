//! Data models exchanged with the finance backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionType;

/// A top-level category and its ordered sub-categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category name, also the backend document id (e.g. "Entertainment")
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "subCategories", default)]
    pub sub_categories: Vec<String>,
}

impl Category {
    pub fn new(id: &str, sub_categories: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            sub_categories: sub_categories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Monetary amount of a transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    /// ISO 4217 code; empty when the source carried none
    pub currency: String,
}

/// A bank-sourced or manually entered transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Option<String>,
    pub transaction_id: Option<String>,
    pub end_to_end_id: Option<String>,
    /// ISO date; `None` while pending
    pub booking_date: Option<String>,
    #[serde(default)]
    pub amount: Amount,
    pub debtor_name: Option<String>,
    pub debtor_iban: Option<String>,
    pub creditor_name: Option<String>,
    pub creditor_iban: Option<String>,
    pub remittance_info: Option<String>,
    pub bank_transaction_code: Option<String>,
    pub internal_transaction_id: Option<String>,
    #[serde(default)]
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub sub_category: Option<String>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.booking_date.is_none()
    }
}

/// IBAN holder reference as the backend stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub iban: String,
}

/// Amount object in backend documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAmount {
    pub amount: f64,
    pub currency: String,
}

/// Document sent on create and update.
///
/// Absent fields are left out of the JSON entirely so an update never
/// blanks a stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_to_end_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<String>,
    pub transaction_amount: WireAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debtor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debtor_account: Option<AccountRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor_account: Option<AccountRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remittance_information_unstructured: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary_bank_transaction_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_transaction_id: Option<String>,
    pub transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "sub_category", skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
}

/// One transaction row as returned by `GET /dashboard`.
///
/// The backend flattens the amount into `amount`/`currency`; the nested
/// `transactionAmount` form is accepted as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTransaction {
    pub id: Option<String>,
    pub transaction_id: Option<String>,
    pub end_to_end_id: Option<String>,
    pub booking_date: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub transaction_amount: Option<WireAmount>,
    pub debtor_name: Option<String>,
    pub debtor_account: Option<AccountRef>,
    pub creditor_name: Option<String>,
    pub creditor_account: Option<AccountRef>,
    pub remittance_information_unstructured: Option<String>,
    pub proprietary_bank_transaction_code: Option<String>,
    pub internal_transaction_id: Option<String>,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "sub_category", alias = "subCategory")]
    pub sub_category: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<DashboardTransaction> for Transaction {
    fn from(row: DashboardTransaction) -> Self {
        let amount = match row.transaction_amount {
            Some(wire) => Amount {
                value: wire.amount,
                currency: wire.currency,
            },
            None => Amount {
                value: row.amount.unwrap_or(0.0),
                currency: row.currency.unwrap_or_default(),
            },
        };

        Self {
            id: non_empty(row.id),
            transaction_id: non_empty(row.transaction_id),
            end_to_end_id: non_empty(row.end_to_end_id),
            booking_date: non_empty(row.booking_date),
            amount,
            debtor_name: non_empty(row.debtor_name),
            debtor_iban: non_empty(row.debtor_account.map(|a| a.iban)),
            creditor_name: non_empty(row.creditor_name),
            creditor_iban: non_empty(row.creditor_account.map(|a| a.iban)),
            remittance_info: non_empty(row.remittance_information_unstructured),
            bank_transaction_code: non_empty(row.proprietary_bank_transaction_code),
            internal_transaction_id: non_empty(row.internal_transaction_id),
            transaction_type: row
                .transaction_type
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            category: non_empty(row.category),
            sub_category: non_empty(row.sub_category),
        }
    }
}

/// Authenticated user as echoed by the dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardUser {
    pub id: String,
}

/// One stacked-bar series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDataset {
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor", default)]
    pub background_color: String,
}

/// Chart arrays already shaped by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub amounts: Vec<f64>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(rename = "categoryData", default)]
    pub category_data: Vec<CategoryDataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.dates.is_empty()
    }
}

/// Response of `GET /dashboard`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub user: Option<DashboardUser>,
    #[serde(default)]
    pub transactions: Vec<DashboardTransaction>,
    #[serde(default)]
    pub chart_data: ChartData,
}

impl DashboardData {
    /// Rows converted into the form-facing model
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.iter().cloned().map(Transaction::from).collect()
    }

    pub fn find_transaction(&self, id: &str) -> Option<Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id.as_deref() == Some(id))
            .cloned()
            .map(Transaction::from)
    }
}

/// Body of `POST /banks/link_bank`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBankRequest {
    pub institution_id: String,
    pub max_historical_days: String,
    pub access_valid_for_days: String,
    pub access_scope: Vec<String>,
}

/// Body of `POST /banks/import`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    pub date_from: String,
    pub date_to: String,
}

impl ImportRequest {
    /// Build an import window, requiring two ISO dates in order
    pub fn new(date_from: &str, date_to: &str) -> CoreResult<Self> {
        let from = parse_date("date_from", date_from)?;
        let to = parse_date("date_to", date_to)?;
        if from > to {
            return Err(CoreError::ValidationError {
                field: "date_to".to_string(),
                message: "End date must not be before start date".to_string(),
            });
        }
        Ok(Self {
            date_from: from.format("%Y-%m-%d").to_string(),
            date_to: to.format("%Y-%m-%d").to_string(),
        })
    }
}

fn parse_date(field: &str, value: &str) -> CoreResult<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::ValidationError {
            field: field.to_string(),
            message: "Date is required".to_string(),
        });
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CoreError::ValidationError {
        field: field.to_string(),
        message: format!("'{}' is not a YYYY-MM-DD date", value),
    })
}

/// Response of `POST /banks/import`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub imported: usize,
}

/// Response of `POST /banks/refresh_link`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshLinkResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub accounts: serde_json::Value,
    #[serde(default)]
    pub agreement: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_mongo_id() {
        let json = r#"[{"_id": "Food", "subCategories": ["Groceries", "Dining"]}, {"id": "Rent"}]"#;
        let categories: Vec<Category> = serde_json::from_str(json).unwrap();

        assert_eq!(categories[0].id, "Food");
        assert_eq!(categories[0].sub_categories, vec!["Groceries", "Dining"]);
        assert_eq!(categories[1].id, "Rent");
        assert!(categories[1].sub_categories.is_empty());
    }

    #[test]
    fn test_dashboard_row_conversion() {
        let json = r#"{
            "id": "65f0",
            "transactionId": "T-1",
            "bookingDate": "",
            "amount": 12.5,
            "currency": "EUR",
            "debtorAccount": {"iban": "NL00INGB0001"},
            "creditorAccount": null,
            "transactionType": "income",
            "category": "Food",
            "sub_category": ""
        }"#;
        let row: DashboardTransaction = serde_json::from_str(json).unwrap();
        let tx = Transaction::from(row);

        assert_eq!(tx.id.as_deref(), Some("65f0"));
        assert!(tx.is_pending());
        assert_eq!(tx.amount.value, 12.5);
        assert_eq!(tx.amount.currency, "EUR");
        assert_eq!(tx.debtor_iban.as_deref(), Some("NL00INGB0001"));
        assert_eq!(tx.creditor_iban, None);
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.sub_category, None);
    }

    #[test]
    fn test_dashboard_row_nested_amount() {
        let json = r#"{"transactionAmount": {"amount": -4.2, "currency": "USD"}, "transactionType": null}"#;
        let tx = Transaction::from(serde_json::from_str::<DashboardTransaction>(json).unwrap());

        assert_eq!(tx.amount.value, -4.2);
        assert_eq!(tx.amount.currency, "USD");
        assert_eq!(tx.transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_dashboard_find_transaction() {
        let json = r#"{
            "user": {"id": "alice"},
            "transactions": [{"id": "a"}, {"id": "b", "category": "Rent"}],
            "chart_data": {"categories": ["Rent"], "amounts": [900.0], "dates": ["March 2024"],
                           "categoryData": [{"label": "Rent", "data": [900.0], "backgroundColor": "red"}]}
        }"#;
        let data: DashboardData = serde_json::from_str(json).unwrap();

        assert_eq!(data.transactions().len(), 2);
        assert_eq!(data.find_transaction("b").unwrap().category.as_deref(), Some("Rent"));
        assert!(data.find_transaction("zzz").is_none());
        assert_eq!(data.chart_data.category_data[0].data, vec![900.0]);
        assert!(!data.chart_data.is_empty());
    }

    #[test]
    fn test_import_request_validation() {
        let req = ImportRequest::new("2024-01-01", "2024-03-31").unwrap();
        assert_eq!(req.date_to, "2024-03-31");

        let err = ImportRequest::new("", "2024-03-31").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { ref field, .. } if field == "date_from"));

        let err = ImportRequest::new("2024-04-01", "2024-03-31").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { ref field, .. } if field == "date_to"));

        assert!(ImportRequest::new("01/02/2024", "2024-03-31").is_err());
    }
}
