//! Editable transaction fields and document assembly

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::models::{AccountRef, Transaction, TransactionDocument, WireAmount};
use crate::types::TransactionType;

/// Currency used when neither the record nor the host supplies one
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Scalar form fields, one per transaction attribute.
///
/// Text fields use `""` for "not filled in". Category and sub-category live on
/// the controller because they are derived together.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    pub id: String,
    pub transaction_id: String,
    pub end_to_end_id: String,
    pub booking_date: String,
    pub amount_value: f64,
    pub currency: String,
    pub debtor_name: String,
    pub debtor_iban: String,
    pub creditor_name: String,
    pub creditor_iban: String,
    pub remittance_info: String,
    pub bank_transaction_code: String,
    pub internal_transaction_id: String,
    pub transaction_type: TransactionType,
}

impl TransactionFields {
    /// Blank form
    pub fn empty(default_currency: &str) -> Self {
        Self {
            id: String::new(),
            transaction_id: String::new(),
            end_to_end_id: String::new(),
            booking_date: String::new(),
            amount_value: 0.0,
            currency: default_currency.to_string(),
            debtor_name: String::new(),
            debtor_iban: String::new(),
            creditor_name: String::new(),
            creditor_iban: String::new(),
            remittance_info: String::new(),
            bank_transaction_code: String::new(),
            internal_transaction_id: String::new(),
            transaction_type: TransactionType::default(),
        }
    }

    /// Copy a stored record into editable fields
    pub fn from_transaction(tx: &Transaction, default_currency: &str) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let currency = if tx.amount.currency.trim().is_empty() {
            default_currency.to_string()
        } else {
            tx.amount.currency.clone()
        };

        Self {
            id: text(&tx.id),
            transaction_id: text(&tx.transaction_id),
            end_to_end_id: text(&tx.end_to_end_id),
            booking_date: text(&tx.booking_date),
            amount_value: tx.amount.value,
            currency,
            debtor_name: text(&tx.debtor_name),
            debtor_iban: text(&tx.debtor_iban),
            creditor_name: text(&tx.creditor_name),
            creditor_iban: text(&tx.creditor_iban),
            remittance_info: text(&tx.remittance_info),
            bank_transaction_code: text(&tx.bank_transaction_code),
            internal_transaction_id: text(&tx.internal_transaction_id),
            transaction_type: tx.transaction_type,
        }
    }

    /// Set the amount from user text; blank means zero
    pub fn set_amount_text(&mut self, text: &str) -> CoreResult<()> {
        let text = text.trim();
        if text.is_empty() {
            self.amount_value = 0.0;
            return Ok(());
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                self.amount_value = v;
                Ok(())
            }
            _ => Err(CoreError::ValidationError {
                field: "amount".to_string(),
                message: format!("'{}' is not a number", text),
            }),
        }
    }

    /// Check values the backend would reject
    pub fn validate(&self) -> CoreResult<()> {
        static CURRENCY_CODE: OnceCell<Regex> = OnceCell::new();
        let currency_regex = CURRENCY_CODE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").unwrap());

        if !currency_regex.is_match(&self.currency) {
            return Err(CoreError::ValidationError {
                field: "currency".to_string(),
                message: format!("'{}' is not an ISO 4217 code", self.currency),
            });
        }

        let booking_date = self.booking_date.trim();
        if !booking_date.is_empty() && NaiveDate::parse_from_str(booking_date, "%Y-%m-%d").is_err() {
            return Err(CoreError::ValidationError {
                field: "bookingDate".to_string(),
                message: format!("'{}' is not a YYYY-MM-DD date", booking_date),
            });
        }

        Ok(())
    }

    /// Assemble the partial document: blank text fields are left out, type and
    /// amount are always sent.
    pub fn to_document(&self, category: &str, sub_category: &str) -> TransactionDocument {
        TransactionDocument {
            transaction_id: present(&self.transaction_id),
            end_to_end_id: present(&self.end_to_end_id),
            booking_date: present(&self.booking_date),
            transaction_amount: WireAmount {
                amount: self.amount_value,
                currency: self.currency.clone(),
            },
            debtor_name: present(&self.debtor_name),
            debtor_account: present(&self.debtor_iban).map(|iban| AccountRef { iban }),
            creditor_name: present(&self.creditor_name),
            creditor_account: present(&self.creditor_iban).map(|iban| AccountRef { iban }),
            remittance_information_unstructured: present(&self.remittance_info),
            proprietary_bank_transaction_code: present(&self.bank_transaction_code),
            internal_transaction_id: present(&self.internal_transaction_id),
            transaction_type: self.transaction_type,
            category: present(category),
            sub_category: present(sub_category),
        }
    }
}

fn present(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;

    #[test]
    fn test_from_transaction_defaults() {
        let tx = Transaction {
            id: Some("abc".to_string()),
            category: Some("Food".to_string()),
            ..Default::default()
        };
        let fields = TransactionFields::from_transaction(&tx, DEFAULT_CURRENCY);

        assert_eq!(fields.id, "abc");
        assert_eq!(fields.amount_value, 0.0);
        assert_eq!(fields.currency, "EUR");
        assert_eq!(fields.debtor_name, "");
        assert_eq!(fields.booking_date, "");
    }

    #[test]
    fn test_from_transaction_copies_values() {
        let tx = Transaction {
            booking_date: Some("2024-02-01".to_string()),
            amount: Amount { value: 19.99, currency: "USD".to_string() },
            creditor_iban: Some("DE89370400440532013000".to_string()),
            transaction_type: TransactionType::Income,
            ..Default::default()
        };
        let fields = TransactionFields::from_transaction(&tx, DEFAULT_CURRENCY);

        assert_eq!(fields.booking_date, "2024-02-01");
        assert_eq!(fields.amount_value, 19.99);
        assert_eq!(fields.currency, "USD");
        assert_eq!(fields.creditor_iban, "DE89370400440532013000");
        assert_eq!(fields.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_document_omits_blank_fields() {
        let mut fields = TransactionFields::empty(DEFAULT_CURRENCY);
        fields.remittance_info = "Coffee".to_string();
        let doc = serde_json::to_value(fields.to_document("", "")).unwrap();
        let obj = doc.as_object().unwrap();

        assert_eq!(obj["remittanceInformationUnstructured"], "Coffee");
        assert_eq!(obj["transactionType"], "expense");
        assert_eq!(obj["transactionAmount"]["amount"], 0.0);
        assert_eq!(obj["transactionAmount"]["currency"], "EUR");
        assert!(!obj.contains_key("category"));
        assert!(!obj.contains_key("sub_category"));
        assert!(!obj.contains_key("debtorAccount"));
        assert!(!obj.contains_key("bookingDate"));
        assert_eq!(obj.len(), 3);
    }

    #[test]
    fn test_document_nests_ibans() {
        let mut fields = TransactionFields::empty(DEFAULT_CURRENCY);
        fields.debtor_iban = "NL91ABNA0417164300".to_string();
        let doc = serde_json::to_value(fields.to_document("Food", "Dining")).unwrap();

        assert_eq!(doc["debtorAccount"]["iban"], "NL91ABNA0417164300");
        assert_eq!(doc["category"], "Food");
        assert_eq!(doc["sub_category"], "Dining");
    }

    #[test]
    fn test_amount_text() {
        let mut fields = TransactionFields::empty(DEFAULT_CURRENCY);
        fields.set_amount_text(" 42.10 ").unwrap();
        assert_eq!(fields.amount_value, 42.10);

        fields.set_amount_text("").unwrap();
        assert_eq!(fields.amount_value, 0.0);

        let err = fields.set_amount_text("ten").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { ref field, .. } if field == "amount"));
        assert!(fields.set_amount_text("NaN").is_err());
    }

    #[test]
    fn test_validate_currency_and_date() {
        let mut fields = TransactionFields::empty(DEFAULT_CURRENCY);
        assert!(fields.validate().is_ok());

        fields.currency = "eur".to_string();
        assert!(fields.validate().is_err());

        fields.currency = "GBP".to_string();
        fields.booking_date = "31-12-2024".to_string();
        let err = fields.validate().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { ref field, .. } if field == "bookingDate"));
    }
}
