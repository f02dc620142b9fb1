use serde::{Deserialize, Serialize};

use super::Amount;

/// One reimbursed expense from the parliamentary quota.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub category: String,
    pub net_value: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_date: Option<String>,
}

/// All expenses of one month, keyed by its `YYYY-MM` period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpenseBatch {
    pub period: String,
    pub entries: Vec<ExpenseEntry>,
}

impl MonthlyExpenseBatch {
    /// Year component of the period, if it parses.
    pub fn year(&self) -> Option<i32> {
        self.period.get(..4).and_then(|y| y.parse().ok())
    }

    pub fn total(&self) -> Amount {
        self.entries.iter().map(|e| e.net_value).sum()
    }
}

/// Raw item of `/deputados/{id}/despesas`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseItem {
    #[serde(rename = "tipoDespesa", default)]
    pub tipo_despesa: String,
    #[serde(rename = "valorLiquido", default)]
    pub valor_liquido: Amount,
    #[serde(rename = "nomeFornecedor", default)]
    pub nome_fornecedor: Option<String>,
    #[serde(rename = "dataDocumento", default)]
    pub data_documento: Option<String>,
}

impl ExpenseItem {
    pub fn to_entry(&self) -> ExpenseEntry {
        ExpenseEntry {
            category: self.tipo_despesa.clone(),
            net_value: self.valor_liquido,
            supplier: self.nome_fornecedor.clone(),
            document_date: self.data_documento.clone(),
        }
    }
}
