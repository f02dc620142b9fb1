//! Typed calls against the structured open data API.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{
    Envelope, ExpenseEntry, ExpenseItem, LegislatorInfoResponse, LegislatorProfile, PartyItem,
    RosterEntry,
};

use super::{RemoteError, SourceClient};

/// Upper bound on parties returned by one listing call.
const PARTY_PAGE_SIZE: &str = "200";

/// Upper bound on expenses returned for one month.
const EXPENSE_PAGE_SIZE: &str = "100";

fn unwrap_dados<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, RemoteError> {
    serde_json::from_value::<Envelope<T>>(value)
        .map(|envelope| envelope.dados)
        .map_err(|e| RemoteError::InvalidResponse(format!("{}: {}", path, e)))
}

/// Party codes, sorted ascending by the API.
pub async fn list_parties(client: &dyn SourceClient) -> Result<Vec<String>, RemoteError> {
    let path = "partidos";
    let query = [
        ("ordem", "ASC"),
        ("ordenarPor", "sigla"),
        ("itens", PARTY_PAGE_SIZE),
    ];
    let value = client.fetch_structured(path, &query).await?;
    let parties: Vec<PartyItem> = unwrap_dados(path, value)?;
    Ok(parties.into_iter().map(|p| p.sigla).collect())
}

pub async fn list_legislators(client: &dyn SourceClient) -> Result<Vec<RosterEntry>, RemoteError> {
    let path = "deputados";
    let value = client.fetch_structured(path, &[]).await?;
    unwrap_dados(path, value)
}

pub async fn legislator_info(
    client: &dyn SourceClient,
    id: i64,
    site_base_url: &str,
) -> Result<LegislatorProfile, RemoteError> {
    let path = format!("deputados/{}", id);
    let value = client.fetch_structured(&path, &[]).await?;
    let info: LegislatorInfoResponse = unwrap_dados(&path, value)?;
    Ok(info.to_profile(site_base_url))
}

pub async fn monthly_expenses(
    client: &dyn SourceClient,
    id: i64,
    year: i32,
    month: u32,
) -> Result<Vec<ExpenseEntry>, RemoteError> {
    let path = format!("deputados/{}/despesas", id);
    let year = year.to_string();
    let month = format!("{:02}", month);
    let query = [
        ("ano", year.as_str()),
        ("mes", month.as_str()),
        ("itens", EXPENSE_PAGE_SIZE),
    ];
    let value = client.fetch_structured(&path, &query).await?;
    let items: Vec<ExpenseItem> = unwrap_dados(&path, value)?;
    Ok(items.iter().map(ExpenseItem::to_entry).collect())
}
