//! Per-deputy, per-year collection of the five data facets.
//!
//! Every remote call is awaited before the next one is issued. Pages are
//! parsed right after they arrive and the parsed tree is dropped before the
//! next await.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::api::{endpoints, RemoteError, SourceClient};
use crate::config::{Config, Period};
use crate::extract::{
    extract_attr_list, extract_count, extract_list, extract_number, extract_text, triples, Document,
};
use crate::models::{
    Activity, ActivityCount, Amount, Attendance, LegislatorProfile, LegislatorRecord,
    MonthlyBudgetEntry, MonthlyExpenseBatch, OfficeBudget, Resources, ValuePercent, YearlyFacets,
};

// Office budget page
const BUDGET_SUMMARY_CELLS: &str = "#percentualgastoverbagabinete td";
const BUDGET_MONTHLY_CELLS: &str = "#gastomensalverbagabinete td";

// Resources page
const STAFF_LINK: &str = r#"[href*="/pessoal-gabinete"]"#;
const SALARY_LINK: &str = r#"[href*="/remuneracao"]"#;
const RESIDENCE_ICON: &str = r#"span[class*="beneficio--icone-imovel-funcional"]"#;
const HOUSING_ALLOWANCE: &str = r#"div[class*="beneficio__auxilio-moradia"] span"#;
const TRAVEL_ALLOWANCE: &str = r#"div[class*="beneficio__viagens"] span"#;

// Activity page
const ACTIVITY_QUANTITY: &str = r#"[class="atuacao__quantidade"]"#;
const ATTENDANCE_VALUES: &str = r#"dd[class="list-table__definition-description"]"#;

pub struct PeriodCollector<'a> {
    client: &'a dyn SourceClient,
    site_base_url: String,
    periods: Vec<Period>,
}

impl<'a> PeriodCollector<'a> {
    pub fn new(client: &'a dyn SourceClient, config: &Config) -> Self {
        Self {
            client,
            site_base_url: config.site_base_url.trim_end_matches('/').to_string(),
            periods: config.periods.clone(),
        }
    }

    fn page_url(&self, id: i64, page: &str, year: i32) -> String {
        format!("{}/deputados/{}/{}?ano={}", self.site_base_url, id, page, year)
    }

    /// Collect every facet of one deputy over every configured period.
    pub async fn collect_legislator(&self, id: i64) -> Result<LegislatorRecord, RemoteError> {
        let profile = self.collect_profile(id).await?;

        let mut expenses = Vec::new();
        for period in &self.periods {
            expenses.extend(self.collect_expenses(id, *period).await?);
        }

        let mut years = BTreeMap::new();
        for period in &self.periods {
            let resources = self.collect_resources(id, period.year).await?;
            let activity = self.collect_activity(id, period.year).await?;
            let budget = self.collect_office_budget(id, period.year).await?;
            years.insert(
                period.year,
                YearlyFacets {
                    budget,
                    resources,
                    activity,
                },
            );
        }

        debug!(id, name = %profile.electoral_name, "Collected deputy");
        Ok(LegislatorRecord {
            profile,
            years,
            expenses,
        })
    }

    pub async fn collect_profile(&self, id: i64) -> Result<LegislatorProfile, RemoteError> {
        endpoints::legislator_info(self.client, id, &self.site_base_url).await
    }

    pub async fn collect_office_budget(&self, id: i64, year: i32) -> Result<OfficeBudget, RemoteError> {
        let body = self
            .client
            .fetch_document(&self.page_url(id, "_gastos", year))
            .await?;
        Ok(parse_office_budget(&Document::parse(&body)))
    }

    pub async fn collect_resources(&self, id: i64, year: i32) -> Result<Resources, RemoteError> {
        let body = self
            .client
            .fetch_document(&self.page_url(id, "_recursos", year))
            .await?;
        Ok(parse_resources(&Document::parse(&body)))
    }

    pub async fn collect_activity(&self, id: i64, year: i32) -> Result<Activity, RemoteError> {
        let body = self
            .client
            .fetch_document(&self.page_url(id, "_atuacao", year))
            .await?;
        let plenary_url = format!("{}/deputados/{}/presenca-plenario/{}", self.site_base_url, id, year);
        let committee_url = self.page_url(id, "presenca-comissoes", year);
        Ok(parse_activity(
            &Document::parse(&body),
            &self.site_base_url,
            plenary_url,
            committee_url,
        ))
    }

    /// One structured call per month of the period.
    pub async fn collect_expenses(
        &self,
        id: i64,
        period: Period,
    ) -> Result<Vec<MonthlyExpenseBatch>, RemoteError> {
        let mut batches = Vec::with_capacity(period.months as usize);
        for month in 1..=period.months {
            let entries = endpoints::monthly_expenses(self.client, id, period.year, month).await?;
            batches.push(MonthlyExpenseBatch {
                period: period_key(period.year, month),
                entries,
            });
        }
        Ok(batches)
    }
}

/// `YYYY-MM` key of one month.
pub fn period_key(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%Y-%m").to_string(),
        None => format!("{:04}-{:02}", year, month),
    }
}

fn cell_amount(cells: &[String], index: usize) -> Amount {
    cells.get(index).map(|c| extract_number(c)).unwrap_or_default()
}

pub fn parse_office_budget(doc: &Document) -> OfficeBudget {
    // [label, spent, spent %, label, available, available %]
    let summary = extract_list(doc, BUDGET_SUMMARY_CELLS);
    let monthly = triples(&extract_list(doc, BUDGET_MONTHLY_CELLS))
        .into_iter()
        .map(|(month, value, percent)| MonthlyBudgetEntry {
            month,
            value: extract_number(&value),
            percent: extract_number(&percent),
        })
        .collect();

    OfficeBudget {
        spent: ValuePercent {
            value: cell_amount(&summary, 1),
            percent: cell_amount(&summary, 2),
        },
        available: ValuePercent {
            value: cell_amount(&summary, 4),
            percent: cell_amount(&summary, 5),
        },
        monthly,
    }
}

/// Split "N planned, M active" into its counts. A missing or empty second
/// group means the active count equals the planned one.
pub fn split_staff_counts(raw: &str) -> (u32, u32) {
    let mut groups = raw.split(',');
    let planned = groups.next().map(extract_count).unwrap_or(0);
    let active = groups
        .next()
        .filter(|g| g.chars().any(|c| c.is_ascii_digit()))
        .map(extract_count)
        .unwrap_or(planned);
    (planned, active)
}

pub fn parse_resources(doc: &Document) -> Resources {
    let office_staff_raw = extract_text(doc, STAFF_LINK);
    let (staff_planned, staff_active) = split_staff_counts(&office_staff_raw);

    Resources {
        staff_planned,
        staff_active,
        salary: extract_number(&extract_text(doc, SALARY_LINK)),
        official_residence: extract_text(doc, RESIDENCE_ICON),
        housing_allowance_raw: extract_text(doc, HOUSING_ALLOWANCE),
        travel_allowance_raw: extract_text(doc, TRAVEL_ALLOWANCE),
        office_staff_raw,
    }
}

/// Resolve a page `href` against the site root. Absolute URLs pass through.
pub fn absolute_link(site_base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!(
        "{}/{}",
        site_base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

pub fn parse_activity(
    doc: &Document,
    site_base_url: &str,
    plenary_url: String,
    committee_url: String,
) -> Activity {
    let quantities = extract_list(doc, ACTIVITY_QUANTITY);
    let (authored, reported) = if quantities.len() >= 2 {
        let mut links = extract_attr_list(doc, ACTIVITY_QUANTITY, "href")
            .into_iter()
            .map(|href| href.map(|h| absolute_link(site_base_url, &h)));
        (
            ActivityCount {
                count: extract_count(&quantities[0]),
                link: links.next().flatten(),
            },
            ActivityCount {
                count: extract_count(&quantities[1]),
                link: links.next().flatten(),
            },
        )
    } else {
        debug!(found = quantities.len(), "Activity quantity nodes missing, recording zero");
        (ActivityCount::default(), ActivityCount::default())
    };

    let values = extract_list(doc, ATTENDANCE_VALUES);
    let at = |i: usize| values.get(i).map(|v| extract_count(v)).unwrap_or(0);

    Activity {
        authored,
        reported,
        plenary: Attendance {
            present: at(0),
            justified_absence: at(1),
            unjustified_absence: at(2),
            url: plenary_url,
        },
        committee: Attendance {
            present: at(3),
            justified_absence: at(4),
            unjustified_absence: at(5),
            url: committee_url,
        },
    }
}
