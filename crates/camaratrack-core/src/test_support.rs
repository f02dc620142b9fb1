//! In-memory remote source used by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{RemoteError, SourceClient};

pub const BUDGET_HTML: &str = r#"
<html><body>
  <table id="percentualgastoverbagabinete">
    <tr><td>Gasto</td><td>R$ 1.500,00</td><td>45,00 %</td></tr>
    <tr><td>Disponível</td><td>R$ 1.833,33</td><td>55,00 %</td></tr>
  </table>
  <table id="gastomensalverbagabinete">
    <tr><td>JAN</td><td>R$ 1.000,00</td><td>30,00 %</td></tr>
    <tr><td>FEV</td><td>R$ 500,00</td><td>15,00 %</td></tr>
  </table>
</body></html>"#;

pub const RESOURCES_HTML: &str = r#"
<html><body>
  <a href="/deputados/1/pessoal-gabinete?ano=2019">15 pessoas, 12 ativas</a>
  <a href="/deputados/1/remuneracao?ano=2019">R$ 33.763,00</a>
  <span class="beneficio--icone-imovel-funcional">Não faz uso</span>
  <div class="beneficio beneficio__auxilio-moradia"><span>R$ 200,00</span></div>
  <div class="beneficio beneficio__viagens"><span>3 viagens</span></div>
</body></html>"#;

pub const ACTIVITY_HTML: &str = r#"
<html><body>
  <a class="atuacao__quantidade" href="/busca?autor=1">7</a>
  <a class="atuacao__quantidade" href="/busca?relator=1">3</a>
  <dl>
    <dd class="list-table__definition-description">40 dias</dd>
    <dd class="list-table__definition-description">2 dias</dd>
    <dd class="list-table__definition-description">1 dia</dd>
    <dd class="list-table__definition-description">20 reuniões</dd>
    <dd class="list-table__definition-description">0 reuniões</dd>
    <dd class="list-table__definition-description">5 reuniões</dd>
  </dl>
</body></html>"#;

/// Every month of every deputy has one expense of this many cents.
pub const MONTHLY_EXPENSE_CENTS: i64 = 5000;

pub struct FakeSource {
    parties: Vec<String>,
    roster: Vec<(i64, String)>,
    activity_html: String,
    failing: Mutex<HashSet<i64>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(parties: &[&str]) -> Self {
        Self {
            parties: parties.iter().map(|p| p.to_string()).collect(),
            roster: Vec::new(),
            activity_html: ACTIVITY_HTML.to_string(),
            failing: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_member(mut self, id: i64, party: &str) -> Self {
        self.roster.push((id, party.to_string()));
        self
    }

    pub fn with_activity_html(mut self, html: &str) -> Self {
        self.activity_html = html.to_string();
        self
    }

    /// Make every call about deputy `id` fail until `recover` is called.
    pub fn fail_member(&self, id: i64) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn recover(&self, id: i64) {
        self.failing.lock().unwrap().remove(&id);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }

    fn check_member(&self, id: i64) -> Result<(), RemoteError> {
        if self.failing.lock().unwrap().contains(&id) {
            return Err(RemoteError::ServerError(format!("deputy {} unavailable", id)));
        }
        Ok(())
    }

    fn party_of(&self, id: i64) -> Option<&str> {
        self.roster
            .iter()
            .find(|(member, _)| *member == id)
            .map(|(_, party)| party.as_str())
    }
}

/// `deputados/{id}` or `deputados/{id}/...` → id
fn member_id(path: &str) -> Option<i64> {
    path.strip_prefix("deputados/")?
        .split(|c: char| c == '/' || c == '?')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl SourceClient for FakeSource {
    async fn fetch_structured(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, RemoteError> {
        let query_string: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        if query_string.is_empty() {
            self.record(path.to_string());
        } else {
            self.record(format!("{}?{}", path, query_string.join("&")));
        }

        if path == "partidos" {
            let dados: Vec<Value> = self.parties.iter().map(|p| json!({ "sigla": p })).collect();
            return Ok(json!({ "dados": dados }));
        }
        if path == "deputados" {
            let dados: Vec<Value> = self
                .roster
                .iter()
                .map(|(id, party)| json!({ "id": id, "siglaPartido": party, "siglaUf": "SP" }))
                .collect();
            return Ok(json!({ "dados": dados }));
        }

        let id = member_id(path).ok_or_else(|| RemoteError::NotFound(path.to_string()))?;
        self.check_member(id)?;
        let party = self
            .party_of(id)
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))?;

        if path.ends_with("/despesas") {
            return Ok(json!({ "dados": [
                { "tipoDespesa": "PASSAGEM AÉREA", "valorLiquido": MONTHLY_EXPENSE_CENTS as f64 / 100.0 }
            ]}));
        }

        Ok(json!({ "dados": {
            "id": id,
            "cpf": format!("{:011}", id),
            "nomeCivil": format!("DEPUTADO {}", id),
            "ultimoStatus": {
                "siglaPartido": party,
                "siglaUf": "SP",
                "nomeEleitoral": format!("Deputado {}", id),
                "email": format!("dep{}@camara.leg.br", id)
            }
        }}))
    }

    async fn fetch_document(&self, url: &str) -> Result<String, RemoteError> {
        self.record(url.to_string());

        let path = url.split_once("/deputados/").map(|(_, rest)| rest).unwrap_or("");
        let id = member_id(&format!("deputados/{}", path))
            .ok_or_else(|| RemoteError::NotFound(url.to_string()))?;
        self.check_member(id)?;

        if url.contains("/_gastos") {
            Ok(BUDGET_HTML.to_string())
        } else if url.contains("/_recursos") {
            Ok(RESOURCES_HTML.to_string())
        } else if url.contains("/_atuacao") {
            Ok(self.activity_html.clone())
        } else {
            Err(RemoteError::NotFound(url.to_string()))
        }
    }
}
