use serde::{Deserialize, Serialize};

/// Identity and contact data for one deputy, fetched once per collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegislatorProfile {
    pub id: i64,
    pub party_code: String,
    pub state_code: String,
    pub tax_id: String,
    pub civil_name: String,
    pub electoral_name: String,
    pub email: String,
    pub profile_uri: String,
}

// API response wrappers

/// Every structured endpoint wraps its payload in `{"dados": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub dados: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyItem {
    pub id: Option<i64>,
    pub sigla: String,
    pub nome: Option<String>,
}

/// One row of the current roster (`/deputados`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub id: i64,
    #[serde(rename = "siglaPartido", default)]
    pub party_code: String,
    #[serde(rename = "siglaUf", default)]
    pub state_code: String,
    #[serde(default)]
    pub nome: String,
}

/// Detail payload of `/deputados/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LegislatorInfoResponse {
    pub id: i64,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(rename = "nomeCivil", default)]
    pub nome_civil: Option<String>,
    #[serde(rename = "ultimoStatus", default)]
    pub ultimo_status: LastStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LastStatus {
    #[serde(rename = "siglaPartido", default)]
    pub sigla_partido: Option<String>,
    #[serde(rename = "siglaUf", default)]
    pub sigla_uf: Option<String>,
    #[serde(rename = "nomeEleitoral", default)]
    pub nome_eleitoral: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl LegislatorInfoResponse {
    pub fn to_profile(&self, site_base_url: &str) -> LegislatorProfile {
        let status = &self.ultimo_status;
        LegislatorProfile {
            id: self.id,
            party_code: status.sigla_partido.clone().unwrap_or_default(),
            state_code: status.sigla_uf.clone().unwrap_or_default(),
            tax_id: self.cpf.clone().unwrap_or_default(),
            civil_name: self.nome_civil.clone().unwrap_or_default(),
            electoral_name: status.nome_eleitoral.clone().unwrap_or_default(),
            email: status.email.clone().unwrap_or_default(),
            profile_uri: profile_uri(site_base_url, self.id),
        }
    }
}

pub fn profile_uri(site_base_url: &str, id: i64) -> String {
    format!("{}/deputados/{}", site_base_url.trim_end_matches('/'), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legislator_info() {
        let json = r#"{"dados": {"id": 204554, "cpf": "12345678900", "nomeCivil": "MARIA DA SILVA",
            "ultimoStatus": {"siglaPartido": "ABC", "siglaUf": "SP", "nomeEleitoral": "Maria Silva",
            "email": "dep.mariasilva@camara.leg.br", "situacao": "Exercício"}}}"#;

        let envelope: Envelope<LegislatorInfoResponse> = serde_json::from_str(json).unwrap();
        let profile = envelope.dados.to_profile("https://www.camara.leg.br/");

        assert_eq!(profile.id, 204554);
        assert_eq!(profile.party_code, "ABC");
        assert_eq!(profile.state_code, "SP");
        assert_eq!(profile.tax_id, "12345678900");
        assert_eq!(profile.civil_name, "MARIA DA SILVA");
        assert_eq!(profile.electoral_name, "Maria Silva");
        assert_eq!(profile.profile_uri, "https://www.camara.leg.br/deputados/204554");
    }

    #[test]
    fn test_missing_status_fields_default_to_empty() {
        let json = r#"{"id": 7}"#;
        let info: LegislatorInfoResponse = serde_json::from_str(json).unwrap();
        let profile = info.to_profile("https://www.camara.leg.br");
        assert_eq!(profile.party_code, "");
        assert_eq!(profile.email, "");
    }

    #[test]
    fn test_parse_roster_entry() {
        let json = r#"[{"id": 1, "siglaPartido": "ABC", "siglaUf": "RJ", "nome": "Fulano"},
                       {"id": 2}]"#;
        let roster: Vec<RosterEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(roster[0].party_code, "ABC");
        assert_eq!(roster[1].party_code, "");
    }
}
