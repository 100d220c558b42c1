//! Typed shapes of the upstream API records.
//!
//! Each node-bearing record types its natural key and keeps the remaining
//! fields as raw JSON, which [`crate::normalize`] turns into properties.
//! Sub-resource records (memberships, votes, authors) only type the
//! fields the pipeline reads.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{Label, Node, NodeKey, Properties, PropertyValue};
use crate::normalize::{normalize_fields, normalize_record, PROPOSITION_STATUS_FIELD};

/// A legislator from `/deputados`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeputyRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DeputyRecord {
    pub fn name(&self) -> Option<&str> {
        self.fields.get("nome").and_then(Value::as_str)
    }

    pub fn party_code(&self) -> Option<&str> {
        self.fields.get("siglaPartido").and_then(Value::as_str)
    }

    pub fn into_node(self) -> Node {
        Node::new(Label::Deputy.key_field(), NodeKey::Int(self.id), normalize_fields(self.fields))
    }
}

/// A party from `/partidos`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartyRecord {
    pub sigla: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PartyRecord {
    pub fn into_node(self) -> Node {
        Node::new(Label::Party.key_field(), NodeKey::Text(self.sigla), normalize_fields(self.fields))
    }
}

/// A committee or other legislative body from `/orgaos`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OrganRecord {
    pub fn into_node(self) -> Node {
        Node::new(Label::Organ.key_field(), NodeKey::Int(self.id), normalize_fields(self.fields))
    }
}

/// A recorded vote event from `/votacoes` or `/votacoes/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VotationRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VotationRecord {
    pub fn organ_uri(&self) -> Option<&str> {
        self.fields.get("uriOrgao").and_then(Value::as_str)
    }

    pub fn proposition_uri(&self) -> Option<&str> {
        self.fields.get("uriProposicaoObjeto").and_then(Value::as_str)
    }

    pub fn into_node(self) -> Node {
        Node::new(Label::Votation.key_field(), NodeKey::Text(self.id), normalize_fields(self.fields))
    }
}

/// A bill or motion from a proposition detail resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PropositionRecord {
    pub id: i64,
    #[serde(rename = "statusProposicao", default)]
    pub status: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PropositionRecord {
    pub fn authors_uri(&self) -> Option<&str> {
        self.fields.get("uriAutores").and_then(Value::as_str)
    }

    pub fn into_node(self) -> Node {
        let mut record = self.fields;
        if let Some(status) = self.status {
            record.insert(PROPOSITION_STATUS_FIELD.to_string(), status);
        }
        let properties = normalize_record(record, Some(PROPOSITION_STATUS_FIELD));
        Node::new(Label::Proposition.key_field(), NodeKey::Int(self.id), properties)
    }
}

/// Short proposition form embedded in a votation detail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropositionSummary {
    pub id: i64,
    #[serde(default)]
    pub sigla_tipo: Option<String>,
    #[serde(default)]
    pub numero: Option<i64>,
    #[serde(default)]
    pub ano: Option<i64>,
    #[serde(default)]
    pub ementa: Option<String>,
}

impl PropositionSummary {
    /// Node holding only the summary fields that are present.
    pub fn into_node(self) -> Node {
        let mut properties = Properties::new();
        if let Some(sigla_tipo) = self.sigla_tipo {
            properties.insert("siglaTipo".to_string(), sigla_tipo.into());
        }
        if let Some(numero) = self.numero {
            properties.insert("numero".to_string(), numero.into());
        }
        if let Some(ano) = self.ano {
            properties.insert("ano".to_string(), ano.into());
        }
        if let Some(ementa) = self.ementa {
            properties.insert("ementa".to_string(), ementa.into());
        }
        Node::new(Label::Proposition.key_field(), NodeKey::Int(self.id), properties)
    }
}

/// Detail of a single votation, carrying the propositions it touched.
///
/// The body's own `id` is not trusted: the detail is always keyed by the
/// id it was fetched with.
#[derive(Debug, Clone, Deserialize)]
pub struct VotationDetail {
    #[serde(rename = "proposicoesAfetadas", default)]
    pub affected: Option<Vec<Value>>,
    #[serde(rename = "objetosPossiveis", default)]
    pub candidates: Option<Vec<Value>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl VotationDetail {
    /// Affected propositions followed by candidate subject objects, first
    /// occurrence of each id only.
    ///
    /// Entries that are not proposition-shaped (no integer `id`) are skipped.
    pub fn propositions(&self) -> Vec<PropositionSummary> {
        let mut seen = HashSet::new();
        self.affected
            .iter()
            .chain(self.candidates.iter())
            .flatten()
            .filter_map(|entry| PropositionSummary::deserialize(entry).ok())
            .filter(|summary| seen.insert(summary.id))
            .collect()
    }

    /// Scalar detail fields as the node of votation `votation_id`.
    pub fn to_node(&self, votation_id: &str) -> Node {
        let mut fields = self.fields.clone();
        fields.remove(Label::Votation.key_field());
        Node::new(
            Label::Votation.key_field(),
            NodeKey::Text(votation_id.to_string()),
            normalize_fields(fields),
        )
    }
}

/// A membership from `/deputados/{id}/orgaos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub id_orgao: i64,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub data_inicio: Option<String>,
    #[serde(default)]
    pub data_fim: Option<String>,
}

impl MembershipRecord {
    /// `MEMBER_OF` properties. An open-ended membership has a null `endDate`.
    pub fn edge_properties(&self) -> Properties {
        Properties::from([
            ("title".to_string(), PropertyValue::from(self.titulo.clone())),
            ("startDate".to_string(), PropertyValue::from(self.data_inicio.clone())),
            ("endDate".to_string(), PropertyValue::from(self.data_fim.clone())),
        ])
    }
}

/// The deputy reference inside a vote.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteDeputy {
    pub id: i64,
}

/// A single deputy's vote from `/votacoes/{id}/votos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    #[serde(default)]
    pub tipo_voto: Option<String>,
    #[serde(default)]
    pub data_registro_voto: Option<String>,
    #[serde(rename = "deputado_")]
    pub deputy: VoteDeputy,
}

impl VoteRecord {
    /// `VOTED_IN` properties.
    pub fn edge_properties(&self) -> Properties {
        Properties::from([
            ("vote".to_string(), PropertyValue::from(self.tipo_voto.clone())),
            (
                "registrationDate".to_string(),
                PropertyValue::from(self.data_registro_voto.clone()),
            ),
        ])
    }
}

/// An author entry from a proposition's authors resource.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRecord {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
}

/// The node-bearing record shapes, one per label.
#[derive(Debug, Clone)]
pub enum ApiRecord {
    Deputy(DeputyRecord),
    Party(PartyRecord),
    Organ(OrganRecord),
    Votation(VotationRecord),
    Proposition(PropositionRecord),
}

impl ApiRecord {
    /// Decode a raw JSON record as the shape stored under `label`.
    pub fn decode(label: Label, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match label {
            Label::Deputy => ApiRecord::Deputy(serde_json::from_value(value)?),
            Label::Party => ApiRecord::Party(serde_json::from_value(value)?),
            Label::Organ => ApiRecord::Organ(serde_json::from_value(value)?),
            Label::Votation => ApiRecord::Votation(serde_json::from_value(value)?),
            Label::Proposition => ApiRecord::Proposition(serde_json::from_value(value)?),
        })
    }

    pub fn label(&self) -> Label {
        match self {
            ApiRecord::Deputy(_) => Label::Deputy,
            ApiRecord::Party(_) => Label::Party,
            ApiRecord::Organ(_) => Label::Organ,
            ApiRecord::Votation(_) => Label::Votation,
            ApiRecord::Proposition(_) => Label::Proposition,
        }
    }

    /// Normalize into a storable node.
    pub fn into_node(self) -> Node {
        match self {
            ApiRecord::Deputy(r) => r.into_node(),
            ApiRecord::Party(r) => r.into_node(),
            ApiRecord::Organ(r) => r.into_node(),
            ApiRecord::Votation(r) => r.into_node(),
            ApiRecord::Proposition(r) => r.into_node(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proposition_status_flattening() {
        let raw = json!({
            "id": 2401234,
            "siglaTipo": "PL",
            "ementa": "Altera a Lei",
            "uriAutores": "https://dadosabertos.camara.leg.br/api/v2/proposicoes/2401234/autores",
            "statusProposicao": {
                "dataHora": "2025-09-10T10:00",
                "descricaoSituacao": null,
                "codSituacao": 924,
            },
            "keywords": ["a", "b"],
        });

        let record = ApiRecord::decode(Label::Proposition, raw).unwrap();
        let ApiRecord::Proposition(ref proposition) = record else {
            panic!("expected proposition");
        };
        assert!(proposition.authors_uri().is_some());

        let node = record.into_node();
        assert_eq!(node.key, NodeKey::Int(2401234));
        assert_eq!(node.get("id"), Some(&PropertyValue::Int(2401234)));
        assert_eq!(node.get("status_codSituacao"), Some(&PropertyValue::Int(924)));
        assert!(node.get("status_descricaoSituacao").is_none());
        assert!(node.get("statusProposicao").is_none());
        assert!(node.get("keywords").is_none());
        assert_eq!(node.get("siglaTipo"), Some(&PropertyValue::Text("PL".into())));
    }

    #[test]
    fn test_party_keyed_by_sigla() {
        let raw = json!({"id": 36844, "sigla": "PT", "nome": "Partido dos Trabalhadores"});
        let node = ApiRecord::decode(Label::Party, raw).unwrap().into_node();
        assert_eq!(node.key, NodeKey::Text("PT".into()));
        assert_eq!(node.get("id"), Some(&PropertyValue::Int(36844)));
    }

    #[test]
    fn test_decode_rejects_missing_key() {
        assert!(ApiRecord::decode(Label::Deputy, json!({"nome": "Sem id"})).is_err());
    }

    #[test]
    fn test_votation_detail_propositions() {
        let detail: VotationDetail = serde_json::from_value(json!({
            "id": "2345-67",
            "descricao": "Aprovado o requerimento",
            "proposicoesAfetadas": [{"id": 10, "siglaTipo": "PL", "numero": 12, "ano": 2025}],
            "objetosPossiveis": [{"id": 11, "ementa": "Requer"}, {"titulo": "sem id"}],
        }))
        .unwrap();

        let ids: Vec<i64> = detail.propositions().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11]);

        let node = detail.to_node("2345-67");
        assert_eq!(node.get("descricao"), Some(&PropertyValue::Text("Aprovado o requerimento".into())));
        assert!(node.get("proposicoesAfetadas").is_none());
    }

    #[test]
    fn test_votation_detail_null_lists() {
        let detail: VotationDetail = serde_json::from_value(json!({
            "id": "1-1",
            "proposicoesAfetadas": null,
        }))
        .unwrap();
        assert!(detail.propositions().is_empty());
    }

    #[test]
    fn test_votation_detail_keyed_by_requested_id() {
        let detail: VotationDetail = serde_json::from_value(json!({
            "descricao": "x",
            "proposicoesAfetadas": [{"id": 5}],
        }))
        .unwrap();
        let node = detail.to_node("9-9");
        assert_eq!(node.key, NodeKey::Text("9-9".into()));
        assert_eq!(node.get("id"), Some(&PropertyValue::Text("9-9".into())));

        let mismatched: VotationDetail = serde_json::from_value(json!({"id": "other", "descricao": "y"})).unwrap();
        let node = mismatched.to_node("9-9");
        assert_eq!(node.key, NodeKey::Text("9-9".into()));
        assert_eq!(node.get("id"), Some(&PropertyValue::Text("9-9".into())));
    }

    #[test]
    fn test_votation_detail_propositions_deduplicated() {
        let detail: VotationDetail = serde_json::from_value(json!({
            "proposicoesAfetadas": [{"id": 10, "siglaTipo": "PL"}, {"id": 10}],
            "objetosPossiveis": [{"id": 11}, {"id": 10, "ementa": "repetida"}],
        }))
        .unwrap();
        let propositions = detail.propositions();
        let ids: Vec<i64> = propositions.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(propositions[0].sigla_tipo.as_deref(), Some("PL"));
    }

    #[test]
    fn test_summary_sets_only_present_fields() {
        let summary: PropositionSummary =
            serde_json::from_value(json!({"id": 5, "siglaTipo": "REQ"})).unwrap();
        let node = summary.into_node();
        assert_eq!(node.properties.len(), 2);
        assert!(node.get("ementa").is_none());
    }

    #[test]
    fn test_membership_open_interval() {
        let membership: MembershipRecord = serde_json::from_value(json!({
            "idOrgao": 2003,
            "titulo": "Titular",
            "dataInicio": "2023-03-01",
            "dataFim": null,
        }))
        .unwrap();
        let props = membership.edge_properties();
        assert_eq!(props.get("title"), Some(&PropertyValue::Text("Titular".into())));
        assert_eq!(props.get("endDate"), Some(&PropertyValue::Null));
    }

    #[test]
    fn test_vote_record() {
        let vote: VoteRecord = serde_json::from_value(json!({
            "tipoVoto": "Sim",
            "dataRegistroVoto": "2025-09-02T18:01:02",
            "deputado_": {"id": 204554, "nome": "Fulana"},
        }))
        .unwrap();
        assert_eq!(vote.deputy.id, 204554);
        assert_eq!(vote.edge_properties().get("vote"), Some(&PropertyValue::Text("Sim".into())));
    }
}
