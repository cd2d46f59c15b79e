use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, Value};

pub use entity::{
    agent_decisions, approval_histories, case_variables, cases, consensus_votes, data_tables,
    decision_consensuses, decision_contexts, decision_histories, involvements, owner_responses,
    requester_responses, users, variable_matches, Id,
};

pub mod agent_decision;
pub mod approval_history;
pub mod case;
pub mod case_variable;
pub mod data_table;
pub mod decision_consensus;
pub mod decision_context;
pub mod decision_history;
pub mod error;
pub mod involvement;
pub mod mutate;
pub mod owner_response;
pub mod query;
pub mod requester_response;
pub mod user;
pub mod variable_match;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// `QueryFilterMap` is a data structure that serves as a bridge for translating
/// filter parameters between layers. It wraps a `HashMap` keyed by column name
/// holding optional `sea_orm::Value`s, so that caller-facing parameter structs
/// can be turned into database filters without the query layer knowing about
/// the callers' types.
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a parameter struct into a `QueryFilterMap`. Implemented by the
/// caller-facing layers so that each endpoint decides which of its fields
/// become database filters.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

pub async fn seed_database(db: &DatabaseConnection) {
    use entity::case_status::CaseStatus;
    use entity::roles::Role;
    use entity::search_status::SearchStatus;

    let now = Utc::now();

    let _admin_user: users::ActiveModel = users::ActiveModel {
        email: Set("admin@datacase.dev".to_owned()),
        display_name: Set(Some("Platform Admin".to_owned())),
        role: Set(Role::Admin),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    let requester = users::ActiveModel {
        email: Set("ana.ribeiro@datacase.dev".to_owned()),
        display_name: Set(Some("Ana Ribeiro".to_owned())),
        role: Set(Role::User),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    let table_owner = users::ActiveModel {
        email: Set("marcos.lima@datacase.dev".to_owned()),
        display_name: Set(Some("Marcos Lima".to_owned())),
        role: Set(Role::Manager),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    let owner_id = table_owner.id.clone().unwrap();

    for (name, display, description, domain, keywords) in [
        (
            "tb_receita_clientes",
            "Receita de Clientes",
            "Receita mensal consolidada por cliente",
            "vendas",
            "receita,cliente,faturamento",
        ),
        (
            "tb_pedidos",
            "Pedidos",
            "Pedidos de venda com status e datas",
            "vendas",
            "pedido,venda,status",
        ),
        (
            "tb_cadastro_produtos",
            "Cadastro de Produtos",
            "Catalogo de produtos ativos e descontinuados",
            "produtos",
            "produto,sku,catalogo",
        ),
    ] {
        data_tables::ActiveModel {
            name: Set(name.to_owned()),
            display_name: Set(Some(display.to_owned())),
            description: Set(Some(description.to_owned())),
            domain: Set(Some(domain.to_owned())),
            keywords: Set(Some(keywords.to_owned())),
            owner_id: Set(owner_id),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .save(db)
        .await
        .unwrap();
    }

    let demo_case = cases::ActiveModel {
        title: Set("Análise de churn de clientes".to_owned()),
        status: Set(CaseStatus::Draft),
        requester_id: Set(requester.id.clone().unwrap()),
        macro_case: Set(Some("vendas e retenção".to_owned())),
        budget: Set(Some(40_000.0)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .save(db)
    .await
    .unwrap();

    for (name, variable_type, concept) in [
        (
            "receita_total",
            "currency",
            "receita total por cliente nos últimos 12 meses",
        ),
        ("data_ultimo_pedido", "date", "data do último pedido do cliente"),
    ] {
        case_variables::ActiveModel {
            case_id: Set(demo_case.id.clone().unwrap()),
            name: Set(name.to_owned()),
            variable_type: Set(variable_type.to_owned()),
            concept: Set(Some(concept.to_owned())),
            search_status: Set(SearchStatus::Pending),
            is_cancelled: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .save(db)
        .await
        .unwrap();
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[tokio::test]
    async fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let uuid_str = "invalid";
        let result = uuid_parse_str(uuid_str);
        assert!(result.is_err());
    }
}
