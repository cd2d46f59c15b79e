//! Match scoring between a case variable and a catalog table.
//!
//! The score is a weighted sum of four independent signals: semantic token
//! overlap, historical approval rate, keyword overlap and domain affinity.
//! Everything here is a pure function over models already loaded by the
//! caller; the only state the engine sees is the optional approval-history
//! row passed in.

use std::collections::HashSet;

use entity::{approval_histories, case_variables, data_tables};
use service::config::Config;
use sha2::{Digest, Sha256};

/// Portuguese stop words removed before computing token overlap.
const STOP_WORDS: &[&str] = &[
    "de", "da", "do", "e", "para", "com", "em", "a", "o", "os", "as", "um", "uma",
];

/// Injected scoring tunables. Tests construct these directly; production code
/// builds them from [`Config`]. Weights are expected to sum to 1.0.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub semantic_weight: f64,
    pub history_weight: f64,
    pub keyword_weight: f64,
    pub domain_weight: f64,
    /// Candidates scoring below this cutoff are discarded.
    pub min_match_score: f64,
    /// Maximum number of candidates persisted per search run.
    pub max_results: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.40,
            history_weight: 0.30,
            keyword_weight: 0.20,
            domain_weight: 0.10,
            min_match_score: 0.3,
            max_results: 5,
        }
    }
}

impl ScoringConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            semantic_weight: config.semantic_weight,
            history_weight: config.history_weight,
            keyword_weight: config.keyword_weight,
            domain_weight: config.domain_weight,
            min_match_score: config.min_match_score,
            max_results: config.max_match_results,
        }
    }

    pub fn weights_sum(&self) -> f64 {
        self.semantic_weight + self.history_weight + self.keyword_weight + self.domain_weight
    }
}

/// A computed score with its human-readable justification.
#[derive(Debug, Clone)]
pub struct MatchScore {
    pub score: f64,
    pub reasons: String,
}

/// Content-address of a (variable name, variable type) pair used to key
/// historical approval statistics. Case-insensitive: `("Revenue", "Currency")`
/// and `("revenue", "currency")` hash identically.
pub fn concept_hash(name: &str, variable_type: &str) -> String {
    let normalized = format!(
        "{}:{}",
        name.trim().to_lowercase(),
        variable_type.trim().to_lowercase()
    );
    let digest = Sha256::digest(normalized.as_bytes());
    let hex = digest.iter().fold(String::new(), |mut acc, byte| {
        acc.push_str(&format!("{byte:02x}"));
        acc
    });
    hex[..32].to_string()
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty() && !STOP_WORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

/// Jaccard similarity between the token set of {variable name, concept} and
/// {table name, description, display name}. Empty-set comparisons score 0.
pub fn semantic_similarity(
    variable_name: &str,
    concept: &str,
    table_name: &str,
    description: &str,
    display_name: &str,
) -> f64 {
    let variable_tokens = tokenize(&format!("{variable_name} {concept}"));
    let table_tokens = tokenize(&format!("{table_name} {description} {display_name}"));

    if variable_tokens.is_empty() || table_tokens.is_empty() {
        return 0.0;
    }

    let intersection = variable_tokens.intersection(&table_tokens).count();
    let union = variable_tokens.union(&table_tokens).count();

    intersection as f64 / union as f64
}

/// Fraction of the table's declared keywords that substring-match the
/// variable name in either direction, capped at 1.0.
pub fn keyword_overlap(variable_name: &str, keywords: Option<&str>) -> f64 {
    let variable_name = variable_name.to_lowercase();

    let keywords: Vec<String> = keywords
        .unwrap_or_default()
        .split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    if keywords.is_empty() {
        return 0.0;
    }

    let hits = keywords
        .iter()
        .filter(|keyword| variable_name.contains(*keyword) || keyword.contains(&variable_name))
        .count();

    (hits as f64 / keywords.len() as f64).min(1.0)
}

/// 1.0 when the table's domain is a case-insensitive substring of the case's
/// macro-case hint; neutral 0.5 otherwise or when either side is absent.
pub fn domain_affinity(table_domain: Option<&str>, macro_case: Option<&str>) -> f64 {
    match (table_domain, macro_case) {
        (Some(domain), Some(hint)) if !domain.is_empty() => {
            if hint.to_lowercase().contains(&domain.to_lowercase()) {
                1.0
            } else {
                0.5
            }
        }
        _ => 0.5,
    }
}

/// Historical approval rate for a (concept hash, table) pair; a neutral 0.5
/// when no history exists yet.
pub fn approval_rate(history: Option<&approval_histories::Model>) -> f64 {
    match history {
        Some(row) => {
            let total = row.approved_count + row.rejected_count;
            if total == 0 {
                0.5
            } else {
                f64::from(row.approved_count) / f64::from(total)
            }
        }
        None => 0.5,
    }
}

/// Scores one (variable, table) pair. Each signal above 0.5 contributes a
/// short justification; the final score is the weighted sum of the four
/// signals, not re-normalized.
pub fn score(
    variable: &case_variables::Model,
    table: &data_tables::Model,
    history: Option<&approval_histories::Model>,
    macro_case: Option<&str>,
    config: &ScoringConfig,
) -> MatchScore {
    let semantic = semantic_similarity(
        &variable.name,
        variable.concept.as_deref().unwrap_or_default(),
        &table.name,
        table.description.as_deref().unwrap_or_default(),
        table.display_name.as_deref().unwrap_or_default(),
    );
    let historical = approval_rate(history);
    let keyword = keyword_overlap(&variable.name, table.keywords.as_deref());
    let domain = domain_affinity(table.domain.as_deref(), macro_case);

    let score = semantic * config.semantic_weight
        + historical * config.history_weight
        + keyword * config.keyword_weight
        + domain * config.domain_weight;

    let mut reasons: Vec<String> = Vec::new();
    if semantic > 0.5 {
        reasons.push(format!(
            "strong name/concept overlap with \"{}\"",
            table.name
        ));
    }
    if historical > 0.5 {
        reasons.push("similar requests were approved on this table before".to_owned());
    }
    if keyword > 0.5 {
        reasons.push("declared keywords match the variable name".to_owned());
    }
    if domain > 0.5 {
        reasons.push("table domain matches the case's macro case".to_owned());
    }

    let reasons = if reasons.is_empty() {
        "weak signals only; review carefully before confirming".to_owned()
    } else {
        reasons.join("; ")
    };

    MatchScore { score, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use entity::Id;

    fn history_row(approved: i32, rejected: i32) -> approval_histories::Model {
        let now = Utc::now();
        approval_histories::Model {
            id: Id::new_v4(),
            concept_hash: "c".repeat(32),
            data_table_id: Id::new_v4(),
            approved_count: approved,
            rejected_count: rejected,
            last_used_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let config = ScoringConfig::default();
        assert!((config.weights_sum() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn concept_hash_is_deterministic_and_case_insensitive() {
        assert_eq!(
            concept_hash("Revenue", "Currency"),
            concept_hash("revenue", "currency")
        );
        assert_eq!(concept_hash("revenue", "currency").len(), 32);
        assert_ne!(
            concept_hash("revenue", "currency"),
            concept_hash("revenue", "date")
        );
    }

    #[test]
    fn approval_rate_defaults_to_neutral_without_history() {
        assert_eq!(approval_rate(None), 0.5);
        assert_eq!(approval_rate(Some(&history_row(0, 0))), 0.5);
    }

    #[test]
    fn approval_rate_reflects_counters() {
        assert!((approval_rate(Some(&history_row(7, 3))) - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn semantic_similarity_identical_sets_is_one() {
        assert_eq!(
            semantic_similarity("revenue total", "", "revenue total", "", ""),
            1.0
        );
    }

    #[test]
    fn semantic_similarity_disjoint_sets_is_zero() {
        assert_eq!(
            semantic_similarity("revenue", "", "inventory", "warehouse stock", ""),
            0.0
        );
    }

    #[test]
    fn semantic_similarity_empty_side_is_zero() {
        assert_eq!(semantic_similarity("", "", "revenue", "", ""), 0.0);
    }

    #[test]
    fn semantic_similarity_strips_stop_words() {
        // "receita de clientes" and "receita clientes" only differ by a stop word.
        assert_eq!(
            semantic_similarity("receita de clientes", "", "receita clientes", "", ""),
            1.0
        );
    }

    #[test]
    fn keyword_overlap_counts_matching_fraction() {
        assert!(
            (keyword_overlap("receita_cliente", Some("receita,pedido")) - 0.5).abs()
                < f64::EPSILON
        );
        assert_eq!(keyword_overlap("receita", None), 0.0);
        assert_eq!(keyword_overlap("receita", Some("")), 0.0);
    }

    #[test]
    fn domain_affinity_requires_substring_hit() {
        assert_eq!(domain_affinity(Some("vendas"), Some("Vendas e retenção")), 1.0);
        assert_eq!(domain_affinity(Some("rh"), Some("vendas")), 0.5);
        assert_eq!(domain_affinity(None, Some("vendas")), 0.5);
        assert_eq!(domain_affinity(Some("vendas"), None), 0.5);
    }

    fn variable(name: &str, concept: &str) -> case_variables::Model {
        let now = Utc::now();
        case_variables::Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            name: name.to_owned(),
            variable_type: "currency".to_owned(),
            concept: Some(concept.to_owned()),
            search_status: Default::default(),
            is_cancelled: false,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
            search_started_at: None,
            search_completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn table(name: &str, description: &str, keywords: &str, domain: &str) -> data_tables::Model {
        let now = Utc::now();
        data_tables::Model {
            id: Id::new_v4(),
            name: name.to_owned(),
            display_name: None,
            description: Some(description.to_owned()),
            domain: Some(domain.to_owned()),
            keywords: Some(keywords.to_owned()),
            owner_id: Id::new_v4(),
            is_active: true,
            synced_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn score_is_weighted_sum_of_signals() {
        let config = ScoringConfig::default();
        let variable = variable("receita", "receita mensal");
        let table = table("receita", "receita mensal", "receita", "vendas");

        let result = score(&variable, &table, None, Some("vendas"), &config);

        // semantic 1.0 * 0.4 + history 0.5 * 0.3 + keyword 1.0 * 0.2 + domain 1.0 * 0.1
        assert!((result.score - 0.85).abs() < 1e-9);
        assert!(result.reasons.contains("overlap"));
    }

    #[test]
    fn score_falls_back_to_generic_reason() {
        let config = ScoringConfig::default();
        let variable = variable("margem", "margem bruta");
        let table = table("tb_estoque", "posições de estoque", "estoque", "logistica");

        let result = score(&variable, &table, None, None, &config);

        assert!(result.reasons.contains("weak signals"));
    }
}
