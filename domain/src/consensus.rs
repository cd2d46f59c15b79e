//! Automated-agent decisions and the quorum consensus around them.
//!
//! Confidence routing: at or above the auto-approve threshold a decision
//! binds immediately; below the auto-reject threshold it is rejected unless
//! its type is critical, in which case it escalates to humans; everything in
//! between escalates. Escalated decisions get a consensus row with a voting
//! deadline. Expiry is always derived from the deadline at read time, never
//! stored; an expired consensus resolves to rejected on its next evaluation.

use crate::error::{BusinessRuleKind, Error};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use entity::decision_status::{AgentDecisionStatus, AgentDecisionType};
use entity::{agent_decisions, decision_consensuses, Id};
use entity_api::{agent_decision, decision_consensus, decision_context};
use log::*;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Injected consensus tunables; production code builds them from
/// [`service::config::Config`], tests construct them directly.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    /// Confidence at or above which a decision auto-approves.
    pub auto_approve_threshold: f64,
    /// Confidence below which a non-critical decision auto-rejects.
    pub auto_reject_threshold: f64,
    pub required_approvals: i32,
    pub voting_window_hours: i64,
    /// Minimum confidence for an approved decision to be reusable.
    pub reuse_threshold: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            auto_approve_threshold: 0.90,
            auto_reject_threshold: 0.40,
            required_approvals: 2,
            voting_window_hours: 72,
            reuse_threshold: 0.70,
        }
    }
}

impl ConsensusConfig {
    pub fn from_config(config: &service::config::Config) -> Self {
        Self {
            auto_approve_threshold: config.auto_approve_threshold,
            auto_reject_threshold: config.auto_reject_threshold,
            required_approvals: config.required_approvals,
            voting_window_hours: config.voting_window_hours,
            reuse_threshold: config.reuse_threshold,
        }
    }
}

/// Where confidence routing sends a fresh decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    AutoApprove,
    AutoReject,
    RequireConsensus,
}

/// Pure routing policy over confidence and decision-type criticality.
pub fn route(
    decision_type: AgentDecisionType,
    confidence: f64,
    config: &ConsensusConfig,
) -> Disposition {
    if confidence >= config.auto_approve_threshold {
        Disposition::AutoApprove
    } else if confidence < config.auto_reject_threshold {
        if decision_type.is_critical() {
            Disposition::RequireConsensus
        } else {
            Disposition::AutoReject
        }
    } else {
        Disposition::RequireConsensus
    }
}

/// Canonical JSON with recursively sorted object keys, so that equal
/// contexts hash equally regardless of field order.
fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map
                .iter()
                .map(|(key, inner)| (key.clone(), normalize(inner)))
                .collect();
            serde_json::to_value(sorted).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

/// Content-address of a decision context: first 32 hex chars of SHA-256 over
/// the normalized context payload.
pub fn context_hash(context_type: &str, context_data: &Value) -> String {
    let canonical = format!("{context_type}:{}", normalize(context_data));
    let digest = Sha256::digest(canonical.as_bytes());
    let hex = digest.iter().fold(String::new(), |mut acc, byte| {
        acc.push_str(&format!("{byte:02x}"));
        acc
    });
    hex[..32].to_string()
}

/// Input for [`record_decision`].
#[derive(Debug, Clone)]
pub struct NewAgentDecision {
    pub agent_id: String,
    pub decision_type: AgentDecisionType,
    pub context_type: String,
    pub context_data: Value,
    pub value: Value,
    pub confidence: f64,
}

/// Outcome of recording a decision: the stored decision, the consensus row
/// when voting is required, and whether a past decision was reused.
#[derive(Debug)]
pub struct RecordedDecision {
    pub decision: agent_decisions::Model,
    pub consensus: Option<decision_consensuses::Model>,
    pub is_reused: bool,
}

/// Records an agent decision, routing it per the confidence policy and
/// reusing a past approved decision on the same context when one qualifies.
pub async fn record_decision(
    db: &DatabaseConnection,
    config: &ConsensusConfig,
    new_decision: NewAgentDecision,
) -> Result<RecordedDecision, Error> {
    if !(0.0..=1.0).contains(&new_decision.confidence) {
        return Err(Error::validation(format!(
            "confidence must be within [0, 1], got {}",
            new_decision.confidence
        )));
    }

    let hash = context_hash(&new_decision.context_type, &new_decision.context_data);
    let context_data = serde_json::to_string(&normalize(&new_decision.context_data))?;
    let context =
        decision_context::find_or_create(db, &new_decision.context_type, &hash, &context_data)
            .await?;

    // Reuse path: a previously approved, high-confidence decision on the
    // same context short-circuits routing entirely.
    if let Some(source) = reusable_source(db, config, context.id).await? {
        let reused = agent_decision::create(
            db,
            agent_decisions::Model {
                id: Id::new_v4(),
                agent_id: new_decision.agent_id,
                decision_type: new_decision.decision_type,
                context_id: Some(context.id),
                value: source.value.clone(),
                confidence: source.confidence,
                status: AgentDecisionStatus::Approved,
                is_reused: true,
                source_decision_id: Some(source.id),
                reuse_count: 0,
                created_at: chrono::Utc::now().into(),
                updated_at: chrono::Utc::now().into(),
            },
        )
        .await?;
        agent_decision::increment_reuse(db, source.id).await?;

        info!(
            "Agent decision {} reused approved decision {} on context {hash}",
            reused.id, source.id
        );

        return Ok(RecordedDecision {
            decision: reused,
            consensus: None,
            is_reused: true,
        });
    }

    let disposition = route(new_decision.decision_type, new_decision.confidence, config);
    let status = match disposition {
        Disposition::AutoApprove => AgentDecisionStatus::Approved,
        Disposition::AutoReject => AgentDecisionStatus::Rejected,
        Disposition::RequireConsensus => AgentDecisionStatus::ConsensusRequired,
    };

    let decision = agent_decision::create(
        db,
        agent_decisions::Model {
            id: Id::new_v4(),
            agent_id: new_decision.agent_id,
            decision_type: new_decision.decision_type,
            context_id: Some(context.id),
            value: serde_json::to_string(&new_decision.value)?,
            confidence: new_decision.confidence,
            status,
            is_reused: false,
            source_decision_id: None,
            reuse_count: 0,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    let consensus = match disposition {
        Disposition::RequireConsensus => {
            let deadline: DateTime<FixedOffset> =
                (Utc::now() + Duration::hours(config.voting_window_hours)).into();
            let row =
                decision_consensus::create(db, decision.id, config.required_approvals, deadline)
                    .await?;
            Some(row)
        }
        Disposition::AutoApprove => {
            decision_context::record_outcome(db, context.id, true).await?;
            None
        }
        Disposition::AutoReject => {
            decision_context::record_outcome(db, context.id, false).await?;
            None
        }
    };

    debug!(
        "Agent decision {} recorded with status {} (confidence {})",
        decision.id, decision.status, decision.confidence
    );

    Ok(RecordedDecision {
        decision,
        consensus,
        is_reused: false,
    })
}

async fn reusable_source(
    db: &DatabaseConnection,
    config: &ConsensusConfig,
    context_id: Id,
) -> Result<Option<agent_decisions::Model>, Error> {
    let latest = decision_context::latest_decision(db, context_id).await?;

    let Some(candidate) = latest else {
        return Ok(None);
    };
    if candidate.status != AgentDecisionStatus::Approved
        || candidate.confidence < config.reuse_threshold
    {
        return Ok(None);
    }

    // Follow the back-reference so chained reuses all credit the original.
    match candidate.source_decision_id {
        Some(original_id) => Ok(Some(agent_decision::find_by_id(db, original_id).await?)),
        None => Ok(Some(candidate)),
    }
}

/// Quorum is reached once the total number of votes meets the requirement.
pub fn has_quorum(consensus: &decision_consensuses::Model) -> bool {
    consensus.approval_votes + consensus.rejection_votes >= consensus.required_approvals
}

/// At quorum, approval wins only on a strict majority of approvals.
pub fn tally_outcome(consensus: &decision_consensuses::Model) -> AgentDecisionStatus {
    if consensus.approval_votes > consensus.rejection_votes {
        AgentDecisionStatus::Approved
    } else {
        AgentDecisionStatus::Rejected
    }
}

/// Whether an unresolved consensus has outlived its voting deadline.
pub fn is_expired(
    consensus: &decision_consensuses::Model,
    now: DateTime<FixedOffset>,
) -> bool {
    consensus.resolved_at.is_none() && now > consensus.deadline
}

/// Result of a vote: the refreshed tally plus the decision status when the
/// vote closed the consensus.
#[derive(Debug)]
pub struct VoteOutcome {
    pub consensus: decision_consensuses::Model,
    pub resolved_status: Option<AgentDecisionStatus>,
}

/// Casts one vote. A second vote by the same voter is a conflict; voting on
/// a resolved or expired consensus is refused (an expired one is resolved
/// to rejected on the spot, per lazy expiry).
pub async fn vote(
    db: &DatabaseConnection,
    consensus_id: Id,
    voter_id: Id,
    approve: bool,
    comment: Option<String>,
) -> Result<VoteOutcome, Error> {
    let consensus = decision_consensus::find_by_id(db, consensus_id).await?;

    if consensus.resolved_at.is_some() {
        return Err(Error::business(
            BusinessRuleKind::ConsensusClosed,
            "this consensus has already been resolved",
        ));
    }

    if is_expired(&consensus, Utc::now().into()) {
        resolve(db, &consensus, AgentDecisionStatus::Rejected).await?;
        return Err(Error::business(
            BusinessRuleKind::ConsensusClosed,
            "the voting deadline has passed; the decision expired",
        ));
    }

    let updated = decision_consensus::record_vote(db, consensus_id, voter_id, approve, comment)
        .await?;

    if has_quorum(&updated) {
        let status = tally_outcome(&updated);
        let resolved = resolve(db, &updated, status).await?;
        return Ok(VoteOutcome {
            consensus: resolved,
            resolved_status: Some(status),
        });
    }

    Ok(VoteOutcome {
        consensus: updated,
        resolved_status: None,
    })
}

async fn resolve(
    db: &DatabaseConnection,
    consensus: &decision_consensuses::Model,
    status: AgentDecisionStatus,
) -> Result<decision_consensuses::Model, Error> {
    let decision = agent_decision::update_status(db, consensus.agent_decision_id, status).await?;
    if let Some(context_id) = decision.context_id {
        decision_context::record_outcome(
            db,
            context_id,
            status == AgentDecisionStatus::Approved,
        )
        .await?;
    }
    let resolved = decision_consensus::mark_resolved(db, consensus.id).await?;

    info!(
        "Consensus {} resolved to {status} ({} approvals / {} rejections)",
        consensus.id, consensus.approval_votes, consensus.rejection_votes
    );

    Ok(resolved)
}

/// Aggregate view over recorded agent decisions.
#[derive(Debug, Default, serde::Serialize)]
pub struct DecisionStatistics {
    /// Decision counts keyed by "type/status".
    pub counts: std::collections::BTreeMap<String, u64>,
    pub average_confidence: f64,
    /// Fraction of decisions that were reused from an earlier one.
    pub reuse_rate: f64,
    pub total: u64,
}

/// Pure aggregation over loaded decisions.
pub fn compute_statistics(decisions: &[agent_decisions::Model]) -> DecisionStatistics {
    let mut stats = DecisionStatistics::default();

    if decisions.is_empty() {
        return stats;
    }

    let mut confidence_sum = 0.0;
    let mut reused = 0u64;

    for decision in decisions {
        let key = format!("{}/{}", decision.decision_type, decision.status);
        *stats.counts.entry(key).or_insert(0) += 1;
        confidence_sum += decision.confidence;
        reused += u64::from(decision.is_reused);
    }

    stats.total = decisions.len() as u64;
    stats.average_confidence = confidence_sum / decisions.len() as f64;
    stats.reuse_rate = reused as f64 / decisions.len() as f64;

    stats
}

pub async fn statistics(db: &DatabaseConnection) -> Result<DecisionStatistics, Error> {
    let decisions = agent_decision::find_all(db).await?;
    Ok(compute_statistics(&decisions))
}

/// Periodic sweep resolving every consensus past its deadline to rejected.
/// Idempotent: already-resolved rows are never revisited.
pub async fn expire_overdue(db: &DatabaseConnection) -> Result<u64, Error> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let expired = decision_consensus::find_expired(db, now).await?;
    let mut resolved = 0;

    for consensus in expired {
        resolve(db, &consensus, AgentDecisionStatus::Rejected).await?;
        resolved += 1;
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn consensus_row(
        approvals: i32,
        rejections: i32,
        required: i32,
        resolved: bool,
    ) -> decision_consensuses::Model {
        let now = Utc::now();
        decision_consensuses::Model {
            id: Id::new_v4(),
            agent_decision_id: Id::new_v4(),
            required_approvals: required,
            deadline: (now + Duration::hours(1)).into(),
            approval_votes: approvals,
            rejection_votes: rejections,
            resolved_at: resolved.then(|| now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn high_confidence_auto_approves() {
        let config = ConsensusConfig::default();
        assert_eq!(
            route(AgentDecisionType::TableClassification, 0.95, &config),
            Disposition::AutoApprove
        );
    }

    #[test]
    fn mid_confidence_requires_consensus() {
        let config = ConsensusConfig::default();
        assert_eq!(
            route(AgentDecisionType::TableClassification, 0.45, &config),
            Disposition::RequireConsensus
        );
        assert_eq!(
            route(AgentDecisionType::VariableMatch, 0.45, &config),
            Disposition::RequireConsensus
        );
    }

    #[test]
    fn low_confidence_depends_on_criticality() {
        let config = ConsensusConfig::default();
        assert_eq!(
            route(AgentDecisionType::TableClassification, 0.2, &config),
            Disposition::AutoReject
        );
        assert_eq!(
            route(AgentDecisionType::VariableMatch, 0.2, &config),
            Disposition::RequireConsensus
        );
    }

    #[test]
    fn context_hash_ignores_key_order() {
        let a = json!({"table": "tb_pedidos", "variable": "receita"});
        let b = json!({"variable": "receita", "table": "tb_pedidos"});

        assert_eq!(context_hash("match", &a), context_hash("match", &b));
        assert_eq!(context_hash("match", &a).len(), 32);
        assert_ne!(context_hash("match", &a), context_hash("other", &a));
    }

    #[test]
    fn quorum_counts_votes_of_both_kinds() {
        assert!(!has_quorum(&consensus_row(1, 0, 2, false)));
        assert!(has_quorum(&consensus_row(2, 0, 2, false)));
        assert!(has_quorum(&consensus_row(1, 1, 2, false)));
    }

    #[test]
    fn tally_requires_strict_majority_for_approval() {
        assert_eq!(
            tally_outcome(&consensus_row(2, 0, 2, false)),
            AgentDecisionStatus::Approved
        );
        assert_eq!(
            tally_outcome(&consensus_row(1, 1, 2, false)),
            AgentDecisionStatus::Rejected
        );
        assert_eq!(
            tally_outcome(&consensus_row(0, 2, 2, false)),
            AgentDecisionStatus::Rejected
        );
    }

    #[test]
    fn statistics_aggregate_counts_confidence_and_reuse() {
        let now = Utc::now();
        let decision = |status, confidence, is_reused| agent_decisions::Model {
            id: Id::new_v4(),
            agent_id: "matcher-1".to_owned(),
            decision_type: AgentDecisionType::VariableMatch,
            context_id: None,
            value: "{}".to_owned(),
            confidence,
            status,
            is_reused,
            source_decision_id: None,
            reuse_count: 0,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let stats = compute_statistics(&[
            decision(AgentDecisionStatus::Approved, 0.9, false),
            decision(AgentDecisionStatus::Approved, 0.9, true),
            decision(AgentDecisionStatus::Rejected, 0.3, false),
        ]);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.counts["variable_match/approved"], 2);
        assert_eq!(stats.counts["variable_match/rejected"], 1);
        assert!((stats.average_confidence - 0.7).abs() < 1e-9);
        assert!((stats.reuse_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn expiry_is_derived_from_the_deadline() {
        let now = Utc::now();
        let mut row = consensus_row(0, 0, 2, false);
        row.deadline = (now - Duration::hours(1)).into();

        assert!(is_expired(&row, now.into()));

        row.resolved_at = Some(now.into());
        assert!(!is_expired(&row, now.into()));
    }
}
