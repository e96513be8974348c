//! Composite reputation score.
//!
//! Eight additive sub-scores, each independently capped, summed and clamped
//! to [0, 100]. The constants below are an explicit weighted heuristic, not a
//! fitted model; changing any of them changes every previously issued score.

/// Everything the composer needs, already aggregated.
#[derive(Debug, Clone, Default)]
pub struct ScoreInputs {
    pub total_transactions: u64,
    pub active_chain_count: usize,
    pub total_trades: u64,
    pub wallet_age_years: f64,
    pub unique_protocol_count: usize,
    pub total_net_worth_usd: f64,
    pub usd_at_risk: f64,
    pub total_fees_usd: f64,
    pub total_profit_usd: f64,
    pub has_ens_domain: bool,
    pub has_unstoppable_domain: bool,
}

/// Max 60: 25 base + transaction volume + chain breadth + trading volume.
fn activity_score(inputs: &ScoreInputs) -> f64 {
    25.0 + (inputs.total_transactions as f64 / 250.0 * 15.0).min(15.0)
        + (inputs.active_chain_count as f64 / 3.0 * 10.0).min(10.0)
        + (inputs.total_trades as f64 / 40.0 * 10.0).min(10.0)
}

/// Max 5: 4 base + up to 1 for age, saturating at 1.5 years.
fn age_score(inputs: &ScoreInputs) -> f64 {
    4.0 + (inputs.wallet_age_years / 1.5).min(1.0)
}

/// Max 10: 6 base + up to 4 for protocol breadth, saturating at 3 protocols.
fn defi_score(inputs: &ScoreInputs) -> f64 {
    6.0 + (inputs.unique_protocol_count as f64 / 3.0 * 4.0).min(4.0)
}

/// Max 20, saturating at $20k net worth.
fn net_worth_score(inputs: &ScoreInputs) -> f64 {
    (inputs.total_net_worth_usd / 20_000.0 * 20.0).min(20.0)
}

/// Max 5, inverse of approval exposure; floors at 0 past $50k at risk.
fn risk_score(inputs: &ScoreInputs) -> f64 {
    ((1.0 - inputs.usd_at_risk / 50_000.0) * 5.0).max(0.0)
}

/// Max 10. Fees relative to net worth, with net worth floored at 1 so a
/// zero-net-worth wallet divides by 1 instead of zero.
fn gas_score(inputs: &ScoreInputs) -> f64 {
    let ratio = inputs.total_fees_usd / inputs.total_net_worth_usd.max(1.0);
    (ratio / 0.05 * 10.0).min(10.0)
}

/// Max 5, saturating at $2k profit. A net loss is a flat 2, not an error.
fn profitability_score(inputs: &ScoreInputs) -> f64 {
    if inputs.total_profit_usd >= 0.0 {
        (inputs.total_profit_usd / 2_000.0 * 5.0).min(5.0)
    } else {
        2.0
    }
}

/// 10 for both naming services, 5 for one, 0 for none.
fn domain_score(inputs: &ScoreInputs) -> f64 {
    match (inputs.has_ens_domain, inputs.has_unstoppable_domain) {
        (true, true) => 10.0,
        (true, false) | (false, true) => 5.0,
        (false, false) => 0.0,
    }
}

/// Compose the final score: sum of all sub-scores clamped to [0, 100],
/// rounded to two decimals for display.
pub fn compose(inputs: &ScoreInputs) -> f64 {
    let total = activity_score(inputs)
        + age_score(inputs)
        + defi_score(inputs)
        + net_worth_score(inputs)
        + risk_score(inputs)
        + gas_score(inputs)
        + profitability_score(inputs)
        + domain_score(inputs);

    round2(total.clamp(0.0, 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {} ~= {}", a, b);
    }

    #[test]
    fn test_inactive_wallet_gets_activity_base_only() {
        let inputs = ScoreInputs::default();
        approx(activity_score(&inputs), 25.0);
    }

    #[test]
    fn test_activity_sub_terms_cap_independently() {
        let inputs = ScoreInputs {
            total_transactions: 1_000_000,
            active_chain_count: 50,
            total_trades: 10_000,
            ..Default::default()
        };
        approx(activity_score(&inputs), 60.0);

        let partial = ScoreInputs {
            total_transactions: 125, // half of the 250 saturation point
            active_chain_count: 3,
            total_trades: 0,
            ..Default::default()
        };
        approx(activity_score(&partial), 25.0 + 7.5 + 10.0);
    }

    #[test]
    fn test_age_score_saturates_at_one_and_a_half_years() {
        approx(
            age_score(&ScoreInputs {
                wallet_age_years: 0.75,
                ..Default::default()
            }),
            4.5,
        );
        approx(
            age_score(&ScoreInputs {
                wallet_age_years: 10.0,
                ..Default::default()
            }),
            5.0,
        );
    }

    #[test]
    fn test_net_worth_score_caps_at_twenty_for_extreme_inputs() {
        approx(
            net_worth_score(&ScoreInputs {
                total_net_worth_usd: 1e9,
                ..Default::default()
            }),
            20.0,
        );
        approx(
            net_worth_score(&ScoreInputs {
                total_net_worth_usd: 10_000.0,
                ..Default::default()
            }),
            10.0,
        );
    }

    #[test]
    fn test_risk_score_floors_at_zero() {
        approx(risk_score(&ScoreInputs::default()), 5.0);
        approx(
            risk_score(&ScoreInputs {
                usd_at_risk: 25_000.0,
                ..Default::default()
            }),
            2.5,
        );
        approx(
            risk_score(&ScoreInputs {
                usd_at_risk: 1e9,
                ..Default::default()
            }),
            0.0,
        );
    }

    #[test]
    fn test_gas_score_substitutes_one_for_zero_net_worth() {
        // $0.05 fees against the substituted denominator of 1 saturates
        let inputs = ScoreInputs {
            total_fees_usd: 0.05,
            total_net_worth_usd: 0.0,
            ..Default::default()
        };
        approx(gas_score(&inputs), 10.0);

        let proportional = ScoreInputs {
            total_fees_usd: 25.0,
            total_net_worth_usd: 1_000.0,
            ..Default::default()
        };
        approx(gas_score(&proportional), 5.0);
    }

    #[test]
    fn test_loss_gets_flat_penalty_floor() {
        approx(
            profitability_score(&ScoreInputs {
                total_profit_usd: -5_000.0,
                ..Default::default()
            }),
            2.0,
        );
        approx(
            profitability_score(&ScoreInputs {
                total_profit_usd: 1_000.0,
                ..Default::default()
            }),
            2.5,
        );
    }

    #[test]
    fn test_domain_score_tiers() {
        approx(domain_score(&ScoreInputs::default()), 0.0);
        approx(
            domain_score(&ScoreInputs {
                has_ens_domain: true,
                ..Default::default()
            }),
            5.0,
        );
        approx(
            domain_score(&ScoreInputs {
                has_ens_domain: true,
                has_unstoppable_domain: true,
                ..Default::default()
            }),
            10.0,
        );
    }

    #[test]
    fn test_composite_is_clamped_to_one_hundred() {
        // Theoretical sum of caps is 125; the composite must not exceed 100.
        let maxed = ScoreInputs {
            total_transactions: u64::MAX,
            active_chain_count: 9,
            total_trades: u64::MAX,
            wallet_age_years: 100.0,
            unique_protocol_count: 100,
            total_net_worth_usd: 1e12,
            usd_at_risk: 0.0,
            total_fees_usd: 1e12,
            total_profit_usd: 1e12,
            has_ens_domain: true,
            has_unstoppable_domain: true,
        };
        assert_eq!(compose(&maxed), 100.0);
    }

    #[test]
    fn test_composite_never_negative() {
        let worst = ScoreInputs {
            usd_at_risk: 1e12,
            total_profit_usd: -1e12,
            ..Default::default()
        };
        let score = compose(&worst);
        assert!(score >= 0.0);
        // base terms alone: 25 activity + 4 age + 6 defi + 2 loss floor
        approx(score, 37.0);
    }

    #[test]
    fn test_composite_rounds_to_two_decimals() {
        let inputs = ScoreInputs {
            wallet_age_years: 1.0, // contributes 4 + 0.666...
            ..Default::default()
        };
        let score = compose(&inputs);
        approx(score * 100.0, (score * 100.0).round());
    }
}
