//! End-to-end scenarios across the workspace crates.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use approx::assert_relative_eq;
use augur_alloc::{AllocationOutcome, BayesianAllocator, Recommendation};
use augur_combine::{AssetStatus, ScoringContext};
use augur_eval::{
    Backtest, BacktestConfig, FrictionModel, HoldingMode, SearchConfig, TradeSide, WeightSearch,
};
use augur_signals::Regime;
use augur_traits::{Date, INDEX_BUCKET, PricePanel, PriceSeries, SectorMap};

use crate::AugurConfig;

const DAYS: usize = 250;

fn calendar() -> Vec<Date> {
    let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
    (0..DAYS as u64).map(|i| start + chrono::Days::new(i)).collect()
}

fn last_date() -> Date {
    calendar()[DAYS - 1]
}

fn shape(u: f64) -> f64 {
    (1.3 * u).sin() + 0.5 * (0.37 * u).sin()
}

fn build(symbol: &str, f: impl Fn(f64, f64) -> f64) -> PriceSeries {
    let closes = (0..DAYS)
        .map(|t| {
            let t = t as f64;
            f(t, t - (DAYS - 1) as f64)
        })
        .collect();
    PriceSeries::new(symbol, calendar(), closes).unwrap()
}

/// A gains 50%, B is flat, C loses 30% and the benchmark gains 10% over 250 days.
fn panel() -> PricePanel {
    let span = (DAYS - 1) as f64;
    PricePanel::new(
        "^NSEI",
        vec![
            build("^NSEI", |t, _| 100.0 * 1.1_f64.powf(t / span)),
            build("A", |t, u| 100.0 * 1.5_f64.powf(t / span) * (1.0 + 0.003 * shape(u))),
            build("B", |_, u| 100.0 * (1.0 + 0.02 * shape(u))),
            build("C", |t, u| {
                100.0 * 0.7_f64.powf(t / span) * (1.0 + 0.03 * (1.3 * u - PI / 2.0).sin())
            }),
        ],
    )
    .unwrap()
}

fn sectors() -> SectorMap {
    [("A", "IT"), ("B", "BANK"), ("C", "PHARMA")].into_iter().collect()
}

#[test]
fn test_benchmark_is_bullish() {
    let config = AugurConfig::default();
    let regime = config.pipeline().regime_at(&panel(), last_date()).unwrap();
    assert_eq!(regime, Regime::Bull);
}

#[test]
fn test_momentum_orders_the_trend() {
    let frame = AugurConfig::default()
        .pipeline()
        .frame_at(&panel(), &sectors(), last_date());
    assert_eq!(frame.len(), 3);
    let (a, b, c) = (
        frame.get("A").unwrap().momentum,
        frame.get("B").unwrap().momentum,
        frame.get("C").unwrap().momentum,
    );
    assert!(a > b && b > c, "momentum {a} {b} {c}");
}

#[test]
fn test_bull_composite_prefers_the_winner() {
    let board = AugurConfig::default()
        .pipeline()
        .board_at(&panel(), &sectors(), &ScoringContext::default(), last_date())
        .unwrap();
    assert_eq!(board.regime(), Regime::Bull);
    let score = |s: &str| board.get(s).unwrap().score;
    assert!(score("A") > score("B"), "A {} B {}", score("A"), score("B"));
    assert!(score("A") > score("C"), "A {} C {}", score("A"), score("C"));
    assert_eq!(board.entries()[0].symbol, "A");
    assert!(board.entries().iter().all(|e| (0.0..=100.0).contains(&e.score)));
}

#[test]
fn test_negative_sentiment_zeroes_the_winner() {
    let context = ScoringContext {
        sentiment: BTreeMap::from([("A".to_string(), -0.5)]),
        ..Default::default()
    };
    let board = AugurConfig::default()
        .pipeline()
        .board_at(&panel(), &sectors(), &context, last_date())
        .unwrap();
    let a = board.get("A").unwrap();
    assert_eq!(a.status, AssetStatus::RejectedSentiment);
    assert_eq!(a.score, 0.0);
    assert_eq!(board.active().count(), 2);
}

#[test]
fn test_allocation_from_the_ranking() {
    let config = AugurConfig::default();
    let panel = panel();
    let sectors = sectors();
    let board = config
        .pipeline()
        .board_at(&panel, &sectors, &ScoringContext::default(), last_date())
        .unwrap();
    let recs: Vec<Recommendation> = board
        .top(3)
        .iter()
        .map(|e| Recommendation::from_score(e.symbol.clone(), e.score))
        .collect();
    let allocation = config.allocator().allocate(&recs, &panel, &sectors, last_date());

    assert_eq!(allocation.outcome(), &AllocationOutcome::Optimized);
    assert_relative_eq!(allocation.total(), 1.0, epsilon = 1e-9);
    for (sector, weight) in allocation.sector_weights(&sectors) {
        if sector != INDEX_BUCKET {
            assert!(weight <= 0.25 + 1e-9, "{sector} holds {weight}");
        }
    }
}

#[test]
fn test_empty_recommendations_touch_nothing() {
    let empty = PricePanel::new(
        "^NSEI",
        vec![PriceSeries::new("^NSEI", vec![last_date()], vec![100.0]).unwrap()],
    )
    .unwrap();
    let allocation = BayesianAllocator::default().allocate(&[], &empty, &SectorMap::new(), last_date());
    assert!(allocation.weights().is_empty());
    assert_eq!(allocation.outcome(), &AllocationOutcome::Empty);
}

#[test]
fn test_friction_of_a_small_order() {
    let model = FrictionModel::default();
    let buy = model.trade_cost(100.0, 10.0, TradeSide::Buy).unwrap();
    let sell = model.trade_cost(100.0, 10.0, TradeSide::Sell).unwrap();
    assert!(buy.execution_price > 100.0 && sell.execution_price < 100.0);
    assert!(buy.breakdown.stamp_duty > 0.0);
    assert_eq!(sell.breakdown.stamp_duty, 0.0);
    assert_relative_eq!(buy.total_tax - sell.total_tax, 0.15, epsilon = 1e-12);
}

#[test]
fn test_backtest_replays_identically() {
    let panel = panel();
    for mode in [HoldingMode::TopN(2), HoldingMode::Allocator(3)] {
        let backtest = Backtest::new(BacktestConfig {
            mode,
            ..Default::default()
        });
        let first = backtest
            .run(&panel, &sectors(), &ScoringContext::default())
            .unwrap();
        let second = backtest
            .run(&panel, &sectors(), &ScoringContext::default())
            .unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert!((-1.0..=0.0).contains(&first.max_drawdown));
        assert_eq!(first.values[0], 100_000.0);
    }
}

#[test]
fn test_weight_search_reports_in_sample_winners_only() {
    let result = WeightSearch::new(SearchConfig {
        top_n: 1,
        ..Default::default()
    })
    .run(&panel(), &sectors())
    .unwrap();
    assert_eq!(result.bull.candidates.len(), 21);
    // the benchmark never dips below its average, so bear keeps the default
    assert!(result.bear.objective.is_none());
    assert_eq!(result.bear.best, augur_combine::WeightTable::search_defaults().bear);
    if let Some(best) = result.bull.objective {
        assert!(
            result
                .bull
                .candidates
                .iter()
                .filter_map(|c| c.objective)
                .all(|o| o <= best)
        );
    }
}
