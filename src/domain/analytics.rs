//! Instrument analytics as composable metric stages.
//!
//! Each stage is a plain function `(InstrumentMetrics, &MarketData) -> InstrumentMetrics`
//! that fills in one more metric; [`compute_metrics`] folds a list of stages
//! over the base metrics of an instrument.

pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub price: f64,
    pub issuer: String,
}

/// Price history a stage may read.
#[derive(Debug, Clone, Copy)]
pub struct MarketData<'a> {
    pub asset_prices: &'a [f64],
    pub market_prices: &'a [f64],
    pub periods_per_year: f64,
}

impl<'a> MarketData<'a> {
    pub fn new(asset_prices: &'a [f64], market_prices: &'a [f64]) -> Self {
        MarketData {
            asset_prices,
            market_prices,
            periods_per_year: TRADING_PERIODS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentMetrics {
    pub instrument: Instrument,
    pub volatility_ann: Option<f64>,
    pub beta: Option<f64>,
    pub max_drawdown: Option<f64>,
}

impl InstrumentMetrics {
    pub fn base(instrument: Instrument) -> Self {
        InstrumentMetrics {
            instrument,
            volatility_ann: None,
            beta: None,
            max_drawdown: None,
        }
    }
}

pub type MetricStage = fn(InstrumentMetrics, &MarketData<'_>) -> InstrumentMetrics;

pub fn compute_metrics(
    instrument: Instrument,
    data: &MarketData<'_>,
    stages: &[MetricStage],
) -> InstrumentMetrics {
    stages
        .iter()
        .fold(InstrumentMetrics::base(instrument), |metrics, stage| {
            stage(metrics, data)
        })
}

/// Annualized sample stddev of simple returns.
pub fn volatility_stage(metrics: InstrumentMetrics, data: &MarketData<'_>) -> InstrumentMetrics {
    let returns = simple_returns(data.asset_prices);
    let volatility_ann =
        sample_variance(&returns).map(|var| var.sqrt() * data.periods_per_year.sqrt());
    InstrumentMetrics {
        volatility_ann,
        ..metrics
    }
}

/// cov(asset, market) / var(market) over aligned simple returns.
pub fn beta_stage(metrics: InstrumentMetrics, data: &MarketData<'_>) -> InstrumentMetrics {
    let asset = simple_returns(data.asset_prices);
    let market = simple_returns(data.market_prices);
    let n = asset.len().min(market.len());
    let beta = if n < 2 {
        None
    } else {
        let asset = &asset[..n];
        let market = &market[..n];
        let mean_a = asset.iter().sum::<f64>() / n as f64;
        let mean_m = market.iter().sum::<f64>() / n as f64;
        let cov = asset
            .iter()
            .zip(market)
            .map(|(a, m)| (a - mean_a) * (m - mean_m))
            .sum::<f64>()
            / (n - 1) as f64;
        match sample_variance(market) {
            Some(var) if var != 0.0 => Some(cov / var),
            _ => None,
        }
    };
    InstrumentMetrics { beta, ..metrics }
}

/// Worst peak-to-trough move, as a non-positive fraction.
pub fn drawdown_stage(metrics: InstrumentMetrics, data: &MarketData<'_>) -> InstrumentMetrics {
    let max_drawdown = max_drawdown(data.asset_prices);
    InstrumentMetrics {
        max_drawdown,
        ..metrics
    }
}

fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    Some(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0))
}

fn max_drawdown(prices: &[f64]) -> Option<f64> {
    let first = *prices.first()?;
    let mut peak = first;
    let mut worst = 0.0_f64;
    for &p in prices {
        if p > peak {
            peak = p;
        }
        if peak > 0.0 {
            worst = worst.min(p / peak - 1.0);
        }
    }
    Some(worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wm() -> Instrument {
        Instrument {
            symbol: "WM".into(),
            price: 245.0,
            issuer: "Waste Management Inc.".into(),
        }
    }

    const ASSET: [f64; 8] = [214.0, 218.0, 210.0, 230.0, 231.0, 233.0, 230.0, 245.0];
    const MARKET: [f64; 8] = [100.0, 100.0, 101.0, 101.0, 102.0, 103.0, 104.0, 104.0];

    #[test]
    fn base_metrics_are_empty() {
        let m = InstrumentMetrics::base(wm());
        assert_eq!(m.instrument.symbol, "WM");
        assert!(m.volatility_ann.is_none());
        assert!(m.beta.is_none());
        assert!(m.max_drawdown.is_none());
    }

    #[test]
    fn no_stages_returns_base() {
        let data = MarketData::new(&ASSET, &MARKET);
        let m = compute_metrics(wm(), &data, &[]);
        assert_eq!(m, InstrumentMetrics::base(wm()));
    }

    #[test]
    fn volatility_annualizes_sample_stddev() {
        let prices = [100.0, 110.0, 99.0];
        let data = MarketData {
            asset_prices: &prices,
            market_prices: &[],
            periods_per_year: 12.0,
        };
        let m = volatility_stage(InstrumentMetrics::base(wm()), &data);
        // returns 0.1 and -0.1: sample stddev sqrt(0.02)
        let expected = 0.02_f64.sqrt() * 12.0_f64.sqrt();
        assert_relative_eq!(m.volatility_ann.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn volatility_needs_two_returns() {
        let prices = [100.0, 110.0];
        let data = MarketData::new(&prices, &[]);
        let m = volatility_stage(InstrumentMetrics::base(wm()), &data);
        assert!(m.volatility_ann.is_none());
    }

    #[test]
    fn beta_of_asset_against_itself_is_one() {
        let data = MarketData::new(&ASSET, &ASSET);
        let m = beta_stage(InstrumentMetrics::base(wm()), &data);
        assert_relative_eq!(m.beta.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn beta_of_flat_market_is_none() {
        let flat = [100.0; 8];
        let data = MarketData::new(&ASSET, &flat);
        let m = beta_stage(InstrumentMetrics::base(wm()), &data);
        assert!(m.beta.is_none());
    }

    #[test]
    fn drawdown_known_series() {
        let data = MarketData::new(&ASSET, &MARKET);
        let m = drawdown_stage(InstrumentMetrics::base(wm()), &data);
        // Worst dip: 218 -> 210.
        assert_relative_eq!(m.max_drawdown.unwrap(), 210.0 / 218.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_of_rising_series_is_zero() {
        let prices = [1.0, 2.0, 3.0];
        let data = MarketData::new(&prices, &[]);
        let m = drawdown_stage(InstrumentMetrics::base(wm()), &data);
        assert_eq!(m.max_drawdown, Some(0.0));
    }

    #[test]
    fn drawdown_of_empty_series_is_none() {
        let data = MarketData::new(&[], &[]);
        let m = drawdown_stage(InstrumentMetrics::base(wm()), &data);
        assert!(m.max_drawdown.is_none());
    }

    #[test]
    fn stages_compose_in_order() {
        let data = MarketData::new(&ASSET, &MARKET);
        let stages: [MetricStage; 3] = [volatility_stage, beta_stage, drawdown_stage];
        let m = compute_metrics(wm(), &data, &stages);
        assert!(m.volatility_ann.unwrap() > 0.0);
        assert!(m.beta.is_some());
        assert!(m.max_drawdown.unwrap() < 0.0);
        assert_eq!(m.instrument, wm());
    }
}
