use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::BotConfig;
use crate::error::EngineError;
use crate::indicators::average_atr;
use crate::models::PriceBar;

/// How many trailing ATR values form the baseline for spike detection.
const SPIKE_LOOKBACK: usize = 10;

/// Account state owned exclusively by the trade lifecycle controller.
/// Mutated only on balance events, trade submissions, and day rollover.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub balance: f64,
    pub day_start_balance: f64,
    pub daily_loss_pct: f64,
    pub trading_enabled: bool,
    /// True while trading is disabled specifically by the daily loss
    /// breaker, so a day boundary knows it may re-enable.
    pub breaker_tripped: bool,
    pub last_trade_time: Option<DateTime<Utc>>,
    pub current_day: Option<NaiveDate>,
}

impl AccountState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            day_start_balance: initial_balance,
            daily_loss_pct: 0.0,
            trading_enabled: true,
            breaker_tripped: false,
            last_trade_time: None,
            current_day: None,
        }
    }

    /// Apply a balance update and recompute the daily loss percentage.
    /// Trips the breaker when the configured threshold is reached; the
    /// breaker never resets mid-day.
    pub fn apply_balance(&mut self, balance: f64, daily_stop_loss_pct: f64) {
        self.balance = balance;

        if self.day_start_balance > 0.0 {
            let loss = (self.day_start_balance - balance) / self.day_start_balance * 100.0;
            self.daily_loss_pct = loss.max(0.0);
        }

        if self.daily_loss_pct >= daily_stop_loss_pct && !self.breaker_tripped {
            tracing::warn!(
                daily_loss_pct = self.daily_loss_pct,
                threshold = daily_stop_loss_pct,
                "daily loss breaker tripped, trading disabled until next day"
            );
            self.trading_enabled = false;
            self.breaker_tripped = true;
        }
    }

    /// Observe a day boundary: reset the daily loss tally and re-enable
    /// trading iff it was disabled solely by the breaker.
    pub fn roll_day(&mut self, day: NaiveDate) {
        self.daily_loss_pct = 0.0;
        self.day_start_balance = self.balance;
        self.current_day = Some(day);

        if self.breaker_tripped {
            tracing::info!(%day, "day boundary: daily loss breaker cleared");
            self.trading_enabled = true;
            self.breaker_tripped = false;
        }
    }

    pub fn record_trade(&mut self, now: DateTime<Utc>) {
        self.last_trade_time = Some(now);
    }
}

/// Reason a risk gate vetoed an otherwise valid signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVeto {
    Cooldown,
    DailyLossBreaker,
    VolatilitySpike,
}

impl std::fmt::Display for RiskVeto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskVeto::Cooldown => write!(f, "cooldown active"),
            RiskVeto::DailyLossBreaker => write!(f, "daily loss breaker engaged"),
            RiskVeto::VolatilitySpike => write!(f, "volatility spike"),
        }
    }
}

/// Position sizing, cooldown, and circuit-breaker gates.
#[derive(Debug, Clone)]
pub struct RiskManager {
    pub risk_fraction: f64,
    pub cooldown: Duration,
    pub daily_stop_loss_pct: f64,
    pub volatility_protection: bool,
    pub spike_multiplier: f64,
    pub atr_period: usize,
}

impl RiskManager {
    pub fn from_config(cfg: &BotConfig) -> Self {
        Self {
            risk_fraction: cfg.risk_fraction,
            cooldown: cfg.cooldown(),
            daily_stop_loss_pct: cfg.daily_stop_loss_pct,
            volatility_protection: cfg.volatility_protection,
            spike_multiplier: cfg.spike_multiplier,
            atr_period: cfg.atr_period,
        }
    }

    /// `lot = balance * risk_fraction / stop_distance`.
    ///
    /// Monotonic increasing in balance and risk fraction, decreasing in stop
    /// distance.
    pub fn lot_size(&self, balance: f64, stop_distance: f64) -> Result<f64, EngineError> {
        if !(stop_distance > 0.0) || !stop_distance.is_finite() {
            return Err(EngineError::InvalidRisk { stop_distance });
        }
        Ok(balance * self.risk_fraction / stop_distance)
    }

    /// Run the gates in order: cooldown, daily loss breaker, volatility
    /// spike. No side effects on veto.
    pub fn check(
        &self,
        account: &AccountState,
        now: DateTime<Utc>,
        bars: &[PriceBar],
        current_atr: f64,
    ) -> Result<(), RiskVeto> {
        if let Some(last) = account.last_trade_time {
            if now - last < self.cooldown {
                return Err(RiskVeto::Cooldown);
            }
        }

        if !account.trading_enabled {
            return Err(RiskVeto::DailyLossBreaker);
        }

        if self.volatility_protection && self.is_volatility_spike(bars, current_atr) {
            return Err(RiskVeto::VolatilitySpike);
        }

        Ok(())
    }

    /// True when the current ATR exceeds `spike_multiplier` times its recent
    /// historical average. Without enough bars to establish a baseline the
    /// gate stays open.
    fn is_volatility_spike(&self, bars: &[PriceBar], current_atr: f64) -> bool {
        match average_atr(bars, self.atr_period, SPIKE_LOOKBACK) {
            Ok(avg) => current_atr > self.spike_multiplier * avg,
            Err(_) => false,
        }
    }
}
