use serde::Deserialize;

use crate::session::Session;

/// Bot configuration: loaded from an optional `volbot.toml` plus `VOLBOT_*`
/// environment overrides, then validated once at startup.
///
/// Per-tick gates never re-validate these values; a configuration that would
/// make every tick fail (e.g. zero risk fraction) is rejected here instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Instrument symbol, e.g. "R_100" (Volatility 100 Index).
    pub symbol: String,
    /// Fraction of balance risked per trade, in (0, 1].
    pub risk_fraction: f64,
    /// Minimum seconds between two trade executions.
    pub cooldown_secs: u64,
    /// Daily loss percentage that disables trading until the next day, in (0, 100].
    pub daily_stop_loss_pct: f64,
    /// Sessions during which execution is allowed.
    pub sessions: Vec<Session>,
    /// Omit stop-loss/take-profit from outgoing orders.
    pub stealth_mode: bool,
    /// Reject trades when ATR spikes above its recent average.
    pub volatility_protection: bool,
    /// Spike threshold as a multiple of average ATR; must be > 1.
    pub spike_multiplier: f64,
    /// ATR lookback period in bars.
    pub atr_period: usize,
    /// Short moving-average period.
    pub sma_short: usize,
    /// Long moving-average period.
    pub sma_long: usize,
    /// Breakout proximity factor k in `close > high - k * ATR`.
    pub breakout_factor: f64,
    /// Bars requested from the historical provider per evaluation.
    pub history_lookback: usize,
    /// Market window capacity; must cover the longest lookback plus the
    /// previous close the ATR needs.
    pub window_capacity: usize,
    /// Seconds to wait for a submission acknowledgment before treating it
    /// as failed.
    pub ack_timeout_secs: u64,
    /// Trade arena capacity.
    pub max_trades: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "R_100".to_string(),
            risk_fraction: 0.02,
            cooldown_secs: 300,
            daily_stop_loss_pct: 5.0,
            sessions: vec![Session::London, Session::NewYork, Session::Asian],
            stealth_mode: true,
            volatility_protection: true,
            spike_multiplier: 2.0,
            atr_period: 14,
            sma_short: 50,
            sma_long: 200,
            breakout_factor: 0.2,
            history_lookback: 200,
            window_capacity: 256,
            ack_timeout_secs: 30,
            max_trades: 64,
        }
    }
}

impl BotConfig {
    /// Load from the given file (if it exists) layered with `VOLBOT_*`
    /// environment variables.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let cfg: BotConfig = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("VOLBOT").try_parsing(true))
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.symbol.trim().is_empty() {
            anyhow::bail!("symbol must not be empty");
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            anyhow::bail!(
                "risk_fraction must be in (0, 1], got {}",
                self.risk_fraction
            );
        }
        if !(self.daily_stop_loss_pct > 0.0 && self.daily_stop_loss_pct <= 100.0) {
            anyhow::bail!(
                "daily_stop_loss_pct must be in (0, 100], got {}",
                self.daily_stop_loss_pct
            );
        }
        if self.sessions.is_empty() {
            anyhow::bail!("at least one trading session must be configured");
        }
        if self.volatility_protection && self.spike_multiplier <= 1.0 {
            anyhow::bail!(
                "spike_multiplier must be > 1 when volatility protection is on, got {}",
                self.spike_multiplier
            );
        }
        if self.atr_period == 0 {
            anyhow::bail!("atr_period must be >= 1");
        }
        if self.sma_short >= self.sma_long {
            anyhow::bail!(
                "sma_short ({}) must be below sma_long ({})",
                self.sma_short,
                self.sma_long
            );
        }
        if self.breakout_factor <= 0.0 {
            anyhow::bail!("breakout_factor must be > 0, got {}", self.breakout_factor);
        }
        if self.history_lookback < self.sma_long {
            anyhow::bail!(
                "history_lookback ({}) must cover sma_long ({})",
                self.history_lookback,
                self.sma_long
            );
        }
        if self.window_capacity < self.sma_long + 1 {
            anyhow::bail!(
                "window_capacity ({}) must be at least sma_long + 1 ({})",
                self.window_capacity,
                self.sma_long + 1
            );
        }
        if self.max_trades == 0 {
            anyhow::bail!("max_trades must be >= 1");
        }
        Ok(())
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn ack_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ack_timeout_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_risk_fraction() {
        let cfg = BotConfig {
            risk_fraction: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_risk_fraction_above_one() {
        let cfg = BotConfig {
            risk_fraction: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_session_set() {
        let cfg = BotConfig {
            sessions: vec![],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_spike_multiplier_at_one() {
        let cfg = BotConfig {
            volatility_protection: true,
            spike_multiplier: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_spike_multiplier_ignored_when_protection_off() {
        let cfg = BotConfig {
            volatility_protection: false,
            spike_multiplier: 1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_window_smaller_than_long_lookback() {
        let cfg = BotConfig {
            window_capacity: 100,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_daily_stop_out_of_range() {
        let cfg = BotConfig {
            daily_stop_loss_pct: 101.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
