use chrono::{DateTime, Timelike, Utc};

use crate::config::BotConfig;
use crate::error::EngineError;
use crate::execution::{BarProvider, ExecutionSink, TradeArena, TradeLog, TradeLogEntry};
use crate::market::MarketWindow;
use crate::models::{
    Direction, Event, OrderRequest, TickEvent, Trade, TradeId, TradeStatus,
};
use crate::risk::{AccountState, RiskManager, RiskVeto};
use crate::session::in_trading_session;
use crate::strategy::SignalGenerator;

/// What a single tick evaluation decided, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Malformed or foreign event, dropped.
    Ignored,
    /// The bar provider could not serve enough history.
    DataUnavailable,
    NoSignal,
    /// Signal computed but execution withheld outside configured sessions.
    SessionClosed,
    Vetoed(RiskVeto),
    /// Sizing failed for this tick.
    InvalidRisk,
    /// A submission is already in flight; the signal is ignored.
    InFlight,
    /// The sink rejected the submission outright.
    SubmissionFailed,
    Submitted(TradeId),
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    trade_id: TradeId,
    submitted_at: DateTime<Utc>,
}

/// Orchestrates the decision pipeline per incoming event and owns all
/// mutable state: market window, account, trade arena, and the single
/// in-flight submission slot.
///
/// One instance runs on one task; events are processed strictly in arrival
/// order. Time is taken from event timestamps, never from a wall clock, so
/// replaying a stream reproduces every decision.
pub struct Controller<S, P, L>
where
    S: ExecutionSink,
    P: BarProvider,
    L: TradeLog,
{
    cfg: BotConfig,
    window: MarketWindow,
    account: AccountState,
    trades: TradeArena,
    in_flight: Option<InFlight>,
    signal_gen: SignalGenerator,
    risk: RiskManager,
    sink: S,
    provider: P,
    trade_log: L,
}

impl<S, P, L> Controller<S, P, L>
where
    S: ExecutionSink,
    P: BarProvider,
    L: TradeLog,
{
    pub fn new(cfg: BotConfig, initial_balance: f64, sink: S, provider: P, trade_log: L) -> Self {
        Self {
            window: MarketWindow::new(cfg.window_capacity),
            account: AccountState::new(initial_balance),
            trades: TradeArena::new(cfg.max_trades),
            in_flight: None,
            signal_gen: SignalGenerator::from_config(&cfg),
            risk: RiskManager::from_config(&cfg),
            cfg,
            sink,
            provider,
            trade_log,
        }
    }

    /// Dispatch one event from the unified stream.
    pub fn handle_event(&mut self, event: Event) -> crate::Result<()> {
        match event {
            Event::Tick(tick) => {
                let outcome = self.handle_tick(&tick);
                tracing::debug!(?outcome, quote = tick.quote, "tick processed");
            }
            Event::Balance { balance } => {
                if !balance.is_finite() || balance < 0.0 {
                    tracing::warn!(balance, "malformed balance event dropped");
                    return Ok(());
                }
                self.account
                    .apply_balance(balance, self.risk.daily_stop_loss_pct);
                tracing::info!(
                    balance,
                    daily_loss_pct = self.account.daily_loss_pct,
                    "balance updated"
                );
            }
            Event::Authorized => {
                tracing::info!("authorized, requesting balance subscription");
                self.sink.request_balance()?;
            }
            Event::OrderAck { trade_id, accepted } => {
                self.handle_order_ack(trade_id, accepted);
            }
            Event::DayBoundary { day } => {
                self.account.roll_day(day);
            }
        }
        Ok(())
    }

    /// Run the full decision pipeline for one tick.
    pub fn handle_tick(&mut self, tick: &TickEvent) -> TickOutcome {
        if tick.symbol != self.cfg.symbol {
            tracing::warn!(symbol = %tick.symbol, "tick for unexpected symbol dropped");
            return TickOutcome::Ignored;
        }
        if !tick.quote.is_finite() {
            tracing::warn!(quote = tick.quote, "malformed tick dropped");
            return TickOutcome::Ignored;
        }

        let now = tick.timestamp;
        self.observe_day(now);
        self.expire_stale_submission(now);

        if let Err(e) = self.refresh_window() {
            if e.is_suppression() {
                tracing::debug!("provider has insufficient history: {}", e);
            } else {
                tracing::warn!("bar provider failed: {}", e);
            }
            return TickOutcome::DataUnavailable;
        }

        let bars = self.window.bars();
        let eval = match self.signal_gen.evaluate(&bars) {
            Some(eval) => eval,
            None => return TickOutcome::NoSignal,
        };

        tracing::debug!(
            direction = ?eval.signal.direction,
            rule = ?eval.signal.source_rule,
            atr = eval.atr,
            "signal generated"
        );

        if !in_trading_session(&self.cfg.sessions, now.hour()) {
            tracing::debug!(hour = now.hour(), "outside configured sessions");
            return TickOutcome::SessionClosed;
        }

        if let Err(veto) = self.risk.check(&self.account, now, &bars, eval.atr) {
            tracing::info!(%veto, "trade vetoed");
            return TickOutcome::Vetoed(veto);
        }

        let lot_size = match self.risk.lot_size(self.account.balance, eval.atr) {
            Ok(lot) => lot,
            Err(e) => {
                tracing::warn!("sizing failed: {}", e);
                return TickOutcome::InvalidRisk;
            }
        };

        // No queuing, no overlap: a submission in flight absorbs all
        // further signals until it resolves
        if self.in_flight.is_some() {
            tracing::info!("submission in flight, signal ignored");
            return TickOutcome::InFlight;
        }

        self.submit(eval.signal.direction, lot_size, eval.atr, now)
    }

    fn submit(
        &mut self,
        direction: Direction,
        lot_size: f64,
        atr: f64,
        now: DateTime<Utc>,
    ) -> TickOutcome {
        let close = match self.window.latest() {
            Some(bar) => bar.close,
            None => return TickOutcome::DataUnavailable,
        };

        // Stealth mode keeps protective levels out of the broker frame
        let (stop_loss, take_profit) = if self.cfg.stealth_mode {
            (None, None)
        } else {
            match direction {
                Direction::Buy => (Some(close - atr), Some(close + 2.0 * atr)),
                Direction::Sell => (Some(close + atr), Some(close - 2.0 * atr)),
            }
        };

        let trade = Trade {
            direction,
            lot_size,
            stop_loss,
            take_profit,
            opened_at: now,
            status: TradeStatus::Submitted,
        };

        let trade_id = match self.trades.insert(trade) {
            Some(id) => id,
            None => {
                tracing::warn!("trade arena full of in-flight slots, submission dropped");
                return TickOutcome::SubmissionFailed;
            }
        };

        let order = OrderRequest {
            side: direction,
            symbol: self.cfg.symbol.clone(),
            amount: lot_size,
            stop_loss,
            take_profit,
        };

        if let Err(e) = self.sink.submit(&order) {
            tracing::error!("submission failed: {}", e);
            self.trades.set_status(trade_id, TradeStatus::Rejected);
            return TickOutcome::SubmissionFailed;
        }

        self.in_flight = Some(InFlight {
            trade_id,
            submitted_at: now,
        });
        self.account.record_trade(now);
        self.trade_log.record(TradeLogEntry {
            timestamp: now,
            direction,
            lot_size,
        });

        tracing::info!(
            trade = %trade_id,
            ?direction,
            lot_size,
            "order submitted"
        );
        TickOutcome::Submitted(trade_id)
    }

    fn handle_order_ack(&mut self, trade_id: TradeId, accepted: bool) {
        match self.in_flight {
            Some(inflight) if inflight.trade_id == trade_id => {
                let status = if accepted {
                    TradeStatus::Filled
                } else {
                    TradeStatus::Rejected
                };
                self.trades.set_status(trade_id, status);
                self.in_flight = None;
                tracing::info!(trade = %trade_id, accepted, "submission acknowledged");
            }
            _ => {
                // Late ack for a submission already timed out, or an id we
                // never issued
                tracing::warn!(trade = %trade_id, "unmatched order ack dropped");
            }
        }
    }

    /// A submission without an acknowledgment inside the timeout is a failed
    /// submission: the trade is rejected and the slot released, no retry.
    fn expire_stale_submission(&mut self, now: DateTime<Utc>) {
        if let Some(inflight) = self.in_flight {
            if now - inflight.submitted_at >= self.cfg.ack_timeout() {
                tracing::warn!(
                    trade = %inflight.trade_id,
                    "submission timed out, marking rejected"
                );
                self.trades
                    .set_status(inflight.trade_id, TradeStatus::Rejected);
                self.in_flight = None;
            }
        }
    }

    /// Derive the UTC-midnight day boundary from event time, so the breaker
    /// resets even if no explicit boundary event arrives.
    fn observe_day(&mut self, now: DateTime<Utc>) {
        let day = now.date_naive();
        match self.account.current_day {
            None => self.account.current_day = Some(day),
            Some(current) if day > current => self.account.roll_day(day),
            Some(_) => {}
        }
    }

    /// Pull fresh history from the provider and extend the window with bars
    /// newer than its tail.
    fn refresh_window(&mut self) -> Result<(), EngineError> {
        let bars = self
            .provider
            .fetch(&self.cfg.symbol, self.cfg.history_lookback)?;

        let tail = self.window.latest().map(|b| b.timestamp);
        for bar in bars {
            if tail.map_or(true, |t| bar.timestamp > t) {
                self.window.append(bar);
            }
        }
        Ok(())
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn trades(&self) -> &TradeArena {
        &self.trades
    }

    pub fn window(&self) -> &MarketWindow {
        &self.window
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn trade_log(&self) -> &L {
        &self.trade_log
    }
}
