//! # engine::simulator
//!
//! **Market Simulator** — synthetic quotes and the trade lifecycle
//!
//! ## Trade lifecycle
//! ```text
//! execute_trade ──▶ entering ──(fill delay)──▶ active ──(stop / target hit)──▶ exiting
//!                                                                                  │
//!            journal notice ◀──(journal delay)── completed ◀──(settle delay)───────┘
//! ```
//!
//! ## Tick (at most once per `tick_interval`)
//! ```text
//! 1. Jitter every quote by ±volatility, round to cents, add volume
//!    → PRICE_UPDATED per symbol
//! 2. Re-mark every trade at its symbol's new price
//!    a. active + exit hit → exiting (stop-loss checked first)
//!    b. exiting           → TRADE_UPDATED(completed snapshot), schedule settlement
//!    c. otherwise         → TRADE_UPDATED(refreshed record)
//! ```
//!
//! The simulator is a synchronous single-writer state machine: every mutation
//! happens inside `&mut self` calls, either a tick or a deferred action fired
//! by [`MarketSimulator::run_due`].  Time comes from the injected [`Clock`] and
//! every random draw from the injected [`RandomSource`].
//!
//! Once a trade's exit is processed it stays in [`MarketSimulator::active_trades`]
//! with status `exiting` until settlement, frozen at its exit price and P/L.
//! Quotes keep moving during that window; the trade does not follow them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{SimConfig, MAX_DELAY_MS};
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::journal::{journal_stats, JournalStats, Timeframe};
use crate::engine::lesson::generate_lesson;
use crate::engine::listeners::{EventBus, ListenerId};
use crate::engine::random::{std_source, RandomSource};
use crate::engine::scheduler::{DeferredAction, DeferredQueue};
use crate::error::EngineError;
use crate::events::{EventKind, SimEvent};
use crate::models::market::{round2, PRICE_FLOOR, SEED_QUOTES};
use crate::models::{ActiveTrade, CompletedTrade, Quote, TradeSetup, TradeStatus, VolatilityLevel};

/// Upper bound of the random volume added to a quote per tick.
const VOLUME_STEP: f64 = 10_000.0;
/// Upper bound of a quote's random starting volume.
const INITIAL_VOLUME: f64 = 1_000_000.0;

// ─── Timings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Timings {
    tick_interval: Duration,
    fill_delay:    Duration,
    settle_delay:  Duration,
    journal_delay: Duration,
}

impl Timings {
    fn from_config(config: &SimConfig) -> Self {
        Self {
            tick_interval: millis(config.tick_interval_ms),
            fill_delay:    delay("fill", config.fill_delay_ms),
            settle_delay:  delay("settle", config.settle_delay_ms),
            journal_delay: delay("journal", config.journal_delay_ms),
        }
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX / 1_000_000))
}

fn delay(name: &str, ms: u64) -> Duration {
    if ms > MAX_DELAY_MS {
        warn!(delay = name, ms, cap = MAX_DELAY_MS, "Delay too long — capped");
    }
    millis(ms.min(MAX_DELAY_MS))
}

/// `from + delay`, or the end of representable time if that overflows.
fn due_after(from: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    from.checked_add_signed(delay).unwrap_or_else(|| {
        warn!(%from, ?delay, "Deferred action out of clock range — it will never fire");
        DateTime::<Utc>::MAX_UTC
    })
}

// ─── MarketSimulator ──────────────────────────────────────────────────────────

pub struct MarketSimulator {
    clock:      Arc<dyn Clock>,
    rng:        Box<dyn RandomSource>,
    timings:    Timings,
    volatility: VolatilityLevel,

    /// symbol → quote.  Seeded once, never shrinks.
    quotes:     BTreeMap<String, Quote>,
    /// id → trade, from execution until settlement.
    active:     HashMap<Uuid, ActiveTrade>,
    /// Trades whose exit has been processed and whose settlement is pending.
    settling:   HashSet<Uuid>,
    completed:  Vec<CompletedTrade>,
    /// Every id handed out, so none is ever reused.
    issued:     HashSet<Uuid>,

    running:    bool,
    last_tick:  DateTime<Utc>,
    tick_count: u64,

    deferred:   DeferredQueue,
    bus:        EventBus,
}

impl MarketSimulator {
    /// Builds a stopped simulator with quotes seeded from [`SEED_QUOTES`].
    pub fn new(config: &SimConfig, clock: Arc<dyn Clock>, mut rng: Box<dyn RandomSource>) -> Self {
        let now = clock.now();
        let quotes: BTreeMap<String, Quote> = SEED_QUOTES
            .iter()
            .map(|&(symbol, price)| {
                let volume = rng.next_unit() * INITIAL_VOLUME;
                (symbol.to_string(), Quote::new(symbol, price, volume, now))
            })
            .collect();

        info!(
            symbols    = quotes.len(),
            volatility = %config.volatility,
            tick_ms    = config.tick_interval_ms,
            "📈 Market simulator initialised"
        );

        Self {
            clock,
            rng,
            timings:    Timings::from_config(config),
            volatility: config.volatility,
            quotes,
            active:     HashMap::new(),
            settling:   HashSet::new(),
            completed:  Vec::new(),
            issued:     HashSet::new(),
            running:    false,
            last_tick:  now,
            tick_count: 0,
            deferred:   DeferredQueue::new(),
            bus:        EventBus::new(),
        }
    }

    /// Wall clock and a `StdRng` seeded from `config.seed` (or entropy).
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config, Arc::new(SystemClock), std_source(config.seed))
    }

    // ─── Run Control ──────────────────────────────────────────────────────────

    /// Starts ticking.  The first tick is due one interval from now.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_tick = self.clock.now();
        info!("▶️ Simulation started");
    }

    /// Stops ticking.  Deferred actions already scheduled stay queued and keep
    /// firing through [`run_due`](Self::run_due).
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        info!(pending_actions = self.deferred.len(), "⏸️ Simulation stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ─── Subscriptions ────────────────────────────────────────────────────────

    /// Registers `listener` for one event kind.
    ///
    /// Listeners run synchronously inside the simulator call that emits, so
    /// they must not call back into the simulator.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&SimEvent) -> anyhow::Result<()> + Send + 'static,
    {
        self.bus.subscribe(Some(kind), Box::new(listener))
    }

    /// Registers `listener` for every event kind.
    pub fn subscribe_all<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SimEvent) -> anyhow::Result<()> + Send + 'static,
    {
        self.bus.subscribe(None, Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ─── Trades ───────────────────────────────────────────────────────────────

    /// Opens a trade on `setup.symbol` at the symbol's current price.
    ///
    /// The trade starts `entering` and is promoted to `active` once the fill
    /// delay has elapsed.  Fails without side effects when the symbol has no
    /// quote.
    pub fn execute_trade(&mut self, setup: TradeSetup) -> Result<ActiveTrade, EngineError> {
        let price = match self.quotes.get(&setup.symbol) {
            Some(quote) => quote.current_price,
            None => {
                warn!(symbol = %setup.symbol, "Trade rejected — symbol not tracked");
                return Err(EngineError::SymbolNotFound(setup.symbol));
            }
        };

        let id = self.fresh_id();
        let now = self.clock.now();
        let trade = ActiveTrade::open(id, setup, price, now);

        self.active.insert(id, trade.clone());
        self.deferred.schedule(due_after(now, self.timings.fill_delay), DeferredAction::Fill { trade_id: id });

        info!(
            trade_id = %id,
            symbol   = %trade.setup.symbol,
            kind     = ?trade.setup.option_type,
            price,
            stop     = trade.setup.stop_loss,
            target   = trade.setup.target,
            "🚀 Trade entering"
        );

        self.bus.emit(&SimEvent::TradeUpdated {
            trade:   Box::new(trade.clone()),
            lessons: None,
        });

        Ok(trade)
    }

    fn fresh_id(&mut self) -> Uuid {
        loop {
            let id = uuid::Builder::from_random_bytes(self.rng.next_id_bytes()).into_uuid();
            if self.issued.insert(id) {
                return id;
            }
            debug!(%id, "Trade id collision — redrawing");
        }
    }

    // ─── Reads ────────────────────────────────────────────────────────────────

    pub fn market_data(&self, symbol: &str) -> Option<Quote> {
        self.quotes.get(symbol).cloned()
    }

    /// All quotes, ordered by symbol.
    pub fn all_market_data(&self) -> Vec<Quote> {
        self.quotes.values().cloned().collect()
    }

    /// Open trades (including those waiting for settlement), oldest first.
    pub fn active_trades(&self) -> Vec<ActiveTrade> {
        let mut trades: Vec<ActiveTrade> = self.active.values().cloned().collect();
        trades.sort_by(|a, b| a.entry_time.cmp(&b.entry_time).then(a.id.cmp(&b.id)));
        trades
    }

    /// The journal, in settlement order.
    pub fn completed_trades(&self) -> Vec<CompletedTrade> {
        self.completed.clone()
    }

    pub fn journal_stats(&self, timeframe: Timeframe) -> JournalStats {
        journal_stats(&self.completed, timeframe, self.clock.now())
    }

    pub fn volatility(&self) -> VolatilityLevel {
        self.volatility
    }

    /// Applies from the next tick on.
    pub fn set_volatility(&mut self, level: VolatilityLevel) {
        if self.volatility != level {
            info!(from = %self.volatility, to = %level, "Volatility changed");
        }
        self.volatility = level;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn pending_actions(&self) -> usize {
        self.deferred.len()
    }

    pub fn listener_count(&self) -> usize {
        self.bus.len()
    }

    /// Overrides a quote's price (replays, demos).  The old price moves into
    /// `last_price`; trades see the new price on the next tick.
    pub fn set_price(&mut self, symbol: &str, price: f64) -> Result<Quote, EngineError> {
        if !price.is_finite() || round2(price) < PRICE_FLOOR {
            return Err(EngineError::InvalidPrice { symbol: symbol.to_string(), price });
        }
        let now = self.clock.now();
        let quote = self
            .quotes
            .get_mut(symbol)
            .ok_or_else(|| EngineError::SymbolNotFound(symbol.to_string()))?;

        quote.reprice(round2(price), now);
        debug!(symbol, price = quote.current_price, "Quote overridden");
        Ok(quote.clone())
    }

    // ─── Scheduling ───────────────────────────────────────────────────────────

    /// One scheduler frame: fire due deferred actions, then tick if due.
    /// Returns `true` when anything changed.
    pub fn pump(&mut self) -> bool {
        let fired = self.run_due();
        let ticked = self.tick();
        fired > 0 || ticked
    }

    /// Fires every deferred action due by now.  Returns how many fired.
    pub fn run_due(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((due, action)) = self.deferred.pop_due(now) {
            self.apply(due, action);
            fired += 1;
        }
        fired
    }

    fn apply(&mut self, due: DateTime<Utc>, action: DeferredAction) {
        match action {
            DeferredAction::Fill { trade_id } => {
                let Some(trade) = self.active.get_mut(&trade_id) else {
                    debug!(%trade_id, "Fill skipped — trade gone");
                    return;
                };
                if trade.status != TradeStatus::Entering {
                    debug!(%trade_id, status = ?trade.status, "Fill skipped — not entering");
                    return;
                }
                trade.status = TradeStatus::Active;
                info!(%trade_id, symbol = %trade.setup.symbol, "✅ Trade filled");

                let snapshot = trade.clone();
                self.bus.emit(&SimEvent::TradeUpdated {
                    trade:   Box::new(snapshot),
                    lessons: None,
                });
            }

            DeferredAction::Settle { completed } => {
                let id = completed.id();
                self.completed.push((*completed).clone());
                self.bus.emit(&SimEvent::TradeCompleted { trade: completed.clone() });
                self.active.remove(&id);
                self.settling.remove(&id);

                info!(
                    trade_id    = %id,
                    profit_loss = completed.trade.profit_loss,
                    journal     = self.completed.len(),
                    "📒 Trade settled"
                );

                self.deferred.schedule(
                    due_after(due, self.timings.journal_delay),
                    DeferredAction::JournalNotice { completed },
                );
            }

            DeferredAction::JournalNotice { completed } => {
                self.bus.emit(&SimEvent::TradeJournalUpdated { trade: completed });
            }
        }
    }

    // ─── Tick ─────────────────────────────────────────────────────────────────

    /// Advances quotes and trades once, if running and at least one tick
    /// interval has passed since the previous tick.  Returns whether it did.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let now = self.clock.now();
        if now - self.last_tick < self.timings.tick_interval {
            return false;
        }
        self.last_tick = now;
        self.tick_count += 1;

        self.advance_quotes(now);
        self.advance_trades(now);

        debug!(
            tick   = self.tick_count,
            trades = self.active.len(),
            "Tick processed"
        );
        true
    }

    fn advance_quotes(&mut self, now: DateTime<Utc>) {
        let coefficient = self.volatility.coefficient();

        for quote in self.quotes.values_mut() {
            let change = (self.rng.next_unit() * 2.0 - 1.0) * coefficient;
            let price = round2(quote.current_price * (1.0 + change)).max(PRICE_FLOOR);

            quote.reprice(price, now);
            quote.volume += self.rng.next_unit() * VOLUME_STEP;

            self.bus.emit(&SimEvent::PriceUpdated {
                symbol: quote.symbol.clone(),
                quote:  quote.clone(),
            });
        }
    }

    fn advance_trades(&mut self, now: DateTime<Utc>) {
        let mut ids: Vec<Uuid> = self.active.keys().copied().collect();
        ids.sort();

        for id in ids {
            // Exit already processed; settlement will remove it.
            if self.settling.contains(&id) {
                continue;
            }
            let Some(trade) = self.active.get_mut(&id) else { continue };
            let Some(price) = self.quotes.get(&trade.setup.symbol).map(|q| q.current_price) else {
                debug!(trade_id = %id, symbol = %trade.setup.symbol, "No quote for trade — skipped");
                continue;
            };

            trade.mark(price);

            if trade.status == TradeStatus::Active {
                if let Some(reason) = trade.setup.exit_signal(price) {
                    trade.status = TradeStatus::Exiting;
                    trade.exit_reason = Some(reason);
                }
            }

            if trade.status == TradeStatus::Exiting {
                trade.exit_time = Some(now);
                let lessons = generate_lesson(trade);
                let completed = CompletedTrade::settle(trade.clone(), now, lessons.clone());

                info!(
                    trade_id    = %id,
                    symbol      = %trade.setup.symbol,
                    reason      = ?trade.exit_reason,
                    price,
                    profit_loss = trade.profit_loss,
                    "🏁 Trade exiting"
                );

                self.settling.insert(id);
                self.bus.emit(&SimEvent::TradeUpdated {
                    trade:   Box::new(completed.trade.clone()),
                    lessons: Some(lessons),
                });
                self.deferred.schedule(
                    due_after(now, self.timings.settle_delay),
                    DeferredAction::Settle { completed: Box::new(completed) },
                );
            } else {
                let snapshot = trade.clone();
                self.bus.emit(&SimEvent::TradeUpdated {
                    trade:   Box::new(snapshot),
                    lessons: None,
                });
            }
        }
    }
}

impl std::fmt::Debug for MarketSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketSimulator")
            .field("running", &self.running)
            .field("volatility", &self.volatility)
            .field("quotes", &self.quotes.len())
            .field("active", &self.active.len())
            .field("completed", &self.completed.len())
            .field("pending_actions", &self.deferred.len())
            .finish()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::engine::random::SequenceRandom;
    use crate::models::OptionType;
    use std::sync::Mutex;

    fn make_sim(rng: SequenceRandom) -> (MarketSimulator, ManualClock) {
        let clock = ManualClock::default();
        let sim = MarketSimulator::new(&SimConfig::default(), Arc::new(clock.clone()), Box::new(rng));
        (sim, clock)
    }

    fn aapl_call() -> TradeSetup {
        TradeSetup {
            symbol: "AAPL".into(),
            option_type: OptionType::Call,
            strike: 175.0,
            expiry: "2024-05-17".into(),
            entry: 175.50,
            stop_loss: 173.50,
            target: 180.00,
            probability: 0.65,
            setup: "Bullish Breakout".into(),
            analysis: String::new(),
        }
    }

    fn record(sim: &mut MarketSimulator) -> Arc<Mutex<Vec<SimEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        sim.subscribe_all(move |event| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
        log
    }

    #[test]
    fn test_seeded_quotes() {
        let (sim, _) = make_sim(SequenceRandom::constant(0.5));
        let quotes = sim.all_market_data();
        assert_eq!(quotes.len(), SEED_QUOTES.len());

        let aapl = sim.market_data("AAPL").unwrap();
        assert_eq!(aapl.current_price, 175.50);
        assert_eq!(aapl.last_price, 175.50);
        assert_eq!(aapl.volume, 500_000.0);
        assert!(sim.market_data("UNKNOWN").is_none());
    }

    #[test]
    fn test_start_stop_idempotent() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        sim.start();
        clock.advance_millis(600);
        sim.start(); // must not reset the tick gate
        clock.advance_millis(400);
        assert!(sim.tick());

        sim.stop();
        sim.stop();
        clock.advance_millis(5000);
        assert!(!sim.tick());
        assert!(!sim.is_running());
    }

    #[test]
    fn test_tick_gate() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        let log = record(&mut sim);
        sim.start();

        assert!(!sim.tick());
        clock.advance_millis(1000);
        assert!(sim.tick());
        let after_first = log.lock().unwrap().len();
        let quote = sim.market_data("AAPL").unwrap();

        clock.advance_millis(500);
        assert!(!sim.tick());
        assert_eq!(log.lock().unwrap().len(), after_first);
        assert_eq!(sim.market_data("AAPL").unwrap(), quote);
    }

    #[test]
    fn test_price_jitter_bounded_by_volatility() {
        // 0.0 → largest down move, 0.999… → largest up move.
        let (mut sim, clock) = make_sim(SequenceRandom::new(vec![0.0, 0.0]));
        sim.set_volatility(VolatilityLevel::High);
        sim.start();
        clock.advance_millis(1000);
        sim.tick();

        let nvda = sim.market_data("NVDA").unwrap();
        assert_eq!(nvda.last_price, 880.30);
        assert_eq!(nvda.current_price, round2(880.30 * (1.0 - 0.004)));
    }

    #[test]
    fn test_price_never_below_floor() {
        let (mut sim, clock) = make_sim(SequenceRandom::new(vec![0.0, 0.0]));
        sim.set_price("AAPL", 0.01).unwrap();
        sim.start();
        for _ in 0..10 {
            clock.advance_millis(1000);
            sim.tick();
        }
        assert_eq!(sim.market_data("AAPL").unwrap().current_price, PRICE_FLOOR);
    }

    #[test]
    fn test_set_price_validation() {
        let (mut sim, _) = make_sim(SequenceRandom::constant(0.5));
        assert!(matches!(sim.set_price("AAPL", 0.0), Err(EngineError::InvalidPrice { .. })));
        assert!(matches!(sim.set_price("AAPL", f64::NAN), Err(EngineError::InvalidPrice { .. })));
        assert!(matches!(sim.set_price("ZZZ", 10.0), Err(EngineError::SymbolNotFound(_))));
        assert_eq!(sim.set_price("AAPL", 176.004).unwrap().current_price, 176.0);
    }

    #[test]
    fn test_unknown_symbol_rejected_without_side_effects() {
        let (mut sim, _) = make_sim(SequenceRandom::constant(0.5));
        let log = record(&mut sim);
        let mut setup = aapl_call();
        setup.symbol = "UNKNOWN".into();

        assert_eq!(
            sim.execute_trade(setup),
            Err(EngineError::SymbolNotFound("UNKNOWN".into()))
        );
        assert!(sim.active_trades().is_empty());
        assert_eq!(sim.pending_actions(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_entering_then_filled() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        let log = record(&mut sim);

        let trade = sim.execute_trade(aapl_call()).unwrap();
        assert_eq!(trade.status, TradeStatus::Entering);
        assert_eq!(trade.current_price, 175.50);
        assert_eq!(trade.profit_loss, 0.0);
        assert_eq!(log.lock().unwrap().len(), 1);

        clock.advance_millis(999);
        assert_eq!(sim.run_due(), 0);
        clock.advance_millis(1);
        assert_eq!(sim.run_due(), 1);

        assert_eq!(sim.active_trades()[0].status, TradeStatus::Active);
        let events = log.lock().unwrap();
        assert!(matches!(
            &events[1],
            SimEvent::TradeUpdated { trade, .. } if trade.status == TradeStatus::Active && trade.id == trade_id(&events[0])
        ));
    }

    fn trade_id(event: &SimEvent) -> Uuid {
        match event {
            SimEvent::TradeUpdated { trade, .. } => trade.id,
            SimEvent::TradeCompleted { trade } | SimEvent::TradeJournalUpdated { trade } => trade.id(),
            SimEvent::PriceUpdated { .. } => Uuid::nil(),
        }
    }

    #[test]
    fn test_entering_trade_does_not_exit() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        sim.execute_trade(aapl_call()).unwrap();
        sim.set_price("AAPL", 170.0).unwrap();
        sim.start();

        // Tick lands before the fill: re-marked, but no exit evaluation.
        clock.advance_millis(1000);
        assert!(sim.tick());
        let trade = &sim.active_trades()[0];
        assert_eq!(trade.status, TradeStatus::Entering);
        assert_eq!(trade.profit_loss, -5.5);
    }

    #[test]
    fn test_ids_unique() {
        let (mut sim, _) = make_sim(SequenceRandom::constant(0.5));
        let ids: HashSet<Uuid> = (0..50)
            .map(|_| sim.execute_trade(aapl_call()).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 50);
    }

    /// Hands out the same id bytes twice, then fresh ones.
    struct RepeatingIds {
        draws: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl RandomSource for RepeatingIds {
        fn next_unit(&mut self) -> f64 {
            0.5
        }

        fn next_id_bytes(&mut self) -> [u8; 16] {
            let n = self.draws.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n < 2 { [7; 16] } else { [n as u8; 16] }
        }
    }

    #[test]
    fn test_issued_id_is_redrawn() {
        let draws = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let rng = RepeatingIds { draws: Arc::clone(&draws) };
        let mut sim = MarketSimulator::new(&SimConfig::default(), Arc::new(ManualClock::default()), Box::new(rng));

        let first = sim.execute_trade(aapl_call()).unwrap().id;
        let second = sim.execute_trade(aapl_call()).unwrap().id;

        assert_ne!(first, second);
        assert_eq!(draws.load(std::sync::atomic::Ordering::SeqCst), 3);
        assert_eq!(sim.active_trades().len(), 2);
    }

    #[test]
    fn test_oversized_delays_are_capped() {
        let config = SimConfig {
            settle_delay_ms:  9_000_000_000_000_000,
            journal_delay_ms: u64::MAX,
            ..SimConfig::default()
        };
        let clock = ManualClock::default();
        let mut sim = MarketSimulator::new(&config, Arc::new(clock.clone()), Box::new(SequenceRandom::constant(0.5)));
        sim.execute_trade(aapl_call()).unwrap();
        sim.start();
        clock.advance_millis(1000);
        sim.pump();

        sim.set_price("AAPL", 181.0).unwrap();
        clock.advance_millis(1000);
        assert!(sim.pump());
        assert_eq!(sim.pending_actions(), 1);

        clock.advance_millis(MAX_DELAY_MS as i64);
        sim.pump();
        assert_eq!(sim.completed_trades().len(), 1);
        assert_eq!(sim.pending_actions(), 1); // journal notice, also capped
    }

    #[test]
    fn test_schedule_at_end_of_time_does_not_panic() {
        let clock = ManualClock::new(DateTime::<Utc>::MAX_UTC - Duration::seconds(1));
        let mut sim = MarketSimulator::new(&SimConfig::default(), Arc::new(clock.clone()), Box::new(SequenceRandom::constant(0.5)));

        sim.execute_trade(aapl_call()).unwrap();
        assert_eq!(sim.pending_actions(), 1);
        assert_eq!(due_after(clock.now(), Duration::hours(1)), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_exit_processed_once() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        let log = record(&mut sim);
        sim.execute_trade(aapl_call()).unwrap();
        sim.start();

        clock.advance_millis(1000);
        sim.pump(); // fill, then a flat tick
        sim.set_price("AAPL", 173.0).unwrap();

        clock.advance_millis(1000);
        sim.pump(); // stop hit
        clock.advance_millis(1000);
        sim.pump(); // settlement still pending: trade untouched
        let waiting = sim.active_trades();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].status, TradeStatus::Exiting);

        clock.advance_millis(1000);
        sim.pump(); // settled
        clock.advance_millis(5000);
        sim.pump();

        let events = log.lock().unwrap();
        let completed = events.iter().filter(|e| e.kind() == EventKind::TradeCompleted).count();
        let journal = events.iter().filter(|e| e.kind() == EventKind::TradeJournalUpdated).count();
        assert_eq!(completed, 1);
        assert_eq!(journal, 1);
        assert_eq!(sim.completed_trades().len(), 1);
        assert!(sim.active_trades().is_empty());

        let done = &sim.completed_trades()[0];
        assert_eq!(done.trade.exit_reason, Some(crate::models::ExitReason::StopLossHit));
        assert_eq!(done.trade.profit_loss, -2.5);
        assert!(done.lessons.starts_with("Protected capital"));
    }

    #[test]
    fn test_stop_keeps_pending_actions() {
        let (mut sim, clock) = make_sim(SequenceRandom::constant(0.5));
        sim.start();
        sim.execute_trade(aapl_call()).unwrap();
        sim.stop();

        clock.advance_millis(1000);
        assert!(!sim.tick());
        assert_eq!(sim.run_due(), 1);
        assert_eq!(sim.active_trades()[0].status, TradeStatus::Active);
    }

    #[test]
    fn test_snapshots_do_not_alias() {
        let (mut sim, _) = make_sim(SequenceRandom::constant(0.5));
        sim.execute_trade(aapl_call()).unwrap();

        let mut copy = sim.active_trades();
        copy[0].status = TradeStatus::Completed;
        copy.clear();

        assert_eq!(sim.active_trades()[0].status, TradeStatus::Entering);
    }
}
