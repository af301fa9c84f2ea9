use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

pub(crate) mod macros;
pub mod traceable;
pub use traceable::Traceable;

pub static TRACER: Lazy<Mutex<Tracer>> = Lazy::new(|| Mutex::new(Tracer::new(65_536)));

/// One recorded cartridge event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    BankSwitch { cart: &'static str, bank: u16 },
    /// A read hit a RAM write port and stored the floating bus
    WritePortRead { cart: &'static str, address: u16, value: u8 },
    State(String),
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::BankSwitch { cart, bank } => write!(f, "[BANK] {cart} -> bank {bank}"),
            TraceEvent::WritePortRead { cart, address, value } => {
                write!(f, "[RWP]  {cart} read ${address:04X} wrote ${value:02X}")
            }
            TraceEvent::State(state) => write!(f, "[STATE] {state}"),
        }
    }
}

/// Bounded history of bank switches and port anomalies
///
/// Events are numbered as they arrive, so a dump still shows how many were
/// pushed out of the ring.
pub struct Tracer {
    history: VecDeque<(u64, TraceEvent)>,
    capacity: usize,
    next_seq: u64,
    bank_switches: u64,
}

impl Tracer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            next_seq: 0,
            bank_switches: 0,
        }
    }

    pub fn record(&mut self, event: TraceEvent) {
        if matches!(event, TraceEvent::BankSwitch { .. }) {
            self.bank_switches += 1;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back((self.next_seq, event));
        self.next_seq += 1;
    }

    pub fn log<T: Traceable + ?Sized>(&mut self, thing: &T) {
        if let Some(trace) = thing.trace() {
            self.record(TraceEvent::State(trace));
        }
    }

    /// Events that fell off the front of the ring
    pub fn dropped(&self) -> u64 {
        self.next_seq - self.history.len() as u64
    }

    pub fn bank_switches(&self) -> u64 {
        self.bank_switches
    }

    /// The newest `count` events, oldest first
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &(u64, TraceEvent)> {
        self.history.iter().skip(self.history.len().saturating_sub(count))
    }

    pub fn print(&self, count: usize) {
        if self.dropped() > 0 {
            println!("... {} earlier events dropped", self.dropped());
        }
        for (seq, event) in self.tail(count) {
            println!("{seq:06}: {event}");
        }
        println!("{} bank switches", self.bank_switches);
    }
}
