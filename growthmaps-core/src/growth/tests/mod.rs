mod aggregation;

use crate::example_models::{Linear, Threshold};
use crate::layer::Layer;
use crate::source::MemorySource;
use crate::stack::Stack;
use crate::timespan::{Period, Timespan, Timestamp};
use chrono::NaiveDate;
use ndarray::{array, Array2};
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};

pub(crate) fn ts(month: u32, day: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2016, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub(crate) fn monthly(count: usize) -> Timespan {
    Timespan::new(ts(1, 3), Period::Months(1), count).unwrap()
}

pub(crate) fn tas(values: Array2<f64>) -> Stack {
    Stack::from_layers([("tas", values)]).unwrap()
}

/// Active below 5 K with a slope of -1 per K.
pub(crate) fn cold_stress() -> Layer {
    Layer::new(
        "tas",
        "K",
        Threshold {
            threshold: 5.0,
            slope: -1.0,
        },
    )
    .unwrap()
}

pub(crate) fn moisture_growth() -> Layer {
    Layer::new("swc", "1", Linear { slope: 2.0 }).unwrap()
}

/// Irregularly spaced 1x2 snapshots from January to early May 2016.
///
/// The first and last snapshots lie outside a four month span starting on 3 January;
/// the last sits exactly on its end.
pub(crate) fn series() -> MemorySource {
    MemorySource::new([
        (ts(1, 1), tas(array![[-100.0, -100.0]])),
        (ts(1, 16), tas(array![[1.0, 2.0]])),
        (ts(2, 10), tas(array![[2.0, 3.0]])),
        (ts(2, 20), tas(array![[3.0, 4.0]])),
        (ts(3, 10), tas(array![[4.0, 5.0]])),
        (ts(3, 20), tas(array![[5.0, 6.0]])),
        (ts(4, 10), tas(array![[6.0, 7.0]])),
        (ts(4, 20), tas(array![[7.0, 8.0]])),
        (ts(5, 3), tas(array![[-100.0, -100.0]])),
    ])
}

/// Records the fields of every `WARN` event as `name=value` text.
#[derive(Clone, Default)]
pub(crate) struct Warnings(Arc<Mutex<Vec<String>>>);

impl Warnings {
    /// Run `f` with this recorder installed as the thread's subscriber.
    pub(crate) fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for Warnings {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut text = FieldText(String::new());
            event.record(&mut text);
            self.0.lock().unwrap().push(text.0);
        }
    }
}
