//! Response listener: folds the console's fader reports into the store.

use std::sync::{Arc, LazyLock};

use log::{debug, trace, warn};
use regex::Regex;
use rosc::{OscMessage, OscType};

use oscfade_types::{ParamId, ParameterClass};

use crate::store::ParameterStore;

/// `/<class-tag>/<index>/mix/fader`
static FADER_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([^/]+)/([^/]+)/mix/fader$").expect("fader address pattern is valid")
});

/// Consumes every message arriving on the response socket.
///
/// Only `<tag>/<index>/mix/fader` reports for known classes touch the store;
/// everything else the console sends is ignored.
#[derive(Clone)]
pub struct ResponseListener {
    store: Arc<ParameterStore>,
}

impl ResponseListener {
    pub fn new(store: Arc<ParameterStore>) -> Self {
        Self { store }
    }

    /// Apply one console message. Returns the fader and value written, if any.
    pub fn handle(&self, msg: &OscMessage) -> Option<(ParamId, f32)> {
        let Some(caps) = FADER_ADDR.captures(&msg.addr) else {
            trace!(target: "listener", "ignoring {}", msg.addr);
            return None;
        };

        let Some(class) = ParameterClass::from_tag(&caps[1]) else {
            trace!(target: "listener", "ignoring unknown class in {}", msg.addr);
            return None;
        };

        let index: i64 = match caps[2].parse() {
            Ok(i) => i,
            Err(e) => {
                warn!(target: "listener", "invalid ID: {} ({}: {})", &caps[2], msg.addr, e);
                return None;
            }
        };

        let Some(id) = ParamId::new(class, index) else {
            warn!(target: "listener", "ID out of range for {}: {} ({})", class.name(), index, msg.addr);
            return None;
        };

        let value = match msg.args.first() {
            Some(OscType::Float(v)) => *v,
            Some(other) => {
                warn!(target: "listener", "failed parsing value: {:?} ({})", other, msg.addr);
                return None;
            }
            None => {
                debug!(target: "listener", "no value in {}", msg.addr);
                return None;
            }
        };

        self.store.set(id, value);
        debug!(target: "listener", "{} = {}", id, value);
        Some((id, value))
    }
}
