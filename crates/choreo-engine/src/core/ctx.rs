use std::rc::Rc;

use crate::config::EngineConfig;
use crate::host::Host;
use crate::style::StyleEngine;
use crate::time::Scheduler;

/// Injected capabilities for building and running jobs.
#[derive(Clone)]
pub struct Services {
    pub host: Rc<dyn Host>,
    pub styles: Rc<dyn StyleEngine>,
    pub frames: Rc<dyn Scheduler>,
    pub config: Rc<EngineConfig>,
}

impl Services {
    /// Services with the default [`EngineConfig`].
    pub fn new(host: Rc<dyn Host>, styles: Rc<dyn StyleEngine>, frames: Rc<dyn Scheduler>) -> Self {
        Self { host, styles, frames, config: Rc::new(EngineConfig::default()) }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Rc::new(config);
        self
    }
}
