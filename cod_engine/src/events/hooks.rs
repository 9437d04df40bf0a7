use std::{future::Future, pin::Pin, sync::Arc};

use tokio::task::JoinHandle;

use crate::events::{EventHandler, EventProducer, FraudScanCompletedEvent, Handler, StatusSyncCompletedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub sync_completed_producer: Vec<EventProducer<StatusSyncCompletedEvent>>,
    pub scan_completed_producer: Vec<EventProducer<FraudScanCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_sync_completed: Option<EventHandler<StatusSyncCompletedEvent>>,
    pub on_scan_completed: Option<EventHandler<FraudScanCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_sync_completed = hooks.on_sync_completed.map(|f| EventHandler::new(buffer_size, f));
        let on_scan_completed = hooks.on_scan_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_sync_completed, on_scan_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_sync_completed {
            result.sync_completed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_scan_completed {
            result.scan_completed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns one task per registered handler. Each task ends once every producer for it has been dropped and its
    /// queued events have been handled, so awaiting the handles drains the hooks.
    pub fn start_handlers(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if let Some(handler) = self.on_sync_completed {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_scan_completed {
            handles.push(tokio::spawn(handler.start_handler()));
        }
        handles
    }
}

type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_sync_completed: Option<Handler<StatusSyncCompletedEvent>>,
    pub on_scan_completed: Option<Handler<FraudScanCompletedEvent>>,
}

impl EventHooks {
    pub fn on_sync_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(StatusSyncCompletedEvent) -> BoxedFuture) + Send + Sync + 'static {
        self.on_sync_completed = Some(Arc::new(f));
        self
    }

    pub fn on_scan_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(FraudScanCompletedEvent) -> BoxedFuture) + Send + Sync + 'static {
        self.on_scan_completed = Some(Arc::new(f));
        self
    }
}
