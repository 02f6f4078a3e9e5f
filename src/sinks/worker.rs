//! Bounded queue plus single consumer thread shared by every sink

use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::sink::Line;
use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub(crate) struct SinkMessage {
    pub level: LogLevel,
    pub line: Line,
}

/// The part of a sink that runs on its worker thread.
pub(crate) trait Consumer: Send + 'static {
    fn consume(&mut self, message: SinkMessage);

    /// The queue is momentarily empty.
    fn idle(&mut self) {}

    /// Maintenance tick, only called when [`Consumer::tick_interval`] is set.
    fn tick(&mut self) {}

    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    /// Called once after the queue has been drained on stop.
    fn finish(&mut self);
}

pub(crate) struct SinkQueue<C: Consumer> {
    name: String,
    sender: Option<Sender<SinkMessage>>,
    receiver: Option<Receiver<SinkMessage>>,
    /// Moved onto the worker thread by `start`.
    consumer: Mutex<Option<C>>,
    handle: Option<thread::JoinHandle<()>>,
    closed: AtomicBool,
}

impl<C: Consumer> SinkQueue<C> {
    pub fn new(name: impl Into<String>, capacity: usize, consumer: C) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            name: name.into(),
            sender: Some(sender),
            receiver: Some(receiver),
            consumer: Mutex::new(Some(consumer)),
            handle: None,
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adjust the consumer before the worker is started.
    pub fn configure(&mut self, f: impl FnOnce(&mut C)) {
        if let Some(consumer) = self.consumer.get_mut().as_mut() {
            f(consumer);
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() || self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        let (Some(receiver), Some(consumer)) =
            (self.receiver.take(), self.consumer.get_mut().take())
        else {
            return Ok(());
        };

        let handle = thread::Builder::new()
            .name(format!("sink-{}", self.name))
            .spawn(move || run(receiver, consumer))
            .map_err(|e| {
                LoggerError::io_operation(
                    "spawning sink worker",
                    format!("Failed to start worker for sink '{}'", self.name),
                    e,
                )
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    pub fn write(&self, level: LogLevel, line: Line) -> Result<usize> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(0);
        }
        let Some(ref sender) = self.sender else {
            return Ok(0);
        };
        let len = line.len();
        sender
            .send(SinkMessage { level, line })
            .map_err(|_| LoggerError::sink_disconnected(&self.name))?;
        Ok(len)
    }

    pub fn stop(&mut self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        drop(self.sender.take());

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                eprintln!(
                    "[LOGGER ERROR] Worker of sink '{}' panicked during shutdown: {:?}",
                    self.name, e
                );
            }
        } else if let (Some(receiver), Some(consumer)) =
            (self.receiver.take(), self.consumer.get_mut().take())
        {
            // never started: drain on the stopping thread
            run(receiver, consumer);
        }
    }
}

impl<C: Consumer> Drop for SinkQueue<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<C: Consumer>(receiver: Receiver<SinkMessage>, mut consumer: C) {
    let ticker = match consumer.tick_interval() {
        Some(interval) => tick(interval),
        None => never(),
    };

    loop {
        select! {
            recv(receiver) -> message => match message {
                Ok(message) => {
                    consumer.consume(message);
                    if receiver.is_empty() {
                        consumer.idle();
                    }
                }
                // disconnected and empty
                Err(_) => break,
            },
            recv(ticker) -> _ => consumer.tick(),
        }
    }

    consumer.finish();
}
