//! Plot sinks: where plotted fields go.
//!
//! The engine hands a sink the fully updated field of every plotted step.
//! What the sink does with it (write a plotfile, render, discard) is up
//! to the sink.

use std::error::Error;
use std::fmt;

use crossbeam_channel::{Receiver, Sender};
use halo_core::Domain;
use halo_field::DistributedField;

/// Errors a sink can report. The run stops on any of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side has gone away.
    Disconnected,
    /// The sink failed to process a frame.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "plot receiver disconnected"),
            Self::Failed { reason } => write!(f, "plot sink failed: {reason}"),
        }
    }
}

impl Error for SinkError {}

/// An owned copy of one plotted step.
#[derive(Clone, Debug)]
pub struct PlotFrame {
    /// The step just completed (0 for the initial state).
    pub step: u64,
    /// Simulation time after that step.
    pub time: f64,
    /// The simulated domain.
    pub domain: Domain,
    /// The field after that step, ghosts included.
    pub field: DistributedField,
}

/// Receives plotted steps.
pub trait PlotSink {
    /// Called with the state after `step`.
    fn plot(
        &mut self,
        step: u64,
        time: f64,
        field: &DistributedField,
        domain: &Domain,
    ) -> Result<(), SinkError>;
}

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PlotSink for NullSink {
    fn plot(&mut self, _: u64, _: f64, _: &DistributedField, _: &Domain) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sends an owned [`PlotFrame`] per plotted step over a channel, so
/// output can be handled on another thread.
///
/// # Examples
///
/// ```
/// use halo_engine::{ChannelSink, PlotSink};
/// use halo_test_utils::{layout, periodic_square, random_field};
///
/// let (mut sink, frames) = ChannelSink::unbounded();
/// let domain = periodic_square(4);
/// let field = random_field(layout(&domain, 4, 1), 1, 1, 0);
/// sink.plot(3, 0.5, &field, &domain).unwrap();
///
/// let frame = frames.recv().unwrap();
/// assert_eq!(frame.step, 3);
/// ```
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<PlotFrame>,
}

impl ChannelSink {
    /// A sink over an unbounded channel, and its receiver.
    pub fn unbounded() -> (Self, Receiver<PlotFrame>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    /// A sink over a channel of `capacity` frames; plotting blocks while
    /// the channel is full.
    pub fn bounded(capacity: usize) -> (Self, Receiver<PlotFrame>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl PlotSink for ChannelSink {
    fn plot(
        &mut self,
        step: u64,
        time: f64,
        field: &DistributedField,
        domain: &Domain,
    ) -> Result<(), SinkError> {
        let frame = PlotFrame {
            step,
            time,
            domain: domain.clone(),
            field: field.clone(),
        };
        self.tx.send(frame).map_err(|_| SinkError::Disconnected)
    }
}
