// src/session.rs
//! Duplex relay session: transmit telemetry, report whatever comes back

use crate::{
    error::{RelayError, Result},
    gps::{FixProfile, SentenceKind},
    telemetry::{render_sample, TelemetrySchedule},
};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
    sync::watch,
    task::JoinHandle,
    time::sleep,
};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::sync::CancellationToken;

/// Typing this in console mode ends the session
pub const QUIT_COMMAND: &str = "$quit()";

/// Longest reply line buffered before it is reported as-is
pub const MAX_REPLY_LINE: usize = 1024;

/// Lifecycle of a relay session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection held, loops not started
    Open,
    /// Transmit and receive loops both active
    Running,
    /// Transmit side finished, stop signal pending
    Draining,
    /// Both loops have exited
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Wait before every transmit iteration
    pub interval: Duration,
    /// Wait after the last write before raising the stop signal
    pub drain: Duration,
}

impl SessionTiming {
    pub fn new(interval: Duration, drain: Duration) -> Self {
        Self { interval, drain }
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(2))
    }
}

/// What the transmit side writes to the device
pub enum TransmitPlan {
    /// Encode every scheduled sample into the listed sentence kinds
    Telemetry {
        schedule: TelemetrySchedule,
        sentences: Vec<SentenceKind>,
        profile: FixProfile,
    },
    /// Forward operator input line by line until `$quit()` or EOF
    Console(Box<dyn AsyncBufRead + Send + Unpin>),
}

impl TransmitPlan {
    pub fn telemetry(
        schedule: TelemetrySchedule,
        sentences: Vec<SentenceKind>,
        profile: FixProfile,
    ) -> Self {
        TransmitPlan::Telemetry {
            schedule,
            sentences,
            profile,
        }
    }

    pub fn console<I>(input: I) -> Self
    where
        I: AsyncBufRead + Send + Unpin + 'static,
    {
        TransmitPlan::Console(Box::new(input))
    }
}

/// Receives every line the device sends back
pub trait ReplyHandler: Send + 'static {
    fn on_line(&mut self, line: &str);
}

impl<F> ReplyHandler for F
where
    F: FnMut(&str) + Send + 'static,
{
    fn on_line(&mut self, line: &str) {
        self(line)
    }
}

/// Outcome of both loops once the session has stopped
#[derive(Debug)]
pub struct SessionReport {
    /// Telemetry sentences or console lines written
    pub transmitted: Result<usize>,
    /// Lines received from the device
    pub received: Result<usize>,
}

impl SessionReport {
    pub fn is_clean(&self) -> bool {
        self.transmitted.is_ok() && self.received.is_ok()
    }

    /// First failure wins, transmit side before receive side
    pub fn into_result(self) -> Result<(usize, usize)> {
        Ok((self.transmitted?, self.received?))
    }
}

/// Open the serial port; failure here is fatal to the whole session
pub fn open_serial(port: &str, baudrate: u32) -> Result<SerialStream> {
    tracing::info!("Opening {} at {} baud", port, baudrate);

    tokio_serial::new(port, baudrate)
        .timeout(Duration::from_millis(1000))
        .open_native_async()
        .map_err(|source| RelayError::PortUnavailable {
            port: port.to_string(),
            source,
        })
}

/// Names of the serial ports present on this machine
pub fn available_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| RelayError::Other(format!("Failed to list serial ports: {}", e)))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// A connection plus everything needed to drive it, not yet started
pub struct RelaySession<T> {
    connection: T,
    plan: TransmitPlan,
    timing: SessionTiming,
    stop: CancellationToken,
    state: Arc<watch::Sender<SessionState>>,
}

impl<T> RelaySession<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(connection: T, plan: TransmitPlan, timing: SessionTiming) -> Self {
        let (state, _) = watch::channel(SessionState::Open);
        Self {
            connection,
            plan,
            timing,
            stop: CancellationToken::new(),
            state: Arc::new(state),
        }
    }

    /// Watch the session move through its states
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Read-only view of the stop signal.
    ///
    /// Only the transmit loop ever sets it; cancelling this child token has
    /// no effect on the session.
    pub fn stop_signal(&self) -> CancellationToken {
        self.stop.child_token()
    }

    /// Spawn the transmit and receive loops
    pub fn start<H: ReplyHandler>(self, replies: H) -> ActiveSession {
        let (reader, writer) = tokio::io::split(self.connection);

        self.state.send_replace(SessionState::Running);
        tracing::info!("Relay session running");

        let transmit = tokio::spawn(transmit_loop(
            writer,
            self.plan,
            self.timing,
            Arc::clone(&self.state),
            self.stop.clone(),
        ));
        let receive = tokio::spawn(receive_loop(reader, replies, self.stop.clone()));

        ActiveSession {
            transmit,
            receive,
            state: self.state,
        }
    }
}

/// Both loops running; join them with [`ActiveSession::await_completion`]
pub struct ActiveSession {
    transmit: JoinHandle<Result<usize>>,
    receive: JoinHandle<Result<usize>>,
    state: Arc<watch::Sender<SessionState>>,
}

impl ActiveSession {
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait for both loops to exit and collect their outcomes
    pub async fn await_completion(self) -> SessionReport {
        let transmitted = self.transmit.await.map_err(RelayError::from).and_then(|r| r);
        let received = self.receive.await.map_err(RelayError::from).and_then(|r| r);

        self.state.send_replace(SessionState::Stopped);
        tracing::info!("Relay session stopped");

        SessionReport {
            transmitted,
            received,
        }
    }
}

/// Run the transmit plan, drain, then raise the stop signal exactly once.
///
/// A write failure skips the drain but still raises the signal so the
/// receive loop does not keep polling a dead link. The signal is tied to a
/// drop guard, so a panic in here raises it as well.
async fn transmit_loop<W>(
    mut writer: W,
    plan: TransmitPlan,
    timing: SessionTiming,
    state: Arc<watch::Sender<SessionState>>,
    stop: CancellationToken,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let stop_on_exit = stop.drop_guard();

    let result = match plan {
        TransmitPlan::Telemetry {
            schedule,
            sentences,
            profile,
        } => transmit_schedule(&mut writer, &schedule, &sentences, &profile, timing.interval).await,
        TransmitPlan::Console(input) => relay_console(input, &mut writer).await,
    };

    state.send_replace(SessionState::Draining);

    match &result {
        Ok(count) => {
            tracing::info!("Transmit finished after {} writes, draining", count);
            sleep(timing.drain).await;
        }
        Err(e) => tracing::error!("Transmit loop failed: {}", e),
    }

    drop(stop_on_exit);
    result
}

/// Write the encoded schedule, one iteration per interval
pub async fn transmit_schedule<W>(
    writer: &mut W,
    schedule: &TelemetrySchedule,
    sentences: &[SentenceKind],
    profile: &FixProfile,
    interval: Duration,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    for (iteration, sample) in schedule.iter().enumerate() {
        sleep(interval).await;

        for sentence in render_sample(sample, sentences, profile, &Utc::now()) {
            writer.write_all(sentence.as_bytes()).await?;
            tracing::debug!(iteration, "sent {}", sentence.trim_end());
            written += 1;
        }
        writer.flush().await?;
    }

    Ok(written)
}

/// Forward input lines verbatim (no terminator added) until `$quit()` or EOF
pub async fn relay_console<I, W>(input: I, writer: &mut W) -> Result<usize>
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            tracing::info!("Quit requested");
            break;
        }
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        tracing::debug!("sent {:?}", line);
        sent += 1;
    }

    Ok(sent)
}

/// Report incoming lines until the stop signal is raised.
///
/// Waiting for data is raced against the stop signal rather than polled, so
/// an idle link costs no CPU and shutdown is immediate. A line longer than
/// [`MAX_REPLY_LINE`] is reported in pieces of at most that many bytes.
async fn receive_loop<R, H>(reader: R, mut replies: H, stop: CancellationToken) -> Result<usize>
where
    R: AsyncRead + Unpin,
    H: ReplyHandler,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut received = 0;

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(MAX_REPLY_LINE as u64);
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            read = limited.read_until(b'\n', &mut buf) => match read {
                Ok(0) => {
                    tracing::warn!("Device closed the connection");
                    return Err(RelayError::ConnectionClosed);
                }
                Ok(n) => {
                    if n == MAX_REPLY_LINE && buf.last() != Some(&b'\n') {
                        tracing::warn!(
                            "Reply exceeds {} bytes, reporting it in pieces",
                            MAX_REPLY_LINE
                        );
                    }
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.trim_end();
                    tracing::debug!("received {:?}", line);
                    replies.on_line(line);
                    received += 1;
                }
                Err(e) => {
                    tracing::error!("Error reading from serial port: {}", e);
                    return Err(e.into());
                }
            },
        }
    }

    Ok(received)
}
