//! The serial endpoint, abstracted behind a small trait so the real device
//! and the simulation sink share one writer implementation (mirrors the
//! donor's `TerminalBackend` split between a real crossterm backend and
//! test doubles).

use std::io;
use std::time::Duration;

/// A byte sink a single frame can be written to. All methods are blocking;
/// the writer task runs them inside `tokio::task::spawn_blocking` for the
/// real backend, and directly (after a token delay) for the simulation
/// sink.
pub trait SerialBackend: Send {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Opens (or re-opens) a backend. Implemented separately from
/// `SerialBackend` because opening is itself a potentially-failing,
/// potentially-blocking operation distinct from steady-state writes.
pub trait BackendOpener: Send + Sync + 'static {
    fn open(&self) -> io::Result<Box<dyn SerialBackend>>;
}

/// Opens a real `serialport` device at the configured path and baud rate.
pub struct RealSerialOpener {
    pub com_port: String,
    pub baud_rate: u32,
}

impl BackendOpener for RealSerialOpener {
    fn open(&self) -> io::Result<Box<dyn SerialBackend>> {
        let port = serialport::new(&self.com_port, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(500))
            .open()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(Box::new(RealSerialBackend { port }))
    }
}

struct RealSerialBackend {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialBackend for RealSerialBackend {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.port, bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut self.port)
    }
}

/// Simulation-mode opener: never fails, and its writes acknowledge after a
/// small token delay rather than touching real hardware (`spec.md` §4.4).
pub struct SimulationOpener;

impl BackendOpener for SimulationOpener {
    fn open(&self) -> io::Result<Box<dyn SerialBackend>> {
        Ok(Box::new(SimulationBackend))
    }
}

struct SimulationBackend;

impl SerialBackend for SimulationBackend {
    fn write_all(&mut self, _bytes: &[u8]) -> io::Result<()> {
        std::thread::sleep(Duration::from_millis(5));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
