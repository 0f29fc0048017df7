//! Log-sink wiring: a write target plus a verbosity flag the engine
//! reports into, best-effort, without ever affecting control flow.
//!
//! Every record is a `CallRecord` stamped with the pipeline id and a
//! timestamp. At `Verbosity::Debug` the engine records every call with its
//! resolved arguments and outputs; at `Verbosity::Errors` only error and
//! panic records reach the sink.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Cuánto reporta la cola al sink activo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Sólo registros de error y panic.
    Errors,
    /// Todas las llamadas (argumentos y salidas) además de los errores.
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordLevel {
    Debug,
    Error,
    Panic,
}

/// Registro de una llamada: posición, nombre opcional, firma declarada,
/// argumentos resueltos, salidas producidas y/o error.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub pipeline: Uuid,
    pub ts: DateTime<Utc>,
    pub level: RecordLevel,
    pub position: usize,
    pub name: String,
    pub signature: String,
    pub args: Vec<String>,
    pub outputs: Vec<String>,
    pub error: Option<String>,
}

impl CallRecord {
    fn header(&self) -> String {
        if self.name.is_empty() {
            format!("[{}] {}", self.position, self.signature)
        } else {
            format!("[{}] {:?} {}", self.position, self.name, self.signature)
        }
    }
}

/// Destino de registros. Las implementaciones no deben fallar hacia el
/// engine: escribir es best-effort.
pub trait TraceSink: Send + Sync {
    fn record(&self, rec: &CallRecord);
}

/// Sink de texto sobre cualquier `io::Write`, con prefijos `DEBUG:` /
/// `ERROR:` / `PANIC:`.
pub struct WriterSink<W: Write + Send> {
    target: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(target: W) -> Self {
        Self { target: Mutex::new(target) }
    }
}

impl<W: Write + Send> TraceSink for WriterSink<W> {
    fn record(&self, rec: &CallRecord) {
        let Ok(mut w) = self.target.lock() else { return };
        let line = match rec.level {
            RecordLevel::Debug => format!("DEBUG: {}({}) => ({})",
                                          rec.header(),
                                          rec.args.join(", "),
                                          rec.outputs.join(", ")),
            RecordLevel::Error => format!("ERROR: {} => error: {}",
                                          rec.header(),
                                          rec.error.as_deref().unwrap_or("")),
            RecordLevel::Panic => format!("PANIC: {} => {}",
                                          rec.header(),
                                          rec.error.as_deref().unwrap_or("")),
        };
        let _ = writeln!(w, "{line}");
    }
}

/// Sink JSON-lines: un `CallRecord` serializado por línea.
pub struct JsonLinesSink<W: Write + Send> {
    target: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(target: W) -> Self {
        Self { target: Mutex::new(target) }
    }
}

impl<W: Write + Send> TraceSink for JsonLinesSink<W> {
    fn record(&self, rec: &CallRecord) {
        let Ok(mut w) = self.target.lock() else { return };
        if let Ok(line) = serde_json::to_string(rec) {
            let _ = writeln!(w, "{line}");
        }
    }
}

/// Sink que reemite los registros como eventos `tracing` (el sustrato de
/// logging estándar del ecosistema).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, rec: &CallRecord) {
        match rec.level {
            RecordLevel::Debug => {
                tracing::debug!(pipeline = %rec.pipeline,
                                position = rec.position,
                                name = %rec.name,
                                signature = %rec.signature,
                                args = ?rec.args,
                                outputs = ?rec.outputs,
                                "call");
            }
            RecordLevel::Error => {
                tracing::error!(pipeline = %rec.pipeline,
                                position = rec.position,
                                name = %rec.name,
                                signature = %rec.signature,
                                error = %rec.error.as_deref().unwrap_or(""),
                                "call failed");
            }
            RecordLevel::Panic => {
                tracing::error!(pipeline = %rec.pipeline,
                                position = rec.position,
                                name = %rec.name,
                                signature = %rec.signature,
                                error = %rec.error.as_deref().unwrap_or(""),
                                "call panicked");
            }
        }
    }
}
