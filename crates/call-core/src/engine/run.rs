//! Invoker y runners de la cola.
//!
//! El invoker (`pipe_call`) es el único borde donde una terminación anormal
//! puede aparecer: cada invocación corre dentro de un guard
//! (`catch_unwind`) que convierte cualquier pánico en un `CallPanic`
//! estructurado; ningún fallo sale sin forma. Los dos runners (`run` y
//! `fallback`) recorren las posiciones en orden estricto y consultan la
//! política de errores activa.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;

use crate::call::{CallOutcome, CallSpec};
use crate::errors::PipelineError;
use crate::handler::{ErrorHandler, Ignore, Stop};
use crate::trace::{CallRecord, RecordLevel, Verbosity};
use crate::value::ValueSet;

use super::pipeline::Pipeline;

/// Resultado de una ejecución en modo fallback: la posición donde el
/// recorrido se detuvo y el error reportado, si lo hubo.
#[derive(Debug)]
pub struct FallbackOutcome {
    pub position: usize,
    pub error: Option<PipelineError>,
}

impl FallbackOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Pipeline {
    /// Ejecuta la cola completa.
    ///
    /// En cada posición se invoca la llamada con sus argumentos, con cada
    /// `PIPE` reemplazado por las salidas de la llamada anterior. Si la
    /// llamada produce un error, decide el `ErrorHandler`: `None` continúa
    /// con la siguiente posición, `Some` detiene la cola y ese error se
    /// devuelve. El handler por defecto es `Stop`.
    ///
    /// Los errores estructurales (`InvalidCall`, `InvalidArgument`) no
    /// pasan por el handler: denuncian una cola mal construida y se
    /// devuelven tal cual. Para diagnósticos más tempranos, usar
    /// `check_and_run`.
    pub fn run(&mut self) -> Result<(), PipelineError> {
        let handler = self.active_handler().unwrap_or_else(|| Arc::new(Stop));
        let mut vals = self.take_start_values();

        for i in 0..self.calls().len() {
            let (outputs, err) = self.pipe_call(&self.calls()[i], &vals);
            vals = outputs;

            if let Some(e) = err {
                if e.is_structural() {
                    return Err(e);
                }
                match handler.handle(e) {
                    Some(stop) => return Err(stop),
                    None => continue,
                }
            }

            if let Some(e) = self.compose_for(i, &vals, &*handler) {
                return Err(e);
            }
        }
        Ok(())
    }

    /// Ejecuta la cola hasta la primera llamada que NO devuelve error.
    ///
    /// Diferencias con `run`:
    /// - la primera llamada exitosa termina el recorrido, reportando su
    ///   posición y ningún error; las posiciones siguientes no se intentan;
    /// - todas las alternativas reciben el mismo conjunto de valores
    ///   entrante (una llamada fallida no produce salidas que entubar);
    /// - el handler por defecto es `Ignore`, porque el propósito del modo
    ///   es probar alternativas;
    /// - si la última posición también falla, su error original se reporta
    ///   siempre, aunque el handler lo hubiera tragado: el último paso es
    ///   el último recurso del caller y su falla tiene que ser visible.
    ///
    /// Branches y feeds corren sólo para la posición que termina siendo el
    /// éxito o la falla final reportada.
    pub fn fallback(&mut self) -> FallbackOutcome {
        let handler = self.active_handler().unwrap_or_else(|| Arc::new(Ignore));
        // cada alternativa recibe el mismo conjunto entrante: una llamada
        // fallida no produce salidas que entubar hacia la siguiente
        let vals = self.take_start_values();
        let count = self.calls().len();

        for i in 0..count {
            let (outputs, err) = self.pipe_call(&self.calls()[i], &vals);

            let Some(e) = err else {
                // éxito: esta posición es la ganadora
                if let Some(ce) = self.compose_for(i, &outputs, &*handler) {
                    return FallbackOutcome { position: i, error: Some(ce) };
                }
                return FallbackOutcome { position: i, error: None };
            };

            if e.is_structural() {
                return FallbackOutcome { position: i, error: Some(e) };
            }

            if i + 1 == count {
                // última posición: reportar siempre, transformado o no
                let original = e.clone();
                let reported = handler.handle(e).unwrap_or(original);
                if let Some(ce) = self.compose_for(i, &ValueSet::new(), &*handler) {
                    return FallbackOutcome { position: i, error: Some(ce) };
                }
                return FallbackOutcome { position: i, error: Some(reported) };
            }

            if let Some(stop) = handler.handle(e) {
                return FallbackOutcome { position: i, error: Some(stop) };
            }
        }

        FallbackOutcome { position: 0, error: None }
    }

    /// Valida firmas y tipos primero (`check`) y sólo ejecuta si la cola
    /// está bien formada.
    pub fn check_and_run(&mut self) -> Result<(), PipelineError> {
        self.check()?;
        self.run()
    }

    /// Variante validada de `fallback`: si `check` falla, reporta el error
    /// estructural sin ejecutar nada.
    pub fn check_and_fallback(&mut self) -> FallbackOutcome {
        if let Err(e) = self.check() {
            return FallbackOutcome { position: e.position().unwrap_or(0),
                                     error: Some(e) };
        }
        self.fallback()
    }

    /// Invoca una llamada con los `PIPE` resueltos contra `piped`.
    ///
    /// Devuelve las salidas no-error (vacías en caso de error: en Rust el
    /// camino `Err` no produce valores) y el error del paso, si lo hubo.
    /// Cualquier pánico dentro de la llamada se intercepta acá y se
    /// convierte en `CallPanic` con posición, nombre, firma y argumentos.
    pub(crate) fn pipe_call(&self,
                            spec: &CallSpec,
                            piped: &ValueSet)
                            -> (ValueSet, Option<PipelineError>) {
        let all = spec.resolve_args(piped);
        let rendered: Vec<String> = all.iter().map(|v| v.render()).collect();

        let outcome = catch_unwind(AssertUnwindSafe(|| spec.target().call(all)));

        match outcome {
            Err(payload) => {
                let err = PipelineError::CallPanic { site: spec.site(),
                                                     args: rendered.clone(),
                                                     detail: panic_message(payload) };
                self.emit(RecordLevel::Panic, spec, rendered, Vec::new(), Some(err.to_string()));
                (ValueSet::new(), Some(err))
            }
            Ok(CallOutcome::Success { outputs }) => {
                self.emit(RecordLevel::Debug,
                          spec,
                          rendered,
                          outputs.iter().map(|v| v.render()).collect(),
                          None);
                (outputs, None)
            }
            Ok(CallOutcome::Failure { error }) => {
                let err = PipelineError::call(error);
                self.emit(RecordLevel::Error, spec, rendered, Vec::new(), Some(err.to_string()));
                (ValueSet::new(), Some(err))
            }
            Ok(CallOutcome::Mismatch { detail }) => {
                let err = PipelineError::InvalidArgument { site: spec.site(),
                                                           detail };
                self.emit(RecordLevel::Panic, spec, rendered, Vec::new(), Some(err.to_string()));
                (ValueSet::new(), Some(err))
            }
        }
    }

    /// Escribe un registro en el sink activo, si corresponde a la
    /// verbosidad. Best-effort: nunca afecta el control de flujo.
    pub(crate) fn emit(&self,
                       level: RecordLevel,
                       spec: &CallSpec,
                       args: Vec<String>,
                       outputs: Vec<String>,
                       error: Option<String>) {
        let Some(binding) = self.trace_binding() else { return };
        if binding.verbosity == Verbosity::Errors && level == RecordLevel::Debug {
            return;
        }
        binding.sink.record(&CallRecord { pipeline: self.id(),
                                          ts: Utc::now(),
                                          level,
                                          position: spec.position(),
                                          name: spec.name().to_string(),
                                          signature: spec.target().signature(),
                                          args,
                                          outputs,
                                          error });
    }
}
