//! Política de manejo de errores de la cola.
//!
//! Un `ErrorHandler` es un objeto de política de un solo método: recibe el
//! error de una llamada y devuelve `None` (tragarlo y seguir) o
//! `Some(error)` (parar y propagar, posiblemente transformado). Cada cola
//! tiene a lo sumo un handler activo; la última asignación gana.
//!
//! Las políticas predefinidas son instancias-valor comunes que se pasan
//! explícitamente; no hay singletons globales.

use crate::errors::PipelineError;

pub trait ErrorHandler: Send + Sync {
    /// Recibe un error no-nulo. Devolver `None` lo considera manejado y la
    /// cola continúa; devolver `Some` detiene la cola con ese error.
    fn handle(&self, err: PipelineError) -> Option<PipelineError>;
}

/// Política por defecto de `run`: detenerse en el primer error,
/// devolviéndolo sin transformar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stop;

impl ErrorHandler for Stop {
    fn handle(&self, err: PipelineError) -> Option<PipelineError> {
        Some(err)
    }
}

/// Política por defecto de `fallback`: tragar todos los errores y seguir
/// probando alternativas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ignore;

impl ErrorHandler for Ignore {
    fn handle(&self, _err: PipelineError) -> Option<PipelineError> {
        None
    }
}

/// Escala: panic inmediato en el primer error (una especie de `Must` para
/// cada llamada de la cola).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanicOnError;

impl ErrorHandler for PanicOnError {
    fn handle(&self, err: PipelineError) -> Option<PipelineError> {
        panic!("{err}")
    }
}

/// Adapta una clausura a la capacidad `ErrorHandler`.
pub struct HandlerFn<F>(pub F);

impl<F> ErrorHandler for HandlerFn<F>
    where F: Fn(PipelineError) -> Option<PipelineError> + Send + Sync
{
    fn handle(&self, err: PipelineError) -> Option<PipelineError> {
        (self.0)(err)
    }
}

/// Atajo para construir un handler desde una clausura.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
    where F: Fn(PipelineError) -> Option<PipelineError> + Send + Sync
{
    HandlerFn(f)
}
