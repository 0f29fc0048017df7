//! Errores estructurados de la cola de llamadas.
//!
//! Dos familias con rutas de propagación distintas:
//! - Estructurales (`InvalidCall`, `InvalidArgument`): un error de
//!   construcción de la cola. Se devuelven tal cual, sin pasar por el
//!   `ErrorHandler`.
//! - De ejecución (`CallPanic`, `Call`): siempre se rutean por el
//!   `ErrorHandler` activo, que decide tragar, transformar o propagar.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error opaco devuelto por una llamada (la cola del `Result`).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Ubicación diagnóstica de una llamada dentro de la cola.
///
/// `name` vacío significa llamada sin nombre; la firma se deriva de los
/// metadatos declarados por el `Callable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub position: usize,
    pub name: String,
    pub signature: String,
}

impl CallSite {
    pub fn new(position: usize, name: &str, signature: String) -> Self {
        Self { position,
               name: name.to_string(),
               signature }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "[{}] {}", self.position, self.signature)
        } else {
            write!(f, "[{}] {:?} {}", self.position, self.name, self.signature)
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// El objetivo de la posición no es invocable (p.ej. una sub-cola cuyo
    /// lock quedó envenenado por un pánico previo).
    #[error("{site} is invalid: {detail}")]
    InvalidCall { site: CallSite, detail: String },

    /// Cantidad o tipos de argumentos incompatibles con la firma declarada,
    /// incluida la regla de cola variádica.
    #[error("{site} got invalid arguments: {detail}")]
    InvalidArgument { site: CallSite, detail: String },

    /// La llamada terminó de forma anormal; interceptada en el borde del
    /// invoker y convertida con posición, firma y argumentos reales.
    #[error("{} panicked (called with [{}]): {}", .site, .args.join(", "), .detail)]
    CallPanic {
        site: CallSite,
        args: Vec<String>,
        detail: String,
    },

    /// Error "de negocio": el valor de error final devuelto por la llamada.
    /// Se comparte en `Arc` para que el runner pueda retener el original
    /// mientras el handler decide (regla del último paso de `fallback`).
    #[error("{0}")]
    Call(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl PipelineError {
    pub fn call(err: impl Into<BoxError>) -> Self {
        PipelineError::Call(Arc::from(err.into()))
    }

    /// Posición de la llamada que originó el error, si se conoce.
    pub fn position(&self) -> Option<usize> {
        match self {
            PipelineError::InvalidCall { site, .. }
            | PipelineError::InvalidArgument { site, .. }
            | PipelineError::CallPanic { site, .. } => Some(site.position),
            PipelineError::Call(_) => None,
        }
    }

    /// Los errores estructurales nunca pasan por el `ErrorHandler`.
    pub fn is_structural(&self) -> bool {
        matches!(self,
                 PipelineError::InvalidCall { .. } | PipelineError::InvalidArgument { .. })
    }
}
