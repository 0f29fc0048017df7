//! Valores dinámicos que fluyen entre llamadas.
//!
//! Rol en la cola:
//! - Cada llamada produce un `ValueSet` (sus salidas no-error, en orden).
//! - El invoker expande el marcador `PIPE` sustituyéndolo por el `ValueSet`
//!   del paso anterior, preservando el orden relativo frente a literales.
//! - `ValueType` es la identidad de tipo usada por el validador de firmas.

mod dynamic;

pub use dynamic::{short_name, PipeValue, ValueSet, ValueType};
