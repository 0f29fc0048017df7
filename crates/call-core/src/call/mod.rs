//! Definiciones relacionadas a llamadas.
//!
//! Una llamada es la unidad que la cola ejecuta: un objetivo invocable
//! (`Callable`) más su lista de argumentos fija, donde el marcador `PIPE`
//! se sustituye en runtime por las salidas del paso anterior. Este módulo
//! define:
//! - `Pipe` / `PIPE`: el pseudo-argumento de sustitución.
//! - `CallSpec`: el descriptor de una llamada (objetivo, args, nombre,
//!   posición).
//! - `Callable` y `CallOutcome`: la capacidad uniforme que el invoker
//!   sostiene de forma polimórfica.
//! - Los adapters tipados (`func0..func5`, `try_*`, `*_2`, `*v`) que
//!   convierten funciones Rust comunes en `Callable`.

pub mod adapters;
pub mod callable;
pub mod spec;

pub use adapters::{func0, func0_2, func0v, func1, func1_2, func1v, func2, func2_2, func2v, func3,
                   func3_2, func4, func5, try_func0, try_func0_2, try_func0v, try_func1,
                   try_func1_2, try_func1v, try_func2, try_func2_2, try_func2v, try_func3,
                   try_func3_2, try_func4, try_func5, FnCallable};
pub use callable::{Callable, CallOutcome};
pub use spec::{CallSpec, Pipe, PIPE};
