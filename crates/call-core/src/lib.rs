//! call-core: Cola secuencial de llamadas con piping de salidas y manejo
//! de errores uniforme.
//!
//! Dada una lista ordenada de llamadas con argumentos explícitos o
//! entubados, la cola las invoca en orden, sustituyendo el marcador `PIPE`
//! por las salidas no-error del paso anterior y aplicando una única
//! política de errores (`ErrorHandler`) sobre todo el recorrido. Dos modos
//! de ejecución: `run` (parar en el primer error no manejado) y `fallback`
//! (parar en el primer éxito). Branches ("tees") y feeds permiten
//! invocaciones laterales y sub-colas dependientes.
//!
//! La ejecución es estrictamente secuencial y monohilo: ninguna operación
//! suspende ni espera, y una llamada colgada cuelga el runner (limitación
//! conocida, fuera de alcance).

pub mod call;
pub mod engine;
pub mod errors;
pub mod handler;
pub mod trace;
pub mod value;

pub use call::{func0, func0_2, func0v, func1, func1_2, func1v, func2, func2_2, func2v, func3,
               func3_2, func4, func5, try_func0, try_func0_2, try_func0v, try_func1, try_func1_2,
               try_func1v, try_func2, try_func2_2, try_func2v, try_func3, try_func3_2, try_func4,
               try_func5, CallOutcome, CallSpec, Callable, FnCallable, Pipe, PIPE};
pub use engine::{FallbackOutcome, Pipeline};
pub use errors::{BoxError, CallSite, PipelineError};
pub use handler::{handler_fn, ErrorHandler, HandlerFn, Ignore, PanicOnError, Stop};
pub use trace::{CallRecord, JsonLinesSink, RecordLevel, TraceSink, TracingSink, Verbosity,
                WriterSink};
pub use value::{PipeValue, ValueSet, ValueType};
