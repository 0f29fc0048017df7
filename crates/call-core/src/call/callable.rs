use crate::errors::BoxError;
use crate::value::{ValueSet, ValueType};

/// Resultado abstracto de invocar un `Callable`.
pub enum CallOutcome {
    /// La llamada terminó bien; `outputs` son sus salidas no-error.
    Success { outputs: ValueSet },
    /// La llamada devolvió su error final (convención de error a la cola).
    Failure { error: BoxError },
    /// Los argumentos recibidos no calzan con la firma declarada. Es una
    /// condición estructural: el runner la devuelve sin consultar el
    /// `ErrorHandler`.
    Mismatch { detail: String },
}

/// Capacidad uniforme de invocación que el invoker sostiene de forma
/// polimórfica. Los adapters tipados (ver `call::adapters`) producen
/// implementaciones; firmas exóticas requieren un adapter explícito.
pub trait Callable: Send + Sync {
    /// Tipos de los parámetros fijos declarados (sin contar la cola
    /// variádica).
    fn params(&self) -> &[ValueType];

    /// Tipo de elemento de la cola variádica, si la hay. Una función
    /// variádica acepta cualquier cantidad de argumentos >= `params().len()`.
    fn variadic(&self) -> Option<ValueType> {
        None
    }

    /// Tipos de las salidas no-error declaradas.
    fn outputs(&self) -> &[ValueType];

    /// `true` si la última salida declarada es de tipo error (y por lo
    /// tanto se separa del `ValueSet` y se rutea al `ErrorHandler`).
    fn fallible(&self) -> bool {
        false
    }

    /// Firma legible derivada de los metadatos declarados.
    fn signature(&self) -> String {
        let mut sig = String::from("fn(");
        for (i, p) in self.params().iter().enumerate() {
            if i > 0 {
                sig.push_str(", ");
            }
            sig.push_str(&p.to_string());
        }
        if let Some(v) = self.variadic() {
            if !self.params().is_empty() {
                sig.push_str(", ");
            }
            sig.push_str("...");
            sig.push_str(&v.to_string());
        }
        sig.push(')');

        let outs = self.outputs();
        if !outs.is_empty() || self.fallible() {
            sig.push_str(" -> (");
            for (i, o) in outs.iter().enumerate() {
                if i > 0 {
                    sig.push_str(", ");
                }
                sig.push_str(&o.to_string());
            }
            if self.fallible() {
                if !outs.is_empty() {
                    sig.push_str(", ");
                }
                sig.push_str("error");
            }
            sig.push(')');
        }
        sig
    }

    /// Invoca con la lista de argumentos ya resuelta (marcadores `PIPE`
    /// expandidos).
    fn call(&self, args: ValueSet) -> CallOutcome;
}
